// ⏳ Simulated Fetch - load events after an artificial network delay
//
// The loading indicator is raised for the whole call and lowered on
// every exit path (guard drop), success or failure.

use crate::catalog::Catalog;
use crate::event::EventRecord;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What the display shows when a fetch fails
pub const FETCH_ERROR_MESSAGE: &str = "Error loading events.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to fetch events")]
    NotOk,

    #[error("Failed to load events: {0}")]
    Source(String),
}

/// Response of a (simulated) events endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub ok: bool,
    pub events: Vec<EventRecord>,
}

pub trait EventSource {
    fn respond(&self) -> Result<FetchResponse, FetchError>;
}

/// Serves a snapshot of an in-memory catalog
impl EventSource for Catalog {
    fn respond(&self) -> Result<FetchResponse, FetchError> {
        Ok(FetchResponse {
            ok: true,
            events: self.events().to_vec(),
        })
    }
}

/// Re-reads a catalog file on every request
#[derive(Debug, Clone)]
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl EventSource for FileSource {
    fn respond(&self) -> Result<FetchResponse, FetchError> {
        let catalog = Catalog::load(&self.path).map_err(|e| FetchError::Source(format!("{e:#}")))?;
        Ok(FetchResponse {
            ok: true,
            events: catalog.events().to_vec(),
        })
    }
}

// ============================================================================
// LOADING INDICATOR
// ============================================================================

pub trait LoadingIndicator {
    fn show(&mut self);
    fn hide(&mut self);
}

/// Shared on/off flag, readable from another thread or task
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl LoadingIndicator for LoadingFlag {
    fn show(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn hide(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct LoadingGuard<'a, L: LoadingIndicator + ?Sized> {
    indicator: &'a mut L,
}

impl<'a, L: LoadingIndicator + ?Sized> LoadingGuard<'a, L> {
    fn raise(indicator: &'a mut L) -> Self {
        indicator.show();
        LoadingGuard { indicator }
    }
}

impl<L: LoadingIndicator + ?Sized> Drop for LoadingGuard<'_, L> {
    fn drop(&mut self) {
        self.indicator.hide();
    }
}

/// Fetch events from `source` after `delay`.
///
/// No cancellation, retry or timeout.
pub async fn fetch_events<S, L>(
    source: &S,
    delay: Duration,
    indicator: &mut L,
) -> Result<Vec<EventRecord>, FetchError>
where
    S: EventSource + ?Sized,
    L: LoadingIndicator + ?Sized,
{
    let _guard = LoadingGuard::raise(indicator);

    tokio::time::sleep(delay).await;

    let response = source.respond().map_err(|e| {
        tracing::error!(error = %e, "fetch failed");
        e
    })?;

    if !response.ok {
        tracing::error!("fetch failed: response not ok");
        return Err(FetchError::NotOk);
    }

    tracing::info!(events = response.events.len(), "fetched events");
    Ok(response.events)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct FailingSource;

    impl EventSource for FailingSource {
        fn respond(&self) -> Result<FetchResponse, FetchError> {
            Ok(FetchResponse {
                ok: false,
                events: Vec::new(),
            })
        }
    }

    /// Records every show/hide call
    #[derive(Default)]
    struct Recorder(Vec<&'static str>);

    impl LoadingIndicator for Recorder {
        fn show(&mut self) {
            self.0.push("show");
        }

        fn hide(&mut self) {
            self.0.push("hide");
        }
    }

    #[tokio::test]
    async fn test_fetch_from_catalog() {
        let catalog = Catalog::from_events(vec![EventRecord::new(
            1,
            "Music Fest",
            date("2025-07-15"),
            50,
            "Music",
            "Park",
        )])
        .unwrap();
        let mut recorder = Recorder::default();

        let events = fetch_events(&catalog, Duration::from_millis(5), &mut recorder)
            .await
            .unwrap();

        assert_eq!(events, catalog.events().to_vec());
        assert_eq!(recorder.0, vec!["show", "hide"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_still_hides_indicator() {
        let mut recorder = Recorder::default();

        let err = fetch_events(&FailingSource, Duration::ZERO, &mut recorder)
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::NotOk);
        assert_eq!(recorder.0, vec!["show", "hide"]);
    }

    #[tokio::test]
    async fn test_loading_flag_lowered_after_source_error() {
        let mut flag = LoadingFlag::new();
        let source = FileSource::new("does/not/exist.json");

        let err = fetch_events(&source, Duration::ZERO, &mut flag).await.unwrap_err();

        assert!(matches!(err, FetchError::Source(_)));
        assert!(!flag.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flag_raised_while_waiting() {
        let mut flag = LoadingFlag::new();
        let observer = flag.clone();
        let catalog = Catalog::new();

        let task = tokio::spawn(async move {
            fetch_events(&catalog, Duration::from_millis(1500), &mut flag).await
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(observer.is_loading());

        let events = task.await.unwrap().unwrap();
        assert!(events.is_empty());
        assert!(!observer.is_loading());
    }

    #[tokio::test]
    async fn test_file_source_reads_current_contents() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"id":3,"name":"Soccer Tournament","date":"2025-08-10","seats":10,"category":"Sports","location":"Stadium"}}]"#
        )
        .unwrap();
        file.flush().unwrap();

        let mut flag = LoadingFlag::new();
        let events = fetch_events(&FileSource::new(file.path()), Duration::ZERO, &mut flag)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Soccer Tournament");
    }
}
