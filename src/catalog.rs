// 📚 Catalog - ordered collection of community events
//
// Insertion order is display order. No secondary index: every lookup
// is a linear scan by identifier.

use crate::event::{EventDraft, EventRecord};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Category filter value that selects every event
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate event id {0}")]
    DuplicateId(u32),

    #[error("unsupported catalog format: {0:?} (expected .json or .csv)")]
    UnsupportedFormat(String),

    #[error("no event id left after {0}")]
    IdsExhausted(u32),
}

/// Upcoming (not strictly before `reference_date`) and not full
pub fn is_valid(event: &EventRecord, reference_date: NaiveDate) -> bool {
    event.is_valid_on(reference_date)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    events: Vec<EventRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog { events: Vec::new() }
    }

    /// Build from records, rejecting duplicate identifiers
    pub fn from_events(events: Vec<EventRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for event in &events {
            if !seen.insert(event.id) {
                return Err(CatalogError::DuplicateId(event.id));
            }
        }
        Ok(Catalog { events })
    }

    /// Load a JSON array of events
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read catalog file: {:?}", path.as_ref()))?;

        let events: Vec<EventRecord> =
            serde_json::from_str(&content).context("Failed to parse catalog JSON")?;

        Ok(Catalog::from_events(events)?)
    }

    /// Load a CSV file with header `id,name,date,seats,category,location`
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path.as_ref())
            .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;

        let mut events = Vec::new();
        for result in rdr.deserialize() {
            let event: EventRecord = result.context("Failed to deserialize event")?;
            events.push(event);
        }

        Ok(Catalog::from_events(events)?)
    }

    /// Load by file extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let catalog = match file_extension(path).as_str() {
            "json" => Catalog::from_json_file(path)?,
            "csv" => Catalog::from_csv_file(path)?,
            _ => return Err(CatalogError::UnsupportedFormat(path.display().to_string()).into()),
        };

        tracing::info!(path = %path.display(), events = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Write back in the format `load` picks for this path.
    ///
    /// The new contents go to a temporary file in the same directory,
    /// which then replaces `path`. A failed write leaves the old file intact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let extension = file_extension(path);
        if extension != "json" && extension != "csv" {
            return Err(CatalogError::UnsupportedFormat(path.display().to_string()).into());
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {:?}", dir))?;

        if extension == "csv" {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            for event in &self.events {
                writer.serialize(event).context("Failed to write event")?;
            }
            writer.flush().context("Failed to flush CSV")?;
        } else {
            serde_json::to_writer_pretty(tmp.as_file_mut(), &self.events)
                .context("Failed to serialize catalog JSON")?;
        }
        tmp.as_file().sync_all()?;

        tmp.persist(path)
            .with_context(|| format!("Failed to replace catalog file: {:?}", path))?;

        tracing::info!(path = %path.display(), events = self.len(), "catalog saved");
        Ok(())
    }

    /// Find event by identifier
    pub fn find(&self, id: u32) -> Option<&EventRecord> {
        self.events.iter().find(|event| event.id == id)
    }

    pub(crate) fn find_mut(&mut self, id: u32) -> Option<&mut EventRecord> {
        self.events.iter_mut().find(|event| event.id == id)
    }

    /// All matching events, in catalog order
    pub fn filter<F>(&self, predicate: F) -> Vec<&EventRecord>
    where
        F: Fn(&EventRecord) -> bool,
    {
        self.events.iter().filter(|event| predicate(event)).collect()
    }

    pub fn is_valid(&self, event: &EventRecord, reference_date: NaiveDate) -> bool {
        is_valid(event, reference_date)
    }

    /// Append to the end
    pub fn add(&mut self, event: EventRecord) {
        self.events.push(event);
    }

    /// Append a draft with the next free identifier (max + 1)
    pub fn add_draft(&mut self, draft: EventDraft) -> Result<u32, CatalogError> {
        let id = self.next_id()?;
        self.events.push(draft.into_record(id));
        Ok(id)
    }

    fn next_id(&self) -> Result<u32, CatalogError> {
        match self.events.iter().map(|event| event.id).max() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(CatalogError::IdsExhausted(max)),
        }
    }

    /// Events that can still be registered for
    pub fn valid_events(&self, reference_date: NaiveDate) -> Vec<&EventRecord> {
        self.filter(|event| is_valid(event, reference_date))
    }

    /// Exact category match; `"all"` selects everything
    pub fn by_category(&self, category: &str) -> Vec<&EventRecord> {
        if category == ALL_CATEGORIES {
            return self.events.iter().collect();
        }
        self.filter(|event| event.category == category)
    }

    /// Case-insensitive substring match on the event name
    pub fn search(&self, query: &str) -> Vec<&EventRecord> {
        let query = query.to_lowercase();
        self.filter(|event| event.name.to_lowercase().contains(&query))
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for event in &self.events {
            if !categories.contains(&event.category) {
                categories.push(event.category.clone());
            }
        }
        categories
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Catalog {
        Catalog::from_events(vec![
            EventRecord::new(1, "Music Fest", date("2025-07-15"), 50, "Music", "Park"),
            EventRecord::new(2, "Baking Workshop", date("2023-05-01"), 0, "Workshop", "Community Center"),
            EventRecord::new(3, "Soccer Tournament", date("2025-08-10"), 10, "Sports", "Stadium"),
            EventRecord::new(4, "Jazz Night", date("2025-06-20"), 0, "Music", "Club"),
        ])
        .unwrap()
    }

    #[test]
    fn test_find() {
        let catalog = sample();
        assert_eq!(catalog.find(3).map(|e| e.name.as_str()), Some("Soccer Tournament"));
        assert!(catalog.find(999).is_none());
    }

    #[test]
    fn test_filter_preserves_order() {
        let catalog = sample();
        let ids: Vec<u32> = catalog.filter(|e| e.seats == 0).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_valid_events() {
        let catalog = sample();
        let ids: Vec<u32> = catalog
            .valid_events(date("2025-07-01"))
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_is_valid_method_matches_free_function() {
        let catalog = sample();
        let reference = date("2025-07-01");
        for event in catalog.events() {
            assert_eq!(catalog.is_valid(event, reference), is_valid(event, reference));
        }
    }

    #[test]
    fn test_add_appends() {
        let mut catalog = sample();
        catalog.add(EventRecord::new(10, "Art Walk", date("2025-09-01"), 5, "Art", "Downtown"));
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.events().last().map(|e| e.id), Some(10));
    }

    #[test]
    fn test_add_draft_assigns_next_id() {
        let mut catalog = sample();
        let id = catalog.add_draft(EventDraft {
            name: "Football Match".to_string(),
            date: date("2025-07-25"),
            seats: 20,
            category: "Sports".to_string(),
            location: "Stadium".to_string(),
        })
        .unwrap();
        assert_eq!(id, 5);
        assert_eq!(catalog.events().last().map(|e| e.id), Some(5));

        let mut empty = Catalog::new();
        let first = empty.add_draft(EventDraft {
            name: "First".to_string(),
            date: date("2025-01-01"),
            seats: 1,
            category: "Misc".to_string(),
            location: "Hall".to_string(),
        })
        .unwrap();
        assert_eq!(first, 1);
    }

    #[test]
    fn test_add_draft_when_ids_run_out() {
        let mut catalog = Catalog::from_events(vec![EventRecord::new(
            u32::MAX,
            "Last",
            date("2025-07-15"),
            5,
            "Music",
            "Park",
        )])
        .unwrap();
        let before = catalog.clone();

        let result = catalog.add_draft(EventDraft {
            name: "One Too Many".to_string(),
            date: date("2025-08-01"),
            seats: 1,
            category: "Music".to_string(),
            location: "Park".to_string(),
        });
        assert_eq!(result, Err(CatalogError::IdsExhausted(u32::MAX)));
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_by_category() {
        let catalog = sample();
        assert_eq!(catalog.by_category("Music").len(), 2);
        assert_eq!(catalog.by_category(ALL_CATEGORIES).len(), 4);
        assert!(catalog.by_category("Gardening").is_empty());
    }

    #[test]
    fn test_search_case_insensitive() {
        let catalog = sample();
        let names: Vec<&str> = catalog.search("NIGHT").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Jazz Night"]);
        assert_eq!(catalog.search("").len(), 4);
    }

    #[test]
    fn test_categories_first_seen_order() {
        assert_eq!(sample().categories(), vec!["Music", "Workshop", "Sports"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::from_events(vec![
            EventRecord::new(1, "A", date("2025-01-01"), 1, "X", "Y"),
            EventRecord::new(1, "B", date("2025-01-02"), 1, "X", "Y"),
        ]);
        assert_eq!(result.unwrap_err(), CatalogError::DuplicateId(1));
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"id":1,"name":"Music Fest","date":"2025-07-15","seats":50,"category":"Music","location":"Park"}}]"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find(1).unwrap().date, date("2025-07-15"));
    }

    #[test]
    fn test_load_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,name,date,seats,category,location").unwrap();
        writeln!(file, "1,Music Fest,2025-07-15,50,Music,Park").unwrap();
        writeln!(file, "3,Soccer Tournament,2025-08-10,10,Sports,Stadium").unwrap();
        file.flush().unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find(3).unwrap().seats, 10);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = Catalog::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported catalog format"));
    }

    #[test]
    fn test_load_rejects_duplicate_ids_in_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,name,date,seats,category,location").unwrap();
        writeln!(file, "1,Music Fest,2025-07-15,50,Music,Park").unwrap();
        writeln!(file, "1,Jazz Night,2025-06-20,0,Music,Club").unwrap();
        file.flush().unwrap();

        let err = Catalog::load(file.path()).unwrap_err();
        assert_eq!(err.downcast_ref::<CatalogError>(), Some(&CatalogError::DuplicateId(1)));
    }

    #[test]
    fn test_save_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        let mut catalog = sample();
        crate::registration::register(&mut catalog, 1, date("2025-07-01")).unwrap();
        catalog.save(&path).unwrap();

        let reloaded = Catalog::load(&path).unwrap();
        assert_eq!(reloaded, catalog);
        assert_eq!(reloaded.find(1).unwrap().seats, 49);
    }

    #[test]
    fn test_save_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");

        let catalog = sample();
        catalog.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,name,date,seats,category,location"));
        assert_eq!(Catalog::load(&path).unwrap(), catalog);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        sample().save(&path).unwrap();

        let smaller = Catalog::from_events(vec![EventRecord::new(
            7,
            "Art Walk",
            date("2025-10-01"),
            12,
            "Art",
            "Downtown",
        )])
        .unwrap();
        smaller.save(&path).unwrap();

        assert_eq!(Catalog::load(&path).unwrap(), smaller);
        // Only the catalog file is left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.txt");
        let err = sample().save(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported catalog format"));
        assert!(!path.exists());
    }
}
