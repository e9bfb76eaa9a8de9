use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use community_portal::{
    fetch_events, logging, register, Catalog, Config, FileSource, LoadingIndicator,
    ALL_CATEGORIES,
};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "community-portal", version, about = "Community events: browse and register")]
struct Cli {
    /// Catalog file (.json or .csv)
    #[arg(long, global = true, env = "PORTAL_CATALOG")]
    catalog: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD) for validity checks; defaults to today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal UI (default)
    Ui,
    /// Print events that can still be registered for
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Include past and full events
        #[arg(long)]
        all: bool,
    },
    /// Register one attendee for an event and save the catalog
    Register {
        id: u32,
    },
    /// One summary line per event
    Summary {
        #[arg(long)]
        category: Option<String>,
    },
}

/// "Loading events..." on stderr while a fetch is in flight
struct ConsoleSpinner;

impl LoadingIndicator for ConsoleSpinner {
    fn show(&mut self) {
        eprint!("⏳ Loading events...");
        let _ = std::io::stderr().flush();
    }

    fn hide(&mut self) {
        eprintln!("\r                    \r");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.catalog {
        config.catalog_path = path;
    }
    if cli.today.is_some() {
        config.today = cli.today;
    }

    let command = cli.command.unwrap_or(Command::Ui);

    // stderr belongs to the terminal UI while it runs
    if !matches!(command, Command::Ui) {
        logging::init(&config.server.log_level);
    }

    let reference_date = config.reference_date();
    match command {
        Command::Ui => run_ui_mode(config).await,
        Command::List { category, search, all } => {
            run_list(&config, reference_date, category, search, all).await
        }
        Command::Register { id } => run_register(&config, reference_date, id).await,
        Command::Summary { category } => run_summary(&config, category).await,
    }
}

async fn load_catalog(config: &Config) -> Result<Catalog> {
    let source = FileSource::new(&config.catalog_path);
    let events = fetch_events(&source, config.fetch_delay(), &mut ConsoleSpinner)
        .await
        .with_context(|| community_portal::FETCH_ERROR_MESSAGE.to_string())?;
    Ok(Catalog::from_events(events)?)
}

async fn run_list(
    config: &Config,
    reference_date: NaiveDate,
    category: Option<String>,
    search: Option<String>,
    all: bool,
) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let category = category.unwrap_or_else(|| ALL_CATEGORIES.to_string());
    let query = search.map(|s| s.to_lowercase());

    let events: Vec<_> = catalog
        .by_category(&category)
        .into_iter()
        .filter(|event| all || catalog.is_valid(event, reference_date))
        .filter(|event| match &query {
            Some(query) => event.name.to_lowercase().contains(query),
            None => true,
        })
        .collect();

    if events.is_empty() {
        println!("No events to show.");
    }
    for event in events {
        println!(
            "{:>4}  {:<36} {:<14} {:<20} seats left: {}",
            event.id,
            event.card_title(),
            event.category,
            event.location,
            event.seats
        );
    }
    Ok(())
}

async fn run_register(config: &Config, reference_date: NaiveDate, id: u32) -> Result<()> {
    let mut catalog = load_catalog(config).await?;
    let seats_left = register(&mut catalog, id, reference_date)
        .with_context(|| format!("Registration failed for event {}", id))?;

    // Persist the seat change so the next run sees it
    catalog.save(&config.catalog_path)?;
    println!("✓ Registered for event {}. Seats left: {}", id, seats_left);
    Ok(())
}

async fn run_summary(config: &Config, category: Option<String>) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let category = category.unwrap_or_else(|| ALL_CATEGORIES.to_string());
    for event in catalog.by_category(&category) {
        println!("{}", event.summary());
    }
    Ok(())
}

#[cfg(feature = "tui")]
async fn run_ui_mode(config: Config) -> Result<()> {
    use community_portal::form::SimulatedBackend;
    use community_portal::ui::{self, App};
    use community_portal::SubmitFlow;

    let catalog = load_catalog(&config).await?;
    let runtime = tokio::runtime::Handle::current();

    let mut app =
        App::new(catalog, config.reference_date(), runtime).with_fetch_delay(config.fetch_delay());
    if config.submit_flow == SubmitFlow::Simulated {
        app = app.with_backend(Box::new(SimulatedBackend::new(
            config.backend_success_rate,
            config.backend_delay(),
        )));
    }

    // The UI loop joins background jobs with block_on, so keep it off the async workers
    tokio::task::spawn_blocking(move || ui::run_ui(&mut app))
        .await
        .context("UI thread panicked")??;

    Ok(())
}

#[cfg(not(feature = "tui"))]
async fn run_ui_mode(_config: Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin portal-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use community_portal::EventRecord;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn config_for(path: PathBuf) -> Config {
        Config {
            catalog_path: path,
            fetch_delay_ms: 0,
            ..Config::default()
        }
    }

    fn write_sample(path: &std::path::Path) {
        Catalog::from_events(vec![
            EventRecord::new(1, "Music Fest", date("2025-07-15"), 50, "Music", "Park"),
            EventRecord::new(2, "Baking Workshop", date("2023-05-01"), 0, "Workshop", "Community Center"),
        ])
        .unwrap()
        .save(path)
        .unwrap();
    }

    #[tokio::test]
    async fn test_register_command_saves_json() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path().join("events.json"));
        write_sample(&config.catalog_path);

        run_register(&config, date("2025-07-01"), 1).await.unwrap();
        run_register(&config, date("2025-07-01"), 1).await.unwrap();

        let saved = Catalog::load(&config.catalog_path).unwrap();
        assert_eq!(saved.find(1).unwrap().seats, 48);
        assert_eq!(saved.find(2).unwrap().seats, 0);
    }

    #[tokio::test]
    async fn test_register_command_saves_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path().join("events.csv"));
        write_sample(&config.catalog_path);

        run_register(&config, date("2025-07-01"), 1).await.unwrap();

        let saved = Catalog::load(&config.catalog_path).unwrap();
        assert_eq!(saved.find(1).unwrap().seats, 49);
    }

    #[tokio::test]
    async fn test_register_command_failure_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path().join("events.json"));
        write_sample(&config.catalog_path);
        let before = std::fs::read_to_string(&config.catalog_path).unwrap();

        let err = run_register(&config, date("2025-07-01"), 2).await.unwrap_err();
        assert!(err.to_string().contains("Registration failed for event 2"));
        assert!(run_register(&config, date("2025-07-01"), 99).await.is_err());

        assert_eq!(std::fs::read_to_string(&config.catalog_path).unwrap(), before);
    }
}
