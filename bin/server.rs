// Community Portal - Web Server
// JSON API over one shared in-memory catalog

use anyhow::{Context, Result};
use community_portal::api::{router, AppState};
use community_portal::{logging, Catalog, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init(&config.server.log_level);

    let catalog = Catalog::load(&config.catalog_path)
        .with_context(|| format!("Failed to load catalog from {:?}", config.catalog_path))?;

    tracing::info!(
        events = catalog.len(),
        flow = ?config.submit_flow,
        "starting community portal server"
    );

    let app = router(AppState::new(catalog, &config));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("listening on http://{}", addr);
    tracing::info!("API: http://{}/api/events", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
