//! Lectorium - catalog consistency tool
//!
//! Loads the catalog through the backend chain, writes a consistency
//! report, and syncs the catalog back through every backend.

use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lectorium::{
    catalog::CatalogStore,
    config::AppConfig,
    report,
    storage::{self, JsonStorage, PersistenceAdapter, SqliteStorage, XmlStorage},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("lectorium={}", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Lectorium v{}", env!("CARGO_PKG_VERSION"));

    let sqlite = SqliteStorage::new(&config.storage.database_path);
    let json = JsonStorage::new(&config.storage.books_json, &config.storage.readers_json);
    let xml = XmlStorage::new(&config.storage.books_xml, &config.storage.readers_xml);
    let adapters: [&dyn PersistenceAdapter; 3] = [&sqlite, &json, &xml];

    // Relational first, then the text formats; empty everywhere means an
    // empty catalog.
    let catalog = storage::load_first_available(&adapters);
    let store = CatalogStore::from_catalog(catalog);

    let summary = report::run_report(
        store.snapshot(),
        PathBuf::from(&config.report.output_path),
    )
    .await?;

    tracing::info!(
        destination = %summary.destination.display(),
        debtors = summary.debtor_count,
        "report complete"
    );

    // Write-through on the way out; a failing backend is reported but the
    // others still get the data.
    if let Err(e) = storage::save_all(&adapters, &store.snapshot()) {
        tracing::warn!(error = %e, "not all backends were saved");
    }

    Ok(())
}
