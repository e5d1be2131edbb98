use std::fs::{self, OpenOptions};
use std::path::Path;

use dotenvy::dotenv;
use talentbank::app;
use talentbank::config::{database, roster};
use talentbank::core::session::SessionStore;
use talentbank::core::user::seed_roster;
use talentbank::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Default log file; override with `TALENTBANK_LOG`.
const DEFAULT_LOG_PATH: &str = "data/talentbank.log";
/// Directory holding the database file and the persisted session.
const DATA_DIR: &str = "data";
/// Roster file consumed on startup when present.
const ROSTER_PATH: &str = "roster.toml";

/// Initializes tracing to an append-mode log file. The terminal owns stdout
/// while the UI runs, so nothing may print there.
fn init_logging(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env first so it can supply the log path and database URL.
    dotenv().ok();

    // 2. Initialize tracing before anything that can fail.
    let log_path =
        std::env::var("TALENTBANK_LOG").unwrap_or_else(|_| DEFAULT_LOG_PATH.to_string());
    init_logging(&log_path)?;
    info!("Starting talentbank");

    // 3. Initialize the database.
    fs::create_dir_all(DATA_DIR)?;
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connected"))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 4. Seed accounts from the roster file when one is present.
    if Path::new(ROSTER_PATH).exists() {
        let config = roster::load_roster(ROSTER_PATH)
            .inspect_err(|e| error!("Failed to read {ROSTER_PATH}: {e}"))?;
        seed_roster(&db, &config)
            .await
            .inspect(|inserted| info!("Roster seeded, {inserted} new accounts"))
            .inspect_err(|e| error!("Failed to seed roster: {e}"))?;
    }

    // 5. Run the terminal UI.
    let session_store = SessionStore::new(DATA_DIR);
    app::run(db, session_store)
        .await
        .inspect_err(|e| error!("UI error: {e}"))?;

    info!("Shut down cleanly");
    Ok(())
}
