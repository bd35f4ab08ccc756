//! # Sari Counter Library
//!
//! The till session: one store database, one cart, and a line-oriented
//! command loop over stdin.
//!
//! ## Module Organization
//! ```text
//! sari_counter_lib/
//! ├── lib.rs          ◄─── You are here (startup & command loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── cart.rs     ◄─── Session cart + adjustments
//! │   └── config.rs   ◄─── Configuration from SARI_* variables
//! ├── commands/
//! │   ├── mod.rs      ◄─── Parsing & dispatch
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── sale.rs     ◄─── Commit & sale lookup
//! │   ├── credit.rs   ◄─── Credit payments & outstanding balances
//! │   ├── inventory.rs◄─── Catalog & stock
//! │   ├── expense.rs  ◄─── Expense log
//! │   └── report.rs   ◄─── Summaries
//! └── error.rs        ◄─── ApiError for commands
//! ```
//!
//! Responses are written to stdout as JSON; logs go to stderr.

pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;

use directories::ProjectDirs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::Command;
use sari_db::{Database, DbConfig};
use state::{CartState, ConfigState, DbState};

/// Runs the counter session until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Counter Startup                                   │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, to stderr                     │
/// │     • Default: info,sari=debug,sqlx=warn (override with RUST_LOG)       │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • SARI_STORE_NAME, SARI_CURRENCY_SYMBOL, ...                        │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SARI_DB_PATH or the platform data directory                       │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │                                                                         │
/// │  4. Command Loop ─────────────────────────────────────────────────────► │
/// │     • one command per line, JSON response per command                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ConfigState::from_env();
    info!(store = %config.store_name, "Starting Sari POS counter");

    let db_path = get_database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let db_state = DbState::new(db);
    let cart_state = CartState::new();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(format!("{} ready. Type 'help' for commands.\n", config.store_name).as_bytes())
        .await?;

    while let Some(line) = lines.next_line().await? {
        let output = match commands::parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Help)) => commands::HELP.to_string(),
            Ok(Some(command)) => {
                match commands::execute(command, &db_state, &cart_state, &config).await {
                    Ok(value) => serde_json::to_string_pretty(&value)?,
                    Err(e) => serde_json::to_string_pretty(&e)?,
                }
            }
            Err(e) => serde_json::to_string_pretty(&e)?,
        };

        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    db_state.inner().close().await;
    info!("Counter session ended");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=sari=trace` - Show trace for sari crates only
/// - Default: `info,sari=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sari=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.sari.pos/sari.db`
/// - **Windows**: `%APPDATA%\sari\pos\data\sari.db`
/// - **Linux**: `~/.local/share/pos/sari.db`
///
/// `SARI_DB_PATH` overrides the default.
fn get_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(path) = std::env::var("SARI_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "sari", "pos")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("sari.db"))
}
