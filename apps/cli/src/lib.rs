//! # Shelf Shell Library
//!
//! The presentation shell of the Shelf library inventory: configuration,
//! logging, command dispatch and rendering. `main.rs` only parses arguments
//! and maps the result to an exit code.
//!
//! ## Module Organization
//! ```text
//! shelf_cli/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap grammar, command execution
//! ├── prompt.rs       ◄─── Interactive prompt
//! ├── config.rs       ◄─── ShelfConfig (file + env + flags)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   └── book.rs     ◄─── Operation boundary (Outcome / ApiError)
//! ├── render.rs       ◄─── Text tables and JSON
//! └── error.rs        ◄─── ApiError, ShellError
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompt;
pub mod render;

use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::ShelfConfig;
use error::{ShellError, ShellResult};
use shelf_db::Database;

/// Runs the shell for parsed arguments.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Shell Startup                                     │
/// │                                                                         │
/// │  1. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults < shelf.toml < SHELF_* env < --db                        │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber to stderr, RUST_LOG wins over config           │
/// │                                                                         │
/// │  3. Open Database ────────────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │     • Failure here aborts with a non-zero exit                          │
/// │                                                                         │
/// │  4. Dispatch ─────────────────────────────────────────────────────────► │
/// │     • one command, or the interactive prompt                            │
/// │                                                                         │
/// │  5. Close Database ───────────────────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> ShellResult<()> {
    let mut config = ShelfConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.db {
        config = config.with_database_path(path);
        config.validate()?;
    }

    init_tracing(&config.logging.filter);

    let db = open_database(&config).await?;
    let mut stdout = std::io::stdout();

    let result = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let stdin = BufReader::new(tokio::io::stdin());
            prompt::run_prompt(&db, stdin, &mut stdout, cli.json).await
        }
        command => command.execute(&db, &mut stdout, cli.json).await,
    };

    db.close().await;
    info!("Database closed");
    result
}

/// Opens the store described by `config`.
///
/// ## When This Occurs
/// Once per process, before any command runs. There is no retry: a store
/// that cannot be opened ends the process.
pub async fn open_database(config: &ShelfConfig) -> ShellResult<Database> {
    let db_config = config.db_config()?;
    info!(path = %db_config.database_path.display(), "Opening database");

    Database::new(db_config).await.map_err(|e| {
        error!(error = %e, "Storage unavailable at startup");
        ShellError::Storage(e)
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shelf=trace` - Show trace for shelf crates only
/// - Otherwise the configured filter (`[logging] filter` / `SHELF_LOG`)
///
/// Logs go to stderr; stdout carries only rendered output.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
