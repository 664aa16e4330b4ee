//! # Shelf Entry Point
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shelf                                            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Terminal                                    │  │
//! │  │  shelf borrow 7            shelf> search le guin                 │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    Rust Shell (this crate)                       │  │
//! │  │                                                                  │  │
//! │  │  main.rs ────► Parses arguments, maps result to exit code       │  │
//! │  │                                                                  │  │
//! │  │  lib.rs ─────► Config, logging, database, dispatch              │  │
//! │  │                                                                  │  │
//! │  │  commands/ ──► add_book, borrow_book, return_book, ...          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         SQLite Database                          │  │
//! │  │  shelf.db (local file, WAL mode)                                 │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::process::ExitCode;

use shelf_cli::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The actual setup is in lib.rs for better testability
    match shelf_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("shelf: {}", e);
            ExitCode::FAILURE
        }
    }
}
