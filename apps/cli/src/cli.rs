//! # Command Line Grammar
//!
//! One clap grammar serves both the one-shot binary and the interactive
//! prompt.
//!
//! ## Usage
//! ```text
//! shelf add --title Dune --author "Frank Herbert" --isbn 9780441013593
//! shelf borrow 1
//! shelf search le guin
//! shelf edit 1 --title "Dune (40th anniversary)"
//! shelf --json list
//! shelf shell            # interactive prompt
//! ```
//!
//! ## After Each Command
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  mutation (add/edit/delete/borrow/return)                               │
//! │       ├── outcome line        "✓ borrowed"                              │
//! │       └── fresh snapshot      table + totals, re-read from the store    │
//! │                                                                         │
//! │  read (list/search/show/stats)                                          │
//! │       └── the requested view, or "✗ <error>"                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::commands::{book, Snapshot};
use crate::error::{ApiError, ShellResult};
use crate::render;
use shelf_core::{BookInput, Outcome};
use shelf_db::Database;

// =============================================================================
// Grammar
// =============================================================================

/// Library book inventory.
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about = "Library book inventory", long_about = None)]
pub struct Cli {
    /// Database file (":memory:" for a throwaway store)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Config file (default: platform config dir/shelf.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Command to run; the interactive prompt when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// One line typed at the interactive prompt.
#[derive(Debug, Parser)]
#[command(
    name = "shelf",
    no_binary_name = true,
    disable_version_flag = true,
    help_template = "{subcommands}"
)]
pub struct PromptLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// List every book
    #[command(visible_alias = "ls")]
    List,

    /// Find books by title, author or ISBN
    Search {
        /// Words to look for, joined with spaces
        #[arg(required = true, num_args = 1..)]
        terms: Vec<String>,
    },

    /// Show one book
    Show {
        /// Book id
        id: i64,
    },

    /// Register a copy (new book for an unseen ISBN)
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        author: String,

        #[arg(short, long)]
        isbn: String,
    },

    /// Change title, author or ISBN of a book
    Edit {
        /// Book id
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(short, long)]
        isbn: Option<String>,
    },

    /// Remove a book and all its copies
    #[command(visible_alias = "rm")]
    Delete {
        /// Book id
        id: i64,
    },

    /// Lend one copy
    Borrow {
        /// Book id
        id: i64,
    },

    /// Take one copy back
    Return {
        /// Book id
        id: i64,
    },

    /// Collection totals
    Stats,

    /// Interactive prompt
    Shell,
}

// =============================================================================
// Execution
// =============================================================================

/// JSON body printed after a mutation.
#[derive(Debug, Serialize)]
struct MutationReport<'a> {
    outcome: &'a Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<Snapshot>,
}

impl Commands {
    /// True for commands that change the collection.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Commands::Add { .. }
                | Commands::Edit { .. }
                | Commands::Delete { .. }
                | Commands::Borrow { .. }
                | Commands::Return { .. }
        )
    }

    /// Runs the command and renders its result.
    ///
    /// Only output failures are returned; store errors are rendered.
    /// `Shell` is handled by the caller and only prints a notice here.
    pub async fn execute(self, db: &Database, out: &mut impl Write, json: bool) -> ShellResult<()> {
        match self {
            Commands::List => show_snapshot(db, None, out, json).await,
            Commands::Search { terms } => {
                let query = terms.join(" ");
                show_snapshot(db, Some(&query), out, json).await
            }
            Commands::Show { id } => match book::get_book(db, id).await {
                Ok(found) if json => render::render_json(out, &found),
                Ok(found) => Ok(render::render_book(out, &found)?),
                Err(e) => show_error(out, &e, json),
            },
            Commands::Stats => match book::inventory_stats(db).await {
                Ok(stats) if json => render::render_json(out, &stats),
                Ok(stats) => Ok(render::render_stats(out, &stats)?),
                Err(e) => show_error(out, &e, json),
            },
            Commands::Add {
                title,
                author,
                isbn,
            } => {
                let outcome = book::add_book(db, BookInput::new(title, author, isbn)).await;
                show_outcome(db, &outcome, out, json).await
            }
            Commands::Edit {
                id,
                title,
                author,
                isbn,
            } => {
                // Fields left out keep their stored value
                let outcome = match book::get_book(db, id).await {
                    Ok(current) => {
                        let input = BookInput::new(
                            title.unwrap_or(current.title),
                            author.unwrap_or(current.author),
                            isbn.unwrap_or(current.isbn),
                        );
                        book::update_book(db, id, input).await
                    }
                    Err(e) => e.into(),
                };
                show_outcome(db, &outcome, out, json).await
            }
            Commands::Delete { id } => {
                let outcome = book::delete_book(db, id).await;
                show_outcome(db, &outcome, out, json).await
            }
            Commands::Borrow { id } => {
                let outcome = book::borrow_book(db, id).await;
                show_outcome(db, &outcome, out, json).await
            }
            Commands::Return { id } => {
                let outcome = book::return_book(db, id).await;
                show_outcome(db, &outcome, out, json).await
            }
            Commands::Shell => {
                writeln!(out, "Already in interactive mode")?;
                Ok(())
            }
        }
    }
}

async fn show_snapshot(
    db: &Database,
    query: Option<&str>,
    out: &mut impl Write,
    json: bool,
) -> ShellResult<()> {
    match book::snapshot(db, query).await {
        Ok(snapshot) if json => render::render_json(out, &snapshot),
        Ok(snapshot) => Ok(render::render_snapshot(out, &snapshot)?),
        Err(e) => show_error(out, &e, json),
    }
}

async fn show_outcome(
    db: &Database,
    outcome: &Outcome,
    out: &mut impl Write,
    json: bool,
) -> ShellResult<()> {
    let snapshot = book::snapshot(db, None).await;

    if json {
        let report = MutationReport {
            outcome,
            snapshot: snapshot.ok(),
        };
        return render::render_json(out, &report);
    }

    render::render_outcome(out, outcome)?;
    writeln!(out)?;
    match snapshot {
        Ok(snapshot) => render::render_snapshot(out, &snapshot)?,
        Err(e) => render::render_error(out, &e)?,
    }
    Ok(())
}

fn show_error(out: &mut impl Write, err: &ApiError, json: bool) -> ShellResult<()> {
    if json {
        render::render_json(out, err)
    } else {
        Ok(render::render_error(out, err)?)
    }
}
