//! # Shell Commands Module
//!
//! The operation boundary between the shell and the inventory store.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! └── book.rs     ◄─── List, search, add, edit, delete, borrow, return
//! ```
//!
//! ## Return Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Results                                      │
//! │                                                                         │
//! │  Reads (list, search, show, stats)                                      │
//! │  ──────────────────────────────────                                     │
//! │  async fn search_books(db: &Database, query: &str)                      │
//! │      -> Result<Vec<BookDto>, ApiError>                                  │
//! │                                                                         │
//! │  Mutations (add, edit, delete, borrow, return)                          │
//! │  ─────────────────────────────────────────────                          │
//! │  async fn borrow_book(db: &Database, id: i64) -> Outcome                │
//! │                                                                         │
//! │  A mutation never returns an error: failures become                     │
//! │  Outcome::Rejected (bad request) or Outcome::Failed (storage).          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod book;

pub use book::{BookDto, Snapshot};
