//! # shelf-db: Inventory Store for Shelf
//!
//! This crate owns the durable collection of books. It uses SQLite for local
//! storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shelf Data Flow                                  │
//! │                                                                         │
//! │  Shell command (borrow 3)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shelf-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ BookRepository│    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │   (book.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ list / search │    │ 001_create_  │  │   │
//! │  │   │ open / close  │    │ add / edit    │    │   books.sql  │  │   │
//! │  │   │               │    │ borrow/return │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/shelf.db                                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Database handle, pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - The book repository
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelf_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/shelf.db")).await?;
//!
//! let added = db.books().add_or_add_copy("Dune", "Herbert", "111").await?;
//! let hits = db.books().search("herb").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, IN_MEMORY_PATH};

pub use repository::book::BookRepository;
