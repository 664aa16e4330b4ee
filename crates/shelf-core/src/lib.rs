//! # shelf-core: Pure Inventory Rules for Shelf
//!
//! This crate holds the domain model of the library inventory and the rules
//! that keep its copy counters consistent. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shelf Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation Shell (apps/cli)                │   │
//! │  │    list ──► add ──► edit ──► borrow / return ──► delete         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plain input struct / Outcome           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shelf-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   error   │  │ validation│                  │   │
//! │  │   │   Book    │  │ CoreError │  │   rules   │                  │   │
//! │  │   │  Outcome  │  │           │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO TERMINAL • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shelf-db (Inventory Store)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Book, BookInput, Outcome, InventoryStats)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## The Copies Invariant
//!
//! Every [`Book`] satisfies `0 <= available_copies <= total_copies` after
//! every operation. The guards live here as pure functions so the store and
//! the shell agree on what "can borrow" and "can return" mean.
//!
//! ## Example Usage
//!
//! ```rust
//! use shelf_core::{Book, Outcome};
//!
//! let mut book = Book::first_copy(1, "Dune", "Herbert", "111");
//! assert!(book.can_borrow());
//! assert!(!book.can_return());
//!
//! book.borrow().unwrap();
//! assert_eq!(book.on_loan(), 1);
//! assert!(book.borrow().is_err());
//!
//! assert_eq!(Outcome::Borrowed { id: 1, available_copies: 0 }.message(), "borrowed");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a book title, in characters.
pub const MAX_TITLE_LEN: usize = 500;

/// Maximum length of an author field, in characters.
pub const MAX_AUTHOR_LEN: usize = 300;

/// Maximum length of an ISBN field, in characters.
///
/// ISBN-13 with hyphens is 17 characters; the extra room covers
/// local catalogue numbers some libraries use instead.
pub const MAX_ISBN_LEN: usize = 32;

/// Maximum length of a search query typed at the shell, in characters.
/// The store itself accepts queries of any length.
pub const MAX_QUERY_LEN: usize = 100;
