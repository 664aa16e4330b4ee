//! # Domain Types
//!
//! Core domain types used throughout Shelf.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Book       │   │   BookInput     │   │    Outcome      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (store)     │   │  title          │   │  BookCreated    │       │
//! │  │  isbn (unique)  │   │  author         │   │  CopyAdded      │       │
//! │  │  total_copies   │   │  isbn           │   │  Borrowed       │       │
//! │  │  avail_copies   │   └─────────────────┘   │  Returned ...   │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   AddResult     │   │ InventoryStats  │                             │
//! │  │  Created(Book)  │   │  titles         │                             │
//! │  │  CopyAdded(Book)│   │  on_loan ...    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! - `id`: assigned by the store, immutable, used by every mutating operation
//! - `isbn`: supplied by the user, unique, editable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::validation::{validate_author, validate_isbn, validate_title, ValidationResult};

// =============================================================================
// Book
// =============================================================================

/// A title held by the library, aggregating a count of physical copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Book {
    /// Store-assigned identifier (monotonically increasing).
    pub id: i64,

    /// Display title.
    pub title: String,

    /// Author, free text, may be empty.
    pub author: String,

    /// User-supplied identifier, unique across all books.
    pub isbn: String,

    /// Every copy ever registered under this ISBN.
    pub total_copies: i64,

    /// Copies currently on the shelf (not on loan).
    pub available_copies: i64,

    /// When the book was first added.
    pub created_at: DateTime<Utc>,

    /// When the book was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Builds the record for the first copy of a new ISBN.
    pub fn first_copy(
        id: i64,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Book {
            id,
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            total_copies: 1,
            available_copies: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of copies currently on loan.
    #[inline]
    pub fn on_loan(&self) -> i64 {
        self.total_copies - self.available_copies
    }

    /// True when at least one copy is on the shelf.
    #[inline]
    pub fn can_borrow(&self) -> bool {
        self.available_copies > 0
    }

    /// True when at least one copy is out on loan.
    #[inline]
    pub fn can_return(&self) -> bool {
        self.available_copies < self.total_copies
    }

    /// Checks `0 <= available_copies <= total_copies`.
    pub fn check_invariant(&self) -> CoreResult<()> {
        if self.available_copies < 0 || self.available_copies > self.total_copies {
            return Err(CoreError::InvariantViolated {
                id: self.id,
                total: self.total_copies,
                available: self.available_copies,
            });
        }
        Ok(())
    }

    /// True when title, author or ISBN contains `query`, ignoring case.
    ///
    /// Case folding is Unicode-aware (`"STANISŁAW"` finds `"Stanisław"`).
    /// The query is matched as given; callers decide about trimming.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        [&self.title, &self.author, &self.isbn]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Lends out one copy.
    ///
    /// ## Errors
    /// `CoreError::NoAvailableCopies` when every copy is on loan.
    /// The book is left untouched on error.
    pub fn borrow(&mut self) -> CoreResult<()> {
        if !self.can_borrow() {
            return Err(CoreError::NoAvailableCopies {
                id: self.id,
                title: self.title.clone(),
            });
        }
        self.available_copies -= 1;
        Ok(())
    }

    /// Takes one copy back.
    ///
    /// ## Errors
    /// `CoreError::NothingToReturn` when no copy is on loan.
    /// The book is left untouched on error.
    pub fn return_copy(&mut self) -> CoreResult<()> {
        if !self.can_return() {
            return Err(CoreError::NothingToReturn {
                id: self.id,
                title: self.title.clone(),
            });
        }
        self.available_copies += 1;
        Ok(())
    }
}

// =============================================================================
// Book Input
// =============================================================================

/// The plain form the shell collects for add and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl BookInput {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        BookInput {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
        }
    }

    /// Returns a copy with surrounding whitespace removed from every field.
    pub fn normalized(&self) -> Self {
        BookInput {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
        }
    }

    /// Runs the field validators in form order: title, author, isbn.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_title(&self.title)?;
        validate_author(&self.author)?;
        validate_isbn(&self.isbn)?;
        Ok(())
    }
}

// =============================================================================
// Add Result
// =============================================================================

/// What `add_or_add_copy` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "book", rename_all = "snake_case")]
pub enum AddResult {
    /// No book had this ISBN; a new record with one copy was created.
    Created(Book),
    /// The ISBN existed; one copy was added to it.
    CopyAdded(Book),
}

impl AddResult {
    /// The book after the operation.
    pub fn book(&self) -> &Book {
        match self {
            AddResult::Created(book) | AddResult::CopyAdded(book) => book,
        }
    }

    pub fn into_book(self) -> Book {
        match self {
            AddResult::Created(book) | AddResult::CopyAdded(book) => book,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, AddResult::Created(_))
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of a mutating operation, as shown to the user.
///
/// Every store call made by the shell ends in exactly one `Outcome`; store
/// errors are folded into [`Outcome::Rejected`] or [`Outcome::Failed`]
/// rather than surfacing as faults.
///
/// ## Messages
/// ```text
/// BookCreated        → "new book created"
/// CopyAdded          → "copy added to existing book"
/// DetailsUpdated     → "book details updated"
/// Deleted            → "book deleted"
/// Borrowed           → "borrowed"
/// NoCopiesAvailable  → "no copies available"
/// Returned           → "returned"
/// AllCopiesReturned  → "all copies already returned"
/// Rejected / Failed  → the carried reason
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    BookCreated { id: i64 },
    CopyAdded { id: i64, total_copies: i64 },
    DetailsUpdated { id: i64 },
    /// `existed` is false when the id was unknown; deletion is still confirmed.
    Deleted { id: i64, existed: bool },
    Borrowed { id: i64, available_copies: i64 },
    /// Covers both "every copy on loan" and "no such book".
    NoCopiesAvailable { id: i64 },
    Returned { id: i64, available_copies: i64 },
    /// Covers both "nothing on loan" and "no such book".
    AllCopiesReturned { id: i64 },
    /// The request broke a rule (validation, ISBN uniqueness, unknown id on edit).
    Rejected { reason: String },
    /// The store could not carry out the request.
    Failed { reason: String },
}

impl Outcome {
    /// Short human-readable message for direct display.
    pub fn message(&self) -> &str {
        match self {
            Outcome::BookCreated { .. } => "new book created",
            Outcome::CopyAdded { .. } => "copy added to existing book",
            Outcome::DetailsUpdated { .. } => "book details updated",
            Outcome::Deleted { .. } => "book deleted",
            Outcome::Borrowed { .. } => "borrowed",
            Outcome::NoCopiesAvailable { .. } => "no copies available",
            Outcome::Returned { .. } => "returned",
            Outcome::AllCopiesReturned { .. } => "all copies already returned",
            Outcome::Rejected { reason } | Outcome::Failed { reason } => reason,
        }
    }

    /// True when the operation changed (or confirmed) state as requested.
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            Outcome::NoCopiesAvailable { .. }
                | Outcome::AllCopiesReturned { .. }
                | Outcome::Rejected { .. }
                | Outcome::Failed { .. }
        )
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

// =============================================================================
// Inventory Stats
// =============================================================================

/// Collection-wide copy totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStats {
    /// Number of distinct books (rows).
    pub titles: i64,
    pub total_copies: i64,
    pub available_copies: i64,
    pub on_loan: i64,
}

impl InventoryStats {
    /// Folds a set of books into totals.
    pub fn from_books<'a>(books: impl IntoIterator<Item = &'a Book>) -> Self {
        books
            .into_iter()
            .fold(InventoryStats::default(), |mut stats, book| {
                stats.titles += 1;
                stats.total_copies += book.total_copies;
                stats.available_copies += book.available_copies;
                stats.on_loan += book.on_loan();
                stats
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book::first_copy(1, "Dune", "Herbert", "111")
    }

    fn dune_with_copies(copies: i64) -> Book {
        Book {
            total_copies: copies,
            available_copies: copies,
            ..dune()
        }
    }

    #[test]
    fn test_first_copy_counts() {
        let book = dune();
        assert_eq!(book.total_copies, 1);
        assert_eq!(book.available_copies, 1);
        assert_eq!(book.on_loan(), 0);
        assert!(book.check_invariant().is_ok());
    }

    #[test]
    fn test_dune_scenario() {
        let mut book = dune_with_copies(2);

        book.borrow().unwrap();
        assert_eq!(book.available_copies, 1);
        book.borrow().unwrap();
        assert_eq!(book.available_copies, 0);

        let before = book.clone();
        let err = book.borrow().unwrap_err();
        assert!(matches!(err, CoreError::NoAvailableCopies { id: 1, .. }));
        assert_eq!(book, before);

        book.return_copy().unwrap();
        assert_eq!(book.available_copies, 1);
        assert!(book.check_invariant().is_ok());
    }

    #[test]
    fn test_return_when_all_on_shelf_is_rejected() {
        let mut book = dune();
        let before = book.clone();

        let err = book.return_copy().unwrap_err();
        assert!(matches!(err, CoreError::NothingToReturn { id: 1, .. }));
        assert_eq!(book, before);
    }

    #[test]
    fn test_borrow_then_return_restores_count() {
        let mut book = dune_with_copies(3);
        let before = book.available_copies;

        book.borrow().unwrap();
        book.return_copy().unwrap();
        assert_eq!(book.available_copies, before);
    }

    #[test]
    fn test_matches_folds_unicode_case() {
        let lem = Book::first_copy(2, "Solaris", "Stanisław Lem", "978-0-15-602760-1");
        assert!(lem.matches("STANISŁAW"));
        assert!(lem.matches("solaris"));
        assert!(lem.matches("602760"));
        assert!(!lem.matches("stanislaw"));

        let camus = Book::first_copy(3, "L'Étranger", "Albert Camus", "222");
        assert!(camus.matches("étranger"));
        assert!(camus.matches("ÉTRANGER"));
    }

    #[test]
    fn test_matches_takes_query_as_given() {
        let book = dune();
        assert!(book.matches("herb"));
        assert!(!book.matches(" herb"));
        assert!(book.matches(""));
    }

    #[test]
    fn test_check_invariant_detects_bad_rows() {
        let mut book = dune();
        book.available_copies = 2;
        assert!(matches!(
            book.check_invariant(),
            Err(CoreError::InvariantViolated { total: 1, available: 2, .. })
        ));

        book.available_copies = -1;
        assert!(book.check_invariant().is_err());
    }

    #[test]
    fn test_book_input_normalized() {
        let input = BookInput::new("  Dune ", " Herbert", "111  ");
        assert_eq!(input.normalized(), BookInput::new("Dune", "Herbert", "111"));
    }

    #[test]
    fn test_book_input_validate() {
        assert!(BookInput::new("Dune", "Herbert", "111").validate().is_ok());
        assert!(BookInput::new("Dune", "", "111").validate().is_ok());
        assert!(BookInput::new("", "Herbert", "111").validate().is_err());
        assert!(BookInput::new("Dune", "Herbert", "").validate().is_err());
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(Outcome::BookCreated { id: 1 }.message(), "new book created");
        assert_eq!(
            Outcome::CopyAdded { id: 1, total_copies: 2 }.message(),
            "copy added to existing book"
        );
        assert_eq!(
            Outcome::NoCopiesAvailable { id: 1 }.to_string(),
            "no copies available"
        );
        assert_eq!(
            Outcome::AllCopiesReturned { id: 1 }.to_string(),
            "all copies already returned"
        );
        assert_eq!(
            Outcome::Rejected { reason: "isbn '111' already exists".into() }.message(),
            "isbn '111' already exists"
        );
    }

    #[test]
    fn test_outcome_success_flags() {
        assert!(Outcome::Deleted { id: 9, existed: false }.is_success());
        assert!(Outcome::Borrowed { id: 1, available_copies: 0 }.is_success());
        assert!(!Outcome::NoCopiesAvailable { id: 1 }.is_success());
        assert!(!Outcome::Failed { reason: "x".into() }.is_success());
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_value(Outcome::Borrowed { id: 4, available_copies: 1 }).unwrap();
        assert_eq!(json["outcome"], "borrowed");
        assert_eq!(json["available_copies"], 1);
    }

    #[test]
    fn test_inventory_stats_from_books() {
        let mut a = dune_with_copies(2);
        a.borrow().unwrap();
        let b = Book::first_copy(2, "Emma", "Austen", "222");

        let stats = InventoryStats::from_books([&a, &b]);
        assert_eq!(
            stats,
            InventoryStats {
                titles: 2,
                total_copies: 3,
                available_copies: 2,
                on_loan: 1,
            }
        );
    }

    #[test]
    fn test_add_result_accessors() {
        let created = AddResult::Created(dune());
        assert!(created.is_created());
        assert_eq!(created.book().isbn, "111");

        let added = AddResult::CopyAdded(dune());
        assert!(!added.is_created());
        assert_eq!(added.into_book().id, 1);
    }
}
