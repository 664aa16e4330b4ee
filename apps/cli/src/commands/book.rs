//! # Book Commands
//!
//! One function per user operation. Each makes a single store call and
//! folds every result, including errors, into something displayable.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Borrow Flow                                          │
//! │                                                                         │
//! │  shelf borrow 7                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  borrow_book(db, 7)                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BookRepository::borrow(7)  (one guarded UPDATE)                        │
//! │       │                                                                 │
//! │       ├── Ok(book) ─────────────────────► Outcome::Borrowed             │
//! │       ├── NotFound ─────────────────────► Outcome::NoCopiesAvailable    │
//! │       ├── Rule(NoAvailableCopies) ──────► Outcome::NoCopiesAvailable    │
//! │       └── anything else ────────────────► Outcome::Rejected / Failed    │
//! │                                                                         │
//! │  The shell then re-reads the collection and renders it.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown ids and exhausted copies share one message for borrow and for
//! return. The distinction is kept in the debug log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use shelf_core::validation::{validate_book_id, validate_search_query};
use shelf_core::{AddResult, Book, BookInput, CoreError, InventoryStats, Outcome};
use shelf_db::{Database, DbError};

// =============================================================================
// DTOs
// =============================================================================

/// Book as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: i64,
    pub available_copies: i64,
    pub on_loan: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookDto {
    fn from(b: Book) -> Self {
        BookDto {
            on_loan: b.on_loan(),
            id: b.id,
            title: b.title,
            author: b.author,
            isbn: b.isbn,
            total_copies: b.total_copies,
            available_copies: b.available_copies,
            updated_at: b.updated_at,
        }
    }
}

/// Fresh view of the collection, re-read after every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Search term, `None` for the full list.
    pub query: Option<String>,
    pub books: Vec<BookDto>,
    /// Totals over `books`.
    pub stats: InventoryStats,
}

// =============================================================================
// Reads
// =============================================================================

/// Every book, ordered by id.
pub async fn list_books(db: &Database) -> Result<Vec<BookDto>, ApiError> {
    let books = db.books().list_all().await?;
    Ok(books.into_iter().map(BookDto::from).collect())
}

/// Books whose title, author or ISBN contains `query`, ignoring case.
///
/// Surrounding spaces are dropped. An empty query lists everything.
pub async fn search_books(db: &Database, query: &str) -> Result<Vec<BookDto>, ApiError> {
    let books = find_books(db, query).await?;
    Ok(books.into_iter().map(BookDto::from).collect())
}

async fn find_books(db: &Database, query: &str) -> Result<Vec<Book>, ApiError> {
    let start = Instant::now();
    let query = validate_search_query(query)?;

    let books = db.books().search(&query).await?;

    debug!(
        query = %query,
        results = books.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Book search"
    );

    Ok(books)
}

/// Single book by id.
pub async fn get_book(db: &Database, id: i64) -> Result<BookDto, ApiError> {
    validate_book_id(id)?;
    db.books()
        .get_by_id(id)
        .await?
        .map(BookDto::from)
        .ok_or_else(|| ApiError::not_found("Book", id))
}

/// Totals over the whole collection.
pub async fn inventory_stats(db: &Database) -> Result<InventoryStats, ApiError> {
    Ok(db.books().stats().await?)
}

/// Lists or searches, and totals the result.
pub async fn snapshot(db: &Database, query: Option<&str>) -> Result<Snapshot, ApiError> {
    let books = match query {
        Some(q) => find_books(db, q).await?,
        None => db.books().list_all().await?,
    };
    let stats = InventoryStats::from_books(&books);

    Ok(Snapshot {
        query: query.map(|q| q.trim().to_string()),
        books: books.into_iter().map(BookDto::from).collect(),
        stats,
    })
}

// =============================================================================
// Mutations
// =============================================================================

/// Registers a copy: new book for an unseen ISBN, one more copy otherwise.
///
/// For a known ISBN the stored title and author are kept.
pub async fn add_book(db: &Database, input: BookInput) -> Outcome {
    let input = input.normalized();
    if let Err(e) = input.validate() {
        return ApiError::from(e).into();
    }

    match db
        .books()
        .add_or_add_copy(&input.title, &input.author, &input.isbn)
        .await
    {
        Ok(AddResult::Created(book)) => {
            info!(id = book.id, isbn = %book.isbn, "Book created");
            Outcome::BookCreated { id: book.id }
        }
        Ok(AddResult::CopyAdded(book)) => {
            info!(id = book.id, total = book.total_copies, "Copy added");
            Outcome::CopyAdded {
                id: book.id,
                total_copies: book.total_copies,
            }
        }
        Err(e) => failure("add", e),
    }
}

/// Replaces title, author and ISBN. Copy counts are untouched.
pub async fn update_book(db: &Database, id: i64, input: BookInput) -> Outcome {
    if let Err(e) = validate_book_id(id) {
        return ApiError::from(e).into();
    }

    let input = input.normalized();
    if let Err(e) = input.validate() {
        return ApiError::from(e).into();
    }

    match db
        .books()
        .update_details(id, &input.title, &input.author, &input.isbn)
        .await
    {
        Ok(book) => {
            info!(id = book.id, "Book details updated");
            Outcome::DetailsUpdated { id: book.id }
        }
        Err(e) => failure("update", e),
    }
}

/// Removes a book and all its copies. Unknown ids are a no-op.
pub async fn delete_book(db: &Database, id: i64) -> Outcome {
    match db.books().delete(id).await {
        Ok(existed) => {
            if existed {
                info!(id, "Book deleted");
            } else {
                debug!(id, "Delete of unknown book");
            }
            Outcome::Deleted { id, existed }
        }
        Err(e) => failure("delete", e),
    }
}

/// Lends one copy.
pub async fn borrow_book(db: &Database, id: i64) -> Outcome {
    match db.books().borrow(id).await {
        Ok(book) => {
            info!(id, available = book.available_copies, "Book borrowed");
            Outcome::Borrowed {
                id,
                available_copies: book.available_copies,
            }
        }
        Err(DbError::NotFound { .. }) => {
            debug!(id, "Borrow of unknown book");
            Outcome::NoCopiesAvailable { id }
        }
        Err(DbError::Rule(CoreError::NoAvailableCopies { .. })) => {
            debug!(id, "Borrow with every copy on loan");
            Outcome::NoCopiesAvailable { id }
        }
        Err(e) => failure("borrow", e),
    }
}

/// Takes one copy back.
pub async fn return_book(db: &Database, id: i64) -> Outcome {
    match db.books().return_copy(id).await {
        Ok(book) => {
            info!(id, available = book.available_copies, "Book returned");
            Outcome::Returned {
                id,
                available_copies: book.available_copies,
            }
        }
        Err(DbError::NotFound { .. }) => {
            debug!(id, "Return of unknown book");
            Outcome::AllCopiesReturned { id }
        }
        Err(DbError::Rule(CoreError::NothingToReturn { .. })) => {
            debug!(id, "Return with no copy on loan");
            Outcome::AllCopiesReturned { id }
        }
        Err(e) => failure("return", e),
    }
}

fn failure(operation: &str, err: DbError) -> Outcome {
    if err.is_storage_unavailable() {
        warn!(operation, error = %err, "Storage unavailable");
    } else {
        debug!(operation, error = %err, "Operation rejected");
    }
    ApiError::from(err).into()
}
