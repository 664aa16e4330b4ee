//! # Book Repository
//!
//! The inventory store: every operation on the `books` table.
//!
//! ## Key Operations
//! - Listing and case-insensitive substring search (Unicode case folding)
//! - Add-or-add-copy keyed by ISBN
//! - Detail edits guarded by ISBN uniqueness
//! - Borrow / return guarded by the copies invariant
//! - Lenient delete
//!
//! ## Guarded Counter Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How borrow(id) Stays Consistent                      │
//! │                                                                         │
//! │  ❌ WRONG: read, decide in Rust, write back (lost update)              │
//! │     SELECT available_copies ...        → 1                             │
//! │     UPDATE books SET available_copies = 0 WHERE id = ?                 │
//! │                                                                         │
//! │  ✅ CORRECT: the guard travels with the write                          │
//! │     UPDATE books SET available_copies = available_copies - 1           │
//! │     WHERE id = ? AND available_copies > 0                              │
//! │                                                                         │
//! │  0 rows changed?                                                        │
//! │     └── re-read the row to tell the caller why:                        │
//! │         no row         → DbError::NotFound                             │
//! │         rule refuses   → DbError::Rule(NoAvailableCopies)              │
//! │         rule allows    → the row changed in between, try again         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Query Checking
//! Statements are plain strings run through `sqlx::query_as`, so sqlx
//! checks them against the schema at run time rather than at compile
//! time. `BOOK_COLUMNS` must list columns in [`Book`] field order. The
//! tests in this module run every statement against the migrated schema.

use chrono::Utc;
use shelf_core::{AddResult, Book, CoreResult, InventoryStats};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Columns selected into [`Book`], in struct order.
const BOOK_COLUMNS: &str =
    "id, title, author, isbn, total_copies, available_copies, created_at, updated_at";

/// How many times a guarded update is retried when the row changes
/// between the write and the re-read.
const GUARD_ATTEMPTS: usize = 3;

/// Repository for book database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = BookRepository::new(pool);
///
/// let added = repo.add_or_add_copy("Dune", "Herbert", "111").await?;
/// let book = repo.borrow(added.book().id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists every book, oldest first (ascending id).
    pub async fn list_all(&self) -> DbResult<Vec<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id");
        let books = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = books.len(), "Listed books");
        Ok(books)
    }

    /// Finds books whose title, author or ISBN contains `query`.
    ///
    /// ## Matching
    /// - Case-insensitive substring match, see [`Book::matches`]
    /// - The query is matched as given, surrounding spaces included
    /// - Empty or whitespace-only query returns every book
    ///
    /// SQLite `LIKE` only folds ASCII, so rows are filtered here instead.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Book>> {
        if query.trim().is_empty() {
            return self.list_all().await;
        }

        debug!(query = %query, "Searching books");

        let mut books = self.list_all().await?;
        books.retain(|book| book.matches(query));

        debug!(count = books.len(), "Search returned books");
        Ok(books)
    }

    /// Gets a book by its id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Gets a book by its ISBN (exact match).
    pub async fn get_by_isbn(&self, isbn: &str) -> DbResult<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?1");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Counts books (titles, not copies).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Copy totals across the whole collection.
    pub async fn stats(&self) -> DbResult<InventoryStats> {
        let (titles, total_copies, available_copies): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(total_copies), 0),
                COALESCE(SUM(available_copies), 0)
            FROM books
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(InventoryStats {
            titles,
            total_copies,
            available_copies,
            on_loan: total_copies - available_copies,
        })
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Adds a book, or one more copy of it if the ISBN is already known.
    ///
    /// ## Behaviour
    /// - Known ISBN: `total_copies` and `available_copies` both +1; the stored
    ///   title and author are kept as they are
    /// - New ISBN: a book with one copy is created
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - ISBN is empty or whitespace
    pub async fn add_or_add_copy(&self, title: &str, author: &str, isbn: &str) -> DbResult<AddResult> {
        if isbn.trim().is_empty() {
            return Err(DbError::duplicate("isbn", isbn));
        }

        debug!(isbn = %isbn, "Adding book or copy");

        let add_copy_sql = format!(
            r#"
            UPDATE books
            SET total_copies = total_copies + 1,
                available_copies = available_copies + 1,
                updated_at = ?2
            WHERE isbn = ?1
            RETURNING {BOOK_COLUMNS}
            "#
        );
        let insert_sql = format!(
            r#"
            INSERT INTO books (
                title, author, isbn, total_copies, available_copies, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING {BOOK_COLUMNS}
            "#
        );

        for _ in 0..GUARD_ATTEMPTS {
            // Id is assigned by the insert
            let draft = Book::first_copy(0, title, author, isbn);

            let existing = sqlx::query_as::<_, Book>(&add_copy_sql)
                .bind(isbn)
                .bind(draft.updated_at)
                .fetch_optional(&self.pool)
                .await?;

            if let Some(book) = existing {
                book.check_invariant()?;
                debug!(id = book.id, total = book.total_copies, "Copy added");
                return Ok(AddResult::CopyAdded(book));
            }

            let inserted = sqlx::query_as::<_, Book>(&insert_sql)
                .bind(&draft.title)
                .bind(&draft.author)
                .bind(&draft.isbn)
                .bind(draft.total_copies)
                .bind(draft.available_copies)
                .bind(draft.created_at)
                .bind(draft.updated_at)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DbError::from(e).with_value(isbn));

            match inserted {
                Ok(book) => {
                    debug!(id = book.id, "Book created");
                    return Ok(AddResult::Created(book));
                }
                // Another writer created this ISBN between our two statements;
                // the next pass takes the add-copy branch.
                Err(err) if err.is_constraint_violation() => {
                    debug!(isbn = %isbn, "ISBN appeared concurrently, retrying as copy");
                }
                Err(err) => return Err(err),
            }
        }

        Err(DbError::Internal(format!(
            "add of isbn '{isbn}' did not settle after {GUARD_ATTEMPTS} attempts"
        )))
    }

    /// Overwrites title, author and ISBN. Copy counters are untouched.
    ///
    /// One statement: if the new ISBN collides, no field changes.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - ISBN empty or owned by another book
    /// * `DbError::NotFound` - no book with this id
    pub async fn update_details(
        &self,
        id: i64,
        title: &str,
        author: &str,
        isbn: &str,
    ) -> DbResult<Book> {
        if isbn.trim().is_empty() {
            return Err(DbError::duplicate("isbn", isbn));
        }

        debug!(id = id, isbn = %isbn, "Updating book details");

        let sql = format!(
            r#"
            UPDATE books
            SET title = ?2,
                author = ?3,
                isbn = ?4,
                updated_at = ?5
            WHERE id = ?1
            RETURNING {BOOK_COLUMNS}
            "#
        );

        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .bind(title)
            .bind(author)
            .bind(isbn)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_value(isbn))?;

        book.ok_or_else(|| DbError::not_found("Book", id))
    }

    /// Deletes a book permanently, copy history included.
    ///
    /// ## Returns
    /// `true` if a row was removed, `false` if the id was unknown
    /// (not an error).
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id = id, "Deleting book");

        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lends out one copy.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no book with this id
    /// * `DbError::Rule(CoreError::NoAvailableCopies)` - every copy is on loan
    ///
    /// Nothing changes on error.
    pub async fn borrow(&self, id: i64) -> DbResult<Book> {
        debug!(id = id, "Borrowing copy");

        let sql = format!(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1,
                updated_at = ?2
            WHERE id = ?1 AND available_copies > 0
            RETURNING {BOOK_COLUMNS}
            "#
        );

        self.guarded_update(id, &sql, Book::borrow).await
    }

    /// Takes one copy back.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no book with this id
    /// * `DbError::Rule(CoreError::NothingToReturn)` - no copy is on loan
    ///
    /// Nothing changes on error.
    pub async fn return_copy(&self, id: i64) -> DbResult<Book> {
        debug!(id = id, "Returning copy");

        let sql = format!(
            r#"
            UPDATE books
            SET available_copies = available_copies + 1,
                updated_at = ?2
            WHERE id = ?1 AND available_copies < total_copies
            RETURNING {BOOK_COLUMNS}
            "#
        );

        self.guarded_update(id, &sql, Book::return_copy).await
    }

    /// Runs a counter update whose WHERE clause encodes `rule`, and explains
    /// a refusal by applying `rule` to the current row.
    async fn guarded_update(
        &self,
        id: i64,
        sql: &str,
        rule: fn(&mut Book) -> CoreResult<()>,
    ) -> DbResult<Book> {
        for attempt in 1..=GUARD_ATTEMPTS {
            let updated = sqlx::query_as::<_, Book>(sql)
                .bind(id)
                .bind(Utc::now())
                .fetch_optional(&self.pool)
                .await?;

            if let Some(book) = updated {
                if let Err(err) = book.check_invariant() {
                    warn!(id = id, error = %err, "Stored row breaks copies invariant");
                    return Err(err.into());
                }
                return Ok(book);
            }

            let Some(mut current) = self.get_by_id(id).await? else {
                return Err(DbError::not_found("Book", id));
            };

            // Err here is the real refusal reason; Ok means the row moved
            // between the two statements.
            rule(&mut current)?;
            debug!(id = id, attempt = attempt, "Row changed during guarded update, retrying");
        }

        Err(DbError::Internal(format!(
            "update of book {id} did not settle after {GUARD_ATTEMPTS} attempts"
        )))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shelf_core::CoreError;

    async fn repo() -> BookRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().books()
    }

    #[tokio::test]
    async fn test_add_creates_then_adds_copy() {
        let repo = repo().await;

        let first = repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap();
        assert!(first.is_created());
        assert_eq!(first.book().total_copies, 1);
        assert_eq!(first.book().available_copies, 1);

        let second = repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap();
        assert!(!second.is_created());
        assert_eq!(second.book().id, first.book().id);
        assert_eq!(second.book().total_copies, 2);
        assert_eq!(second.book().available_copies, 2);

        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_copy_keeps_stored_details() {
        let repo = repo().await;
        repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap();

        let added = repo
            .add_or_add_copy("Dune Messiah", "F. Herbert", "111")
            .await
            .unwrap();
        assert_eq!(added.book().title, "Dune");
        assert_eq!(added.book().author, "Herbert");
    }

    #[tokio::test]
    async fn test_add_rejects_empty_isbn() {
        let repo = repo().await;

        let err = repo.add_or_add_copy("Dune", "Herbert", "").await.unwrap_err();
        assert!(err.is_constraint_violation());
        let err = repo.add_or_add_copy("Dune", "Herbert", "   ").await.unwrap_err();
        assert!(err.is_constraint_violation());

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let repo = repo().await;
        let a = repo.add_or_add_copy("A", "", "1").await.unwrap().into_book();
        let b = repo.add_or_add_copy("B", "", "2").await.unwrap().into_book();
        assert!(b.id > a.id);

        // Deleted ids are not reused.
        repo.delete(b.id).await.unwrap();
        let c = repo.add_or_add_copy("C", "", "3").await.unwrap().into_book();
        assert!(c.id > b.id);
    }

    #[tokio::test]
    async fn test_borrow_guards() {
        let repo = repo().await;
        let id = repo
            .add_or_add_copy("Dune", "Herbert", "111")
            .await
            .unwrap()
            .book()
            .id;

        let book = repo.borrow(id).await.unwrap();
        assert_eq!(book.available_copies, 0);

        let err = repo.borrow(id).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::NoAvailableCopies { .. })));
        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().available_copies, 0);

        let err = repo.borrow(id + 100).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_return_guards() {
        let repo = repo().await;
        let id = repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap().book().id;

        let err = repo.return_copy(id).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::NothingToReturn { .. })));

        repo.borrow(id).await.unwrap();
        let book = repo.return_copy(id).await.unwrap();
        assert_eq!(book.available_copies, 1);

        assert!(repo.return_copy(9999).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_details_keeps_counts() {
        let repo = repo().await;
        let id = repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap().book().id;
        repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap();
        repo.borrow(id).await.unwrap();

        let book = repo
            .update_details(id, "Dune (Deluxe)", "Frank Herbert", "111-D")
            .await
            .unwrap();
        assert_eq!(book.title, "Dune (Deluxe)");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.isbn, "111-D");
        assert_eq!((book.total_copies, book.available_copies), (2, 1));
    }

    #[tokio::test]
    async fn test_update_details_same_isbn_is_allowed() {
        let repo = repo().await;
        let id = repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap().book().id;

        let book = repo.update_details(id, "Dune", "F. Herbert", "111").await.unwrap();
        assert_eq!(book.author, "F. Herbert");
    }

    #[tokio::test]
    async fn test_update_details_collision_changes_nothing() {
        let repo = repo().await;
        let dune = repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap().into_book();
        let emma = repo.add_or_add_copy("Emma", "Austen", "222").await.unwrap().into_book();

        let err = repo
            .update_details(emma.id, "Emma (new)", "J. Austen", "111")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate isbn: '111' already exists");

        let dune_after = repo.get_by_id(dune.id).await.unwrap().unwrap();
        let emma_after = repo.get_by_id(emma.id).await.unwrap().unwrap();
        assert_eq!(dune_after, dune);
        assert_eq!(emma_after, emma);
    }

    #[tokio::test]
    async fn test_update_details_unknown_id() {
        let repo = repo().await;
        let err = repo.update_details(42, "X", "Y", "Z").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_is_lenient() {
        let repo = repo().await;
        let id = repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap().book().id;
        repo.add_or_add_copy("Emma", "Austen", "222").await.unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(repo.get_by_id(id).await.unwrap().is_none());

        let before = repo.list_all().await.unwrap();
        assert!(!repo.delete(12345).await.unwrap());
        assert_eq!(repo.list_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let repo = repo().await;
        repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap();
        repo.add_or_add_copy("Emma", "Austen", "222").await.unwrap();
        repo.add_or_add_copy("Persuasion", "Austen", "333-X").await.unwrap();

        let hits = repo.search("herb").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Dune");

        assert_eq!(repo.search("AUSTEN").await.unwrap().len(), 2);
        assert_eq!(repo.search("3-x").await.unwrap().len(), 1);
        assert_eq!(repo.search("UN").await.unwrap().len(), 1);
        assert!(repo.search("tolkien").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_matches_all() {
        let repo = repo().await;
        repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap();
        repo.add_or_add_copy("Emma", "Austen", "222").await.unwrap();

        assert_eq!(repo.search("").await.unwrap().len(), 2);
        assert_eq!(repo.search("   ").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_keeps_surrounding_spaces() {
        let repo = repo().await;
        repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap();
        repo.add_or_add_copy("Emma", "Jane Austen", "222").await.unwrap();

        assert!(repo.search(" herb").await.unwrap().is_empty());
        assert_eq!(repo.search("herb").await.unwrap().len(), 1);

        let hits = repo.search(" austen").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Emma");
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let repo = repo().await;
        repo.add_or_add_copy("Solaris", "Stanisław Lem", "111").await.unwrap();
        repo.add_or_add_copy("L'Étranger", "Albert Camus", "222").await.unwrap();

        let hits = repo.search("STANISŁAW").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Solaris");

        let hits = repo.search("étranger").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].author, "Albert Camus");
    }

    #[tokio::test]
    async fn test_book_columns_match_schema() {
        let repo = repo().await;
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books LIMIT 0");
        let rows = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&repo.pool)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let repo = repo().await;
        repo.add_or_add_copy("100% Cotton", "", "111").await.unwrap();
        repo.add_or_add_copy("1000 Cats", "", "222").await.unwrap();
        repo.add_or_add_copy("snake_case", "", "333").await.unwrap();

        assert_eq!(repo.search("0%").await.unwrap().len(), 1);
        assert_eq!(repo.search("e_c").await.unwrap().len(), 1);
        assert_eq!(repo.search("_").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_isbn() {
        let repo = repo().await;
        repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap();

        assert_eq!(repo.get_by_isbn("111").await.unwrap().unwrap().title, "Dune");
        assert!(repo.get_by_isbn("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats() {
        let repo = repo().await;
        assert_eq!(repo.stats().await.unwrap(), InventoryStats::default());

        let id = repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap().book().id;
        repo.add_or_add_copy("Dune", "Herbert", "111").await.unwrap();
        repo.add_or_add_copy("Emma", "Austen", "222").await.unwrap();
        repo.borrow(id).await.unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(
            stats,
            InventoryStats {
                titles: 2,
                total_copies: 3,
                available_copies: 2,
                on_loan: 1,
            }
        );
        assert_eq!(stats, InventoryStats::from_books(&repo.list_all().await.unwrap()));
    }
}
