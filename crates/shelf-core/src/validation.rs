//! # Validation Module
//!
//! Input validation for book forms and search queries.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Shell (apps/cli)                                             │
//! │  ├── Trims input (BookInput::normalized)                               │
//! │  └── THIS MODULE: required fields, lengths, formats                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Inventory Store (shelf-db)                                   │
//! │  └── Rejects empty ISBN before touching the table                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE (isbn)                                                     │
//! │  └── CHECK (0 <= available_copies <= total_copies)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shelf_core::validation::{validate_isbn, validate_title};
//!
//! validate_title("Dune").unwrap();
//! assert!(validate_isbn("").is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_AUTHOR_LEN, MAX_ISBN_LEN, MAX_QUERY_LEN, MAX_TITLE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a book title.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most `MAX_TITLE_LEN` characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(())
}

/// Validates an author field. Empty is allowed.
pub fn validate_author(author: &str) -> ValidationResult<()> {
    if author.trim().chars().count() > MAX_AUTHOR_LEN {
        return Err(ValidationError::TooLong {
            field: "author".to_string(),
            max: MAX_AUTHOR_LEN,
        });
    }

    Ok(())
}

/// Validates an ISBN.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most `MAX_ISBN_LEN` characters
/// - No control characters
///
/// Check digits are not verified: libraries also catalogue items under
/// local numbers that only need to be unique.
///
/// ## Example
/// ```rust
/// use shelf_core::validation::validate_isbn;
///
/// assert!(validate_isbn("978-0-441-17271-9").is_ok());
/// assert!(validate_isbn("   ").is_err());
/// ```
pub fn validate_isbn(isbn: &str) -> ValidationResult<()> {
    let isbn = isbn.trim();

    if isbn.is_empty() {
        return Err(ValidationError::Required {
            field: "isbn".to_string(),
        });
    }

    if isbn.chars().count() > MAX_ISBN_LEN {
        return Err(ValidationError::TooLong {
            field: "isbn".to_string(),
            max: MAX_ISBN_LEN,
        });
    }

    if isbn.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: "isbn".to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches every book)
/// - Maximum `MAX_QUERY_LEN` characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a book id typed by the user.
pub fn validate_book_id(id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "id".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Dune").is_ok());
        assert!(validate_title("  Dune  ").is_ok());

        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"A".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_author() {
        assert!(validate_author("").is_ok());
        assert!(validate_author("Frank Herbert").is_ok());
        assert!(validate_author(&"B".repeat(MAX_AUTHOR_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_isbn() {
        assert!(validate_isbn("111").is_ok());
        assert!(validate_isbn("978-0-441-17271-9").is_ok());
        assert!(validate_isbn("LOCAL 0042").is_ok());

        assert_eq!(
            validate_isbn(""),
            Err(ValidationError::Required {
                field: "isbn".to_string()
            })
        );
        assert!(validate_isbn("  ").is_err());
        assert!(validate_isbn("12\t34").is_err());
        assert!(validate_isbn(&"9".repeat(MAX_ISBN_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  herb ").unwrap(), "herb");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(MAX_QUERY_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_book_id() {
        assert!(validate_book_id(1).is_ok());
        assert!(validate_book_id(0).is_err());
        assert!(validate_book_id(-5).is_err());
    }
}
