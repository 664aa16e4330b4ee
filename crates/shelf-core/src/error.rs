//! # Error Types
//!
//! Domain-specific error types for shelf-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shelf-core errors (this file)                                         │
//! │  ├── CoreError        - Copy-count rule violations                     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shelf-db errors (separate crate)                                      │
//! │  └── DbError          - Store failures, wraps CoreError                │
//! │                                                                         │
//! │  Shell (apps/cli)                                                      │
//! │  └── Outcome / ApiError - What the user sees                           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → Outcome → Renderer      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Inventory rule errors.
///
/// Raised when a copy-count transition would break
/// `0 <= available_copies <= total_copies`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Every copy of the book is on loan.
    ///
    /// ## When This Occurs
    /// - Borrowing a book whose `available_copies` is 0
    #[error("No copies of '{title}' (id {id}) are available")]
    NoAvailableCopies { id: i64, title: String },

    /// No copy of the book is on loan.
    ///
    /// ## When This Occurs
    /// - Returning a book whose `available_copies` equals `total_copies`
    #[error("All copies of '{title}' (id {id}) are already returned")]
    NothingToReturn { id: i64, title: String },

    /// A stored row breaks the copies invariant.
    ///
    /// Only reachable if the table was edited outside the store.
    #[error("Book {id} has inconsistent copy counts: total {total}, available {available}")]
    InvariantViolated { id: i64, total: i64, available: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before the store is called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., control characters in an ISBN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
