//! # Shell Error Types
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shelf                                  │
//! │                                                                         │
//! │  Startup (config, opening the database)                                │
//! │       └── ShellError ──► logged, process exits non-zero                │
//! │                                                                         │
//! │  Commands (after startup)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError / CoreError / ValidationError                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError { code, message }                                            │
//! │       │                                                                 │
//! │       ├── mutating command ──► Outcome::Rejected / Outcome::Failed     │
//! │       └── read command ──────► rendered as an error line               │
//! │                                                                         │
//! │  Nothing after startup reaches the user as a fault.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use shelf_core::{CoreError, Outcome, ValidationError};
use shelf_db::DbError;
use thiserror::Error;

// =============================================================================
// API Error
// =============================================================================

/// Error returned from shell commands.
///
/// ## Serialization (`--json`)
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Book not found: 12"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No book with the given id
    NotFound,

    /// Input validation failed
    ValidationError,

    /// ISBN uniqueness would be broken
    ConstraintViolation,

    /// Every copy is on loan
    NoAvailableCopies,

    /// No copy is on loan
    NothingToReturn,

    /// The database cannot be reached
    StorageUnavailable,

    /// Database operation failed
    DatabaseError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// True when the caller's request was at fault (as opposed to the store).
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self.code,
            ErrorCode::StorageUnavailable | ErrorCode::DatabaseError | ErrorCode::Internal
        )
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } if value.trim().is_empty() => {
                ApiError::new(ErrorCode::ConstraintViolation, format!("{} is required", field))
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ConstraintViolation,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Rule(e) => ApiError::from(e),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::StorageUnavailable, "Database unavailable")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::StorageUnavailable, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::StorageUnavailable, "Database is busy")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Copy counts out of range")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::Internal, "Database operation failed")
            }
        }
    }
}

/// Converts inventory rule errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoAvailableCopies { .. } => {
                ApiError::new(ErrorCode::NoAvailableCopies, err.to_string())
            }
            CoreError::NothingToReturn { .. } => {
                ApiError::new(ErrorCode::NothingToReturn, err.to_string())
            }
            CoreError::InvariantViolated { .. } => {
                tracing::error!("{}", err);
                ApiError::new(ErrorCode::DatabaseError, "Copy counts out of range")
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Folds an error into the outcome shown after a mutating command.
impl From<ApiError> for Outcome {
    fn from(err: ApiError) -> Self {
        if err.is_rejection() {
            Outcome::Rejected {
                reason: err.message,
            }
        } else {
            Outcome::Failed {
                reason: err.message,
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Shell Error
// =============================================================================

/// Errors that stop the shell: startup failures and broken output.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Configuration file could not be parsed.
    #[error("Invalid config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration values are unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    /// No platform data directory for the default database path.
    #[error("Could not determine the application data directory")]
    NoDataDir,

    /// The database could not be opened.
    #[error("Storage unavailable: {0}")]
    Storage(#[from] DbError),

    /// Terminal or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_message() {
        let err = ApiError::from(DbError::duplicate("isbn", "111"));
        assert_eq!(err.code, ErrorCode::ConstraintViolation);
        assert_eq!(err.message, "isbn '111' already exists");

        let err = ApiError::from(DbError::duplicate("isbn", ""));
        assert_eq!(err.message, "isbn is required");
    }

    #[test]
    fn test_storage_errors_become_failures() {
        let outcome: Outcome = ApiError::from(DbError::ConnectionFailed("gone".into())).into();
        assert_eq!(
            outcome,
            Outcome::Failed {
                reason: "Database unavailable".into()
            }
        );
    }

    #[test]
    fn test_rule_and_lookup_errors_become_rejections() {
        let outcome: Outcome = ApiError::from(DbError::not_found("Book", 4)).into();
        assert_eq!(
            outcome,
            Outcome::Rejected {
                reason: "Book not found: 4".into()
            }
        );

        let err = ApiError::from(DbError::Rule(CoreError::NothingToReturn {
            id: 1,
            title: "Dune".into(),
        }));
        assert_eq!(err.code, ErrorCode::NothingToReturn);
        assert!(err.is_rejection());
    }

    #[test]
    fn test_validation_error_code() {
        let err = ApiError::from(ValidationError::Required {
            field: "title".into(),
        });
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn test_api_error_serialization() {
        let json = serde_json::to_value(ApiError::not_found("Book", 12)).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Book not found: 12");
    }
}
