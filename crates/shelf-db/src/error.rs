//! # Database Error Types
//!
//! Error types for inventory store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        Copy rule (shelf_core::CoreError)    │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Outcome / ApiError (in the shell) ← Short message for display         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Categories
//! ```text
//! NotFound             → id has no row
//! UniqueViolation      → ConstraintViolation (isbn taken or empty)
//! Rule(CoreError)      → NoAvailableCopies / NothingToReturn
//! ConnectionFailed,
//! MigrationFailed,
//! PoolExhausted        → StorageUnavailable
//! ```

use shelf_core::CoreError;
use thiserror::Error;

/// Inventory store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Editing, borrowing or returning an id with no row
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Editing a book to an ISBN another book already has
    /// - Adding or editing with an empty ISBN
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// CHECK constraint violation (copy counters out of range).
    ///
    /// The guarded updates never produce this; it means the
    /// table was written outside the store.
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// A copy-count rule refused the operation.
    #[error(transparent)]
    Rule(#[from] CoreError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fills in the offending value of a UniqueViolation.
    ///
    /// SQLite only reports the column, so repositories attach the value
    /// they tried to write. Other variants pass through unchanged.
    pub fn with_value(self, value: impl Into<String>) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: value.into(),
            },
            other => other,
        }
    }

    /// True when the id referenced by the operation has no row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }

    /// True for ISBN uniqueness failures.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }

    /// True when the durable store cannot be reached or initialized.
    ///
    /// At startup these abort the shell instead of becoming an outcome.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_) | DbError::MigrationFailed(_) | DbError::PoolExhausted
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .and_then(|qualified| qualified.rsplit('.').next())
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_value_fills_unique_violation() {
        let err = DbError::duplicate("isbn", "unknown").with_value("111");
        assert_eq!(err.to_string(), "Duplicate isbn: '111' already exists");

        let err = DbError::PoolExhausted.with_value("111");
        assert!(matches!(err, DbError::PoolExhausted));
    }

    #[test]
    fn test_categories() {
        assert!(DbError::not_found("Book", 3).is_not_found());
        assert!(DbError::duplicate("isbn", "1").is_constraint_violation());
        assert!(DbError::ConnectionFailed("x".into()).is_storage_unavailable());
        assert!(DbError::MigrationFailed("x".into()).is_storage_unavailable());
        assert!(!DbError::QueryFailed("x".into()).is_storage_unavailable());
    }

    #[test]
    fn test_rule_error_is_transparent() {
        let err: DbError = CoreError::NoAvailableCopies {
            id: 1,
            title: "Dune".into(),
        }
        .into();
        assert_eq!(err.to_string(), "No copies of 'Dune' (id 1) are available");
    }

    #[test]
    fn test_pool_errors_map() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
    }
}
