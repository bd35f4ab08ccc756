//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← constraint classification                                   │
//! │       │                                                                 │
//! │       │        CoreError (sari-core) ← business rule rejections        │
//! │       │             │                                                   │
//! │       ▼             ▼                                                   │
//! │  LedgerError { Rule | Storage } ← what every ledger call returns       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (counter app) ← code + message                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sari_core::{CoreError, ErrorKind};
use thiserror::Error;

// =============================================================================
// DbError
// =============================================================================

/// Storage-level errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Row not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate item code
    /// - A second credit entry for the same sale
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - A stock decrement that would take `current_stock` below zero
    #[error("Check constraint violated: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin/commit failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
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
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → UNIQUE / FOREIGN KEY / CHECK by message
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

                // SQLite reports constraint failures as:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                //   "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
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

// =============================================================================
// LedgerError
// =============================================================================

/// Error returned by ledger, committer and report operations.
///
/// `Rule` is an expected business outcome; `Storage` is a fault.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl LedgerError {
    /// Returns the taxonomy kind, `StorageFailure` for storage faults.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Rule(e) => e.kind(),
            LedgerError::Storage(_) => ErrorKind::StorageFailure,
        }
    }

    /// Returns the business rule error, if this is one.
    pub fn as_rule(&self) -> Option<&CoreError> {
        match self {
            LedgerError::Rule(e) => Some(e),
            LedgerError::Storage(_) => None,
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Storage(err.into())
    }
}

impl From<sari_core::ValidationError> for LedgerError {
    fn from(err: sari_core::ValidationError) -> Self {
        LedgerError::Rule(err.into())
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_kinds() {
        let err: LedgerError = CoreError::EmptyCart.into();
        assert_eq!(err.kind(), ErrorKind::EmptyCart);
        assert!(err.as_rule().is_some());

        let err: LedgerError = DbError::PoolExhausted.into();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(err.as_rule().is_none());
    }

    #[test]
    fn test_messages_pass_through() {
        let err: LedgerError = CoreError::CustomerNameRequired.into();
        assert_eq!(err.to_string(), "Customer name is required for credit sales");

        let err: LedgerError = DbError::not_found("Sale", 12).into();
        assert_eq!(err.to_string(), "Sale not found: 12");
    }
}
