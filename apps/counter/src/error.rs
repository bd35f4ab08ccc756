//! # API Error Type
//!
//! Unified error type for counter commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Sari POS                               │
//! │                                                                         │
//! │  stdin: "commit cash 50"                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Storage fault? ─── DbError::QueryFailed("...") ───┐            │  │
//! │  │         │             (logged, generic message)    │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule violation? ── CoreError::InsufficientPayment ─► ApiError ─►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stdout: {"code":"INSUFFICIENT_PAYMENT","message":"..."}               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use sari_core::{CoreError, ErrorKind};
use sari_db::{DbError, LedgerError};

/// Error returned from counter commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: SKU-123"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable reason
    pub message: String,
}

/// Error codes for command responses: one per ledger error kind, plus
/// `BadCommand` for unparseable input and `Internal` for output failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    Inactive,
    ValidationError,
    InsufficientStock,
    InsufficientPayment,
    EmptyCart,
    CustomerNameRequired,
    DuplicateCredit,
    AlreadyPaid,
    StockRaceLost,
    DatabaseError,
    BadCommand,
    Internal,
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Inactive => ErrorCode::Inactive,
            ErrorKind::InvalidInput => ErrorCode::ValidationError,
            ErrorKind::InsufficientStock => ErrorCode::InsufficientStock,
            ErrorKind::InsufficientPayment => ErrorCode::InsufficientPayment,
            ErrorKind::EmptyCart => ErrorCode::EmptyCart,
            ErrorKind::CustomerNameRequired => ErrorCode::CustomerNameRequired,
            ErrorKind::DuplicateCredit => ErrorCode::DuplicateCredit,
            ErrorKind::AlreadyPaid => ErrorCode::AlreadyPaid,
            ErrorKind::StockRaceLost => ErrorCode::StockRaceLost,
            ErrorKind::StorageFailure => ErrorCode::DatabaseError,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a parse/usage error for a command line.
    pub fn bad_command(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadCommand, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts storage faults to API errors. Details are logged, the caller
/// gets a generic message.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Database constraint violated")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::new(err.kind().into(), err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rule(e) => e.into(),
            LedgerError::Storage(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sari_core::Money;

    #[test]
    fn test_rule_errors_keep_their_message() {
        let err: ApiError = CoreError::InsufficientPayment {
            due: Money::from_cents(1_500),
            tendered: Money::from_cents(1_000),
        }
        .into();

        assert_eq!(err.code, ErrorCode::InsufficientPayment);
        assert!(err.message.contains("15.00"));
    }

    #[test]
    fn test_storage_errors_are_generic() {
        let err: ApiError = LedgerError::Storage(DbError::QueryFailed("disk I/O error".into())).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_serialized_code() {
        let err = ApiError::new(ErrorCode::StockRaceLost, "x");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"STOCK_RACE_LOST\""));
    }
}
