//! # Error Types
//!
//! Domain error types for sari-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sari-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - Stable classification of both                  │
//! │                                                                         │
//! │  sari-db errors (separate crate)                                       │
//! │  ├── DbError          - Storage faults                                 │
//! │  └── LedgerError      - CoreError | DbError                            │
//! │                                                                         │
//! │  counter app                                                           │
//! │  └── ApiError         - code + message shown at the till               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → ApiError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant's message names the rule that was violated, so the till
//! can show it verbatim.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Error Kind
// =============================================================================

/// Classification of every outcome a ledger operation can fail with.
///
/// Business-rule kinds are expected outcomes returned to the caller;
/// `StorageFailure` is the only kind that signals a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Inactive,
    InvalidInput,
    InsufficientStock,
    InsufficientPayment,
    EmptyCart,
    CustomerNameRequired,
    DuplicateCredit,
    AlreadyPaid,
    StockRaceLost,
    StorageFailure,
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown product, sale or credit entry.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The product has been discontinued (inactive flag).
    #[error("Product {item_code} is inactive and cannot be sold")]
    Inactive { item_code: String },

    /// Cart request exceeds what is on the shelf.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5, already in cart: 2)
    ///      │
    ///      ▼
    /// Check stock: available=6
    ///      │
    ///      ▼
    /// InsufficientStock { item_code: "RICE-1KG", available: 6, requested: 7 }
    /// ```
    #[error("Insufficient stock for {item_code}: available {available}, requested {requested}")]
    InsufficientStock {
        item_code: String,
        available: i64,
        requested: i64,
    },

    /// Cash tendered does not cover the amount due.
    #[error("Insufficient payment: {due} due, {tendered} tendered")]
    InsufficientPayment { due: Money, tendered: Money },

    /// Commit requested on a cart with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Credit sale without a customer to bill.
    #[error("Customer name is required for credit sales")]
    CustomerNameRequired,

    /// A credit entry already exists for the sale.
    #[error("Sale {sale_id} already has a credit entry")]
    DuplicateCredit { sale_id: i64 },

    /// Payment against a settled credit entry.
    #[error("Credit entry {credit_id} is already fully paid")]
    AlreadyPaid { credit_id: i64 },

    /// Stock dropped between adding to the cart and committing.
    ///
    /// Nothing is written when this is returned.
    #[error(
        "Stock for {item_code} changed before commit: available {available}, requested {requested}"
    )]
    StockRaceLost {
        item_code: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Inactive { .. } => ErrorKind::Inactive,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::InsufficientPayment { .. } => ErrorKind::InsufficientPayment,
            CoreError::EmptyCart => ErrorKind::EmptyCart,
            CoreError::CustomerNameRequired => ErrorKind::CustomerNameRequired,
            CoreError::DuplicateCredit { .. } => ErrorKind::DuplicateCredit,
            CoreError::AlreadyPaid { .. } => ErrorKind::AlreadyPaid,
            CoreError::StockRaceLost { .. } => ErrorKind::StockRaceLost,
            CoreError::Validation(_) => ErrorKind::InvalidInput,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., malformed amount or date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate item code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            item_code: "RICE-1KG".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for RICE-1KG: available 3, requested 5"
        );

        let err = CoreError::InsufficientPayment {
            due: Money::from_cents(1500),
            tendered: Money::from_cents(1000),
        };
        assert_eq!(err.to_string(), "Insufficient payment: 15.00 due, 10.00 tendered");

        let err = CoreError::not_found("Credit entry", 42);
        assert_eq!(err.to_string(), "Credit entry not found: 42");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "category".to_string(),
        };
        assert_eq!(err.to_string(), "category is required");

        let err = ValidationError::Duplicate {
            field: "item code".to_string(),
            value: "SKU1".to_string(),
        };
        assert_eq!(err.to_string(), "item code 'SKU1' already exists");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(CoreError::EmptyCart.kind(), ErrorKind::EmptyCart);
        assert_eq!(
            CoreError::AlreadyPaid { credit_id: 1 }.kind(),
            ErrorKind::AlreadyPaid
        );

        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::InvalidInput);
    }
}
