//! # sari-core: Pure Business Logic for Sari POS
//!
//! Everything in this crate is deterministic and free of I/O. The ledger
//! store (`sari-db`) and the counter app build on these types.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sari POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/counter (till session)                  │   │
//! │  │    add ──► qty ──► total ──► commit ──► pay credit             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sari-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  credit   │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │  status   │  │   │
//! │  │   │   Sale    │  │           │  │ CartLine  │  │  balance  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 sari-db (Ledger Store)                          │   │
//! │  │     SQLite, migrations, committer, inventory & credit ledgers   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Sale, CreditEntry, Expense, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - In-memory transaction builder
//! - [`credit`] - Credit balance and status rules
//! - [`pricing`] - Per-unit cost and suggested selling price
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use sari_core::money::Money;
//! use sari_core::credit::{balance_after, status_for};
//! use sari_core::PaymentStatus;
//!
//! let original = Money::from_cents(10_000);
//! let paid = Money::from_cents(4_000);
//!
//! assert_eq!(balance_after(original, paid).cents(), 6_000);
//! assert_eq!(status_for(original, paid), PaymentStatus::PartiallyPaid);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod credit;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Reorder threshold applied when a product is added without one.
pub const DEFAULT_REORDER_THRESHOLD: i64 = 5;

/// Maximum distinct lines in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single item in a cart or stock movement.
///
/// Catches typos such as 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Largest single money amount accepted anywhere (₱1,000,000,000.00).
///
/// Keeps price × quantity and running totals far inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Name shown for line items whose product has since been deleted.
pub const UNKNOWN_ITEM_NAME: &str = "Unknown Item";
