//! # sari-db: Ledger Store for Sari POS
//!
//! SQLite persistence plus the three ledgers that own every write.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sari POS Data Flow                               │
//! │                                                                         │
//! │  counter command (commit cash 20.00)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     sari-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │    ledger     │   │   repository   │   │   Database    │   │   │
//! │  │   │               │   │                │   │   (pool.rs)   │   │   │
//! │  │   │ SaleCommitter │──►│ products       │──►│ SqlitePool    │   │   │
//! │  │   │ Inventory     │   │ sales          │   │ begin() → tx  │   │   │
//! │  │   │ Credit        │   │ credits, stock │   │ migrations    │   │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘   │   │
//! │  │           │                                                     │   │
//! │  │           └──► reports (read-only aggregates)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/sari-pos/sari.db (platform data dir)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool and transactions
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - `DbError` and `LedgerError`
//! - [`repository`] - Plain SQL, one module per table group
//! - [`ledger`] - Inventory Ledger, Sale Committer, Credit Ledger
//! - [`reports`] - Sales, expense and profit summaries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sari_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("sari.db")).await?;
//!
//! let product = db.inventory().get("RICE-1KG").await?;
//! cart.add(&product, 2)?;
//!
//! let receipt = db.committer().commit(&mut cart, CommitRequest::cash(tendered)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, LedgerError, LedgerResult};
pub use pool::{Database, DbConfig};

pub use ledger::committer::{Checkout, CommitRequest, SaleCommitter, SaleReceipt};
pub use ledger::credit::CreditLedger;
pub use ledger::inventory::{InventoryLedger, InventoryValuation};
pub use reports::Reports;

pub use repository::expense::ExpenseRepository;
