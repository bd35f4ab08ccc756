//! # Ledgers
//!
//! The components that own writes to the store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Write Ownership                               │
//! │                                                                         │
//! │  SaleCommitter ──┬──► sales, sale_items                                 │
//! │                  ├──► InventoryLedger::adjust_in ──► products.stock     │
//! │                  └──► CreditLedger::open_in ──► credit_entries          │
//! │                                                                         │
//! │  receive_stock ──────► stock_in_events + InventoryLedger::adjust_in     │
//! │                                                                         │
//! │  CreditLedger::apply_payment ──► credit_entries + credit_payments       │
//! │                                                                         │
//! │  `current_stock` has exactly one writer: InventoryLedger::adjust_in.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every method returns [`LedgerResult`](crate::error::LedgerResult):
//! business rule rejections come back as `LedgerError::Rule`, storage
//! faults as `LedgerError::Storage`. Multi-row writes run in one
//! transaction that is rolled back on any error.

pub mod committer;
pub mod credit;
pub mod inventory;
