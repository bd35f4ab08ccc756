//! # Repository Module
//!
//! Plain SQL, grouped by table.
//!
//! ## Connection-Level Functions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Ledger operation                                                       │
//! │       │                                                                 │
//! │       │  let mut tx = db.begin().await?;                                │
//! │       │  product::get(&mut tx, code)                                    │
//! │       │  sale::insert(&mut tx, &new_sale)                               │
//! │       │  product::adjust_stock(&mut tx, code, -qty)                     │
//! │       │  tx.commit()                                                    │
//! │       ▼                                                                 │
//! │  repository::{product, sale, credit, stock}                            │
//! │       │   fn(conn: &mut SqliteConnection, ...)                          │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Functions take `&mut SqliteConnection` so the same SQL runs against a
//! pooled connection or inside a transaction. Business rules live in
//! [`crate::ledger`], not here.
//!
//! - [`product`] - Catalog rows and the stock column
//! - [`sale`] - Sales and sale lines
//! - [`credit`] - Credit entries and the payment trail
//! - [`stock`] - Stock-in events
//! - [`expense`] - [`expense::ExpenseRepository`] (pool-backed)

pub mod credit;
pub mod expense;
pub mod product;
pub mod sale;
pub mod stock;
