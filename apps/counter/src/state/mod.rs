//! # State Module
//!
//! Session state for the counter. Each command takes only the state it
//! needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │   DbState    │  │  CartState   │  │   ConfigState    │              │
//! │  │              │  │              │  │                  │              │
//! │  │  Database    │  │  Arc<Mutex<  │  │  store_name      │              │
//! │  │  (SQLite     │  │    Cart +    │  │  currency_symbol │              │
//! │  │   pool)      │  │  adjustments │  │  reorder default │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  • DbState: Database has an internal connection pool                   │
//! │  • CartState: one session cart behind a tokio Mutex                    │
//! │  • ConfigState: read-only after startup                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;

pub use cart::{CartSession, CartState};
pub use config::ConfigState;
pub use db::DbState;
