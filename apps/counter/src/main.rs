//! # Sari POS Counter Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sari POS Counter                                 │
//! │                                                                         │
//! │  stdin ──► commands::parse ──► commands::execute ──► stdout (JSON)     │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                     sari-db ledgers (SQLite, WAL mode)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The actual setup is in lib.rs.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    sari_counter_lib::run().await
}
