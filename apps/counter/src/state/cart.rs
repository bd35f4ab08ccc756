//! # Cart State
//!
//! The session cart plus the charge and discount keyed in at the counter.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Counter Input            Command                 Cart State Change     │
//! │  ─────────────            ───────                 ─────────────────     │
//! │                                                                         │
//! │  add RICE-1KG 2 ─────────► cart::add() ─────────► line added / merged   │
//! │  qty RICE-1KG 5 ─────────► cart::set_quantity() ► line qty = 5          │
//! │  remove RICE-1KG ────────► cart::remove() ──────► line removed          │
//! │  charge 10 / discount 5 ─► cart::adjust() ──────► adjustments set       │
//! │  clear ──────────────────► cart::clear() ───────► empty, adjustments 0  │
//! │  commit ... ─────────────► sale::commit() ──────► empty on success      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock is a `tokio::sync::Mutex` because commit holds the cart across
//! the ledger transaction.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use sari_core::{Cart, CartTotals, Money};

/// Cart plus the adjustments that apply to it at commit.
#[derive(Debug, Default)]
pub struct CartSession {
    pub cart: Cart,
    pub additional_charge: Money,
    pub discount: Money,
}

impl CartSession {
    pub fn totals(&self) -> CartTotals {
        self.cart.total(self.additional_charge, self.discount)
    }

    /// Empties the cart and drops any adjustments.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.additional_charge = Money::zero();
        self.discount = Money::zero();
    }
}

#[derive(Debug, Clone, Default)]
pub struct CartState {
    session: Arc<Mutex<CartSession>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the session cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let mut session = cart_state.lock().await;
    /// db.checkout().add(&mut session.cart, "RICE-1KG", 1).await?;
    /// ```
    pub async fn lock(&self) -> MutexGuard<'_, CartSession> {
        self.session.lock().await
    }
}
