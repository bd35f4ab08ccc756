//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Tender  │────►│ Committed│       │
//! │  │  Cart    │     │          │     │          │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add / qty         commit_sale                        │
//! │                   remove            (sale.rs)                          │
//! │                   charge / discount                                     │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear ─────────────────────────►  (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use sari_core::{CartLine, CartTotals, Money};

use crate::error::ApiError;
use crate::state::{CartSession, CartState, ConfigState, DbState};

/// Cart contents and totals as shown at the counter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub cart_id: String,
    pub lines: Vec<CartLineView>,
    pub totals: CartTotals,
    pub total_quantity: i64,
    pub display_total: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub item_code: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: String,
    pub subtotal: String,
}

impl CartResponse {
    pub fn new(session: &CartSession, config: &ConfigState) -> Self {
        let totals = session.totals();
        CartResponse {
            cart_id: session.cart.id().to_string(),
            lines: session
                .cart
                .lines()
                .iter()
                .map(|l| CartLineView::new(l, config))
                .collect(),
            total_quantity: session.cart.total_quantity(),
            display_total: config.format_currency(totals.grand.cents()),
            totals,
        }
    }
}

impl CartLineView {
    fn new(line: &CartLine, config: &ConfigState) -> Self {
        CartLineView {
            item_code: line.item_code.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: config.format_currency(line.unit_price_cents),
            subtotal: config.format_currency(line.subtotal().cents()),
        }
    }
}

pub async fn get_cart(cart: &CartState, config: &ConfigState) -> CartResponse {
    let session = cart.lock().await;
    CartResponse::new(&session, config)
}

/// Adds `quantity` of a product. Adding to an existing line merges; the
/// price stays the one captured on first add.
pub async fn add_to_cart(
    db: &DbState,
    cart: &CartState,
    config: &ConfigState,
    item_code: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(item_code = %item_code, quantity, "add_to_cart command");

    let mut session = cart.lock().await;
    db.inner().checkout().add(&mut session.cart, item_code, quantity).await?;
    Ok(CartResponse::new(&session, config))
}

/// Sets a line's quantity. Zero removes the line.
pub async fn update_cart_item(
    db: &DbState,
    cart: &CartState,
    config: &ConfigState,
    item_code: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(item_code = %item_code, quantity, "update_cart_item command");

    let mut session = cart.lock().await;
    db.inner()
        .checkout()
        .set_quantity(&mut session.cart, item_code, quantity)
        .await?;
    Ok(CartResponse::new(&session, config))
}

pub async fn remove_from_cart(
    cart: &CartState,
    config: &ConfigState,
    item_code: &str,
) -> Result<CartResponse, ApiError> {
    debug!(item_code = %item_code, "remove_from_cart command");

    let mut session = cart.lock().await;
    session.cart.remove(item_code)?;
    Ok(CartResponse::new(&session, config))
}

/// Sets the additional charge and/or discount applied at commit.
/// Negative amounts count as zero.
pub async fn adjust_cart(
    cart: &CartState,
    config: &ConfigState,
    additional_charge: Option<Money>,
    discount: Option<Money>,
) -> CartResponse {
    let mut session = cart.lock().await;
    if let Some(charge) = additional_charge {
        session.additional_charge = charge.clamp_non_negative();
    }
    if let Some(discount) = discount {
        session.discount = discount.clamp_non_negative();
    }
    CartResponse::new(&session, config)
}

/// Empties the cart. Clearing an empty cart is a no-op.
pub async fn clear_cart(cart: &CartState, config: &ConfigState) -> CartResponse {
    debug!("clear_cart command");

    let mut session = cart.lock().await;
    session.reset();
    CartResponse::new(&session, config)
}
