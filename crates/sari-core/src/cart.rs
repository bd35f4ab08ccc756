//! # Cart
//!
//! The in-memory staging area for a sale. Nothing here touches the store:
//! every mutation is checked against a live [`Product`] snapshot the
//! caller has just read, and stock is only reserved logically.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Till Action             Cart Method              Effect                │
//! │  ───────────             ───────────              ──────                │
//! │                                                                         │
//! │  Scan / type code ─────► add(product, qty) ─────► line.qty += qty      │
//! │                                                    (price frozen at     │
//! │                                                     first add)          │
//! │  Change quantity ──────► set_quantity(...) ─────► line.qty = n         │
//! │                                                                         │
//! │  Void line ────────────► remove(code) ──────────► line dropped         │
//! │                                                                         │
//! │  Show total ───────────► total(charge, disc) ───► CartTotals          │
//! │                                                                         │
//! │  Cancel sale ──────────► clear() ───────────────► no lines             │
//! │                                                                         │
//! │  Commit happens in sari-db (SaleCommitter), which re-checks stock.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_cart_size, validate_quantity};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart.
///
/// The unit price is captured when the item first enters the cart and is
/// not re-read afterwards, so the running total stays stable for the whole
/// transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_code: String,

    /// Product name at time of adding (display only)
    pub name: String,

    pub unit_price_cents: i64,

    pub quantity: i64,

    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            item_code: product.item_code.clone(),
            name: product.name.clone(),
            unit_price_cents: product.sell_price_cents,
            quantity,
            added_at: Utc::now(),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Quantity × captured unit price.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Totals for a cart with optional charge and discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    /// Charge after clamping to ≥ 0.
    pub additional_charge: Money,
    /// Discount requested, after clamping to ≥ 0.
    pub discount: Money,
    /// `subtotal + additional_charge`
    pub gross: Money,
    /// `max(0, gross - discount)`
    pub grand: Money,
}

impl CartTotals {
    /// The part of the discount that actually reduced the total.
    ///
    /// `grand == gross - applied_discount` always holds.
    #[inline]
    pub fn applied_discount(&self) -> Money {
        self.gross - self.grand
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart for one till session.
///
/// ## Invariants
/// - Lines are unique by item code
/// - Every line has quantity > 0
/// - At most `MAX_CART_LINES` lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    id: Uuid,
    lines: Vec<CartLine>,
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart with a fresh id.
    pub fn new() -> Self {
        Cart {
            id: Uuid::new_v4(),
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Identifier used to correlate log lines for this cart.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, item_code: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_code == item_code)
    }

    /// Quantity of `item_code` already reserved in this cart.
    pub fn quantity_of(&self, item_code: &str) -> i64 {
        self.line(item_code).map(|l| l.quantity).unwrap_or(0)
    }

    /// Adds `quantity` of a product, merging with an existing line.
    ///
    /// `quantity` may be negative to take units back off an existing line;
    /// a line whose quantity reaches zero or below is removed.
    ///
    /// Taking units off a line is always allowed, even for a product that
    /// has since been deactivated or run short.
    ///
    /// ## Errors
    /// - `Inactive` if the product is discontinued and the line would grow
    /// - `InvalidInput` for a non-positive quantity on a new line, or a
    ///   total above `MAX_ITEM_QUANTITY`
    /// - `InsufficientStock` if in-cart + quantity exceeds live stock
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        let existing = self.quantity_of(&product.item_code);
        let requested = existing
            .checked_add(quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_ITEM_QUANTITY,
            })?;

        if requested <= 0 {
            if existing > 0 {
                self.lines.retain(|l| l.item_code != product.item_code);
                return Ok(());
            }
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if quantity > 0 {
            if !product.is_active {
                return Err(CoreError::Inactive {
                    item_code: product.item_code.clone(),
                });
            }
            validate_quantity(requested)?;
            check_stock(product, requested)?;
        }

        match self.lines.iter_mut().find(|l| l.item_code == product.item_code) {
            Some(line) => line.quantity = requested,
            None => {
                validate_cart_size(self.lines.len())?;
                self.lines.push(CartLine::from_product(product, requested));
            }
        }

        Ok(())
    }

    /// Sets the quantity of a line already in the cart.
    ///
    /// ## Errors
    /// - `InvalidInput` for a negative quantity
    /// - `NotFound` if the item is not in the cart
    /// - `Inactive` / `InsufficientStock` against the live product
    pub fn set_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity < 0 {
            return Err(ValidationError::Negative {
                field: "quantity".to_string(),
            }
            .into());
        }

        if quantity == 0 {
            return self.remove(&product.item_code).map(|_| ());
        }

        if self.line(&product.item_code).is_none() {
            return Err(CoreError::not_found("Cart line", &product.item_code));
        }

        if !product.is_active {
            return Err(CoreError::Inactive {
                item_code: product.item_code.clone(),
            });
        }

        validate_quantity(quantity)?;
        check_stock(product, quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_code == product.item_code) {
            line.quantity = quantity;
        }

        Ok(())
    }

    /// Removes a line and returns it.
    pub fn remove(&mut self, item_code: &str) -> CoreResult<CartLine> {
        let pos = self
            .lines
            .iter()
            .position(|l| l.item_code == item_code)
            .ok_or_else(|| CoreError::not_found("Cart line", item_code))?;

        Ok(self.lines.remove(pos))
    }

    /// Empties the cart. Always succeeds.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line subtotals.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Computes the totals for an optional charge and discount.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::{Cart, Money};
    ///
    /// let cart = Cart::new();
    /// let t = cart.total(Money::from_cents(-100), Money::from_cents(500));
    /// assert_eq!(t.additional_charge, Money::zero());
    /// assert_eq!(t.grand, Money::zero());
    /// ```
    pub fn total(&self, additional_charge: Money, discount: Money) -> CartTotals {
        let subtotal = self.subtotal();
        let additional_charge = additional_charge.clamp_non_negative();
        let discount = discount.clamp_non_negative();
        let gross = subtotal.saturating_add(additional_charge);
        let grand = (gross - discount).clamp_non_negative();

        CartTotals {
            subtotal,
            additional_charge,
            discount,
            gross,
            grand,
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

fn check_stock(product: &Product, requested: i64) -> CoreResult<()> {
    if requested > product.current_stock {
        return Err(CoreError::InsufficientStock {
            item_code: product.item_code.clone(),
            available: product.current_stock,
            requested,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
