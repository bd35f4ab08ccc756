//! # Domain Types
//!
//! Records shared by the ledger store and the counter app.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  CreditEntry    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  item_code (PK) │   │  id (seq)       │   │  id (seq)       │       │
//! │  │  sell_price     │◄──│  SaleItem[]     │◄──│  sale_id (1:1)  │       │
//! │  │  current_stock  │   │  total_cents    │   │  balance_cents  │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │          ▲                                            │                 │
//! │  ┌───────┴─────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │  StockInEvent   │   │    Expense      │   │ CreditPayment   │       │
//! │  │  (additive)     │   │  (standalone)   │   │ (append-only)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Item codes on sale lines and stock-in events are plain strings with no
//! cascading relationship: a product may be deleted while history still
//! names it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing;
use crate::DEFAULT_REORDER_THRESHOLD;

// =============================================================================
// Product
// =============================================================================

/// A product on the store's shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Business identifier, immutable once created.
    pub item_code: String,

    /// Display name shown at the till.
    pub name: String,

    pub description: Option<String>,

    /// Unit label ("pc", "kg", "pack").
    pub unit: Option<String>,

    /// What the store paid for one supplier lot.
    pub supplier_cost_cents: i64,

    /// Units per supplier lot.
    pub volume: i64,

    /// Additive markup over unit cost.
    pub markup_cents: i64,

    /// Selling price per unit.
    pub sell_price_cents: i64,

    /// Units on hand. Written only by the inventory ledger.
    pub current_stock: i64,

    pub reorder_threshold: i64,

    pub reorder_qty: i64,

    /// Persisted `current_stock < reorder_threshold`.
    pub reorder_alert: bool,

    /// Inactive products stay in history but cannot be sold.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as Money.
    #[inline]
    pub fn sell_price(&self) -> Money {
        Money::from_cents(self.sell_price_cents)
    }

    /// Returns the supplier cost of one unit.
    pub fn unit_cost(&self) -> Money {
        pricing::unit_cost(Money::from_cents(self.supplier_cost_cents), self.volume)
    }

    /// Returns the suggested selling price (unit cost plus markup, whole units).
    pub fn suggested_price(&self) -> Money {
        pricing::suggested_price(self.unit_cost(), Money::from_cents(self.markup_cents))
    }

    /// Checks the reorder rule against the current stock.
    #[inline]
    pub fn needs_reorder(&self) -> bool {
        self.current_stock < self.reorder_threshold
    }
}

/// Input for adding a product to the catalog.
///
/// ## Example
/// ```rust
/// use sari_core::NewProduct;
///
/// let rice = NewProduct::new("RICE-1KG", "Rice 1kg", 5_500)
///     .with_stock(40)
///     .with_supplier_cost(200_000, 40);
/// assert_eq!(rice.initial_stock, 40);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub item_code: String,
    pub name: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub supplier_cost_cents: i64,
    pub volume: i64,
    pub markup_cents: i64,
    pub sell_price_cents: i64,
    pub initial_stock: i64,
    pub reorder_threshold: i64,
    pub reorder_qty: i64,
}

impl NewProduct {
    pub fn new(item_code: impl Into<String>, name: impl Into<String>, sell_price_cents: i64) -> Self {
        NewProduct {
            item_code: item_code.into(),
            name: name.into(),
            description: None,
            unit: None,
            supplier_cost_cents: 0,
            volume: 1,
            markup_cents: 0,
            sell_price_cents,
            initial_stock: 0,
            reorder_threshold: DEFAULT_REORDER_THRESHOLD,
            reorder_qty: 0,
        }
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.initial_stock = stock;
        self
    }

    /// Sets the lot investment and the number of units it covers.
    pub fn with_supplier_cost(mut self, cost_cents: i64, volume: i64) -> Self {
        self.supplier_cost_cents = cost_cents;
        self.volume = volume;
        self
    }

    pub fn with_markup(mut self, markup_cents: i64) -> Self {
        self.markup_cents = markup_cents;
        self
    }

    pub fn with_reorder(mut self, threshold: i64, qty: i64) -> Self {
        self.reorder_threshold = threshold;
        self.reorder_qty = qty;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Editable product details. Stock is deliberately absent: counts are
/// corrected through the inventory ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub supplier_cost_cents: i64,
    pub volume: i64,
    pub markup_cents: i64,
    pub sell_price_cents: i64,
    pub reorder_threshold: i64,
    pub reorder_qty: i64,
}

impl From<&Product> for ProductUpdate {
    fn from(p: &Product) -> Self {
        ProductUpdate {
            name: p.name.clone(),
            description: p.description.clone(),
            unit: p.unit.clone(),
            supplier_cost_cents: p.supplier_cost_cents,
            volume: p.volume,
            markup_cents: p.markup_cents,
            sell_price_cents: p.sell_price_cents,
            reorder_threshold: p.reorder_threshold,
            reorder_qty: p.reorder_qty,
        }
    }
}

// =============================================================================
// Payment Type & Status
// =============================================================================

/// How the customer settles a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Cash,
    Credit,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Credit => "credit",
        }
    }
}

/// Settlement status of a sale or credit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::PartiallyPaid => "Partially Paid",
            PaymentStatus::Paid => "Paid",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Never updated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    /// Local calendar day the sale belongs to (report bucketing).
    pub business_date: NaiveDate,
    pub subtotal_cents: i64,
    pub additional_charge_cents: i64,
    /// Discount actually applied (never larger than subtotal + charge).
    pub discount_cents: i64,
    /// `subtotal + additional_charge - discount`.
    pub total_cents: i64,
    pub payment_type: PaymentType,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    /// Cash: the total. Credit: what was tendered at the counter.
    pub amount_paid_cents: i64,
    /// Status at the time of sale. Later credit payments do not touch it.
    pub status: PaymentStatus,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }
}

/// A line of a committed sale with prices frozen at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub item_code: String,
    pub quantity: i64,
    /// Selling price per unit at sale time.
    pub sell_price_cents: i64,
    /// Supplier unit cost at sale time (for COGS).
    pub supplier_cost_cents: i64,
    pub line_total_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }

    /// Cost of goods sold for this line.
    #[inline]
    pub fn line_cost(&self) -> Money {
        Money::from_cents(self.supplier_cost_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Credit
// =============================================================================

/// Running balance for one credit sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CreditEntry {
    pub id: i64,
    pub sale_id: i64,
    pub customer_name: String,
    pub original_cents: i64,
    /// Cumulative payments, including any overpayment.
    pub paid_cents: i64,
    /// `max(0, original - paid)`.
    pub balance_cents: i64,
    pub status: PaymentStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreditEntry {
    #[inline]
    pub fn original(&self) -> Money {
        Money::from_cents(self.original_cents)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

/// One payment in a credit entry's trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CreditPayment {
    pub id: i64,
    pub credit_id: i64,
    pub amount_cents: i64,
    pub paid_at: DateTime<Utc>,
}

// =============================================================================
// Stock-In
// =============================================================================

/// Goods received from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockInEvent {
    pub id: i64,
    pub item_code: String,
    pub quantity: i64,
    pub supplier_name: Option<String>,
    pub notes: Option<String>,
    pub business_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for receiving stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStockIn {
    pub item_code: String,
    pub quantity: i64,
    pub supplier_name: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Expense
// =============================================================================

/// A store expense. Unrelated to sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub business_date: NaiveDate,
    pub category: String,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Input for recording or editing an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub business_date: NaiveDate,
    pub category: String,
    pub description: Option<String>,
    pub amount_cents: i64,
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive range of business dates used by history and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if start > end {
            return Err(ValidationError::InvalidFormat {
                field: "date range".to_string(),
                reason: format!("start {} is after end {}", start, end),
            }
            .into());
        }
        Ok(DateRange { start, end })
    }

    /// A range covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        DateRange {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
