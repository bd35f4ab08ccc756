//! # Sale Committer
//!
//! The only way a cart becomes a sale.
//!
//! ## Commit Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         commit(cart, request)                           │
//! │                                                                         │
//! │  1. cart empty? ──────────────────────────────────► EmptyCart          │
//! │  2. totals = cart.total(charge, discount)   (never a caller's total)   │
//! │  3. cash and tendered < grand? ───────────────────► InsufficientPayment│
//! │                                                                         │
//! │  ──────────────────────── BEGIN ───────────────────────────────────    │
//! │  4. for each line: re-read product                                     │
//! │       missing ──► NotFound   inactive ──► Inactive                     │
//! │       stock < qty ──► StockRaceLost                                    │
//! │  5. credit without customer name ─────────────────► CustomerNameRequired│
//! │     INSERT sale                                                         │
//! │     INSERT sale_items (price + unit cost snapshot)                      │
//! │     InventoryLedger::adjust_in(-qty) per line                          │
//! │     credit? CreditLedger::open_in(original = grand, paid = tendered)   │
//! │  ──────────────────────── COMMIT ──────────────────────────────────    │
//! │                                                                         │
//! │  6. any error above: transaction dropped → full rollback               │
//! │  7. cart.clear(), return SaleReceipt                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use sari_core::credit::status_for;
use sari_core::validation::{require_customer_name, validate_optional_text};
use sari_core::{Cart, CartTotals, CoreError, Money, PaymentStatus, PaymentType, Product};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::credit::CreditLedger;
use crate::ledger::inventory::InventoryLedger;
use crate::pool::begin_write;
use crate::repository::product;
use crate::repository::sale::{self, NewSale, NewSaleItem};

// =============================================================================
// Request & Receipt
// =============================================================================

/// Payment parameters for a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    pub payment_type: PaymentType,
    pub customer_name: Option<String>,
    pub additional_charge: Money,
    pub discount: Money,
    /// Cash handed over. For credit sales, the down payment (if any).
    pub tendered: Option<Money>,
    pub notes: Option<String>,
    /// Credit sales only.
    pub due_date: Option<NaiveDate>,
}

impl CommitRequest {
    /// A cash sale with the amount the customer handed over.
    pub fn cash(tendered: Money) -> Self {
        CommitRequest {
            payment_type: PaymentType::Cash,
            customer_name: None,
            additional_charge: Money::zero(),
            discount: Money::zero(),
            tendered: Some(tendered),
            notes: None,
            due_date: None,
        }
    }

    /// A credit sale billed to `customer_name`.
    pub fn credit(customer_name: impl Into<String>) -> Self {
        CommitRequest {
            payment_type: PaymentType::Credit,
            customer_name: Some(customer_name.into()),
            additional_charge: Money::zero(),
            discount: Money::zero(),
            tendered: None,
            notes: None,
            due_date: None,
        }
    }

    pub fn with_adjustments(mut self, additional_charge: Money, discount: Money) -> Self {
        self.additional_charge = additional_charge;
        self.discount = discount;
        self
    }

    pub fn with_tendered(mut self, tendered: Money) -> Self {
        self.tendered = Some(tendered);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// What the till shows after a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleReceipt {
    pub sale_id: i64,
    pub payment_type: PaymentType,
    pub totals: CartTotals,
    /// Cash sales: tendered − total.
    pub change: Money,
    pub status: PaymentStatus,
    /// Credit sales: the opened entry.
    pub credit_id: Option<i64>,
}

// =============================================================================
// Sale Committer
// =============================================================================

/// Turns carts into sales, atomically.
#[derive(Debug, Clone)]
pub struct SaleCommitter {
    pool: SqlitePool,
}

impl SaleCommitter {
    pub fn new(pool: SqlitePool) -> Self {
        SaleCommitter { pool }
    }

    /// Commits the cart as one sale.
    ///
    /// On success the cart is cleared. On any error nothing is written and
    /// the cart is left as it was.
    pub async fn commit(&self, cart: &mut Cart, request: CommitRequest) -> LedgerResult<SaleReceipt> {
        let result = self.commit_inner(cart, &request).await;

        match &result {
            Ok(receipt) => {
                cart.clear();
                info!(
                    cart_id = %cart.id(),
                    sale_id = receipt.sale_id,
                    payment_type = receipt.payment_type.as_str(),
                    total = %receipt.totals.grand,
                    "Sale committed"
                );
            }
            Err(LedgerError::Rule(e)) => {
                warn!(cart_id = %cart.id(), error = %e, "Commit rejected");
            }
            Err(LedgerError::Storage(e)) => {
                warn!(cart_id = %cart.id(), error = %e, "Commit failed, rolled back");
            }
        }

        result
    }

    async fn commit_inner(&self, cart: &Cart, request: &CommitRequest) -> LedgerResult<SaleReceipt> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let totals = cart.total(request.additional_charge, request.discount);
        let grand = totals.grand;
        let tendered = request.tendered.map(Money::clamp_non_negative);

        let (amount_paid, change, status) = match request.payment_type {
            PaymentType::Cash => {
                let tendered = tendered.unwrap_or_else(Money::zero);
                if grand.is_positive() && tendered < grand {
                    return Err(CoreError::InsufficientPayment { due: grand, tendered }.into());
                }
                (grand, tendered - grand, PaymentStatus::Paid)
            }
            PaymentType::Credit => {
                let paid = tendered.unwrap_or_else(Money::zero);
                (paid, Money::zero(), status_for(grand, paid))
            }
        };

        validate_optional_text("notes", request.notes.as_deref(), 500)?;

        debug!(
            cart_id = %cart.id(),
            lines = cart.line_count(),
            grand = %grand,
            "Committing cart"
        );

        let mut tx = begin_write(&self.pool).await?;

        let mut products = Vec::with_capacity(cart.line_count());
        for line in cart.lines() {
            let product = revalidate_line(&mut tx, &line.item_code, line.quantity).await?;
            products.push(product);
        }

        let customer_name = match request.payment_type {
            PaymentType::Credit => Some(require_customer_name(request.customer_name.as_deref())?),
            PaymentType::Cash => request
                .customer_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        };

        let sale_id = sale::insert(
            &mut tx,
            &NewSale {
                created_at: Utc::now(),
                business_date: Local::now().date_naive(),
                subtotal_cents: totals.subtotal.cents(),
                additional_charge_cents: totals.additional_charge.cents(),
                discount_cents: totals.applied_discount().cents(),
                total_cents: grand.cents(),
                payment_type: request.payment_type,
                customer_name: customer_name.clone(),
                notes: request.notes.clone(),
                amount_paid_cents: amount_paid.cents(),
                status,
            },
        )
        .await?;

        for (line, product) in cart.lines().iter().zip(&products) {
            sale::insert_item(
                &mut tx,
                sale_id,
                &NewSaleItem {
                    item_code: line.item_code.clone(),
                    quantity: line.quantity,
                    sell_price_cents: line.unit_price_cents,
                    supplier_cost_cents: product.unit_cost().cents(),
                },
            )
            .await?;

            InventoryLedger::adjust_in(&mut tx, &line.item_code, -line.quantity)
                .await
                .map_err(|e| race_lost(e, &line.item_code, line.quantity))?;
        }

        let credit_id = match request.payment_type {
            PaymentType::Credit => {
                let entry = CreditLedger::open_in(
                    &mut tx,
                    sale_id,
                    customer_name.as_deref(),
                    grand,
                    amount_paid,
                    request.due_date,
                )
                .await?;
                Some(entry.id)
            }
            PaymentType::Cash => None,
        };

        tx.commit().await?;

        Ok(SaleReceipt {
            sale_id,
            payment_type: request.payment_type,
            totals,
            change,
            status,
            credit_id,
        })
    }
}

/// Re-reads a product inside the commit transaction.
async fn revalidate_line(conn: &mut SqliteConnection, item_code: &str, quantity: i64) -> LedgerResult<Product> {
    let product = product::get(conn, item_code)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", item_code))?;

    if !product.is_active {
        return Err(CoreError::Inactive {
            item_code: item_code.to_string(),
        }
        .into());
    }

    if product.current_stock < quantity {
        return Err(CoreError::StockRaceLost {
            item_code: item_code.to_string(),
            available: product.current_stock,
            requested: quantity,
        }
        .into());
    }

    Ok(product)
}

/// A stock decrement rejected by the CHECK constraint means another
/// session sold the units after `revalidate_line` read them.
fn race_lost(err: LedgerError, item_code: &str, quantity: i64) -> LedgerError {
    match err {
        LedgerError::Rule(CoreError::InsufficientStock { available, .. }) => CoreError::StockRaceLost {
            item_code: item_code.to_string(),
            available,
            requested: quantity,
        }
        .into(),
        other => other,
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Cart mutations that look the product up by item code first.
///
/// The cart itself never touches the store; this wrapper reads the live
/// product and hands it to the cart.
#[derive(Debug, Clone)]
pub struct Checkout {
    pool: SqlitePool,
}

impl Checkout {
    pub fn new(pool: SqlitePool) -> Self {
        Checkout { pool }
    }

    async fn product(&self, item_code: &str) -> LedgerResult<Product> {
        let mut conn = self.pool.acquire().await?;
        product::get(&mut conn, item_code.trim())
            .await?
            .ok_or_else(|| CoreError::not_found("Product", item_code.trim()).into())
    }

    /// Adds `quantity` of `item_code` to the cart.
    ///
    /// ## Errors
    /// * `NotFound` - unknown item code
    /// * anything [`Cart::add`] returns
    pub async fn add(&self, cart: &mut Cart, item_code: &str, quantity: i64) -> LedgerResult<()> {
        let product = self.product(item_code).await?;
        cart.add(&product, quantity)?;

        debug!(
            cart_id = %cart.id(),
            item_code = %product.item_code,
            quantity,
            in_cart = cart.quantity_of(&product.item_code),
            "Cart add"
        );
        Ok(())
    }

    /// Sets the quantity of a line already in the cart.
    pub async fn set_quantity(&self, cart: &mut Cart, item_code: &str, quantity: i64) -> LedgerResult<()> {
        if quantity == 0 {
            cart.remove(item_code.trim())?;
            return Ok(());
        }

        let product = self.product(item_code).await?;
        cart.set_quantity(&product, quantity)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use sari_core::{ErrorKind, NewProduct};

    use crate::pool::{Database, DbConfig};
    use crate::repository::credit;

    use super::*;

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.inventory()
            .add_product(
                &NewProduct::new("SKU1", "Widget", 500)
                    .with_stock(10)
                    .with_supplier_cost(1_200, 4),
            )
            .await
            .unwrap();
        db.inventory()
            .add_product(&NewProduct::new("SKU2", "Gadget", 2_500).with_stock(100))
            .await
            .unwrap();
        db
    }

    async fn counts(db: &Database) -> (i64, i64, i64) {
        let mut conn = db.pool().acquire().await.unwrap();
        let sales = sale::count(&mut conn).await.unwrap();
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        let credits = credit::count(&mut conn).await.unwrap();
        (sales, items, credits)
    }

    #[tokio::test]
    async fn test_cash_sale_deducts_stock() {
        let db = setup().await;
        let mut cart = Cart::new();

        db.checkout().add(&mut cart, "SKU1", 3).await.unwrap();
        assert_eq!(cart.subtotal().cents(), 1_500);

        let receipt = db
            .committer()
            .commit(&mut cart, CommitRequest::cash(Money::from_cents(1_500)))
            .await
            .unwrap();

        assert_eq!(receipt.totals.grand.cents(), 1_500);
        assert_eq!(receipt.change, Money::zero());
        assert_eq!(receipt.status, PaymentStatus::Paid);
        assert!(receipt.credit_id.is_none());
        assert!(cart.is_empty());

        assert_eq!(db.inventory().get("SKU1").await.unwrap().current_stock, 7);

        let details = db.reports().sale_details(receipt.sale_id).await.unwrap();
        assert_eq!(details.sale.total_cents, 1_500);
        assert_eq!(details.sale.amount_paid_cents, 1_500);
        assert_eq!(details.lines.len(), 1);
        assert_eq!(details.lines[0].item.sell_price_cents, 500);
        // 12.00 / 4
        assert_eq!(details.lines[0].item.supplier_cost_cents, 300);
    }

    #[tokio::test]
    async fn test_stock_race_lost_writes_nothing() {
        let db = setup().await;
        let mut cart = Cart::new();

        db.checkout().add(&mut cart, "SKU2", 1).await.unwrap();
        db.checkout().add(&mut cart, "SKU1", 3).await.unwrap();

        // Another till sells SKU1 down to 2.
        db.inventory().set_stock("SKU1", 2).await.unwrap();

        let err = db
            .committer()
            .commit(&mut cart, CommitRequest::cash(Money::from_cents(10_000)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Rule(CoreError::StockRaceLost {
                available: 2,
                requested: 3,
                ..
            })
        ));
        assert_eq!(db.inventory().get("SKU1").await.unwrap().current_stock, 2);
        assert_eq!(db.inventory().get("SKU2").await.unwrap().current_stock, 100);
        assert_eq!(counts(&db).await, (0, 0, 0));
        assert_eq!(cart.line_count(), 2);
    }

    #[tokio::test]
    async fn test_credit_sale_opens_entry() {
        let db = setup().await;
        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "SKU2", 4).await.unwrap();

        let receipt = db
            .committer()
            .commit(&mut cart, CommitRequest::credit("Ana"))
            .await
            .unwrap();

        assert_eq!(receipt.status, PaymentStatus::Unpaid);
        let credit_id = receipt.credit_id.unwrap();

        let credits = db.credits();
        let entry = credits.get(credit_id).await.unwrap();
        assert_eq!(entry.sale_id, receipt.sale_id);
        assert_eq!(entry.original_cents, 10_000);
        assert_eq!(entry.paid_cents, 0);
        assert_eq!(entry.balance_cents, 10_000);

        let entry = credits.apply_payment(credit_id, Money::from_cents(4_000)).await.unwrap();
        assert_eq!(entry.status, PaymentStatus::PartiallyPaid);
        assert_eq!(entry.balance_cents, 6_000);

        let entry = credits.apply_payment(credit_id, Money::from_cents(6_000)).await.unwrap();
        assert_eq!(entry.status, PaymentStatus::Paid);
        assert_eq!(entry.balance_cents, 0);

        let err = credits.apply_payment(credit_id, Money::from_cents(1_000)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyPaid);
    }

    #[tokio::test]
    async fn test_credit_with_down_payment() {
        let db = setup().await;
        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "SKU2", 2).await.unwrap();

        let receipt = db
            .committer()
            .commit(
                &mut cart,
                CommitRequest::credit("Ben").with_tendered(Money::from_cents(1_000)),
            )
            .await
            .unwrap();
        assert_eq!(receipt.status, PaymentStatus::PartiallyPaid);

        let entry = db.credits().for_sale(receipt.sale_id).await.unwrap().unwrap();
        assert_eq!(entry.paid_cents, 1_000);
        assert_eq!(entry.balance_cents, 4_000);
    }

    #[tokio::test]
    async fn test_credit_requires_customer_name() {
        let db = setup().await;
        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "SKU1", 1).await.unwrap();

        let err = db
            .committer()
            .commit(&mut cart, CommitRequest::credit(""))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CustomerNameRequired);
        assert_eq!(counts(&db).await, (0, 0, 0));
        assert_eq!(db.inventory().get("SKU1").await.unwrap().current_stock, 10);
        assert_eq!(cart.line_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let db = setup().await;
        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "SKU1", 2).await.unwrap();
        cart.remove("SKU1").unwrap();

        let err = db
            .committer()
            .commit(&mut cart, CommitRequest::cash(Money::from_cents(1_000)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCart);
    }

    #[tokio::test]
    async fn test_insufficient_payment() {
        let db = setup().await;
        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "SKU1", 3).await.unwrap();

        let err = db
            .committer()
            .commit(&mut cart, CommitRequest::cash(Money::from_cents(1_000)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientPayment);

        let mut request = CommitRequest::cash(Money::zero());
        request.tendered = None;
        let err = db.committer().commit(&mut cart, request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientPayment);

        assert_eq!(counts(&db).await.0, 0);
    }

    #[tokio::test]
    async fn test_fully_discounted_cash_sale_needs_no_tender() {
        let db = setup().await;
        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "SKU1", 2).await.unwrap();

        let mut request = CommitRequest::cash(Money::zero())
            .with_adjustments(Money::from_cents(100), Money::from_cents(5_000));
        request.tendered = None;

        let receipt = db.committer().commit(&mut cart, request).await.unwrap();
        assert_eq!(receipt.totals.grand, Money::zero());

        let sale = db.reports().sale_details(receipt.sale_id).await.unwrap().sale;
        // Stored discount is what was actually applied.
        assert_eq!(sale.discount_cents, 1_100);
        assert_eq!(
            sale.total_cents,
            sale.subtotal_cents + sale.additional_charge_cents - sale.discount_cents
        );
    }

    #[tokio::test]
    async fn test_change_and_adjustments() {
        let db = setup().await;
        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "SKU1", 2).await.unwrap();
        db.checkout().add(&mut cart, "SKU2", 1).await.unwrap();

        let receipt = db
            .committer()
            .commit(
                &mut cart,
                CommitRequest::cash(Money::from_cents(5_000))
                    .with_adjustments(Money::from_cents(300), Money::from_cents(800))
                    .with_notes("bagged"),
            )
            .await
            .unwrap();

        // 10.00 + 25.00 + 3.00 - 8.00
        assert_eq!(receipt.totals.grand.cents(), 3_000);
        assert_eq!(receipt.change.cents(), 2_000);

        let details = db.reports().sale_details(receipt.sale_id).await.unwrap();
        let line_sum: i64 = details.lines.iter().map(|l| l.item.line_total_cents).sum();
        assert_eq!(
            details.sale.total_cents,
            line_sum + details.sale.additional_charge_cents - details.sale.discount_cents
        );
        assert_eq!(details.sale.notes.as_deref(), Some("bagged"));
    }

    #[tokio::test]
    async fn test_inactive_at_commit() {
        let db = setup().await;
        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "SKU1", 1).await.unwrap();
        db.inventory().set_active("SKU1", false).await.unwrap();

        let err = db
            .committer()
            .commit(&mut cart, CommitRequest::cash(Money::from_cents(500)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inactive);
        assert_eq!(counts(&db).await, (0, 0, 0));
    }

    #[tokio::test]
    async fn test_checkout_lookup() {
        let db = setup().await;
        let mut cart = Cart::new();

        let err = db.checkout().add(&mut cart, "NOPE", 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = db.checkout().add(&mut cart, "SKU1", 11).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);

        db.checkout().add(&mut cart, "SKU1", 4).await.unwrap();
        db.checkout().set_quantity(&mut cart, "SKU1", 9).await.unwrap();
        assert_eq!(cart.quantity_of("SKU1"), 9);

        db.checkout().set_quantity(&mut cart, "SKU1", 0).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_sequential_carts_never_oversell() {
        let db = setup().await;

        let mut first = Cart::new();
        let mut second = Cart::new();
        db.checkout().add(&mut first, "SKU1", 6).await.unwrap();
        db.checkout().add(&mut second, "SKU1", 6).await.unwrap();

        db.committer()
            .commit(&mut first, CommitRequest::cash(Money::from_cents(3_000)))
            .await
            .unwrap();
        let err = db
            .committer()
            .commit(&mut second, CommitRequest::cash(Money::from_cents(3_000)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StockRaceLost);
        assert_eq!(db.inventory().get("SKU1").await.unwrap().current_stock, 4);
    }

    #[tokio::test]
    async fn test_failure_after_stock_deducted_rolls_back_everything() {
        let db = setup().await;
        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "SKU1", 2).await.unwrap();
        db.checkout().add(&mut cart, "SKU2", 5).await.unwrap();

        // The credit entry is the last write of a commit; by then the sale,
        // both lines and both stock decrements are already in the transaction.
        sqlx::query(
            "CREATE TRIGGER credit_offline BEFORE INSERT ON credit_entries \
             BEGIN SELECT RAISE(ABORT, 'credit ledger offline'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .committer()
            .commit(&mut cart, CommitRequest::credit("Ana"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert_eq!(counts(&db).await, (0, 0, 0));
        assert_eq!(db.inventory().get("SKU1").await.unwrap().current_stock, 10);
        assert_eq!(db.inventory().get("SKU2").await.unwrap().current_stock, 100);
        assert_eq!(cart.line_count(), 2);

        sqlx::query("DROP TRIGGER credit_offline")
            .execute(db.pool())
            .await
            .unwrap();
        let receipt = db
            .committer()
            .commit(&mut cart, CommitRequest::credit("Ana"))
            .await
            .unwrap();
        assert!(receipt.credit_id.is_some());
        assert_eq!(counts(&db).await, (1, 2, 1));
    }

    #[tokio::test]
    async fn test_concurrent_session_race_is_stock_race_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("till.db");
        let till_a = Database::new(DbConfig::new(&path)).await.unwrap();
        let till_b = Database::new(DbConfig::new(&path)).await.unwrap();

        till_a
            .inventory()
            .add_product(&NewProduct::new("RICE", "Rice 1kg", 5_500).with_stock(10))
            .await
            .unwrap();

        let mut cart = Cart::new();
        till_a.checkout().add(&mut cart, "RICE", 3).await.unwrap();

        // Till B is mid-sale and holds the write lock.
        let mut tx = till_b.begin().await.unwrap();
        InventoryLedger::adjust_in(&mut tx, "RICE", -8).await.unwrap();

        let committer = till_a.committer();
        let pending = tokio::spawn(async move {
            let result = committer
                .commit(&mut cart, CommitRequest::cash(Money::from_cents(20_000)))
                .await;
            (result, cart)
        });

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        tx.commit().await.unwrap();

        let (result, cart) = pending.await.unwrap();
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Rule(CoreError::StockRaceLost {
                available: 2,
                requested: 3,
                ..
            })
        ));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(till_a.inventory().get("RICE").await.unwrap().current_stock, 2);
        assert_eq!(counts(&till_a).await, (0, 0, 0));

        till_a.close().await;
        till_b.close().await;
    }
}
