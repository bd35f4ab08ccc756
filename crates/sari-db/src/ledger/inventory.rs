//! # Inventory Ledger
//!
//! The catalog and the single writer of `current_stock`.
//!
//! ## Stock Movements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Movements                                      │
//! │                                                                         │
//! │  Source               Path                              Delta           │
//! │  ──────               ────                              ─────           │
//! │  Sale commit     ──► adjust_in(tx, code, -qty)          negative        │
//! │  Supplier delivery ► receive_stock() → adjust_in        positive        │
//! │  Physical count  ──► set_stock() → adjust_in            counted - cur   │
//! │  Manual          ──► adjust(code, delta)                either          │
//! │                                                                         │
//! │  Every path ends in ONE statement that also recomputes reorder_alert:  │
//! │    current_stock = current_stock + delta                                │
//! │    reorder_alert = (current_stock + delta < reorder_threshold)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `adjust` does not check business rules. The `current_stock >= 0` CHECK
//! constraint is the last line of defense and surfaces as
//! `InsufficientStock`.

use chrono::{Local, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use sari_core::validation::{
    validate_item_code, validate_optional_text, validate_price_cents, validate_product_name,
    validate_quantity, validate_search_query, validate_stock_count, validate_stock_settings,
};
use sari_core::{
    CoreError, DateRange, Money, NewProduct, NewStockIn, Product, ProductUpdate, ValidationError,
};

use crate::error::{DbError, LedgerError, LedgerResult};
use crate::pool::begin_write;
use crate::repository::product;
use crate::repository::stock::{self, StockInRecord};

/// Default number of rows returned by [`InventoryLedger::search`].
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Aggregate value of everything on the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventoryValuation {
    /// Σ stock × selling price
    pub retail_value: Money,
    /// Σ stock × supplier unit cost
    pub cost_value: Money,
    pub product_count: i64,
    pub total_units: i64,
}

/// Outcome of a supplier delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockReceived {
    pub event_id: i64,
    pub new_stock: i64,
}

/// Catalog and stock ledger.
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    pool: SqlitePool,
}

impl InventoryLedger {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryLedger { pool }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Adds a product to the catalog.
    ///
    /// ## Errors
    /// * `InvalidInput` - malformed fields, or the item code already exists
    pub async fn add_product(&self, new: &NewProduct) -> LedgerResult<Product> {
        let new = normalize(new);
        validate_new_product(&new)?;

        let mut conn = self.pool.acquire().await?;
        match product::insert(&mut conn, &new, Utc::now()).await {
            Ok(created) => {
                info!(
                    item_code = %created.item_code,
                    stock = created.current_stock,
                    "Product added"
                );
                Ok(created)
            }
            Err(DbError::UniqueViolation { .. }) => Err(ValidationError::Duplicate {
                field: "item code".to_string(),
                value: new.item_code,
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Gets a product by item code.
    pub async fn get(&self, item_code: &str) -> LedgerResult<Product> {
        self.find(item_code)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", item_code).into())
    }

    pub async fn find(&self, item_code: &str) -> LedgerResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Ok(product::get(&mut conn, item_code.trim()).await?)
    }

    pub async fn list(&self, include_inactive: bool) -> LedgerResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        Ok(product::list(&mut conn, include_inactive).await?)
    }

    /// Searches item codes and names. An empty query lists active products.
    pub async fn search(&self, query: &str) -> LedgerResult<Vec<Product>> {
        let query = validate_search_query(query)?;
        if query.is_empty() {
            return self.list(false).await;
        }

        let mut conn = self.pool.acquire().await?;
        let products = product::search(&mut conn, &query, DEFAULT_SEARCH_LIMIT).await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Edits product details in place. Stock is never changed here.
    pub async fn update_details(&self, item_code: &str, update: &ProductUpdate) -> LedgerResult<Product> {
        validate_product_name(&update.name)?;
        validate_optional_text("description", update.description.as_deref(), 500)?;
        validate_optional_text("unit", update.unit.as_deref(), 20)?;
        validate_price_cents("supplier cost", update.supplier_cost_cents)?;
        validate_price_cents("markup", update.markup_cents)?;
        validate_price_cents("selling price", update.sell_price_cents)?;
        validate_stock_settings(update.volume, update.reorder_threshold, update.reorder_qty)?;

        let mut conn = self.pool.acquire().await?;
        product::update_details(&mut conn, item_code, update, Utc::now())
            .await
            .map_err(not_found_as_rule)?;

        let updated = product::get(&mut conn, item_code)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", item_code))?;

        info!(item_code = %item_code, "Product updated");
        Ok(updated)
    }

    /// Deactivates (`false`) or reactivates (`true`) a product.
    pub async fn set_active(&self, item_code: &str, active: bool) -> LedgerResult<()> {
        let mut conn = self.pool.acquire().await?;
        product::set_active(&mut conn, item_code, active, Utc::now())
            .await
            .map_err(not_found_as_rule)?;

        info!(item_code = %item_code, active, "Product activation changed");
        Ok(())
    }

    /// Removes a product. Sales and stock-in history keep the code and
    /// report it as "Unknown Item".
    pub async fn delete(&self, item_code: &str) -> LedgerResult<()> {
        let mut conn = self.pool.acquire().await?;
        product::delete(&mut conn, item_code)
            .await
            .map_err(not_found_as_rule)?;

        warn!(item_code = %item_code, "Product deleted");
        Ok(())
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Applies `delta` to a product's stock on the given connection.
    ///
    /// This is the single entry point that writes `current_stock`. It runs
    /// on whatever connection or transaction the caller holds.
    ///
    /// ## Returns
    /// The new stock level.
    ///
    /// ## Errors
    /// * `NotFound` - unknown item code
    /// * `InsufficientStock` - stock would go below zero
    pub async fn adjust_in(conn: &mut SqliteConnection, item_code: &str, delta: i64) -> LedgerResult<i64> {
        match product::adjust_stock(conn, item_code, delta, Utc::now()).await {
            Ok(new_stock) => Ok(new_stock),
            Err(DbError::CheckViolation { .. }) => {
                let available = product::get(conn, item_code)
                    .await?
                    .map(|p| p.current_stock)
                    .unwrap_or(0);
                Err(CoreError::InsufficientStock {
                    item_code: item_code.to_string(),
                    available,
                    requested: -delta,
                }
                .into())
            }
            Err(e) => Err(not_found_as_rule(e)),
        }
    }

    /// Applies `delta` to a product's stock.
    pub async fn adjust(&self, item_code: &str, delta: i64) -> LedgerResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let new_stock = Self::adjust_in(&mut conn, item_code, delta).await?;

        info!(item_code = %item_code, delta, new_stock, "Stock adjusted");
        Ok(new_stock)
    }

    /// Corrects stock to a physical count.
    pub async fn set_stock(&self, item_code: &str, counted: i64) -> LedgerResult<i64> {
        validate_stock_count(counted)?;

        let mut tx = begin_write(&self.pool).await?;
        let current = product::get(&mut tx, item_code)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", item_code))?;

        let new_stock = Self::adjust_in(&mut tx, item_code, counted - current.current_stock).await?;
        tx.commit().await?;

        info!(
            item_code = %item_code,
            previous = current.current_stock,
            new_stock,
            "Stock count corrected"
        );
        Ok(new_stock)
    }

    /// Logs a supplier delivery and adds it to stock, atomically.
    pub async fn receive_stock(&self, event: &NewStockIn) -> LedgerResult<StockReceived> {
        validate_quantity(event.quantity)?;
        validate_optional_text("supplier name", event.supplier_name.as_deref(), 100)?;
        validate_optional_text("notes", event.notes.as_deref(), 500)?;

        let mut tx = begin_write(&self.pool).await?;
        if product::get(&mut tx, &event.item_code).await?.is_none() {
            return Err(CoreError::not_found("Product", &event.item_code).into());
        }

        let event_id = stock::insert(&mut tx, event, Local::now().date_naive(), Utc::now()).await?;
        let new_stock = Self::adjust_in(&mut tx, &event.item_code, event.quantity).await?;
        tx.commit().await?;

        info!(
            item_code = %event.item_code,
            quantity = event.quantity,
            new_stock,
            "Stock received"
        );
        Ok(StockReceived { event_id, new_stock })
    }

    /// Stock-in events in `range`, with current product names.
    pub async fn stock_in_history(&self, range: DateRange) -> LedgerResult<Vec<StockInRecord>> {
        let mut conn = self.pool.acquire().await?;
        Ok(stock::history(&mut conn, range).await?)
    }

    // =========================================================================
    // Valuation & Reorder
    // =========================================================================

    /// Retail and cost value of all stock on hand.
    pub async fn valuation(&self) -> LedgerResult<InventoryValuation> {
        let products = self.list(true).await?;

        let mut valuation = InventoryValuation {
            retail_value: Money::zero(),
            cost_value: Money::zero(),
            product_count: products.len() as i64,
            total_units: 0,
        };

        for p in &products {
            valuation.retail_value += p.sell_price().multiply_quantity(p.current_stock);
            valuation.cost_value += p.unit_cost().multiply_quantity(p.current_stock);
            valuation.total_units += p.current_stock;
        }

        Ok(valuation)
    }

    /// Products currently flagged for reorder.
    pub async fn reorder_alerts(&self) -> LedgerResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        Ok(product::reorder_alerts(&mut conn).await?)
    }

    /// Cost of topping every alerted product back up to its reorder quantity.
    pub async fn reorder_cost(&self) -> LedgerResult<Money> {
        let alerts = self.reorder_alerts().await?;

        Ok(alerts
            .iter()
            .map(|p| {
                let needed = p.reorder_qty - p.current_stock;
                if needed > 0 {
                    p.unit_cost().multiply_quantity(needed)
                } else {
                    Money::zero()
                }
            })
            .sum())
    }
}

fn normalize(new: &NewProduct) -> NewProduct {
    let mut new = new.clone();
    new.item_code = new.item_code.trim().to_string();
    new.name = new.name.trim().to_string();
    new
}

fn validate_new_product(new: &NewProduct) -> LedgerResult<()> {
    validate_item_code(&new.item_code)?;
    validate_product_name(&new.name)?;
    validate_optional_text("description", new.description.as_deref(), 500)?;
    validate_optional_text("unit", new.unit.as_deref(), 20)?;
    validate_price_cents("supplier cost", new.supplier_cost_cents)?;
    validate_price_cents("markup", new.markup_cents)?;
    validate_price_cents("selling price", new.sell_price_cents)?;
    validate_stock_count(new.initial_stock)?;
    validate_stock_settings(new.volume, new.reorder_threshold, new.reorder_qty)?;
    Ok(())
}

/// Row-level NotFound is a business outcome for callers, not a fault.
fn not_found_as_rule(err: DbError) -> LedgerError {
    match err {
        DbError::NotFound { entity, id } if entity == "Product" => {
            CoreError::not_found("Product", id).into()
        }
        other => other.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use chrono::Local;
    use sari_core::ErrorKind;

    use crate::pool::{Database, DbConfig};

    use super::*;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_and_get_product() {
        let db = setup().await;
        let inv = db.inventory();

        let created = inv
            .add_product(&NewProduct::new(" SKU1 ", "Widget", 500).with_stock(10))
            .await
            .unwrap();
        assert_eq!(created.item_code, "SKU1");
        assert!(created.is_active);
        assert!(!created.reorder_alert);

        let fetched = inv.get("SKU1").await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(inv.get("NOPE").await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_item_code() {
        let db = setup().await;
        let inv = db.inventory();

        inv.add_product(&NewProduct::new("SKU1", "Widget", 500)).await.unwrap();
        let err = inv
            .add_product(&NewProduct::new("SKU1", "Other", 700))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Rule(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn test_adjust_recomputes_reorder_alert() {
        let db = setup().await;
        let inv = db.inventory();
        inv.add_product(&NewProduct::new("SKU1", "Widget", 500).with_stock(6).with_reorder(5, 20))
            .await
            .unwrap();

        assert_eq!(inv.adjust("SKU1", -2).await.unwrap(), 4);
        assert!(inv.get("SKU1").await.unwrap().reorder_alert);

        assert_eq!(inv.adjust("SKU1", 10).await.unwrap(), 14);
        assert!(!inv.get("SKU1").await.unwrap().reorder_alert);

        assert_eq!(inv.adjust("NOPE", 1).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_adjust_never_goes_negative() {
        let db = setup().await;
        let inv = db.inventory();
        inv.add_product(&NewProduct::new("SKU1", "Widget", 500).with_stock(2))
            .await
            .unwrap();

        let err = inv.adjust("SKU1", -3).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Rule(CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            })
        ));
        assert_eq!(inv.get("SKU1").await.unwrap().current_stock, 2);
    }

    #[tokio::test]
    async fn test_set_stock() {
        let db = setup().await;
        let inv = db.inventory();
        inv.add_product(&NewProduct::new("SKU1", "Widget", 500).with_stock(10))
            .await
            .unwrap();

        assert_eq!(inv.set_stock("SKU1", 3).await.unwrap(), 3);
        assert!(inv.get("SKU1").await.unwrap().reorder_alert);
        assert_eq!(inv.set_stock("SKU1", -1).await.unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(inv.set_stock("NOPE", 1).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_receive_stock_logs_and_adjusts() {
        let db = setup().await;
        let inv = db.inventory();
        inv.add_product(&NewProduct::new("SKU1", "Widget", 500).with_stock(1))
            .await
            .unwrap();

        let received = inv
            .receive_stock(&NewStockIn {
                item_code: "SKU1".to_string(),
                quantity: 24,
                supplier_name: Some("Metro Wholesale".to_string()),
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(received.new_stock, 25);

        let today = DateRange::day(Local::now().date_naive());
        let history = inv.stock_in_history(today).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].product_name, "Widget");
        assert_eq!(history[0].quantity, 24);

        let err = inv
            .receive_stock(&NewStockIn {
                item_code: "SKU1".to_string(),
                quantity: 0,
                supplier_name: None,
                notes: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = inv
            .receive_stock(&NewStockIn {
                item_code: "NOPE".to_string(),
                quantity: 5,
                supplier_name: None,
                notes: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(inv.stock_in_history(today).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_survives_product_deletion() {
        let db = setup().await;
        let inv = db.inventory();
        inv.add_product(&NewProduct::new("SKU1", "Widget", 500)).await.unwrap();
        inv.receive_stock(&NewStockIn {
            item_code: "SKU1".to_string(),
            quantity: 5,
            supplier_name: None,
            notes: None,
        })
        .await
        .unwrap();

        inv.delete("SKU1").await.unwrap();

        let history = inv
            .stock_in_history(DateRange::day(Local::now().date_naive()))
            .await
            .unwrap();
        assert_eq!(history[0].product_name, sari_core::UNKNOWN_ITEM_NAME);
        assert_eq!(inv.delete("SKU1").await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_valuation_and_reorder_cost() {
        let db = setup().await;
        let inv = db.inventory();

        // unit cost 100.00 / 4 = 25.00
        inv.add_product(
            &NewProduct::new("A", "Alpha", 3_000)
                .with_stock(2)
                .with_supplier_cost(10_000, 4)
                .with_reorder(5, 10),
        )
        .await
        .unwrap();
        // unit cost 2.00, not alerted
        inv.add_product(
            &NewProduct::new("B", "Beta", 500)
                .with_stock(20)
                .with_supplier_cost(200, 1)
                .with_reorder(5, 10),
        )
        .await
        .unwrap();

        let v = inv.valuation().await.unwrap();
        assert_eq!(v.retail_value.cents(), 2 * 3_000 + 20 * 500);
        assert_eq!(v.cost_value.cents(), 2 * 2_500 + 20 * 200);
        assert_eq!(v.total_units, 22);

        let alerts = inv.reorder_alerts().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].item_code, "A");

        // (10 - 2) × 25.00
        assert_eq!(inv.reorder_cost().await.unwrap().cents(), 20_000);

        // Deactivating a product does not hide it from the reorder list.
        inv.set_active("A", false).await.unwrap();
        assert_eq!(inv.reorder_alerts().await.unwrap().len(), 1);
        assert_eq!(inv.reorder_cost().await.unwrap().cents(), 20_000);
    }

    #[tokio::test]
    async fn test_update_details_keeps_stock() {
        let db = setup().await;
        let inv = db.inventory();
        let p = inv
            .add_product(&NewProduct::new("SKU1", "Widget", 500).with_stock(8))
            .await
            .unwrap();

        let mut update = ProductUpdate::from(&p);
        update.sell_price_cents = 650;
        update.reorder_threshold = 10;

        let updated = inv.update_details("SKU1", &update).await.unwrap();
        assert_eq!(updated.sell_price_cents, 650);
        assert_eq!(updated.current_stock, 8);
        assert!(updated.reorder_alert);

        let err = inv.update_details("NOPE", &update).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_search_and_deactivate() {
        let db = setup().await;
        let inv = db.inventory();
        inv.add_product(&NewProduct::new("RICE-1KG", "Rice 1kg", 5_500)).await.unwrap();
        inv.add_product(&NewProduct::new("SOAP-01", "Bath Soap", 3_500)).await.unwrap();

        assert_eq!(inv.search("rice").await.unwrap().len(), 1);
        assert_eq!(inv.search("").await.unwrap().len(), 2);

        inv.set_active("SOAP-01", false).await.unwrap();
        assert_eq!(inv.list(false).await.unwrap().len(), 1);
        assert_eq!(inv.list(true).await.unwrap().len(), 2);
        assert!(!inv.get("SOAP-01").await.unwrap().is_active);
    }
}
