//! # Inventory Commands
//!
//! Catalog lookups, new products, deliveries and stock counts.

use serde::Serialize;
use tracing::debug;

use sari_core::{Money, NewProduct, NewStockIn, Product};
use sari_db::ledger::inventory::StockReceived;
use sari_db::InventoryValuation;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderResponse {
    pub alerts: Vec<Product>,
    /// Cost to bring every alerted product up to its reorder quantity.
    pub reorder_cost: Money,
}

pub async fn search_products(db: &DbState, query: &str) -> Result<Vec<Product>, ApiError> {
    debug!(query = %query, "search_products command");
    Ok(db.inner().inventory().search(query).await?)
}

pub async fn list_products(db: &DbState, include_inactive: bool) -> Result<Vec<Product>, ApiError> {
    Ok(db.inner().inventory().list(include_inactive).await?)
}

pub async fn get_product(db: &DbState, item_code: &str) -> Result<Product, ApiError> {
    Ok(db.inner().inventory().get(item_code).await?)
}

/// Adds a product with the configured default reorder threshold.
pub async fn add_product(
    db: &DbState,
    config: &ConfigState,
    item_code: &str,
    name: &str,
    price: Money,
    stock: i64,
) -> Result<Product, ApiError> {
    let mut new = NewProduct::new(item_code, name, price.cents()).with_stock(stock);
    new.reorder_threshold = config.default_reorder_threshold;

    Ok(db.inner().inventory().add_product(&new).await?)
}

pub async fn set_active(db: &DbState, item_code: &str, active: bool) -> Result<Product, ApiError> {
    let inventory = db.inner().inventory();
    inventory.set_active(item_code, active).await?;
    Ok(inventory.get(item_code).await?)
}

/// Logs a supplier delivery.
pub async fn receive_stock(
    db: &DbState,
    item_code: &str,
    quantity: i64,
    supplier_name: Option<String>,
) -> Result<StockReceived, ApiError> {
    let event = NewStockIn {
        item_code: item_code.to_string(),
        quantity,
        supplier_name,
        notes: None,
    };
    Ok(db.inner().inventory().receive_stock(&event).await?)
}

/// Replaces the stock level with a physical count.
pub async fn count_stock(db: &DbState, item_code: &str, counted: i64) -> Result<Product, ApiError> {
    let inventory = db.inner().inventory();
    inventory.set_stock(item_code, counted).await?;
    Ok(inventory.get(item_code).await?)
}

pub async fn reorder_alerts(db: &DbState) -> Result<ReorderResponse, ApiError> {
    let inventory = db.inner().inventory();
    Ok(ReorderResponse {
        alerts: inventory.reorder_alerts().await?,
        reorder_cost: inventory.reorder_cost().await?,
    })
}

pub async fn valuation(db: &DbState) -> Result<InventoryValuation, ApiError> {
    Ok(db.inner().inventory().valuation().await?)
}
