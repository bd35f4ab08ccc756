//! # Product Repository
//!
//! Catalog rows. `adjust_stock` is the only statement in the crate that
//! writes `current_stock`, and it is only called from the inventory ledger.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use sari_core::{NewProduct, Product, ProductUpdate};

use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = "item_code, name, description, unit, supplier_cost_cents, volume, \
     markup_cents, sell_price_cents, current_stock, reorder_threshold, reorder_qty, \
     reorder_alert, is_active, created_at, updated_at";

/// Gets a product by its item code.
pub async fn get(conn: &mut SqliteConnection, item_code: &str) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE item_code = ?1", PRODUCT_COLUMNS);

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(item_code)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(product)
}

/// Lists products ordered by name.
pub async fn list(conn: &mut SqliteConnection, include_inactive: bool) -> DbResult<Vec<Product>> {
    let sql = format!(
        "SELECT {} FROM products WHERE is_active = 1 OR ?1 ORDER BY name, item_code",
        PRODUCT_COLUMNS
    );

    let products = sqlx::query_as::<_, Product>(&sql)
        .bind(include_inactive)
        .fetch_all(&mut *conn)
        .await?;

    Ok(products)
}

/// Substring search over item code and name (case-insensitive for ASCII).
pub async fn search(conn: &mut SqliteConnection, query: &str, limit: u32) -> DbResult<Vec<Product>> {
    debug!(query = %query, limit = %limit, "Searching products");

    let pattern = format!("%{}%", escape_like(query));
    let sql = format!(
        "SELECT {} FROM products \
         WHERE item_code LIKE ?1 ESCAPE '\\' OR name LIKE ?1 ESCAPE '\\' \
         ORDER BY is_active DESC, name \
         LIMIT ?2",
        PRODUCT_COLUMNS
    );

    let products = sqlx::query_as::<_, Product>(&sql)
        .bind(pattern)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

    Ok(products)
}

/// Inserts a new product.
///
/// ## Returns
/// * `Err(DbError::UniqueViolation)` - item code already exists
pub async fn insert(
    conn: &mut SqliteConnection,
    new: &NewProduct,
    now: DateTime<Utc>,
) -> DbResult<Product> {
    debug!(item_code = %new.item_code, "Inserting product");

    let sql = format!(
        "INSERT INTO products ({}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 1, ?13, ?13) \
         RETURNING {}",
        PRODUCT_COLUMNS, PRODUCT_COLUMNS
    );

    let result = sqlx::query_as::<_, Product>(&sql)
        .bind(&new.item_code)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.unit)
        .bind(new.supplier_cost_cents)
        .bind(new.volume)
        .bind(new.markup_cents)
        .bind(new.sell_price_cents)
        .bind(new.initial_stock)
        .bind(new.reorder_threshold)
        .bind(new.reorder_qty)
        .bind(new.initial_stock < new.reorder_threshold)
        .bind(now)
        .fetch_one(&mut *conn)
        .await;

    match result {
        Ok(product) => Ok(product),
        Err(e) => match DbError::from(e) {
            DbError::UniqueViolation { .. } => Err(DbError::duplicate("item code", &new.item_code)),
            other => Err(other),
        },
    }
}

/// Updates editable details. Stock is untouched; the alert flag is
/// recomputed because the threshold may have changed.
pub async fn update_details(
    conn: &mut SqliteConnection,
    item_code: &str,
    update: &ProductUpdate,
    now: DateTime<Utc>,
) -> DbResult<()> {
    debug!(item_code = %item_code, "Updating product");

    let result = sqlx::query(
        r#"
        UPDATE products SET
            name = ?2,
            description = ?3,
            unit = ?4,
            supplier_cost_cents = ?5,
            volume = ?6,
            markup_cents = ?7,
            sell_price_cents = ?8,
            reorder_threshold = ?9,
            reorder_qty = ?10,
            reorder_alert = (current_stock < ?9),
            updated_at = ?11
        WHERE item_code = ?1
        "#,
    )
    .bind(item_code)
    .bind(&update.name)
    .bind(&update.description)
    .bind(&update.unit)
    .bind(update.supplier_cost_cents)
    .bind(update.volume)
    .bind(update.markup_cents)
    .bind(update.sell_price_cents)
    .bind(update.reorder_threshold)
    .bind(update.reorder_qty)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", item_code));
    }

    Ok(())
}

/// Applies a stock delta and recomputes the reorder flag in one statement.
///
/// ## Returns
/// The new stock level.
///
/// ## Errors
/// * `NotFound` - unknown item code
/// * `CheckViolation` - the delta would take stock below zero
pub async fn adjust_stock(
    conn: &mut SqliteConnection,
    item_code: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    debug!(item_code = %item_code, delta = %delta, "Adjusting stock");

    let new_stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET
            current_stock = current_stock + ?2,
            reorder_alert = (current_stock + ?2 < reorder_threshold),
            updated_at = ?3
        WHERE item_code = ?1
        RETURNING current_stock
        "#,
    )
    .bind(item_code)
    .bind(delta)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    new_stock.ok_or_else(|| DbError::not_found("Product", item_code))
}

/// Activates or deactivates a product.
pub async fn set_active(
    conn: &mut SqliteConnection,
    item_code: &str,
    active: bool,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE products SET is_active = ?2, updated_at = ?3 WHERE item_code = ?1")
        .bind(item_code)
        .bind(active)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", item_code));
    }

    Ok(())
}

/// Hard-deletes a product. History rows keep the item code.
pub async fn delete(conn: &mut SqliteConnection, item_code: &str) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM products WHERE item_code = ?1")
        .bind(item_code)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", item_code));
    }

    Ok(())
}

/// Products whose persisted reorder flag is set, active or not.
pub async fn reorder_alerts(conn: &mut SqliteConnection) -> DbResult<Vec<Product>> {
    let sql = format!(
        "SELECT {} FROM products WHERE reorder_alert = 1 ORDER BY name",
        PRODUCT_COLUMNS
    );

    let products = sqlx::query_as::<_, Product>(&sql)
        .fetch_all(&mut *conn)
        .await?;

    Ok(products)
}

/// Counts products (diagnostics and the seed binary).
pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
