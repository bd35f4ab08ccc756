//! # Sale Repository
//!
//! Sales and their lines. Both are written once, inside the commit
//! transaction, and never updated.
//!
//! ## Snapshot Pattern
//! Each line copies the selling price and supplier unit cost at the time of
//! sale, so later price edits or product deletion leave history intact.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use sari_core::{DateRange, PaymentStatus, PaymentType, Sale, SaleItem};

use crate::error::DbResult;

const SALE_COLUMNS: &str = "id, created_at, business_date, subtotal_cents, additional_charge_cents, \
     discount_cents, total_cents, payment_type, customer_name, notes, amount_paid_cents, status";

/// Row values for a sale about to be inserted.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub created_at: DateTime<Utc>,
    pub business_date: NaiveDate,
    pub subtotal_cents: i64,
    pub additional_charge_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_type: PaymentType,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub amount_paid_cents: i64,
    pub status: PaymentStatus,
}

/// Row values for a sale line.
#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub item_code: String,
    pub quantity: i64,
    pub sell_price_cents: i64,
    pub supplier_cost_cents: i64,
}

impl NewSaleItem {
    pub fn line_total_cents(&self) -> i64 {
        self.sell_price_cents * self.quantity
    }
}

/// Inserts a sale and returns its generated id.
pub async fn insert(conn: &mut SqliteConnection, sale: &NewSale) -> DbResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sales (
            created_at, business_date,
            subtotal_cents, additional_charge_cents, discount_cents, total_cents,
            payment_type, customer_name, notes, amount_paid_cents, status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        RETURNING id
        "#,
    )
    .bind(sale.created_at)
    .bind(sale.business_date)
    .bind(sale.subtotal_cents)
    .bind(sale.additional_charge_cents)
    .bind(sale.discount_cents)
    .bind(sale.total_cents)
    .bind(sale.payment_type)
    .bind(&sale.customer_name)
    .bind(&sale.notes)
    .bind(sale.amount_paid_cents)
    .bind(sale.status)
    .fetch_one(&mut *conn)
    .await?;

    debug!(sale_id = id, total_cents = sale.total_cents, "Inserted sale");
    Ok(id)
}

/// Inserts one line of a sale.
pub async fn insert_item(conn: &mut SqliteConnection, sale_id: i64, item: &NewSaleItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            sale_id, item_code, quantity,
            sell_price_cents, supplier_cost_cents, line_total_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(sale_id)
    .bind(&item.item_code)
    .bind(item.quantity)
    .bind(item.sell_price_cents)
    .bind(item.supplier_cost_cents)
    .bind(item.line_total_cents())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets a sale by id.
pub async fn get(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Sale>> {
    let sql = format!("SELECT {} FROM sales WHERE id = ?1", SALE_COLUMNS);

    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(sale)
}

/// Gets all lines of a sale in insertion order.
pub async fn items(conn: &mut SqliteConnection, sale_id: i64) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(
        r#"
        SELECT id, sale_id, item_code, quantity,
               sell_price_cents, supplier_cost_cents, line_total_cents
        FROM sale_items
        WHERE sale_id = ?1
        ORDER BY id
        "#,
    )
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Sales whose business date falls in `range`, newest first.
pub async fn list(conn: &mut SqliteConnection, range: DateRange) -> DbResult<Vec<Sale>> {
    let sql = format!(
        "SELECT {} FROM sales WHERE business_date BETWEEN ?1 AND ?2 ORDER BY id DESC",
        SALE_COLUMNS
    );

    let sales = sqlx::query_as::<_, Sale>(&sql)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&mut *conn)
        .await?;

    Ok(sales)
}

/// Total number of sales (all time).
pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}
