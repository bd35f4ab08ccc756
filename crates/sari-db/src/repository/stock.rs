//! # Stock-In Repository
//!
//! Supplier deliveries. Only the event log lives here; the stock column is
//! moved by the inventory ledger in the same transaction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

use sari_core::{DateRange, NewStockIn, UNKNOWN_ITEM_NAME};

use crate::error::DbResult;

/// A stock-in event joined with the product's current name.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StockInRecord {
    pub id: i64,
    pub item_code: String,
    /// "Unknown Item" when the product has been deleted.
    pub product_name: String,
    pub quantity: i64,
    pub supplier_name: Option<String>,
    pub notes: Option<String>,
    pub business_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Logs a stock-in event and returns its id.
pub async fn insert(
    conn: &mut SqliteConnection,
    event: &NewStockIn,
    business_date: NaiveDate,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO stock_in_events (
            item_code, quantity, supplier_name, notes, business_date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING id
        "#,
    )
    .bind(&event.item_code)
    .bind(event.quantity)
    .bind(&event.supplier_name)
    .bind(&event.notes)
    .bind(business_date)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Stock-in events in `range`, newest first.
pub async fn history(conn: &mut SqliteConnection, range: DateRange) -> DbResult<Vec<StockInRecord>> {
    let records = sqlx::query_as::<_, StockInRecord>(
        r#"
        SELECT
            s.id,
            s.item_code,
            COALESCE(p.name, ?3) AS product_name,
            s.quantity,
            s.supplier_name,
            s.notes,
            s.business_date,
            s.created_at
        FROM stock_in_events s
        LEFT JOIN products p ON p.item_code = s.item_code
        WHERE s.business_date BETWEEN ?1 AND ?2
        ORDER BY s.id DESC
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .bind(UNKNOWN_ITEM_NAME)
    .fetch_all(&mut *conn)
    .await?;

    Ok(records)
}
