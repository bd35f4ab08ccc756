//! # Credit Repository
//!
//! Credit entries and their append-only payment trail.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use sari_core::credit::Settlement;
use sari_core::{CreditEntry, CreditPayment, PaymentStatus};

use crate::error::{DbError, DbResult};

const CREDIT_COLUMNS: &str = "id, sale_id, customer_name, original_cents, paid_cents, balance_cents, \
     status, due_date, created_at, updated_at";

/// Row values for a new credit entry.
#[derive(Debug, Clone)]
pub struct NewCredit {
    pub sale_id: i64,
    pub customer_name: String,
    pub original_cents: i64,
    pub paid_cents: i64,
    pub balance_cents: i64,
    pub status: PaymentStatus,
    pub due_date: Option<NaiveDate>,
}

/// Inserts a credit entry.
///
/// ## Returns
/// * `Err(DbError::UniqueViolation)` - the sale already has an entry
pub async fn insert(conn: &mut SqliteConnection, new: &NewCredit, now: DateTime<Utc>) -> DbResult<CreditEntry> {
    let sql = format!(
        "INSERT INTO credit_entries ( \
            sale_id, customer_name, original_cents, paid_cents, balance_cents, \
            status, due_date, created_at, updated_at \
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) \
         RETURNING {}",
        CREDIT_COLUMNS
    );

    let entry = sqlx::query_as::<_, CreditEntry>(&sql)
        .bind(new.sale_id)
        .bind(&new.customer_name)
        .bind(new.original_cents)
        .bind(new.paid_cents)
        .bind(new.balance_cents)
        .bind(new.status)
        .bind(new.due_date)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

    debug!(credit_id = entry.id, sale_id = entry.sale_id, "Inserted credit entry");
    Ok(entry)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<CreditEntry>> {
    let sql = format!("SELECT {} FROM credit_entries WHERE id = ?1", CREDIT_COLUMNS);

    let entry = sqlx::query_as::<_, CreditEntry>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(entry)
}

pub async fn for_sale(conn: &mut SqliteConnection, sale_id: i64) -> DbResult<Option<CreditEntry>> {
    let sql = format!("SELECT {} FROM credit_entries WHERE sale_id = ?1", CREDIT_COLUMNS);

    let entry = sqlx::query_as::<_, CreditEntry>(&sql)
        .bind(sale_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(entry)
}

/// Writes a settlement computed by `sari_core::credit::settle`.
pub async fn update_settlement(
    conn: &mut SqliteConnection,
    id: i64,
    settlement: &Settlement,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE credit_entries SET
            paid_cents = ?2,
            balance_cents = ?3,
            status = ?4,
            updated_at = ?5
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(settlement.paid.cents())
    .bind(settlement.balance.cents())
    .bind(settlement.status)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Credit entry", id));
    }

    Ok(())
}

/// Appends a payment to the trail.
pub async fn insert_payment(
    conn: &mut SqliteConnection,
    credit_id: i64,
    amount_cents: i64,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO credit_payments (credit_id, amount_cents, paid_at) VALUES (?1, ?2, ?3) RETURNING id",
    )
    .bind(credit_id)
    .bind(amount_cents)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

pub async fn payments(conn: &mut SqliteConnection, credit_id: i64) -> DbResult<Vec<CreditPayment>> {
    let payments = sqlx::query_as::<_, CreditPayment>(
        "SELECT id, credit_id, amount_cents, paid_at FROM credit_payments WHERE credit_id = ?1 ORDER BY id",
    )
    .bind(credit_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(payments)
}

/// Entries not yet paid, ordered by customer then due date.
///
/// Entries without a due date sort last within a customer.
pub async fn list_outstanding(conn: &mut SqliteConnection, customer: Option<&str>) -> DbResult<Vec<CreditEntry>> {
    let sql = format!(
        "SELECT {} FROM credit_entries \
         WHERE status != 'paid' AND (?1 IS NULL OR customer_name = ?1) \
         ORDER BY customer_name, due_date IS NULL, due_date, id",
        CREDIT_COLUMNS
    );

    let entries = sqlx::query_as::<_, CreditEntry>(&sql)
        .bind(customer)
        .fetch_all(&mut *conn)
        .await?;

    Ok(entries)
}

/// Deletes an entry together with its payment trail.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> DbResult<()> {
    sqlx::query("DELETE FROM credit_payments WHERE credit_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM credit_entries WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Credit entry", id));
    }

    Ok(())
}

pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credit_entries")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}
