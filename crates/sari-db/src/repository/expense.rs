//! # Expense Repository
//!
//! Store expenses (rent, utilities, supplies). Standalone records with no
//! link to sales; reports subtract them from gross profit.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use sari_core::validation::{validate_expense_category, validate_optional_text, validate_payment_amount};
use sari_core::{CoreError, DateRange, Expense, Money, NewExpense};

use crate::error::LedgerResult;

const EXPENSE_COLUMNS: &str = "id, business_date, category, description, amount_cents, created_at";

/// Repository for expense records.
///
/// ## Usage
/// ```rust,ignore
/// let expenses = db.expenses();
/// let rent = expenses.add(&NewExpense { ... }).await?;
/// let total = expenses.total(DateRange::day(today)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense.
    ///
    /// ## Errors
    /// * `InvalidInput` - blank category or amount ≤ 0
    pub async fn add(&self, expense: &NewExpense) -> LedgerResult<Expense> {
        validate_expense(expense)?;

        let sql = format!(
            "INSERT INTO expenses (business_date, category, description, amount_cents, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {}",
            EXPENSE_COLUMNS
        );

        let created = sqlx::query_as::<_, Expense>(&sql)
            .bind(expense.business_date)
            .bind(expense.category.trim())
            .bind(&expense.description)
            .bind(expense.amount_cents)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        info!(
            expense_id = created.id,
            category = %created.category,
            amount = %created.amount(),
            "Expense recorded"
        );
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> LedgerResult<Expense> {
        let sql = format!("SELECT {} FROM expenses WHERE id = ?1", EXPENSE_COLUMNS);

        sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found("Expense", id).into())
    }

    /// Expenses in `range`, newest business date first.
    pub async fn list(&self, range: DateRange) -> LedgerResult<Vec<Expense>> {
        let sql = format!(
            "SELECT {} FROM expenses WHERE business_date BETWEEN ?1 AND ?2 \
             ORDER BY business_date DESC, id DESC",
            EXPENSE_COLUMNS
        );

        let expenses = sqlx::query_as::<_, Expense>(&sql)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = expenses.len(), "Listed expenses");
        Ok(expenses)
    }

    /// Replaces every field of an existing expense.
    pub async fn update(&self, id: i64, expense: &NewExpense) -> LedgerResult<Expense> {
        validate_expense(expense)?;

        let result = sqlx::query(
            r#"
            UPDATE expenses SET
                business_date = ?2,
                category = ?3,
                description = ?4,
                amount_cents = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(expense.business_date)
        .bind(expense.category.trim())
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Expense", id).into());
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> LedgerResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Expense", id).into());
        }

        info!(expense_id = id, "Expense deleted");
        Ok(())
    }

    /// Sum of expenses in `range`.
    pub async fn total(&self, range: DateRange) -> LedgerResult<Money> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE business_date BETWEEN ?1 AND ?2",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(total))
    }
}

fn validate_expense(expense: &NewExpense) -> LedgerResult<()> {
    validate_expense_category(&expense.category)?;
    validate_optional_text("description", expense.description.as_deref(), 500)?;
    validate_payment_amount(expense.amount_cents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sari_core::ErrorKind;

    use crate::pool::{Database, DbConfig};

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, day).unwrap()
    }

    fn expense(day: u32, category: &str, cents: i64) -> NewExpense {
        NewExpense {
            business_date: date(day),
            category: category.to_string(),
            description: None,
            amount_cents: cents,
        }
    }

    #[tokio::test]
    async fn test_add_list_total() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        repo.add(&expense(1, "Rent", 500_000)).await.unwrap();
        repo.add(&expense(2, "Electricity", 120_050)).await.unwrap();
        repo.add(&expense(10, "Supplies", 9_900)).await.unwrap();

        let range = DateRange::new(date(1), date(5)).unwrap();
        let listed = repo.list(range).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].category, "Electricity");

        assert_eq!(repo.total(range).await.unwrap().cents(), 620_050);
        assert_eq!(repo.total(DateRange::day(date(20))).await.unwrap(), Money::zero());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        let created = repo.add(&expense(1, "Rent", 500_000)).await.unwrap();
        let updated = repo.update(created.id, &expense(3, "Rent", 450_000)).await.unwrap();
        assert_eq!(updated.amount_cents, 450_000);
        assert_eq!(updated.business_date, date(3));

        repo.delete(created.id).await.unwrap();
        assert_eq!(repo.get(created.id).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(repo.delete(created.id).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_invalid() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        let err = repo.add(&expense(1, "  ", 100)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = repo.add(&expense(1, "Rent", 0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
