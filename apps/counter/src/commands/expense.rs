//! # Expense Commands

use chrono::{Local, NaiveDate};
use serde::Serialize;

use sari_core::{DateRange, Expense, Money, NewExpense};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
    pub total: Money,
    pub display_total: String,
}

/// Records an expense. `business_date` defaults to today.
pub async fn add_expense(
    db: &DbState,
    category: &str,
    amount: Money,
    description: Option<String>,
    business_date: Option<NaiveDate>,
) -> Result<Expense, ApiError> {
    let expense = NewExpense {
        business_date: business_date.unwrap_or_else(|| Local::now().date_naive()),
        category: category.to_string(),
        description,
        amount_cents: amount.cents(),
    };
    Ok(db.inner().expenses().add(&expense).await?)
}

pub async fn list_expenses(
    db: &DbState,
    config: &ConfigState,
    range: DateRange,
) -> Result<ExpenseListResponse, ApiError> {
    let repo = db.inner().expenses();
    let expenses = repo.list(range).await?;
    let total = repo.total(range).await?;

    Ok(ExpenseListResponse {
        display_total: config.format_currency(total.cents()),
        expenses,
        total,
    })
}

/// Changes the amount of an expense, keeping its other fields.
pub async fn update_expense_amount(db: &DbState, id: i64, amount: Money) -> Result<Expense, ApiError> {
    let repo = db.inner().expenses();
    let current = repo.get(id).await?;

    let updated = NewExpense {
        business_date: current.business_date,
        category: current.category,
        description: current.description,
        amount_cents: amount.cents(),
    };
    Ok(repo.update(id, &updated).await?)
}

pub async fn delete_expense(db: &DbState, id: i64) -> Result<(), ApiError> {
    Ok(db.inner().expenses().delete(id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use sari_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_expense_flow() {
        let db = DbState::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let config = ConfigState::default();
        let today = DateRange::day(Local::now().date_naive());

        let e = add_expense(&db, "Electricity", Money::from_cents(150_000), None, None)
            .await
            .unwrap();
        add_expense(&db, "Rent", Money::from_cents(300_000), Some("October".into()), None)
            .await
            .unwrap();

        let resp = list_expenses(&db, &config, today).await.unwrap();
        assert_eq!(resp.expenses.len(), 2);
        assert_eq!(resp.display_total, "₱4,500.00");

        let e = update_expense_amount(&db, e.id, Money::from_cents(120_000)).await.unwrap();
        assert_eq!(e.amount_cents, 120_000);
        assert_eq!(e.category, "Electricity");

        delete_expense(&db, e.id).await.unwrap();
        let err = delete_expense(&db, e.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = add_expense(&db, "Rent", Money::zero(), None, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
