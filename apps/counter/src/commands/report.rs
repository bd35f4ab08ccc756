//! # Report Commands
//!
//! Read-only summaries over a range of business dates.

use sari_core::DateRange;
use sari_db::reports::{ExpenseSummary, FinancialSummary, ItemCogs};
use sari_db::repository::stock::StockInRecord;

use crate::error::ApiError;
use crate::state::DbState;

/// Revenue, COGS, expenses and net income for `range`.
pub async fn financial_summary(db: &DbState, range: DateRange) -> Result<FinancialSummary, ApiError> {
    Ok(db.inner().reports().financial_summary(range).await?)
}

pub async fn cogs_by_item(db: &DbState, range: DateRange) -> Result<Vec<ItemCogs>, ApiError> {
    Ok(db.inner().reports().cogs_by_item(range).await?)
}

pub async fn expense_summary(db: &DbState, range: DateRange) -> Result<ExpenseSummary, ApiError> {
    Ok(db.inner().reports().expense_summary(range).await?)
}

pub async fn stock_in_history(db: &DbState, range: DateRange) -> Result<Vec<StockInRecord>, ApiError> {
    Ok(db.inner().inventory().stock_in_history(range).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use sari_core::{Cart, Money, NewProduct, NewStockIn};
    use sari_db::{CommitRequest, Database, DbConfig};

    #[tokio::test]
    async fn test_day_report() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.inventory()
            .add_product(
                &NewProduct::new("OIL", "Cooking Oil", 3_000)
                    .with_stock(5)
                    .with_supplier_cost(48_000, 24),
            )
            .await
            .unwrap();
        db.inventory()
            .receive_stock(&NewStockIn {
                item_code: "OIL".into(),
                quantity: 24,
                supplier_name: None,
                notes: None,
            })
            .await
            .unwrap();

        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "OIL", 3).await.unwrap();
        db.committer()
            .commit(&mut cart, CommitRequest::cash(Money::from_cents(10_000)))
            .await
            .unwrap();

        let db = DbState::new(db);
        let today = DateRange::day(Local::now().date_naive());

        let summary = financial_summary(&db, today).await.unwrap();
        assert_eq!(summary.sales.revenue.cents(), 9_000);
        // unit cost 20.00
        assert_eq!(summary.sales.cogs.cents(), 6_000);
        assert_eq!(summary.net_income.cents(), 3_000);

        let rows = cogs_by_item(&db, today).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 3);

        let history = stock_in_history(&db, today).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].product_name, "Cooking Oil");

        assert!(expense_summary(&db, today).await.unwrap().by_category.is_empty());
    }
}
