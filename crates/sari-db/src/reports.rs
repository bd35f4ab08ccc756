//! # Reports
//!
//! Read-only aggregates over a range of business dates.
//!
//! ```text
//! revenue        = Σ sales.total
//! cogs           = Σ sale_items.quantity × supplier unit cost captured at sale
//! gross profit   = revenue − cogs
//! net income     = gross profit − Σ expenses
//! ```
//!
//! Line items whose product was deleted are reported as "Unknown Item".

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use sari_core::{CoreError, CreditEntry, DateRange, Money, Sale, SaleItem, UNKNOWN_ITEM_NAME};

use crate::error::LedgerResult;
use crate::repository::{credit, sale};

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub range: DateRange,
    pub transaction_count: i64,
    pub items_sold: i64,
    pub revenue: Money,
    pub cogs: Money,
    pub gross_profit: Money,
    pub cash_sales: Money,
    pub credit_sales: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub count: i64,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseSummary {
    pub range: DateRange,
    pub total: Money,
    /// Largest category first.
    pub by_category: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    pub sales: SalesSummary,
    pub expenses: Money,
    pub net_income: Money,
    /// Unpaid credit balances across all dates.
    pub outstanding_credit: Money,
}

/// Cost of goods sold for one item code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCogs {
    pub item_code: String,
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
    pub cogs: Money,
    pub gross_profit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleLineDetail {
    pub item: SaleItem,
    pub name: String,
}

/// A sale with its lines and, for credit sales, the credit entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleDetails {
    pub sale: Sale,
    pub lines: Vec<SaleLineDetail>,
    pub credit: Option<CreditEntry>,
}

// =============================================================================
// Reports
// =============================================================================

/// Report queries.
#[derive(Debug, Clone)]
pub struct Reports {
    pool: SqlitePool,
}

impl Reports {
    pub fn new(pool: SqlitePool) -> Self {
        Reports { pool }
    }

    pub async fn sales_summary(&self, range: DateRange) -> LedgerResult<SalesSummary> {
        let (count, revenue, cash, credit): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(total_cents), 0),
                COALESCE(SUM(CASE WHEN payment_type = 'cash' THEN total_cents ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN payment_type = 'credit' THEN total_cents ELSE 0 END), 0)
            FROM sales
            WHERE business_date BETWEEN ?1 AND ?2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        let (cogs, items_sold): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(si.quantity * si.supplier_cost_cents), 0),
                COALESCE(SUM(si.quantity), 0)
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.business_date BETWEEN ?1 AND ?2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        let revenue = Money::from_cents(revenue);
        let cogs = Money::from_cents(cogs);

        debug!(
            start = %range.start,
            end = %range.end,
            transactions = count,
            revenue = %revenue,
            "Sales summary"
        );

        Ok(SalesSummary {
            range,
            transaction_count: count,
            items_sold,
            revenue,
            cogs,
            gross_profit: revenue - cogs,
            cash_sales: Money::from_cents(cash),
            credit_sales: Money::from_cents(credit),
        })
    }

    pub async fn expense_summary(&self, range: DateRange) -> LedgerResult<ExpenseSummary> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT category, COUNT(*), SUM(amount_cents) AS total
            FROM expenses
            WHERE business_date BETWEEN ?1 AND ?2
            GROUP BY category
            ORDER BY total DESC, category
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        let by_category: Vec<CategoryTotal> = rows
            .into_iter()
            .map(|(category, count, total)| CategoryTotal {
                category,
                count,
                total: Money::from_cents(total),
            })
            .collect();

        Ok(ExpenseSummary {
            range,
            total: by_category.iter().map(|c| c.total).sum(),
            by_category,
        })
    }

    pub async fn financial_summary(&self, range: DateRange) -> LedgerResult<FinancialSummary> {
        let sales = self.sales_summary(range).await?;
        let expenses = self.expense_summary(range).await?.total;

        let outstanding: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(balance_cents), 0) FROM credit_entries WHERE status != 'paid'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(FinancialSummary {
            net_income: sales.gross_profit - expenses,
            sales,
            expenses,
            outstanding_credit: Money::from_cents(outstanding),
        })
    }

    /// COGS per item code, largest cost first.
    pub async fn cogs_by_item(&self, range: DateRange) -> LedgerResult<Vec<ItemCogs>> {
        let rows: Vec<(String, String, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                si.item_code,
                COALESCE(p.name, ?3),
                SUM(si.quantity),
                SUM(si.line_total_cents),
                SUM(si.quantity * si.supplier_cost_cents) AS cogs
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            LEFT JOIN products p ON p.item_code = si.item_code
            WHERE s.business_date BETWEEN ?1 AND ?2
            GROUP BY si.item_code
            ORDER BY cogs DESC, si.item_code
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .bind(UNKNOWN_ITEM_NAME)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(item_code, name, quantity, revenue, cogs)| {
                let revenue = Money::from_cents(revenue);
                let cogs = Money::from_cents(cogs);
                ItemCogs {
                    item_code,
                    name,
                    quantity,
                    revenue,
                    cogs,
                    gross_profit: revenue - cogs,
                }
            })
            .collect())
    }

    /// One sale with line names and its credit entry.
    pub async fn sale_details(&self, sale_id: i64) -> LedgerResult<SaleDetails> {
        let mut conn = self.pool.acquire().await?;

        let sale = sale::get(&mut conn, sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;

        let items = sale::items(&mut conn, sale_id).await?;
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let name: Option<String> = sqlx::query_scalar("SELECT name FROM products WHERE item_code = ?1")
                .bind(&item.item_code)
                .fetch_optional(&mut *conn)
                .await?;
            lines.push(SaleLineDetail {
                item,
                name: name.unwrap_or_else(|| UNKNOWN_ITEM_NAME.to_string()),
            });
        }

        let credit = credit::for_sale(&mut conn, sale_id).await?;

        Ok(SaleDetails { sale, lines, credit })
    }

    /// Sales in `range`, newest first.
    pub async fn sales(&self, range: DateRange) -> LedgerResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        Ok(sale::list(&mut conn, range).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
