//! # Credit Ledger
//!
//! Running balances for credit sales and the payment trail behind them.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_payment(credit_id, amount)                                       │
//! │       │                                                                 │
//! │       ├── amount ≤ 0 ──────────────────────────► InvalidInput          │
//! │       │                                                                 │
//! │       ▼  BEGIN                                                          │
//! │  load entry ── missing ──────────────────────► NotFound   (rollback)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  credit::settle(entry, amount) ── Paid ──────► AlreadyPaid (rollback)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE paid / balance / status                                         │
//! │  INSERT credit_payments                                                 │
//! │       │                                                                 │
//! │       ▼  COMMIT                                                         │
//! │  updated CreditEntry                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use sari_core::credit::{balance_after, settle, status_for};
use sari_core::validation::{require_customer_name, validate_payment_amount, validate_price_cents};
use sari_core::{CoreError, CreditEntry, CreditPayment, Money};

use crate::error::{DbError, LedgerResult};
use crate::pool::begin_write;
use crate::repository::credit::{self, NewCredit};
use crate::repository::sale;

/// Ledger of credit entries.
#[derive(Debug, Clone)]
pub struct CreditLedger {
    pool: SqlitePool,
}

impl CreditLedger {
    pub fn new(pool: SqlitePool) -> Self {
        CreditLedger { pool }
    }

    /// Opens the credit entry for a sale on the given connection.
    ///
    /// Used by the sale committer inside its transaction and by [`open`].
    ///
    /// ## Errors
    /// * `NotFound` - the sale does not exist
    /// * `DuplicateCredit` - the sale already has an entry
    /// * `CustomerNameRequired` - blank customer name
    ///
    /// [`open`]: CreditLedger::open
    pub async fn open_in(
        conn: &mut SqliteConnection,
        sale_id: i64,
        customer_name: Option<&str>,
        original: Money,
        initial_paid: Money,
        due_date: Option<NaiveDate>,
    ) -> LedgerResult<CreditEntry> {
        validate_price_cents("credit amount", original.cents())?;
        validate_price_cents("initial payment", initial_paid.cents())?;

        if sale::get(conn, sale_id).await?.is_none() {
            return Err(CoreError::not_found("Sale", sale_id).into());
        }
        if credit::for_sale(conn, sale_id).await?.is_some() {
            return Err(CoreError::DuplicateCredit { sale_id }.into());
        }
        let customer_name = require_customer_name(customer_name)?;

        let new = NewCredit {
            sale_id,
            customer_name,
            original_cents: original.cents(),
            paid_cents: initial_paid.cents(),
            balance_cents: balance_after(original, initial_paid).cents(),
            status: status_for(original, initial_paid),
            due_date,
        };

        match credit::insert(conn, &new, Utc::now()).await {
            Ok(entry) => Ok(entry),
            // Lost a race with another session opening the same sale
            Err(DbError::UniqueViolation { .. }) => Err(CoreError::DuplicateCredit { sale_id }.into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Opens a credit entry for an existing sale.
    pub async fn open(
        &self,
        sale_id: i64,
        customer_name: &str,
        original: Money,
        initial_paid: Money,
        due_date: Option<NaiveDate>,
    ) -> LedgerResult<CreditEntry> {
        let mut tx = begin_write(&self.pool).await?;
        let entry = Self::open_in(&mut tx, sale_id, Some(customer_name), original, initial_paid, due_date).await?;
        tx.commit().await?;

        info!(
            credit_id = entry.id,
            sale_id,
            customer = %entry.customer_name,
            balance = %entry.balance(),
            "Credit entry opened"
        );
        Ok(entry)
    }

    /// Records a payment against a credit entry.
    ///
    /// Overpayment is accepted: `paid` records the full sum and the balance
    /// floors at zero.
    ///
    /// ## Errors
    /// * `InvalidInput` - amount ≤ 0
    /// * `NotFound` - unknown credit id
    /// * `AlreadyPaid` - the entry is settled
    pub async fn apply_payment(&self, credit_id: i64, amount: Money) -> LedgerResult<CreditEntry> {
        validate_payment_amount(amount.cents())?;

        let mut tx = begin_write(&self.pool).await?;

        let entry = credit::get(&mut tx, credit_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Credit entry", credit_id))?;

        let settlement = match settle(&entry, amount) {
            Ok(s) => s,
            Err(e) => {
                warn!(credit_id, amount = %amount, error = %e, "Payment rejected");
                return Err(e.into());
            }
        };

        let now = Utc::now();
        credit::update_settlement(&mut tx, credit_id, &settlement, now).await?;
        credit::insert_payment(&mut tx, credit_id, amount.cents(), now).await?;

        let updated = credit::get(&mut tx, credit_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Credit entry", credit_id))?;

        tx.commit().await?;

        info!(
            credit_id,
            amount = %amount,
            balance = %updated.balance(),
            status = updated.status.label(),
            "Credit payment applied"
        );
        Ok(updated)
    }

    /// Unpaid and partially paid entries, by customer then due date.
    pub async fn list_outstanding(&self, customer: Option<&str>) -> LedgerResult<Vec<CreditEntry>> {
        let customer = customer.map(str::trim).filter(|c| !c.is_empty());

        let mut conn = self.pool.acquire().await?;
        let entries = credit::list_outstanding(&mut conn, customer).await?;

        debug!(count = entries.len(), "Listed outstanding credit");
        Ok(entries)
    }

    pub async fn get(&self, credit_id: i64) -> LedgerResult<CreditEntry> {
        let mut conn = self.pool.acquire().await?;
        credit::get(&mut conn, credit_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Credit entry", credit_id).into())
    }

    /// The credit entry of a sale, if it was a credit sale.
    pub async fn for_sale(&self, sale_id: i64) -> LedgerResult<Option<CreditEntry>> {
        let mut conn = self.pool.acquire().await?;
        Ok(credit::for_sale(&mut conn, sale_id).await?)
    }

    /// The payment trail of an entry, oldest first.
    pub async fn payments(&self, credit_id: i64) -> LedgerResult<Vec<CreditPayment>> {
        let mut conn = self.pool.acquire().await?;
        if credit::get(&mut conn, credit_id).await?.is_none() {
            return Err(CoreError::not_found("Credit entry", credit_id).into());
        }
        Ok(credit::payments(&mut conn, credit_id).await?)
    }

    /// Removes an entry and its payment trail. The sale itself is kept.
    pub async fn delete(&self, credit_id: i64) -> LedgerResult<()> {
        let mut tx = begin_write(&self.pool).await?;
        match credit::delete(&mut tx, credit_id).await {
            Ok(()) => {}
            Err(DbError::NotFound { .. }) => {
                return Err(CoreError::not_found("Credit entry", credit_id).into())
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;

        warn!(credit_id, "Credit entry deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use chrono::Local;
    use sari_core::{ErrorKind, PaymentStatus, PaymentType};

    use crate::pool::{Database, DbConfig};
    use crate::repository::sale::NewSale;

    use super::*;

    async fn setup_with_sale(total_cents: i64) -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let sale_id = sale::insert(
            &mut conn,
            &NewSale {
                created_at: Utc::now(),
                business_date: Local::now().date_naive(),
                subtotal_cents: total_cents,
                additional_charge_cents: 0,
                discount_cents: 0,
                total_cents,
                payment_type: PaymentType::Credit,
                customer_name: Some("Ana".to_string()),
                notes: None,
                amount_paid_cents: 0,
                status: PaymentStatus::Unpaid,
            },
        )
        .await
        .unwrap();
        drop(conn);

        (db, sale_id)
    }

    #[tokio::test]
    async fn test_payment_sequence() {
        let (db, sale_id) = setup_with_sale(10_000).await;
        let credits = db.credits();

        let entry = credits
            .open(sale_id, "Ana", Money::from_cents(10_000), Money::zero(), None)
            .await
            .unwrap();
        assert_eq!(entry.balance_cents, 10_000);
        assert_eq!(entry.status, PaymentStatus::Unpaid);

        let entry = credits.apply_payment(entry.id, Money::from_cents(4_000)).await.unwrap();
        assert_eq!(entry.paid_cents, 4_000);
        assert_eq!(entry.balance_cents, 6_000);
        assert_eq!(entry.status, PaymentStatus::PartiallyPaid);

        let entry = credits.apply_payment(entry.id, Money::from_cents(6_000)).await.unwrap();
        assert_eq!(entry.paid_cents, 10_000);
        assert_eq!(entry.balance_cents, 0);
        assert_eq!(entry.status, PaymentStatus::Paid);

        let err = credits
            .apply_payment(entry.id, Money::from_cents(1_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyPaid);

        let trail = credits.payments(entry.id).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail.iter().map(|p| p.amount_cents).sum::<i64>(), 10_000);
    }

    #[tokio::test]
    async fn test_overpayment_clamps_balance() {
        let (db, sale_id) = setup_with_sale(10_000).await;
        let credits = db.credits();
        let entry = credits
            .open(sale_id, "Ana", Money::from_cents(10_000), Money::zero(), None)
            .await
            .unwrap();

        let entry = credits.apply_payment(entry.id, Money::from_cents(15_000)).await.unwrap();
        assert_eq!(entry.paid_cents, 15_000);
        assert_eq!(entry.balance_cents, 0);
        assert_eq!(entry.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_payment_rejections_leave_no_trail() {
        let (db, sale_id) = setup_with_sale(10_000).await;
        let credits = db.credits();
        let entry = credits
            .open(sale_id, "Ana", Money::from_cents(10_000), Money::zero(), None)
            .await
            .unwrap();

        let err = credits.apply_payment(entry.id, Money::zero()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = credits.apply_payment(999, Money::from_cents(100)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert!(credits.payments(entry.id).await.unwrap().is_empty());
        assert_eq!(credits.get(entry.id).await.unwrap().paid_cents, 0);
    }

    #[tokio::test]
    async fn test_open_rules() {
        let (db, sale_id) = setup_with_sale(5_000).await;
        let credits = db.credits();

        let err = credits
            .open(sale_id, "   ", Money::from_cents(5_000), Money::zero(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CustomerNameRequired);

        let err = credits
            .open(4242, "Ana", Money::from_cents(5_000), Money::zero(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        credits
            .open(sale_id, "Ana", Money::from_cents(5_000), Money::from_cents(1_000), None)
            .await
            .unwrap();
        let err = credits
            .open(sale_id, "Ana", Money::from_cents(5_000), Money::zero(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateCredit);

        let entry = credits.for_sale(sale_id).await.unwrap().unwrap();
        assert_eq!(entry.status, PaymentStatus::PartiallyPaid);
        assert_eq!(entry.balance_cents, 4_000);
    }

    #[tokio::test]
    async fn test_list_outstanding_order_and_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let credits = db.credits();

        let mut sale_ids = Vec::new();
        for _ in 0..4 {
            let mut conn = db.pool().acquire().await.unwrap();
            let id = sale::insert(
                &mut conn,
                &NewSale {
                    created_at: Utc::now(),
                    business_date: Local::now().date_naive(),
                    subtotal_cents: 1_000,
                    additional_charge_cents: 0,
                    discount_cents: 0,
                    total_cents: 1_000,
                    payment_type: PaymentType::Credit,
                    customer_name: None,
                    notes: None,
                    amount_paid_cents: 0,
                    status: PaymentStatus::Unpaid,
                },
            )
            .await
            .unwrap();
            sale_ids.push(id);
        }

        let d = |day| NaiveDate::from_ymd_opt(2026, 6, day);
        let amount = Money::from_cents(1_000);
        credits.open(sale_ids[0], "Ben", amount, Money::zero(), d(20)).await.unwrap();
        credits.open(sale_ids[1], "Ana", amount, Money::zero(), d(15)).await.unwrap();
        credits.open(sale_ids[2], "Ana", amount, Money::zero(), d(1)).await.unwrap();
        let paid = credits.open(sale_ids[3], "Ana", amount, Money::zero(), d(2)).await.unwrap();
        credits.apply_payment(paid.id, amount).await.unwrap();

        let all = credits.list_outstanding(None).await.unwrap();
        let order: Vec<(&str, Option<NaiveDate>)> = all
            .iter()
            .map(|e| (e.customer_name.as_str(), e.due_date))
            .collect();
        assert_eq!(order, vec![("Ana", d(1)), ("Ana", d(15)), ("Ben", d(20))]);

        let ben = credits.list_outstanding(Some("Ben")).await.unwrap();
        assert_eq!(ben.len(), 1);
        assert!(credits.list_outstanding(Some("ana")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_trail() {
        let (db, sale_id) = setup_with_sale(10_000).await;
        let credits = db.credits();
        let entry = credits
            .open(sale_id, "Ana", Money::from_cents(10_000), Money::zero(), None)
            .await
            .unwrap();
        credits.apply_payment(entry.id, Money::from_cents(100)).await.unwrap();

        credits.delete(entry.id).await.unwrap();
        assert_eq!(credits.get(entry.id).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(credits.delete(entry.id).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert!(credits.for_sale(sale_id).await.unwrap().is_none());
    }
}
