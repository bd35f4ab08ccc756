//! # Credit Commands
//!
//! Outstanding balances ("utang") and payments against them.

use serde::Serialize;
use tracing::debug;

use sari_core::{CreditEntry, CreditPayment, Money};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutstandingResponse {
    pub entries: Vec<CreditEntry>,
    pub total_balance: Money,
    pub display_total: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditDetail {
    pub entry: CreditEntry,
    pub payments: Vec<CreditPayment>,
}

/// Records a payment against a credit entry.
pub async fn pay_credit(db: &DbState, credit_id: i64, amount: Money) -> Result<CreditEntry, ApiError> {
    debug!(credit_id, amount = %amount, "pay_credit command");
    Ok(db.inner().credits().apply_payment(credit_id, amount).await?)
}

/// Lists unpaid and partially paid entries, optionally for one customer.
pub async fn list_outstanding(
    db: &DbState,
    config: &ConfigState,
    customer: Option<&str>,
) -> Result<OutstandingResponse, ApiError> {
    let entries = db.inner().credits().list_outstanding(customer).await?;
    let total_balance: Money = entries.iter().map(CreditEntry::balance).sum();

    Ok(OutstandingResponse {
        display_total: config.format_currency(total_balance.cents()),
        total_balance,
        entries,
    })
}

pub async fn get_credit(db: &DbState, credit_id: i64) -> Result<CreditDetail, ApiError> {
    let credits = db.inner().credits();
    Ok(CreditDetail {
        entry: credits.get(credit_id).await?,
        payments: credits.payments(credit_id).await?,
    })
}

pub async fn delete_credit(db: &DbState, credit_id: i64) -> Result<(), ApiError> {
    Ok(db.inner().credits().delete(credit_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use sari_core::{Cart, NewProduct, PaymentStatus};
    use sari_db::{CommitRequest, Database, DbConfig};

    async fn credit_sale(db: &Database, customer: &str, qty: i64) -> i64 {
        let mut cart = Cart::new();
        db.checkout().add(&mut cart, "NOODLES", qty).await.unwrap();
        db.committer()
            .commit(&mut cart, CommitRequest::credit(customer))
            .await
            .unwrap()
            .credit_id
            .unwrap()
    }

    #[tokio::test]
    async fn test_pay_until_settled() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.inventory()
            .add_product(&NewProduct::new("NOODLES", "Noodles", 1_500).with_stock(20))
            .await
            .unwrap();
        let credit_id = credit_sale(&db, "Ana", 2).await;
        credit_sale(&db, "Ben", 1).await;

        let db = DbState::new(db);
        let config = ConfigState::default();

        let resp = list_outstanding(&db, &config, None).await.unwrap();
        assert_eq!(resp.entries.len(), 2);
        assert_eq!(resp.display_total, "₱45.00");

        let entry = pay_credit(&db, credit_id, Money::from_cents(1_000)).await.unwrap();
        assert_eq!(entry.status, PaymentStatus::PartiallyPaid);

        let entry = pay_credit(&db, credit_id, Money::from_cents(5_000)).await.unwrap();
        assert_eq!(entry.status, PaymentStatus::Paid);
        assert_eq!(entry.balance_cents, 0);

        let err = pay_credit(&db, credit_id, Money::from_cents(100)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyPaid);

        let detail = get_credit(&db, credit_id).await.unwrap();
        assert_eq!(detail.payments.len(), 2);

        let resp = list_outstanding(&db, &config, Some("Ana")).await.unwrap();
        assert!(resp.entries.is_empty());
    }
}
