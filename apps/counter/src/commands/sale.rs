//! # Sale Commands
//!
//! Commit the session cart as a cash or credit sale, and look up past
//! sales.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use sari_core::{Money, PaymentType};
use sari_db::reports::SaleDetails;
use sari_db::{CommitRequest, SaleReceipt};

use crate::error::ApiError;
use crate::state::{CartState, ConfigState, DbState};

/// Payment details keyed in at commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tender {
    /// Cash handed over, or the down payment on a credit sale.
    pub amount: Option<Money>,
    pub customer_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub store_name: String,
    #[serde(flatten)]
    pub receipt: SaleReceipt,
    pub display_total: String,
    pub display_change: String,
}

/// Commits the session cart.
///
/// On success the cart and its adjustments are cleared. On any error the
/// cart is left as it was and nothing is written.
pub async fn commit_sale(
    db: &DbState,
    cart: &CartState,
    config: &ConfigState,
    payment_type: PaymentType,
    tender: Tender,
) -> Result<ReceiptResponse, ApiError> {
    debug!(payment_type = payment_type.as_str(), "commit_sale command");

    let mut session = cart.lock().await;

    let mut request = match payment_type {
        PaymentType::Cash => CommitRequest::cash(tender.amount.unwrap_or_else(Money::zero)),
        PaymentType::Credit => {
            let mut r = CommitRequest::credit(tender.customer_name.clone().unwrap_or_default());
            if let Some(down) = tender.amount {
                r = r.with_tendered(down);
            }
            r
        }
    }
    .with_adjustments(session.additional_charge, session.discount);

    if payment_type == PaymentType::Cash {
        request.customer_name = tender.customer_name;
    }
    if let Some(due) = tender.due_date {
        request = request.with_due_date(due);
    }
    if let Some(notes) = tender.notes {
        request = request.with_notes(notes);
    }

    let receipt = db.inner().committer().commit(&mut session.cart, request).await?;
    session.reset();

    info!(sale_id = receipt.sale_id, total = %receipt.totals.grand, "Receipt issued");

    Ok(ReceiptResponse {
        store_name: config.store_name.clone(),
        display_total: config.format_currency(receipt.totals.grand.cents()),
        display_change: config.format_currency(receipt.change.cents()),
        receipt,
    })
}

pub async fn get_sale(db: &DbState, sale_id: i64) -> Result<SaleDetails, ApiError> {
    Ok(db.inner().reports().sale_details(sale_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::error::ErrorCode;
    use sari_core::{NewProduct, PaymentStatus};
    use sari_db::{Database, DbConfig};

    async fn setup() -> (DbState, CartState, ConfigState) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.inventory()
            .add_product(&NewProduct::new("SODA", "Soda", 1_500).with_stock(10))
            .await
            .unwrap();
        (DbState::new(db), CartState::new(), ConfigState::default())
    }

    #[tokio::test]
    async fn test_cash_commit_clears_session() {
        let (db, cart, config) = setup().await;
        add_to_cart(&db, &cart, &config, "SODA", 2).await.unwrap();
        crate::commands::cart::adjust_cart(&cart, &config, None, Some(Money::from_cents(500))).await;

        let tender = Tender {
            amount: Some(Money::from_cents(3_000)),
            ..Tender::default()
        };
        let resp = commit_sale(&db, &cart, &config, PaymentType::Cash, tender).await.unwrap();

        assert_eq!(resp.display_total, "₱25.00");
        assert_eq!(resp.display_change, "₱5.00");
        assert_eq!(resp.receipt.status, PaymentStatus::Paid);

        let session = cart.lock().await;
        assert!(session.cart.is_empty());
        assert_eq!(session.discount, Money::zero());
        drop(session);

        let details = get_sale(&db, resp.receipt.sale_id).await.unwrap();
        assert_eq!(details.sale.discount_cents, 500);
        assert_eq!(db.inner().inventory().get("SODA").await.unwrap().current_stock, 8);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_cart() {
        let (db, cart, config) = setup().await;
        add_to_cart(&db, &cart, &config, "SODA", 2).await.unwrap();

        let err = commit_sale(&db, &cart, &config, PaymentType::Credit, Tender::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CustomerNameRequired);
        assert_eq!(cart.lock().await.cart.line_count(), 1);

        let tender = Tender {
            customer_name: Some("Ana".to_string()),
            amount: Some(Money::from_cents(1_000)),
            ..Tender::default()
        };
        let resp = commit_sale(&db, &cart, &config, PaymentType::Credit, tender).await.unwrap();
        assert_eq!(resp.receipt.status, PaymentStatus::PartiallyPaid);
        assert!(resp.receipt.credit_id.is_some());
    }
}
