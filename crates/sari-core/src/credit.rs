//! # Credit Rules
//!
//! Balance and status of a credit entry are pure functions of the original
//! amount and the cumulative amount paid. The ledger stores all three
//! columns, but always writes them from these functions.
//!
//! ## Status Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   paid == 0, balance > 0          0 < paid, balance > 0                │
//! │   ┌──────────┐   payment      ┌────────────────┐   payment   ┌──────┐  │
//! │   │  Unpaid  │ ─────────────► │ Partially Paid │ ──────────► │ Paid │  │
//! │   └──────────┘                └────────────────┘             └──┬───┘  │
//! │        │                 payment ≥ balance                     │      │
//! │        └───────────────────────────────────────────────────────┘      │
//! │                                                                         │
//! │   Paid is terminal: further payments fail with AlreadyPaid.            │
//! │   Overpayment is accepted; balance floors at zero.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CreditEntry, PaymentStatus};
use crate::validation::validate_payment_amount;
use crate::MAX_AMOUNT_CENTS;

/// Remaining balance: `max(0, original - paid)`.
#[inline]
pub fn balance_after(original: Money, paid: Money) -> Money {
    (original - paid).clamp_non_negative()
}

/// Status derived from the original amount and what has been paid.
///
/// ## Example
/// ```rust
/// use sari_core::credit::status_for;
/// use sari_core::{Money, PaymentStatus};
///
/// let original = Money::from_cents(10_000);
/// assert_eq!(status_for(original, Money::zero()), PaymentStatus::Unpaid);
/// assert_eq!(status_for(original, Money::from_cents(15_000)), PaymentStatus::Paid);
/// ```
pub fn status_for(original: Money, paid: Money) -> PaymentStatus {
    if balance_after(original, paid).is_zero() {
        PaymentStatus::Paid
    } else if paid.is_positive() {
        PaymentStatus::PartiallyPaid
    } else {
        PaymentStatus::Unpaid
    }
}

/// Result of applying a payment to a credit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub paid: Money,
    pub balance: Money,
    pub status: PaymentStatus,
}

/// Computes the new paid/balance/status for `amount` against `entry`.
///
/// ## Errors
/// - `InvalidInput` when `amount <= 0` or above `MAX_AMOUNT_CENTS`
/// - `AlreadyPaid` when the entry is settled
pub fn settle(entry: &CreditEntry, amount: Money) -> CoreResult<Settlement> {
    validate_payment_amount(amount.cents())?;

    if entry.status == PaymentStatus::Paid {
        return Err(CoreError::AlreadyPaid {
            credit_id: entry.id,
        });
    }

    let paid = entry
        .paid()
        .checked_add(amount)
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        })?;
    Ok(Settlement {
        paid,
        balance: balance_after(entry.original(), paid),
        status: status_for(entry.original(), paid),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(original: i64, paid: i64) -> CreditEntry {
        let now = Utc::now();
        let original_m = Money::from_cents(original);
        let paid_m = Money::from_cents(paid);
        CreditEntry {
            id: 7,
            sale_id: 1,
            customer_name: "Ana".to_string(),
            original_cents: original,
            paid_cents: paid,
            balance_cents: balance_after(original_m, paid_m).cents(),
            status: status_for(original_m, paid_m),
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_for() {
        let original = Money::from_cents(10_000);
        assert_eq!(status_for(original, Money::zero()), PaymentStatus::Unpaid);
        assert_eq!(
            status_for(original, Money::from_cents(4_000)),
            PaymentStatus::PartiallyPaid
        );
        assert_eq!(status_for(original, original), PaymentStatus::Paid);
        assert_eq!(status_for(Money::zero(), Money::zero()), PaymentStatus::Paid);
    }

    #[test]
    fn test_settle_sequence() {
        let e = entry(10_000, 0);
        let s = settle(&e, Money::from_cents(4_000)).unwrap();
        assert_eq!(s.paid.cents(), 4_000);
        assert_eq!(s.balance.cents(), 6_000);
        assert_eq!(s.status, PaymentStatus::PartiallyPaid);

        let e = entry(10_000, 4_000);
        let s = settle(&e, Money::from_cents(6_000)).unwrap();
        assert_eq!(s.balance, Money::zero());
        assert_eq!(s.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_overpayment_clamps_balance() {
        let s = settle(&entry(10_000, 0), Money::from_cents(15_000)).unwrap();
        assert_eq!(s.paid.cents(), 15_000);
        assert_eq!(s.balance, Money::zero());
        assert_eq!(s.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_settle_rejections() {
        let err = settle(&entry(10_000, 10_000), Money::from_cents(1_000)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyPaid { credit_id: 7 }));

        let err = settle(&entry(10_000, 0), Money::zero()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = settle(&entry(10_000, 0), Money::from_cents(-5)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_huge_payment_is_rejected_not_overflowed() {
        let err = settle(&entry(10_000, 50), Money::from_cents(i64::MAX)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));

        let err = settle(&entry(i64::MAX, i64::MAX - 10), Money::from_cents(1_000)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_balance_reconciles_over_many_payments() {
        let original = Money::from_cents(9_999);
        let mut e = entry(original.cents(), 0);
        for amount in [1, 250, 3_000, 17, 6_000, 800] {
            match settle(&e, Money::from_cents(amount)) {
                Ok(s) => {
                    assert_eq!(s.balance, balance_after(original, s.paid));
                    e.paid_cents = s.paid.cents();
                    e.balance_cents = s.balance.cents();
                    e.status = s.status;
                }
                Err(err) => {
                    assert_eq!(e.status, PaymentStatus::Paid);
                    assert!(matches!(err, CoreError::AlreadyPaid { .. }));
                }
            }
        }
        assert_eq!(e.status, PaymentStatus::Paid);
    }
}
