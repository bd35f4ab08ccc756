//! # Pricing
//!
//! Suppliers sell in lots: an investment covers `volume` units. The store
//! adds a flat markup per unit and rounds the suggestion up to a whole
//! peso so the till never deals in odd centavos.
//!
//! ```text
//! investment 100.00 / volume 3 = unit cost 33.33
//! unit cost 33.33 + markup 5.00 = 38.33 → suggested 39.00
//! ```

use crate::money::Money;

/// Supplier cost of a single unit, rounded to the nearest centavo.
pub fn unit_cost(investment: Money, volume: i64) -> Money {
    investment.divide_rounded(volume)
}

/// Suggested selling price: unit cost plus markup, rounded up to a whole unit.
pub fn suggested_price(unit_cost: Money, markup: Money) -> Money {
    unit_cost.saturating_add(markup).ceil_to_major()
}

/// Gross margin of a selling price over unit cost.
pub fn margin(sell_price: Money, unit_cost: Money) -> Money {
    sell_price - unit_cost
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_cost_guards_zero_volume() {
        assert_eq!(unit_cost(Money::from_cents(1_250), 0).cents(), 1_250);
        assert_eq!(unit_cost(Money::from_cents(1_250), 5).cents(), 250);
    }

    #[test]
    fn test_suggested_price_rounds_up() {
        let cost = unit_cost(Money::from_cents(10_000), 3);
        assert_eq!(suggested_price(cost, Money::from_cents(500)).cents(), 3_900);
        assert_eq!(suggested_price(Money::from_cents(1_000), Money::zero()).cents(), 1_000);
    }

    #[test]
    fn test_margin() {
        assert_eq!(margin(Money::from_cents(3_900), Money::from_cents(3_333)).cents(), 567);
    }
}
