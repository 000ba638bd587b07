//! Per-step rounding rules.
//!
//! Every intermediate result is rounded as soon as it is produced; midpoints
//! go to the even neighbour.

use rust_decimal::{Decimal, RoundingStrategy};

const STRATEGY: RoundingStrategy = RoundingStrategy::MidpointNearestEven;

/// Monetary amounts: whole currency units.
pub fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, STRATEGY)
}

/// Exchange rates: 4 decimal places.
pub fn fx_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, STRATEGY)
}

/// Foreign-currency equivalents of local principal: 2 decimal places.
pub fn fx_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, STRATEGY)
}

/// Interest rates entered by the user: 2 decimal places.
pub fn percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, STRATEGY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_half_to_even() {
        assert_eq!(money(dec!(2.5)), dec!(2));
        assert_eq!(money(dec!(3.5)), dec!(4));
        assert_eq!(money(dec!(2465.8)), dec!(2466));
    }

    #[test]
    fn test_rate_precision() {
        assert_eq!(fx_rate(dec!(36.657534246)), dec!(36.6575));
        assert_eq!(fx_amount(dec!(3333.3333)), dec!(3333.33));
    }
}
