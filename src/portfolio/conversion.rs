use crate::core::deposit::{Deposit, Valuation};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A deposit with its principal and net interest expressed in local currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertedDeposit<'a> {
    pub deposit: &'a Deposit,
    /// Principal in local currency.
    pub amount: Decimal,
    /// Net interest in local currency.
    pub net_interest: Decimal,
}

impl<'a> ConvertedDeposit<'a> {
    /// Convert one deposit at `fx_rate`. Local deposits pass through unchanged;
    /// foreign amounts are multiplied by the rate without rounding, saturating
    /// at the edge of the `Decimal` range.
    pub fn new(deposit: &'a Deposit, fx_rate: Decimal) -> Self {
        let (amount, net_interest) = match deposit.valuation() {
            Valuation::Local(v) => (deposit.principal(), v.net_interest),
            Valuation::Foreign(v) => (
                deposit.principal().saturating_mul(fx_rate),
                v.net_interest_fx.saturating_mul(fx_rate),
            ),
        };
        Self {
            deposit,
            amount,
            net_interest,
        }
    }
}

/// Express every deposit in local currency at `fx_rate`.
pub fn to_common_currency<'a, I>(deposits: I, fx_rate: Decimal) -> Vec<ConvertedDeposit<'a>>
where
    I: IntoIterator<Item = &'a Deposit>,
{
    deposits
        .into_iter()
        .map(|d| ConvertedDeposit::new(d, fx_rate))
        .collect()
}

/// Deposits whose end date is on or after `as_of`.
pub fn filter_active<'a, I>(deposits: I, as_of: NaiveDate) -> Vec<&'a Deposit>
where
    I: IntoIterator<Item = &'a Deposit>,
{
    deposits.into_iter().filter(|d| d.is_active(as_of)).collect()
}

/// Deposits that matured before `as_of`.
pub fn filter_closed<'a, I>(deposits: I, as_of: NaiveDate) -> Vec<&'a Deposit>
where
    I: IntoIterator<Item = &'a Deposit>,
{
    deposits.into_iter().filter(|d| !d.is_active(as_of)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::deposit::DepositInput;
    use crate::valuation::engine::ValuationEngine;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Deposit> {
        let engine = ValuationEngine::default();
        let start = date(2024, 1, 1);
        vec![
            engine
                .evaluate(
                    &DepositInput::local("Akbank", dec!(100000), dec!(50), start, start + Duration::days(180)),
                    dec!(30),
                )
                .unwrap(),
            engine
                .evaluate(
                    &DepositInput::foreign("Halkbank", dec!(1000), dec!(5), start, start + Duration::days(400)),
                    dec!(30),
                )
                .unwrap(),
        ]
    }

    #[test]
    fn test_local_passes_through() {
        let deposits = sample();
        let rows = to_common_currency(&deposits, dec!(35));
        assert_eq!(rows[0].amount, dec!(100000));
        assert_eq!(rows[0].net_interest, dec!(22192));
    }

    #[test]
    fn test_foreign_uses_given_rate() {
        let deposits = sample();
        let rows = to_common_currency(&deposits, dec!(35));
        assert_eq!(rows[1].amount, dec!(35000));
        assert_eq!(rows[1].net_interest, dec!(1435));
    }

    #[test]
    fn test_extreme_rate_saturates() {
        let deposits = sample();
        let rows = to_common_currency(&deposits, Decimal::MAX);
        assert_eq!(rows[1].amount, Decimal::MAX);
        assert_eq!(rows[0].amount, dec!(100000));
    }

    #[test]
    fn test_active_boundary_inclusive() {
        let deposits = sample();
        let first_end = deposits[0].end_date();

        let active = filter_active(&deposits, first_end);
        assert_eq!(active.len(), 2);

        let active = filter_active(&deposits, first_end + Duration::days(1));
        assert_eq!(active.len(), 1);
        assert_eq!(filter_closed(&deposits, first_end + Duration::days(1)).len(), 1);
    }
}
