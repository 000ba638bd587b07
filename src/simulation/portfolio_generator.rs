//! Random deposit portfolios for benchmarks and manual testing.

use crate::core::bank::BankId;
use crate::core::currency::CurrencyType;
use crate::core::deposit::DepositInput;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Configuration for generating a random portfolio.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    pub deposit_count: usize,
    pub banks: Vec<BankId>,
    /// Probability that a deposit is foreign, between 0 and 1.
    pub foreign_ratio: f64,
    /// Dates are generated around this day.
    pub anchor: NaiveDate,
    pub min_term_days: i64,
    pub max_term_days: i64,
    /// Principal range, in whole units of the deposit's own currency.
    pub min_principal: u64,
    pub max_principal: u64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            deposit_count: 20,
            banks: crate::core::bank::DEFAULT_BANKS.iter().map(|b| BankId::new(*b)).collect(),
            foreign_ratio: 0.3,
            anchor: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            min_term_days: 30,
            max_term_days: 730,
            min_principal: 1_000,
            max_principal: 1_000_000,
        }
    }
}

/// Generate random, valid deposit inputs.
///
/// Start dates fall up to one maximum term before the anchor, so the result
/// mixes matured and active deposits.
pub fn generate_random_portfolio(config: &PortfolioConfig) -> Vec<DepositInput> {
    let mut rng = rand::thread_rng();
    let min_term = config.min_term_days.max(1);
    let max_term = config.max_term_days.max(min_term + 1);
    let min_principal = config.min_principal.max(1);
    let max_principal = config.max_principal.max(min_principal + 1);

    (0..config.deposit_count)
        .filter_map(|_| {
            let bank = config.banks.get(rng.gen_range(0..config.banks.len().max(1)))?.clone();
            let currency = if rng.gen_bool(config.foreign_ratio.clamp(0.0, 1.0)) {
                CurrencyType::Foreign
            } else {
                CurrencyType::Local
            };
            let term = rng.gen_range(min_term..max_term);
            let start = config.anchor - Duration::days(rng.gen_range(0..max_term));
            let principal = Decimal::from(rng.gen_range(min_principal..max_principal));
            let rate = match currency {
                CurrencyType::Local => Decimal::from(rng.gen_range(3_000u32..5_500)) / dec!(100),
                CurrencyType::Foreign => Decimal::from(rng.gen_range(50u32..600)) / dec!(100),
            };
            Some(DepositInput::new(
                currency,
                bank,
                principal,
                rate,
                start,
                start + Duration::days(term),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::Settings;
    use crate::session::store::Session;

    #[test]
    fn test_generated_inputs_are_accepted() {
        let config = PortfolioConfig {
            deposit_count: 50,
            ..Default::default()
        };
        let inputs = generate_random_portfolio(&config);
        assert_eq!(inputs.len(), 50);

        let mut session = Session::new(Settings::default(), dec!(32.5));
        let rejected = session.add_all(&inputs);
        assert!(rejected.is_empty(), "unexpected rejections: {:?}", rejected);
    }

    #[test]
    fn test_degenerate_ranges_still_generate() {
        let config = PortfolioConfig {
            deposit_count: 10,
            min_term_days: 0,
            max_term_days: 1,
            min_principal: 0,
            max_principal: 1,
            ..Default::default()
        };
        let inputs = generate_random_portfolio(&config);
        assert_eq!(inputs.len(), 10);
        for input in &inputs {
            assert_eq!(input.principal, Decimal::ONE);
            assert_eq!((input.end_date - input.start_date).num_days(), 1);
        }
    }

    #[test]
    fn test_no_banks_yields_nothing() {
        let config = PortfolioConfig {
            banks: Vec::new(),
            ..Default::default()
        };
        assert!(generate_random_portfolio(&config).is_empty());
    }
}
