//! Point-in-time exchange-rate lookup.
//!
//! Providers answer a single question: what is the local/foreign rate right
//! now. A failed lookup is not fatal; callers degrade to the zero sentinel
//! through [`current_rate_or_sentinel`].

use crate::valuation::engine::MAX_FX_RATE;
use crate::valuation::rounding;
use log::warn;
use rust_decimal::Decimal;
use std::env;
use thiserror::Error;

/// Environment variable read by [`EnvRateProvider`].
pub const FX_RATE_ENV: &str = "DEPOSIT_FX_RATE";

/// Rate used in place of a failed lookup.
pub const SENTINEL_RATE: Decimal = Decimal::ZERO;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("no exchange rate available: {0}")]
    Unavailable(String),
    #[error("could not parse exchange rate '{value}': {reason}")]
    Parse { value: String, reason: String },
    #[error("exchange rate must not be negative, got {0}")]
    Negative(Decimal),
}

/// Source of the current local/foreign exchange rate.
pub trait RateProvider {
    /// Short name for log messages.
    fn name(&self) -> &str;

    fn current_rate(&self) -> Result<Decimal, RateError>;
}

/// Fetch from `provider`, falling back to [`SENTINEL_RATE`] with a warning.
///
/// Successful rates are rounded to 4 decimal places. Negative rates and
/// rates above [`MAX_FX_RATE`] count as failures.
pub fn current_rate_or_sentinel(provider: &dyn RateProvider) -> Decimal {
    match provider.current_rate() {
        Ok(rate) if rate < Decimal::ZERO => {
            warn!("{} returned a negative rate {}; using sentinel", provider.name(), rate);
            SENTINEL_RATE
        }
        Ok(rate) if rate > MAX_FX_RATE => {
            warn!("{} returned an out-of-range rate {}; using sentinel", provider.name(), rate);
            SENTINEL_RATE
        }
        Ok(rate) => rounding::fx_rate(rate),
        Err(e) => {
            warn!("exchange rate lookup via {} failed: {}; cross-currency figures will be zero", provider.name(), e);
            SENTINEL_RATE
        }
    }
}

pub fn parse_rate(value: &str) -> Result<Decimal, RateError> {
    let rate: Decimal = value.trim().parse().map_err(|e: rust_decimal::Error| RateError::Parse {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if rate < Decimal::ZERO {
        return Err(RateError::Negative(rate));
    }
    Ok(rate)
}

/// A rate fixed at construction, e.g. from a command-line flag.
#[derive(Debug, Clone, Copy)]
pub struct FixedRateProvider {
    rate: Decimal,
}

impl FixedRateProvider {
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }
}

impl RateProvider for FixedRateProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    fn current_rate(&self) -> Result<Decimal, RateError> {
        Ok(self.rate)
    }
}

/// Reads the rate from an environment variable on every lookup.
#[derive(Debug, Clone)]
pub struct EnvRateProvider {
    var: String,
}

impl EnvRateProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvRateProvider {
    fn default() -> Self {
        Self::new(FX_RATE_ENV)
    }
}

impl RateProvider for EnvRateProvider {
    fn name(&self) -> &str {
        &self.var
    }

    fn current_rate(&self) -> Result<Decimal, RateError> {
        let value = env::var(&self.var)
            .map_err(|e| RateError::Unavailable(format!("{}: {}", self.var, e)))?;
        parse_rate(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct FailingProvider;

    impl RateProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn current_rate(&self) -> Result<Decimal, RateError> {
            Err(RateError::Unavailable("market closed".into()))
        }
    }

    #[test]
    fn test_fixed_rate_rounded() {
        let provider = FixedRateProvider::new(dec!(32.123456));
        assert_eq!(current_rate_or_sentinel(&provider), dec!(32.1235));
    }

    #[test]
    fn test_failure_yields_sentinel() {
        assert_eq!(current_rate_or_sentinel(&FailingProvider), SENTINEL_RATE);
    }

    #[test]
    fn test_negative_yields_sentinel() {
        let provider = FixedRateProvider::new(dec!(-1));
        assert_eq!(current_rate_or_sentinel(&provider), SENTINEL_RATE);
    }

    #[test]
    fn test_oversized_yields_sentinel() {
        let provider = FixedRateProvider::new(MAX_FX_RATE * dec!(10));
        assert_eq!(current_rate_or_sentinel(&provider), SENTINEL_RATE);
        let provider = FixedRateProvider::new(MAX_FX_RATE);
        assert_eq!(current_rate_or_sentinel(&provider), MAX_FX_RATE);
    }

    #[test]
    fn test_missing_env_var() {
        let provider = EnvRateProvider::new("DEPOSIT_ENGINE_TEST_UNSET_RATE");
        assert!(matches!(provider.current_rate(), Err(RateError::Unavailable(_))));
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate(" 34.5 ").unwrap(), dec!(34.5));
        assert!(matches!(parse_rate("abc"), Err(RateError::Parse { .. })));
        assert!(matches!(parse_rate("-3"), Err(RateError::Negative(_))));
    }
}
