use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Term band used to pick a withholding tax percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxTier {
    /// Up to and including 180 days.
    UpToSixMonths,
    /// 181 to 365 days.
    UpToOneYear,
    /// Longer than 365 days.
    OverOneYear,
}

impl TaxTier {
    /// Classify an original term length, in days.
    pub fn for_term(term_days: i64) -> Self {
        if term_days <= 180 {
            TaxTier::UpToSixMonths
        } else if term_days <= 365 {
            TaxTier::UpToOneYear
        } else {
            TaxTier::OverOneYear
        }
    }
}

impl fmt::Display for TaxTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaxTier::UpToSixMonths => "up to 6 months",
            TaxTier::UpToOneYear => "up to 1 year",
            TaxTier::OverOneYear => "over 1 year",
        };
        write!(f, "{}", label)
    }
}

/// Withholding tax percentages for one currency type, one per [`TaxTier`].
///
/// # Examples
///
/// ```
/// use deposit_engine::core::schedule::WithholdingSchedule;
/// use rust_decimal_macros::dec;
///
/// let schedule = WithholdingSchedule::local_default();
/// assert_eq!(schedule.rate_for_term(180), dec!(10));
/// assert_eq!(schedule.rate_for_term(181), dec!(7.5));
/// assert_eq!(schedule.rate_for_term(366), dec!(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingSchedule {
    pub up_to_six_months: Decimal,
    pub up_to_one_year: Decimal,
    pub over_one_year: Decimal,
}

impl WithholdingSchedule {
    pub fn new(up_to_six_months: Decimal, up_to_one_year: Decimal, over_one_year: Decimal) -> Self {
        Self {
            up_to_six_months,
            up_to_one_year,
            over_one_year,
        }
    }

    pub fn local_default() -> Self {
        Self::new(dec!(10), dec!(7.5), dec!(5))
    }

    pub fn foreign_default() -> Self {
        Self::new(dec!(25), dec!(25), dec!(25))
    }

    pub fn rate(&self, tier: TaxTier) -> Decimal {
        match tier {
            TaxTier::UpToSixMonths => self.up_to_six_months,
            TaxTier::UpToOneYear => self.up_to_one_year,
            TaxTier::OverOneYear => self.over_one_year,
        }
    }

    /// Withholding percentage for a deposit opened with the given term.
    pub fn rate_for_term(&self, term_days: i64) -> Decimal {
        self.rate(TaxTier::for_term(term_days))
    }

    pub(crate) fn rates(&self) -> [Decimal; 3] {
        [self.up_to_six_months, self.up_to_one_year, self.over_one_year]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(TaxTier::for_term(1), TaxTier::UpToSixMonths);
        assert_eq!(TaxTier::for_term(180), TaxTier::UpToSixMonths);
        assert_eq!(TaxTier::for_term(181), TaxTier::UpToOneYear);
        assert_eq!(TaxTier::for_term(365), TaxTier::UpToOneYear);
        assert_eq!(TaxTier::for_term(366), TaxTier::OverOneYear);
    }

    #[test]
    fn test_foreign_schedule_is_flat() {
        let schedule = WithholdingSchedule::foreign_default();
        for term in [30, 200, 400] {
            assert_eq!(schedule.rate_for_term(term), dec!(25));
        }
    }
}
