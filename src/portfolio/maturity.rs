use serde::{Deserialize, Serialize};
use std::fmt;

/// Remaining-maturity band used for reporting.
///
/// Variants are declared in canonical display order, which is also the
/// order of [`MaturityBucket::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaturityBucket {
    #[serde(rename = "≤1 month")]
    UpToOneMonth,
    #[serde(rename = "1-3 months")]
    OneToThreeMonths,
    #[serde(rename = "3-6 months")]
    ThreeToSixMonths,
    #[serde(rename = "6-12 months")]
    SixToTwelveMonths,
    #[serde(rename = "12+ months")]
    OverTwelveMonths,
}

impl MaturityBucket {
    pub const ALL: [MaturityBucket; 5] = [
        MaturityBucket::UpToOneMonth,
        MaturityBucket::OneToThreeMonths,
        MaturityBucket::ThreeToSixMonths,
        MaturityBucket::SixToTwelveMonths,
        MaturityBucket::OverTwelveMonths,
    ];

    pub fn classify(remaining_days: i64) -> Self {
        match remaining_days {
            d if d <= 30 => MaturityBucket::UpToOneMonth,
            d if d <= 90 => MaturityBucket::OneToThreeMonths,
            d if d <= 180 => MaturityBucket::ThreeToSixMonths,
            d if d <= 365 => MaturityBucket::SixToTwelveMonths,
            _ => MaturityBucket::OverTwelveMonths,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaturityBucket::UpToOneMonth => "≤1 month",
            MaturityBucket::OneToThreeMonths => "1-3 months",
            MaturityBucket::ThreeToSixMonths => "3-6 months",
            MaturityBucket::SixToTwelveMonths => "6-12 months",
            MaturityBucket::OverTwelveMonths => "12+ months",
        }
    }
}

impl fmt::Display for MaturityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(MaturityBucket::classify(0), MaturityBucket::UpToOneMonth);
        assert_eq!(MaturityBucket::classify(30), MaturityBucket::UpToOneMonth);
        assert_eq!(MaturityBucket::classify(31), MaturityBucket::OneToThreeMonths);
        assert_eq!(MaturityBucket::classify(90), MaturityBucket::OneToThreeMonths);
        assert_eq!(MaturityBucket::classify(180), MaturityBucket::ThreeToSixMonths);
        assert_eq!(MaturityBucket::classify(365), MaturityBucket::SixToTwelveMonths);
        assert_eq!(MaturityBucket::classify(366), MaturityBucket::OverTwelveMonths);
    }

    #[test]
    fn test_all_is_sorted() {
        let mut sorted = MaturityBucket::ALL;
        sorted.sort();
        assert_eq!(sorted, MaturityBucket::ALL);
    }

    #[test]
    fn test_serialized_label() {
        let json = serde_json::to_string(&MaturityBucket::OneToThreeMonths).unwrap();
        assert_eq!(json, "\"1-3 months\"");
    }
}
