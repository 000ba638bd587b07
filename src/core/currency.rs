use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Denomination of a deposit relative to the holder's home currency.
///
/// `Local` deposits are held in the home currency, `Foreign` deposits in
/// US dollars. The variant decides which valuation branch applies and is
/// fixed for the life of a deposit.
///
/// # Examples
///
/// ```
/// use deposit_engine::core::currency::CurrencyType;
///
/// let local: CurrencyType = "local".parse().unwrap();
/// assert_eq!(local, CurrencyType::Local);
/// assert_eq!(CurrencyType::Foreign.to_string(), "FOREIGN");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurrencyType {
    Local,
    Foreign,
}

impl CurrencyType {
    /// Both currency types in display order.
    pub const ALL: [CurrencyType; 2] = [CurrencyType::Local, CurrencyType::Foreign];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyType::Local => "LOCAL",
            CurrencyType::Foreign => "FOREIGN",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, CurrencyType::Local)
    }
}

impl fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown currency type '{0}' (expected LOCAL or FOREIGN)")]
pub struct ParseCurrencyTypeError(String);

impl FromStr for CurrencyType {
    type Err = ParseCurrencyTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOCAL" | "TL" => Ok(CurrencyType::Local),
            "FOREIGN" | "USD" => Ok(CurrencyType::Foreign),
            _ => Err(ParseCurrencyTypeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Local".parse::<CurrencyType>().unwrap(), CurrencyType::Local);
        assert_eq!("foreign".parse::<CurrencyType>().unwrap(), CurrencyType::Foreign);
        assert_eq!("usd".parse::<CurrencyType>().unwrap(), CurrencyType::Foreign);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("EUR".parse::<CurrencyType>().is_err());
    }

    #[test]
    fn test_serde_uses_upper_case() {
        let json = serde_json::to_string(&CurrencyType::Foreign).unwrap();
        assert_eq!(json, "\"FOREIGN\"");
        let back: CurrencyType = serde_json::from_str("\"LOCAL\"").unwrap();
        assert_eq!(back, CurrencyType::Local);
    }
}
