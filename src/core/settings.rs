//! Runtime configuration: accepted banks, default interest rates and
//! withholding schedules per currency type.

use crate::core::bank::{BankId, DEFAULT_BANKS};
use crate::core::currency::CurrencyType;
use crate::core::schedule::WithholdingSchedule;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors arising while loading or validating [`Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("configuration must list at least one bank")]
    NoBanks,
    #[error("withholding rate {rate} for {currency} must be between 0 and 100")]
    InvalidWithholding { currency: CurrencyType, rate: Decimal },
    #[error("default interest rate {rate} for {currency} must not be negative")]
    InvalidDefaultRate { currency: CurrencyType, rate: Decimal },
}

/// Per-currency-type parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// Annual rate used when an input omits one.
    pub default_rate_percent: Decimal,
    pub withholding: WithholdingSchedule,
}

/// Engine configuration.
///
/// `Settings::default()` carries the built-in tables; a JSON file may
/// override any subset of fields.
///
/// ```json
/// {
///   "banks": ["Akbank", "Halkbank"],
///   "local": {
///     "default_rate_percent": "45",
///     "withholding": { "up_to_six_months": "10", "up_to_one_year": "7.5", "over_one_year": "5" }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub banks: Vec<BankId>,
    pub local: CurrencySettings,
    pub foreign: CurrencySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            banks: DEFAULT_BANKS.iter().map(|b| BankId::new(*b)).collect(),
            local: CurrencySettings {
                default_rate_percent: dec!(50.00),
                withholding: WithholdingSchedule::local_default(),
            },
            foreign: CurrencySettings {
                default_rate_percent: dec!(4.75),
                withholding: WithholdingSchedule::foreign_default(),
            },
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.banks.is_empty() {
            return Err(ConfigError::NoBanks);
        }
        for currency in CurrencyType::ALL {
            let cs = self.for_currency(currency);
            if cs.default_rate_percent < Decimal::ZERO {
                return Err(ConfigError::InvalidDefaultRate {
                    currency,
                    rate: cs.default_rate_percent,
                });
            }
            for rate in cs.withholding.rates() {
                if rate < Decimal::ZERO || rate > dec!(100) {
                    return Err(ConfigError::InvalidWithholding { currency, rate });
                }
            }
        }
        Ok(())
    }

    pub fn for_currency(&self, currency: CurrencyType) -> &CurrencySettings {
        match currency {
            CurrencyType::Local => &self.local,
            CurrencyType::Foreign => &self.foreign,
        }
    }

    pub fn schedule(&self, currency: CurrencyType) -> &WithholdingSchedule {
        &self.for_currency(currency).withholding
    }

    pub fn default_rate(&self, currency: CurrencyType) -> Decimal {
        self.for_currency(currency).default_rate_percent
    }

    pub fn accepts_bank(&self, bank: &BankId) -> bool {
        self.banks.contains(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.banks.len(), 5);
        assert_eq!(settings.default_rate(CurrencyType::Foreign), dec!(4.75));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let settings = Settings::from_json_str(r#"{ "banks": ["Akbank"] }"#).unwrap();
        assert_eq!(settings.banks, vec![BankId::new("Akbank")]);
        assert_eq!(settings.local, Settings::default().local);
    }

    #[test]
    fn test_empty_bank_list_rejected() {
        let err = Settings::from_json_str(r#"{ "banks": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoBanks));
    }

    #[test]
    fn test_withholding_over_hundred_rejected() {
        let json = r#"{
            "foreign": {
                "default_rate_percent": "4",
                "withholding": { "up_to_six_months": "120", "up_to_one_year": "25", "over_one_year": "25" }
            }
        }"#;
        let err = Settings::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidWithholding { currency: CurrencyType::Foreign, .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::from_json_file("/nonexistent/settings.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
