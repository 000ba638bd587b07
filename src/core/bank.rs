use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the bank holding a deposit.
///
/// The set of accepted banks is part of [`Settings`](crate::core::settings::Settings);
/// the valuation engine rejects deposits naming a bank outside it.
///
/// # Examples
///
/// ```
/// use deposit_engine::core::bank::BankId;
///
/// let a = BankId::new("Akbank");
/// let b = BankId::new("Denizbank");
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankId(String);

impl BankId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BankId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Banks accepted when no configuration file overrides them.
pub const DEFAULT_BANKS: [&str; 5] = [
    "Halkbank",
    "Garanti Bank",
    "Denizbank",
    "Akbank",
    "Yapı Kredi",
];
