//! # deposit-engine
//!
//! Fixed-term deposit valuation and multi-currency portfolio aggregation.
//!
//! Given deposits in local currency and in US dollars, this engine computes
//! interest, withholding tax, maturity payouts and break-even exchange
//! rates, then rolls the portfolio up by currency, bank and remaining term.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: deposits, currency types, banks, withholding schedules, settings
//! - **valuation** — The valuation engine and its per-step rounding rules
//! - **portfolio** — Currency conversion, active filtering, grouping and summary metrics
//! - **session** — In-memory deposit store and exchange-rate providers
//! - **export** — Spreadsheet-shaped workbook export
//! - **simulation** — Random portfolio generation for benchmarks

pub mod core;
pub mod export;
pub mod portfolio;
pub mod session;
pub mod simulation;
pub mod valuation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::bank::BankId;
    pub use crate::core::currency::CurrencyType;
    pub use crate::core::deposit::{Deposit, DepositInput, Valuation};
    pub use crate::core::settings::Settings;
    pub use crate::export::workbook::Workbook;
    pub use crate::portfolio::summary::{PortfolioMetrics, PortfolioSummary};
    pub use crate::session::rates::{FixedRateProvider, RateProvider};
    pub use crate::session::store::Session;
    pub use crate::valuation::engine::{Rejection, ValuationEngine};
}
