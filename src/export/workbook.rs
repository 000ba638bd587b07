//! Spreadsheet-shaped export of a session.
//!
//! The workbook is a plain data model (sheets of typed cells) serialized to
//! JSON; any spreadsheet writer can render it. Sheet names and column
//! identifiers are a stable contract.

use crate::core::currency::CurrencyType;
use crate::core::deposit::{Deposit, Valuation};
use crate::portfolio::conversion::filter_active;
use crate::portfolio::grouping::share_percent;
use crate::portfolio::summary::{PortfolioSummary, SummaryScope};
use crate::valuation::rounding;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const OVERVIEW_SHEET: &str = "Portfolio Overview";
pub const LOCAL_SHEET: &str = "Local Deposits";
pub const FOREIGN_SHEET: &str = "Foreign Deposits";

pub const LOCAL_COLUMNS: [&str; 15] = [
    "currency_type",
    "bank",
    "start_date",
    "end_date",
    "principal",
    "annual_rate_percent",
    "withholding_rate",
    "gross_interest",
    "tax_amount",
    "net_interest",
    "maturity_payout_local",
    "opening_fx_rate",
    "break_even_rate",
    "original_term_days",
    "remaining_days",
];

pub const FOREIGN_COLUMNS: [&str; 15] = [
    "currency_type",
    "bank",
    "start_date",
    "end_date",
    "principal",
    "annual_rate_percent",
    "withholding_rate",
    "gross_interest_fx",
    "tax_amount_fx",
    "net_interest_fx",
    "maturity_payout_fx",
    "opening_fx_rate",
    "break_even_rate",
    "original_term_days",
    "remaining_days",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize workbook: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write workbook to '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A typed spreadsheet cell. `Percent` values are in percent (12.5 = 12.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Text(String),
    Integer(i64),
    Money(Decimal),
    Percent(Decimal),
    Rate(Decimal),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Value cell of the overview row labelled `label`.
    pub fn lookup(&self, label: &str) -> Option<&Cell> {
        self.rows
            .iter()
            .find(|row| matches!(row.first(), Some(Cell::Text(t)) if t == label))
            .and_then(|row| row.get(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

/// Native-currency totals for one currency type.
struct NativeTotals {
    count: usize,
    principal: Decimal,
    net_interest: Decimal,
}

impl NativeTotals {
    fn of(deposits: &[&Deposit], currency: CurrencyType) -> Self {
        let matching: Vec<&&Deposit> = deposits.iter().filter(|d| d.currency_type() == currency).collect();
        Self {
            count: matching.len(),
            principal: matching.iter().map(|d| d.principal()).sum(),
            net_interest: matching.iter().map(|d| d.net_interest_native()).sum(),
        }
    }

    fn yield_percent(&self) -> Decimal {
        share_percent(self.net_interest, self.principal)
    }
}

fn count_cell(n: usize) -> Cell {
    Cell::Integer(n as i64)
}

impl Workbook {
    /// Lay out `deposits` and an active-portfolio `summary` as sheets.
    ///
    /// A full-history summary is replaced by the active summary at the same
    /// rate and date, so every overview row describes the same deposits.
    /// Per-currency sheets are omitted when they would have no rows.
    pub fn build(deposits: &[Deposit], summary: &PortfolioSummary, generated_at: DateTime<Utc>) -> Self {
        let mut sheets = vec![Self::overview(deposits, summary, generated_at)];
        for (currency, name, columns) in [
            (CurrencyType::Local, LOCAL_SHEET, &LOCAL_COLUMNS),
            (CurrencyType::Foreign, FOREIGN_SHEET, &FOREIGN_COLUMNS),
        ] {
            let mut sheet = Sheet::new(name, columns);
            sheet.rows = deposits
                .iter()
                .filter(|d| d.currency_type() == currency)
                .map(|d| deposit_row(d, summary.as_of))
                .collect();
            if !sheet.rows.is_empty() {
                sheets.push(sheet);
            }
        }
        Self { sheets }
    }

    fn overview(deposits: &[Deposit], summary: &PortfolioSummary, generated_at: DateTime<Utc>) -> Sheet {
        let summary = match summary.scope {
            SummaryScope::Active => Cow::Borrowed(summary),
            SummaryScope::FullHistory => {
                Cow::Owned(PortfolioSummary::active(deposits, summary.fx_rate, summary.as_of))
            }
        };
        let active = filter_active(deposits, summary.as_of);
        let local = NativeTotals::of(&active, CurrencyType::Local);
        let foreign = NativeTotals::of(&active, CurrencyType::Foreign);
        let metrics = &summary.metrics;

        let mut sheet = Sheet::new(OVERVIEW_SHEET, &["metric", "value"]);
        let mut section = |title: &str, entries: Vec<(&str, Cell)>| {
            if !sheet.rows.is_empty() {
                sheet.rows.push(vec![Cell::Empty, Cell::Empty]);
            }
            sheet.rows.push(vec![title.into(), Cell::Empty]);
            for (label, value) in entries {
                sheet.rows.push(vec![label.into(), value]);
            }
        };

        section(
            "1. GENERAL",
            vec![
                ("Total Deposits", count_cell(deposits.len())),
                ("Active Deposits", count_cell(active.len())),
                ("Closed Deposits", count_cell(deposits.len() - active.len())),
                ("Average Term (Days)", Cell::Integer(summary.weighted_average_term_days)),
            ],
        );
        section(
            "2. LOCAL DEPOSITS",
            vec![
                ("Local Deposit Count", count_cell(local.count)),
                ("Total Local Principal", Cell::Money(local.principal)),
                ("Total Local Net Interest", Cell::Money(local.net_interest)),
                ("Local Portfolio Yield", Cell::Percent(local.yield_percent())),
            ],
        );
        section(
            "3. FOREIGN DEPOSITS",
            vec![
                ("Foreign Deposit Count", count_cell(foreign.count)),
                ("Total Foreign Principal", Cell::Money(foreign.principal)),
                ("Total Foreign Net Interest", Cell::Money(foreign.net_interest)),
                ("Foreign Portfolio Yield", Cell::Percent(foreign.yield_percent())),
            ],
        );
        section(
            "4. TOTAL PORTFOLIO (LOCAL CURRENCY)",
            vec![
                ("Total Portfolio Value", Cell::Money(metrics.total_principal)),
                ("Total Net Interest", Cell::Money(metrics.total_net_interest)),
                ("Overall Yield", Cell::Percent(rounding::percent(metrics.yield_percent))),
            ],
        );
        section(
            "5. CURRENCY SPLIT",
            vec![
                ("Local Share", Cell::Percent(summary.currency_share(CurrencyType::Local))),
                ("Foreign Share", Cell::Percent(summary.currency_share(CurrencyType::Foreign))),
            ],
        );
        section(
            "6. CURRENT",
            vec![
                ("Exchange Rate", Cell::Rate(summary.fx_rate)),
                ("Report Time", Cell::Timestamp(generated_at)),
            ],
        );
        sheet
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

fn deposit_row(deposit: &Deposit, as_of: NaiveDate) -> Vec<Cell> {
    let (gross, tax, net, payout) = match deposit.valuation() {
        Valuation::Local(v) => (v.gross_interest, v.tax_amount, v.net_interest, v.maturity_payout),
        Valuation::Foreign(v) => (
            v.gross_interest_fx,
            v.tax_amount_fx,
            v.net_interest_fx,
            v.maturity_payout_fx,
        ),
    };
    vec![
        deposit.currency_type().as_str().into(),
        deposit.bank().as_str().into(),
        Cell::Date(deposit.start_date()),
        Cell::Date(deposit.end_date()),
        Cell::Money(deposit.principal()),
        Cell::Percent(deposit.annual_rate_percent()),
        Cell::Percent(deposit.withholding_rate()),
        Cell::Money(gross),
        Cell::Money(tax),
        Cell::Money(net),
        Cell::Money(payout),
        Cell::Rate(deposit.opening_fx_rate()),
        Cell::Rate(deposit.break_even_rate()),
        Cell::Integer(deposit.original_term_days()),
        Cell::Integer(deposit.remaining_days(as_of)),
    ]
}
