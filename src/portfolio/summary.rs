use crate::core::bank::BankId;
use crate::core::currency::CurrencyType;
use crate::core::deposit::Deposit;
use crate::portfolio::conversion::{filter_active, to_common_currency, ConvertedDeposit};
use crate::portfolio::grouping::{group_by_bank, group_by_currency, group_by_maturity, GroupSummary};
use crate::portfolio::maturity::MaturityBucket;
use crate::valuation::rounding;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Headline figures for a set of deposits, in local currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub count: usize,
    pub total_principal: Decimal,
    pub total_net_interest: Decimal,
    /// Net interest over principal, in percent. Zero for an empty portfolio.
    pub yield_percent: Decimal,
}

fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

pub fn portfolio_metrics(rows: &[ConvertedDeposit<'_>]) -> PortfolioMetrics {
    let total_principal = saturating_sum(rows.iter().map(|r| r.amount));
    let total_net_interest = saturating_sum(rows.iter().map(|r| r.net_interest));
    let yield_percent = total_net_interest
        .checked_div(total_principal)
        .map(|ratio| ratio.saturating_mul(dec!(100)))
        .unwrap_or(Decimal::ZERO);
    PortfolioMetrics {
        count: rows.len(),
        total_principal,
        total_net_interest,
        yield_percent,
    }
}

/// Principal-weighted mean of remaining days, rounded to a whole day.
///
/// Weights are each deposit's native principal, whatever its currency, so
/// the result does not move with the exchange rate. Returns 0 for an empty
/// slice.
pub fn weighted_average_term(rows: &[ConvertedDeposit<'_>], as_of: NaiveDate) -> i64 {
    let total = saturating_sum(rows.iter().map(|r| r.deposit.principal()));
    let weighted = saturating_sum(
        rows.iter()
            .map(|r| r.deposit.principal().saturating_mul(Decimal::from(r.deposit.remaining_days(as_of)))),
    );
    weighted
        .checked_div(total)
        .map(rounding::money)
        .and_then(|days| days.to_i64())
        .unwrap_or(0)
}

/// Which deposits a summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryScope {
    /// Deposits with `end_date >= as_of`.
    Active,
    /// Every deposit, matured ones included.
    FullHistory,
}

/// Aggregated view of a portfolio at one exchange rate and evaluation date.
///
/// Built fresh on every call; it borrows nothing and is never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub scope: SummaryScope,
    pub as_of: NaiveDate,
    pub fx_rate: Decimal,
    pub metrics: PortfolioMetrics,
    pub weighted_average_term_days: i64,
    pub by_currency: Vec<GroupSummary<CurrencyType>>,
    pub by_bank: Vec<GroupSummary<BankId>>,
    pub by_maturity: Vec<GroupSummary<MaturityBucket>>,
}

impl PortfolioSummary {
    /// Summary over deposits still active on `as_of`.
    pub fn active(deposits: &[Deposit], fx_rate: Decimal, as_of: NaiveDate) -> Self {
        let active = filter_active(deposits, as_of);
        Self::build(SummaryScope::Active, to_common_currency(active, fx_rate), fx_rate, as_of)
    }

    /// Summary over every deposit, including matured ones.
    pub fn full_history(deposits: &[Deposit], fx_rate: Decimal, as_of: NaiveDate) -> Self {
        Self::build(
            SummaryScope::FullHistory,
            to_common_currency(deposits, fx_rate),
            fx_rate,
            as_of,
        )
    }

    fn build(scope: SummaryScope, rows: Vec<ConvertedDeposit<'_>>, fx_rate: Decimal, as_of: NaiveDate) -> Self {
        Self {
            scope,
            as_of,
            fx_rate,
            metrics: portfolio_metrics(&rows),
            weighted_average_term_days: weighted_average_term(&rows, as_of),
            by_currency: group_by_currency(&rows),
            by_bank: group_by_bank(&rows),
            by_maturity: group_by_maturity(&rows, as_of),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.count == 0
    }

    /// Local-currency share of the currency grouping, in percent.
    pub fn currency_share(&self, currency: CurrencyType) -> Decimal {
        self.by_currency
            .iter()
            .find(|g| g.key == currency)
            .map(|g| g.share_percent)
            .unwrap_or(Decimal::ZERO)
    }
}

fn write_groups<K: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    groups: &[GroupSummary<K>],
) -> fmt::Result {
    writeln!(f, "\n{}:", title)?;
    for g in groups {
        writeln!(
            f,
            "  {:<14} {:>3}  principal {:>16}  net interest {:>14}  share {:>6}%",
            g.key.to_string(),
            g.count,
            g.total_amount.round_dp(0),
            g.total_net_interest.round_dp(0),
            g.share_percent.round_dp(2)
        )?;
    }
    Ok(())
}

impl fmt::Display for PortfolioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self.scope {
            SummaryScope::Active => "Active Portfolio",
            SummaryScope::FullHistory => "Portfolio",
        };
        writeln!(f, "=== {} Summary ({}) ===", title, self.as_of)?;
        if self.is_empty() {
            writeln!(f, "No deposits.")?;
            return Ok(());
        }
        writeln!(f, "Exchange Rate:      {}", self.fx_rate)?;
        writeln!(f, "Deposits:           {}", self.metrics.count)?;
        writeln!(f, "Total Principal:    {}", self.metrics.total_principal.round_dp(0))?;
        writeln!(f, "Total Net Interest: {}", self.metrics.total_net_interest.round_dp(0))?;
        writeln!(f, "Yield:              {:.2}%", self.metrics.yield_percent.round_dp(2))?;
        writeln!(f, "Average Term:       {} days", self.weighted_average_term_days)?;

        write_groups(f, "By Currency", &self.by_currency)?;
        write_groups(f, "By Bank", &self.by_bank)?;
        write_groups(f, "By Maturity", &self.by_maturity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::deposit::DepositInput;
    use crate::valuation::engine::ValuationEngine;
    use chrono::Duration;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn local(principal: Decimal, remaining: i64) -> Deposit {
        let end = as_of() + Duration::days(remaining);
        ValuationEngine::default()
            .evaluate(
                &DepositInput::local("Akbank", principal, dec!(40), end - Duration::days(200), end),
                dec!(30),
            )
            .unwrap()
    }

    #[test]
    fn test_weighted_average_empty() {
        assert_eq!(weighted_average_term(&[], as_of()), 0);
    }

    #[test]
    fn test_weighted_average_single() {
        let deposits = vec![local(dec!(5000), 77)];
        let rows = to_common_currency(&deposits, dec!(30));
        assert_eq!(weighted_average_term(&rows, as_of()), 77);
    }

    #[test]
    fn test_weighted_average_mixed() {
        let deposits = vec![local(dec!(1000), 10), local(dec!(3000), 50)];
        let rows = to_common_currency(&deposits, dec!(30));
        // (1000*10 + 3000*50) / 4000 = 40
        assert_eq!(weighted_average_term(&rows, as_of()), 40);
    }

    #[test]
    fn test_weighted_average_uses_native_principal() {
        let end = as_of() + Duration::days(100);
        let foreign = ValuationEngine::default()
            .evaluate(
                &DepositInput::foreign("Akbank", dec!(1000), dec!(5), end - Duration::days(200), end),
                dec!(30),
            )
            .unwrap();
        let deposits = vec![local(dec!(1000), 10), foreign];

        // (1000*10 + 1000*100) / 2000 = 55, at any exchange rate.
        for fx in [dec!(30), dec!(1), Decimal::ZERO] {
            let rows = to_common_currency(&deposits, fx);
            assert_eq!(weighted_average_term(&rows, as_of()), 55);
        }
    }

    #[test]
    fn test_metrics_yield() {
        let deposits = vec![local(dec!(100000), 30)];
        let rows = to_common_currency(&deposits, dec!(30));
        let metrics = portfolio_metrics(&rows);
        let net = deposits[0].net_interest_native();
        assert_eq!(metrics.count, 1);
        assert_eq!(metrics.total_net_interest, net);
        assert_eq!(metrics.yield_percent, net / dec!(100000) * dec!(100));
    }

    #[test]
    fn test_metrics_empty() {
        let metrics = portfolio_metrics(&[]);
        assert_eq!(metrics.count, 0);
        assert_eq!(metrics.yield_percent, Decimal::ZERO);
    }

    #[test]
    fn test_active_summary_excludes_matured() {
        let deposits = vec![local(dec!(1000), -5), local(dec!(2000), 40)];
        let active = PortfolioSummary::active(&deposits, dec!(30), as_of());
        let history = PortfolioSummary::full_history(&deposits, dec!(30), as_of());

        assert_eq!(active.metrics.count, 1);
        assert_eq!(active.metrics.total_principal, dec!(2000));
        assert_eq!(history.metrics.count, 2);
        assert_eq!(active.by_maturity.len(), 5);
        assert_eq!(active.currency_share(CurrencyType::Local), dec!(100));
        assert_eq!(active.currency_share(CurrencyType::Foreign), Decimal::ZERO);
    }

    #[test]
    fn test_display_empty() {
        let summary = PortfolioSummary::active(&[], dec!(30), as_of());
        assert!(summary.to_string().contains("No deposits."));
    }
}
