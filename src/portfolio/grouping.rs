use crate::core::bank::BankId;
use crate::core::currency::CurrencyType;
use crate::portfolio::conversion::ConvertedDeposit;
use crate::portfolio::maturity::MaturityBucket;
use crate::valuation::rounding;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Totals for one group of deposits, in local currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary<K> {
    pub key: K,
    pub count: usize,
    pub total_amount: Decimal,
    pub total_net_interest: Decimal,
    /// Share of the grouping's total amount, in percent (2 dp).
    pub share_percent: Decimal,
}

impl<K> GroupSummary<K> {
    fn empty(key: K) -> Self {
        Self {
            key,
            count: 0,
            total_amount: Decimal::ZERO,
            total_net_interest: Decimal::ZERO,
            share_percent: Decimal::ZERO,
        }
    }

    fn add(&mut self, row: &ConvertedDeposit<'_>) {
        self.count += 1;
        self.total_amount = self.total_amount.saturating_add(row.amount);
        self.total_net_interest = self.total_net_interest.saturating_add(row.net_interest);
    }
}

/// Share of `part` in `total`, in percent; zero when `total` is zero.
pub fn share_percent(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    rounding::percent(part / total * dec!(100))
}

fn fill_shares<K>(groups: &mut [GroupSummary<K>]) {
    let total = groups
        .iter()
        .fold(Decimal::ZERO, |acc, g| acc.saturating_add(g.total_amount));
    for group in groups.iter_mut() {
        group.share_percent = share_percent(group.total_amount, total);
    }
}

/// Group rows by an arbitrary key.
///
/// Groups appear in the order their key is first seen.
pub fn group_by<K, F>(rows: &[ConvertedDeposit<'_>], key_fn: F) -> Vec<GroupSummary<K>>
where
    K: Eq + Hash + Clone,
    F: Fn(&ConvertedDeposit<'_>) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<GroupSummary<K>> = Vec::new();

    for row in rows {
        let key = key_fn(row);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(GroupSummary::empty(key));
            groups.len() - 1
        });
        groups[slot].add(row);
    }

    fill_shares(&mut groups);
    groups
}

pub fn group_by_currency(rows: &[ConvertedDeposit<'_>]) -> Vec<GroupSummary<CurrencyType>> {
    group_by(rows, |row| row.deposit.currency_type())
}

pub fn group_by_bank(rows: &[ConvertedDeposit<'_>]) -> Vec<GroupSummary<BankId>> {
    group_by(rows, |row| row.deposit.bank().clone())
}

/// Group rows by remaining maturity as of `as_of`.
///
/// Always returns all five buckets in canonical order, empty ones zeroed.
pub fn group_by_maturity(rows: &[ConvertedDeposit<'_>], as_of: NaiveDate) -> Vec<GroupSummary<MaturityBucket>> {
    let mut groups: Vec<GroupSummary<MaturityBucket>> =
        MaturityBucket::ALL.iter().map(|b| GroupSummary::empty(*b)).collect();

    for row in rows {
        let bucket = MaturityBucket::classify(row.deposit.remaining_days(as_of));
        if let Some(group) = groups.iter_mut().find(|g| g.key == bucket) {
            group.add(row);
        }
    }

    fill_shares(&mut groups);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::deposit::{Deposit, DepositInput};
    use crate::portfolio::conversion::to_common_currency;
    use crate::valuation::engine::ValuationEngine;
    use chrono::Duration;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn deposit(bank: &str, principal: Decimal, remaining: i64) -> Deposit {
        let end = as_of() + Duration::days(remaining);
        let start = end - Duration::days(400);
        ValuationEngine::default()
            .evaluate(&DepositInput::local(bank, principal, dec!(40), start, end), dec!(30))
            .unwrap()
    }

    #[test]
    fn test_group_by_bank_first_seen_order() {
        let deposits = vec![
            deposit("Halkbank", dec!(1000), 10),
            deposit("Akbank", dec!(3000), 10),
            deposit("Halkbank", dec!(1000), 50),
        ];
        let rows = to_common_currency(&deposits, dec!(30));
        let groups = group_by_bank(&rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, BankId::new("Halkbank"));
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].total_amount, dec!(2000));
        assert_eq!(groups[0].share_percent, dec!(40));
        assert_eq!(groups[1].share_percent, dec!(60));
    }

    #[test]
    fn test_maturity_buckets_always_five() {
        let deposits = vec![deposit("Akbank", dec!(1000), 200)];
        let rows = to_common_currency(&deposits, dec!(30));
        let groups = group_by_maturity(&rows, as_of());

        let keys: Vec<_> = groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, MaturityBucket::ALL.to_vec());
        assert_eq!(groups[3].count, 1);
        assert_eq!(groups[3].share_percent, dec!(100));
        assert_eq!(groups[0].count, 0);
        assert_eq!(groups[0].share_percent, Decimal::ZERO);
    }

    #[test]
    fn test_empty_input() {
        let groups = group_by_maturity(&[], as_of());
        assert_eq!(groups.len(), 5);
        assert!(groups.iter().all(|g| g.total_amount.is_zero() && g.share_percent.is_zero()));
        assert!(group_by_bank(&[]).is_empty());
    }

    #[test]
    fn test_share_of_zero_total() {
        assert_eq!(share_percent(dec!(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(share_percent(dec!(1), dec!(3)), dec!(33.33));
    }
}
