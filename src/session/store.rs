use crate::core::currency::CurrencyType;
use crate::core::deposit::{Deposit, DepositInput};
use crate::core::settings::Settings;
use crate::portfolio::conversion::{filter_active, filter_closed};
use crate::portfolio::summary::PortfolioSummary;
use crate::session::rates::{current_rate_or_sentinel, RateProvider};
use crate::valuation::engine::{Rejection, ValuationEngine, MAX_FX_RATE};
use chrono::NaiveDate;
use log::{info, warn};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no deposit at index {index} (session holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no deposit with id {0}")]
    NotFound(Uuid),
    #[error("exchange rate must not be negative, got {0}")]
    NegativeRate(Decimal),
    #[error("exchange rate {0} is above the supported maximum")]
    RateOutOfRange(Decimal),
}

/// In-memory state of one interactive session.
///
/// Owns the ordered deposit collection, the last known exchange rate and the
/// valuation engine. Insertion order is display order. All mutation goes
/// through `&mut self`, so an aggregation borrowing [`Session::deposits`]
/// never sees a half-applied change.
#[derive(Debug, Clone)]
pub struct Session {
    engine: ValuationEngine,
    deposits: Vec<Deposit>,
    fx_rate: Decimal,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default(), Decimal::ZERO)
    }
}

impl Session {
    pub fn new(settings: Settings, fx_rate: Decimal) -> Self {
        Self {
            engine: ValuationEngine::new(settings),
            deposits: Vec::new(),
            fx_rate,
        }
    }

    /// Start a session with the rate reported by `provider`, or the zero
    /// sentinel if the lookup fails.
    pub fn with_provider(settings: Settings, provider: &dyn RateProvider) -> Self {
        Self::new(settings, current_rate_or_sentinel(provider))
    }

    pub fn settings(&self) -> &Settings {
        self.engine.settings()
    }

    pub fn engine(&self) -> &ValuationEngine {
        &self.engine
    }

    pub fn fx_rate(&self) -> Decimal {
        self.fx_rate
    }

    pub fn deposits(&self) -> &[Deposit] {
        &self.deposits
    }

    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Deposit> {
        self.deposits.get(index)
    }

    /// Value `input` at the session's current rate and append it.
    pub fn add(&mut self, input: &DepositInput) -> Result<&Deposit, Rejection> {
        let deposit = self.engine.evaluate(input, self.fx_rate)?;
        info!(
            "added {} deposit {} at {} (principal {})",
            deposit.currency_type(),
            deposit.id(),
            deposit.bank(),
            deposit.principal()
        );
        self.deposits.push(deposit);
        let last = self.deposits.len() - 1;
        Ok(&self.deposits[last])
    }

    /// Add every input, returning the rejections with their input positions.
    pub fn add_all<'a, I>(&mut self, inputs: I) -> Vec<(usize, Rejection)>
    where
        I: IntoIterator<Item = &'a DepositInput>,
    {
        inputs
            .into_iter()
            .enumerate()
            .filter_map(|(i, input)| self.add(input).err().map(|e| (i, e)))
            .collect()
    }

    pub fn remove(&mut self, index: usize) -> Result<Deposit, SessionError> {
        if index >= self.deposits.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.deposits.len(),
            });
        }
        let removed = self.deposits.remove(index);
        info!("removed deposit {} at index {}", removed.id(), index);
        Ok(removed)
    }

    pub fn remove_by_id(&mut self, id: Uuid) -> Result<Deposit, SessionError> {
        let index = self
            .deposits
            .iter()
            .position(|d| d.id() == id)
            .ok_or(SessionError::NotFound(id))?;
        self.remove(index)
    }

    /// Remove several deposits by index in one step. Indices refer to the
    /// collection before any removal; duplicates are ignored.
    pub fn remove_many(&mut self, indices: &[usize]) -> Result<Vec<Deposit>, SessionError> {
        let len = self.deposits.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(SessionError::IndexOutOfRange { index, len });
        }
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut removed: Vec<Deposit> = sorted.iter().rev().map(|&i| self.deposits.remove(i)).collect();
        removed.reverse();
        info!("removed {} deposits", removed.len());
        Ok(removed)
    }

    /// Replace the current rate and re-derive every local deposit's
    /// rate-dependent fields.
    pub fn set_rate(&mut self, rate: Decimal) -> Result<usize, SessionError> {
        if rate < Decimal::ZERO {
            return Err(SessionError::NegativeRate(rate));
        }
        if rate > MAX_FX_RATE {
            return Err(SessionError::RateOutOfRange(rate));
        }
        Ok(self.apply_rate(rate))
    }

    /// Look the rate up again and apply it. Returns the rate now in effect.
    pub fn refresh_rate(&mut self, provider: &dyn RateProvider) -> Decimal {
        let rate = current_rate_or_sentinel(provider);
        self.apply_rate(rate);
        self.fx_rate
    }

    /// `rate` must already be within `0..=MAX_FX_RATE`.
    fn apply_rate(&mut self, rate: Decimal) -> usize {
        self.fx_rate = rate;
        let mut refreshed = 0;
        for deposit in &mut self.deposits {
            match ValuationEngine::refresh_in_place(deposit, rate) {
                Ok(true) => refreshed += 1,
                Ok(false) => {}
                Err(rejection) => warn!("deposit {} kept its previous valuation: {}", deposit.id(), rejection),
            }
        }
        info!("exchange rate set to {}; refreshed {} local deposits", rate, refreshed);
        refreshed
    }

    pub fn by_currency(&self, currency: CurrencyType) -> impl Iterator<Item = &Deposit> {
        self.deposits.iter().filter(move |d| d.currency_type() == currency)
    }

    pub fn active(&self, as_of: NaiveDate) -> Vec<&Deposit> {
        filter_active(&self.deposits, as_of)
    }

    pub fn closed(&self, as_of: NaiveDate) -> Vec<&Deposit> {
        filter_closed(&self.deposits, as_of)
    }

    /// Active-portfolio summary at the session's current rate.
    pub fn summary(&self, as_of: NaiveDate) -> PortfolioSummary {
        PortfolioSummary::active(&self.deposits, self.fx_rate, as_of)
    }

    /// Whole-history summary at the session's current rate.
    pub fn overview(&self, as_of: NaiveDate) -> PortfolioSummary {
        PortfolioSummary::full_history(&self.deposits, self.fx_rate, as_of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::rates::FixedRateProvider;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn local(principal: Decimal) -> DepositInput {
        DepositInput::local("Akbank", principal, dec!(50), start(), start() + Duration::days(180))
    }

    fn foreign(principal: Decimal) -> DepositInput {
        DepositInput::foreign("Denizbank", principal, dec!(5), start(), start() + Duration::days(400))
    }

    #[test]
    fn test_add_keeps_order() {
        let mut session = Session::new(Settings::default(), dec!(30));
        session.add(&local(dec!(1000))).unwrap();
        session.add(&foreign(dec!(500))).unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.deposits()[0].currency_type(), CurrencyType::Local);
        assert_eq!(session.deposits()[1].currency_type(), CurrencyType::Foreign);
    }

    #[test]
    fn test_rejected_input_not_stored() {
        let mut session = Session::new(Settings::default(), dec!(30));
        assert!(session.add(&local(Decimal::ZERO)).is_err());
        assert!(session.is_empty());
    }

    #[test]
    fn test_add_all_reports_positions() {
        let mut session = Session::new(Settings::default(), dec!(30));
        let inputs = vec![local(dec!(1000)), local(dec!(-1)), foreign(dec!(10))];
        let rejected = session.add_all(&inputs);
        assert_eq!(session.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, 1);
    }

    #[test]
    fn test_remove_by_index_and_id() {
        let mut session = Session::new(Settings::default(), dec!(30));
        session.add(&local(dec!(1000))).unwrap();
        let id = session.add(&local(dec!(2000))).unwrap().id();
        session.add(&local(dec!(3000))).unwrap();

        let removed = session.remove_by_id(id).unwrap();
        assert_eq!(removed.principal(), dec!(2000));
        assert_eq!(session.remove(5), Err(SessionError::IndexOutOfRange { index: 5, len: 2 }));
        assert_eq!(session.remove_by_id(id), Err(SessionError::NotFound(id)));

        let removed = session.remove(0).unwrap();
        assert_eq!(removed.principal(), dec!(1000));
        assert_eq!(session.deposits()[0].principal(), dec!(3000));
    }

    #[test]
    fn test_remove_many() {
        let mut session = Session::new(Settings::default(), dec!(30));
        for p in [1000, 2000, 3000, 4000] {
            session.add(&local(Decimal::from(p))).unwrap();
        }
        let removed = session.remove_many(&[3, 1, 1]).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].principal(), dec!(2000));
        let left: Vec<_> = session.deposits().iter().map(|d| d.principal()).collect();
        assert_eq!(left, vec![dec!(1000), dec!(3000)]);
        assert!(session.remove_many(&[9]).is_err());
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_set_rate_refreshes_local_only() {
        let mut session = Session::new(Settings::default(), dec!(30));
        session.add(&local(dec!(100000))).unwrap();
        session.add(&foreign(dec!(1000))).unwrap();
        let foreign_before = session.deposits()[1].clone();

        let refreshed = session.set_rate(dec!(40)).unwrap();
        assert_eq!(refreshed, 1);
        assert_eq!(
            session.deposits()[0].as_local().unwrap().foreign_equivalent_principal,
            dec!(2500)
        );
        assert_eq!(session.deposits()[1], foreign_before);
        assert!(session.set_rate(dec!(-1)).is_err());
        assert_eq!(session.fx_rate(), dec!(40));
    }

    #[test]
    fn test_set_rate_rejects_oversized_rate() {
        let mut session = Session::new(Settings::default(), dec!(30));
        session.add(&local(dec!(100000))).unwrap();
        let before = session.deposits()[0].clone();

        let err = session.set_rate(MAX_FX_RATE * dec!(2)).unwrap_err();
        assert_eq!(err, SessionError::RateOutOfRange(MAX_FX_RATE * dec!(2)));
        assert_eq!(session.fx_rate(), dec!(30));
        assert_eq!(session.deposits()[0], before);
    }

    #[test]
    fn test_huge_principal_does_not_panic() {
        let mut session = Session::new(Settings::default(), dec!(0.0001));
        let rejection = session.add(&local(dec!(10000000000000000000000000))).unwrap_err();
        assert_eq!(rejection.code(), "amount_out_of_range");
        assert!(session.is_empty());
    }

    #[test]
    fn test_refresh_rate_from_provider() {
        let mut session = Session::default();
        let rate = session.refresh_rate(&FixedRateProvider::new(dec!(34.56789)));
        assert_eq!(rate, dec!(34.5679));

        let rate = session.refresh_rate(&FixedRateProvider::new(MAX_FX_RATE + dec!(1)));
        assert_eq!(rate, Decimal::ZERO);
    }

    #[test]
    fn test_summary_uses_session_rate() {
        let mut session = Session::new(Settings::default(), dec!(30));
        session.add(&foreign(dec!(1000))).unwrap();
        let summary = session.summary(start());
        assert_eq!(summary.metrics.total_principal, dec!(30000));
        assert_eq!(session.by_currency(CurrencyType::Foreign).count(), 1);
        assert_eq!(session.active(start() + Duration::days(500)).len(), 0);
        assert_eq!(session.closed(start() + Duration::days(500)).len(), 1);
    }
}
