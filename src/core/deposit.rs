use crate::core::bank::BankId;
use crate::core::currency::CurrencyType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw, unvalidated parameters for opening a deposit.
///
/// `annual_rate_percent` falls back to the configured default for the
/// currency type when omitted. `opening_fx_rate` is only honoured for
/// foreign deposits and defaults to the current rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositInput {
    pub currency_type: CurrencyType,
    pub bank: BankId,
    pub principal: Decimal,
    #[serde(default)]
    pub annual_rate_percent: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub opening_fx_rate: Option<Decimal>,
}

impl DepositInput {
    pub fn new(
        currency_type: CurrencyType,
        bank: impl Into<BankId>,
        principal: Decimal,
        annual_rate_percent: Decimal,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            currency_type,
            bank: bank.into(),
            principal,
            annual_rate_percent: Some(annual_rate_percent),
            start_date,
            end_date,
            opening_fx_rate: None,
        }
    }

    pub fn local(
        bank: impl Into<BankId>,
        principal: Decimal,
        annual_rate_percent: Decimal,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self::new(CurrencyType::Local, bank, principal, annual_rate_percent, start_date, end_date)
    }

    pub fn foreign(
        bank: impl Into<BankId>,
        principal: Decimal,
        annual_rate_percent: Decimal,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self::new(CurrencyType::Foreign, bank, principal, annual_rate_percent, start_date, end_date)
    }

    /// Set the exchange rate the deposit was opened at.
    pub fn with_opening_fx_rate(mut self, rate: Decimal) -> Self {
        self.opening_fx_rate = Some(rate);
        self
    }
}

/// Computed fields of a local-currency deposit. All amounts are in local units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalValuation {
    pub gross_interest: Decimal,
    pub tax_amount: Decimal,
    pub net_interest: Decimal,
    pub maturity_payout: Decimal,
    /// Principal expressed in foreign units at the last applied rate.
    pub foreign_equivalent_principal: Decimal,
    /// Rate at which converting to foreign currency today breaks even.
    pub break_even_rate: Decimal,
}

/// Computed fields of a foreign-currency deposit.
///
/// `*_fx` amounts are in foreign units; `*_local` amounts are their
/// local-currency equivalents at the rate applied when the deposit was
/// evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignValuation {
    pub gross_interest_fx: Decimal,
    pub tax_amount_fx: Decimal,
    pub net_interest_fx: Decimal,
    pub maturity_payout_fx: Decimal,
    pub gross_interest_local: Decimal,
    pub tax_amount_local: Decimal,
    pub net_interest_local: Decimal,
    pub maturity_payout_local: Decimal,
    /// Anchored to the opening rate and the original term.
    pub break_even_rate: Decimal,
}

/// Currency-specific part of a [`Deposit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "currency_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Valuation {
    Local(LocalValuation),
    Foreign(ForeignValuation),
}

/// A fully valued fixed-term deposit.
///
/// Created only by [`ValuationEngine::evaluate`](crate::valuation::engine::ValuationEngine::evaluate),
/// so every `Deposit` satisfies `principal > 0` and `end_date > start_date`.
/// Remaining days are never stored; ask [`Deposit::remaining_days`] with the
/// evaluation date instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    id: Uuid,
    bank: BankId,
    principal: Decimal,
    annual_rate_percent: Decimal,
    start_date: NaiveDate,
    end_date: NaiveDate,
    original_term_days: i64,
    opening_fx_rate: Decimal,
    /// Withholding percentage fixed at creation from the original term.
    withholding_rate: Decimal,
    valuation: Valuation,
}

impl Deposit {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        bank: BankId,
        principal: Decimal,
        annual_rate_percent: Decimal,
        start_date: NaiveDate,
        end_date: NaiveDate,
        opening_fx_rate: Decimal,
        withholding_rate: Decimal,
        valuation: Valuation,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            bank,
            principal,
            annual_rate_percent,
            start_date,
            end_date,
            original_term_days: (end_date - start_date).num_days(),
            opening_fx_rate,
            withholding_rate,
            valuation,
        }
    }

    pub(crate) fn valuation_mut(&mut self) -> &mut Valuation {
        &mut self.valuation
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn currency_type(&self) -> CurrencyType {
        match self.valuation {
            Valuation::Local(_) => CurrencyType::Local,
            Valuation::Foreign(_) => CurrencyType::Foreign,
        }
    }

    pub fn bank(&self) -> &BankId {
        &self.bank
    }

    /// Principal in the deposit's own currency.
    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        self.annual_rate_percent
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn original_term_days(&self) -> i64 {
        self.original_term_days
    }

    /// Days left until maturity as of `as_of`; negative once matured.
    pub fn remaining_days(&self, as_of: NaiveDate) -> i64 {
        (self.end_date - as_of).num_days()
    }

    /// Active until and including its end date.
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        self.end_date >= as_of
    }

    pub fn opening_fx_rate(&self) -> Decimal {
        self.opening_fx_rate
    }

    pub fn withholding_rate(&self) -> Decimal {
        self.withholding_rate
    }

    pub fn valuation(&self) -> &Valuation {
        &self.valuation
    }

    pub fn break_even_rate(&self) -> Decimal {
        match &self.valuation {
            Valuation::Local(v) => v.break_even_rate,
            Valuation::Foreign(v) => v.break_even_rate,
        }
    }

    pub fn gross_interest_native(&self) -> Decimal {
        match &self.valuation {
            Valuation::Local(v) => v.gross_interest,
            Valuation::Foreign(v) => v.gross_interest_fx,
        }
    }

    pub fn tax_amount_native(&self) -> Decimal {
        match &self.valuation {
            Valuation::Local(v) => v.tax_amount,
            Valuation::Foreign(v) => v.tax_amount_fx,
        }
    }

    /// Net interest in the deposit's own currency.
    pub fn net_interest_native(&self) -> Decimal {
        match &self.valuation {
            Valuation::Local(v) => v.net_interest,
            Valuation::Foreign(v) => v.net_interest_fx,
        }
    }

    /// Maturity payout in the deposit's own currency.
    pub fn maturity_payout_native(&self) -> Decimal {
        match &self.valuation {
            Valuation::Local(v) => v.maturity_payout,
            Valuation::Foreign(v) => v.maturity_payout_fx,
        }
    }

    pub fn as_local(&self) -> Option<&LocalValuation> {
        match &self.valuation {
            Valuation::Local(v) => Some(v),
            Valuation::Foreign(_) => None,
        }
    }

    pub fn as_foreign(&self) -> Option<&ForeignValuation> {
        match &self.valuation {
            Valuation::Foreign(v) => Some(v),
            Valuation::Local(_) => None,
        }
    }
}
