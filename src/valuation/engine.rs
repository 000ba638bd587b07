use crate::core::bank::BankId;
use crate::core::currency::CurrencyType;
use crate::core::deposit::{Deposit, DepositInput, ForeignValuation, LocalValuation, Valuation};
use crate::core::settings::Settings;
use crate::valuation::rounding;
use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use thiserror::Error;

const DAYS_PER_YEAR: Decimal = dec!(365);
const HUNDRED: Decimal = dec!(100);

/// Largest principal accepted, in whole units of the deposit's currency.
pub const MAX_PRINCIPAL: Decimal = dec!(1000000000000000);
/// Largest annual interest rate accepted, in percent.
pub const MAX_RATE_PERCENT: Decimal = dec!(1000);
/// Largest exchange rate the engine values deposits at.
pub const MAX_FX_RATE: Decimal = dec!(1000000);

/// Why a deposit input was refused. No record is created for a rejected input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("principal must be positive, got {principal}")]
    NonPositivePrincipal { principal: Decimal },
    #[error("end date {end_date} must be after start date {start_date}")]
    NonPositiveTerm {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    #[error("annual interest rate must not be negative, got {rate}")]
    NegativeRate { rate: Decimal },
    #[error("opening exchange rate must not be negative, got {rate}")]
    InvalidOpeningRate { rate: Decimal },
    #[error("bank '{bank}' is not in the configured bank list")]
    UnknownBank { bank: BankId },
    #[error("{field} {value} is outside the supported range")]
    AmountOutOfRange { field: &'static str, value: Decimal },
}

impl Rejection {
    /// Stable reason code for presentation layers.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::NonPositivePrincipal { .. } => "non_positive_principal",
            Rejection::NonPositiveTerm { .. } => "non_positive_term",
            Rejection::NegativeRate { .. } => "negative_rate",
            Rejection::InvalidOpeningRate { .. } => "invalid_opening_rate",
            Rejection::UnknownBank { .. } => "unknown_bank",
            Rejection::AmountOutOfRange { .. } => "amount_out_of_range",
        }
    }

    fn out_of_range(field: &'static str, value: Decimal) -> Self {
        Rejection::AmountOutOfRange { field, value }
    }
}

/// Interest amounts in a single currency, each rounded to whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestBreakdown {
    pub gross: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
    pub payout: Decimal,
}

impl InterestBreakdown {
    /// Simple interest over `term_days` on a 365-day year, less withholding.
    ///
    /// `None` when an intermediate amount leaves the `Decimal` range.
    pub fn compute(
        principal: Decimal,
        annual_rate_percent: Decimal,
        term_days: i64,
        withholding_rate: Decimal,
    ) -> Option<Self> {
        let gross = rounding::money(
            principal
                .checked_mul(annual_rate_percent / HUNDRED)?
                .checked_mul(Decimal::from(term_days) / DAYS_PER_YEAR)?,
        );
        let tax = rounding::money(gross.checked_mul(withholding_rate / HUNDRED)?);
        let net = gross.checked_sub(tax)?;
        Some(Self {
            gross,
            tax,
            net,
            payout: principal.checked_add(net)?,
        })
    }
}

/// After-tax return over the whole term, as a fraction of principal.
pub fn net_yield_fraction(annual_rate_percent: Decimal, term_days: i64, withholding_rate: Decimal) -> Option<Decimal> {
    (annual_rate_percent / HUNDRED)
        .checked_mul(Decimal::from(term_days) / DAYS_PER_YEAR)?
        .checked_mul(Decimal::ONE - withholding_rate / HUNDRED)
}

/// Exchange rate at which holding this deposit matches holding the other
/// currency from `anchor_rate` onward.
pub fn break_even_rate(
    annual_rate_percent: Decimal,
    term_days: i64,
    anchor_rate: Decimal,
    withholding_rate: Decimal,
) -> Option<Decimal> {
    let net_yield = net_yield_fraction(annual_rate_percent, term_days, withholding_rate)?;
    let rate = anchor_rate.checked_mul(Decimal::ONE.checked_add(net_yield)?)?;
    Some(rounding::fx_rate(rate))
}

fn foreign_equivalent(principal: Decimal, fx_rate: Decimal) -> Option<Decimal> {
    if fx_rate.is_zero() {
        return Some(Decimal::ZERO);
    }
    principal.checked_div(fx_rate).map(rounding::fx_amount)
}

fn check_fx_rate(field: &'static str, rate: Decimal) -> Result<(), Rejection> {
    if rate > MAX_FX_RATE {
        return Err(Rejection::out_of_range(field, rate));
    }
    Ok(())
}

/// Foreign-equivalent principal and break-even rate of a local deposit at `fx_rate`.
fn local_rate_fields(
    principal: Decimal,
    rate: Decimal,
    term_days: i64,
    withholding: Decimal,
    fx_rate: Decimal,
) -> Result<(Decimal, Decimal), Rejection> {
    check_fx_rate("exchange rate", fx_rate)?;
    let equivalent =
        foreign_equivalent(principal, fx_rate).ok_or_else(|| Rejection::out_of_range("exchange rate", fx_rate))?;
    let break_even = break_even_rate(rate, term_days, fx_rate, withholding)
        .ok_or_else(|| Rejection::out_of_range("exchange rate", fx_rate))?;
    Ok((equivalent, break_even))
}

/// Turns deposit inputs into valued [`Deposit`] records.
///
/// The engine owns the [`Settings`] it validates against; the current
/// exchange rate is always passed in by the caller.
///
/// # Examples
///
/// ```
/// use deposit_engine::core::deposit::DepositInput;
/// use deposit_engine::valuation::engine::ValuationEngine;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let engine = ValuationEngine::default();
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = start + chrono::Duration::days(180);
/// let input = DepositInput::local("Akbank", dec!(100000), dec!(50), start, end);
///
/// let deposit = engine.evaluate(&input, dec!(30)).unwrap();
/// assert_eq!(deposit.net_interest_native(), dec!(22192));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    settings: Settings,
}

impl ValuationEngine {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Withholding percentage for a deposit opened with `term_days`.
    pub fn withholding_tier(&self, term_days: i64, currency: CurrencyType) -> Decimal {
        self.settings.schedule(currency).rate_for_term(term_days)
    }

    /// Validate `input` and compute every derived field.
    ///
    /// Local deposits take `current_fx_rate` as their opening rate. Foreign
    /// deposits use the explicit opening rate when given.
    pub fn evaluate(&self, input: &DepositInput, current_fx_rate: Decimal) -> Result<Deposit, Rejection> {
        let result = self.try_evaluate(input, current_fx_rate);
        match &result {
            Ok(deposit) => debug!(
                "evaluated {} deposit at {}: principal={} term={}d withholding={}% net={}",
                deposit.currency_type(),
                deposit.bank(),
                deposit.principal(),
                deposit.original_term_days(),
                deposit.withholding_rate(),
                deposit.net_interest_native()
            ),
            Err(rejection) => warn!("deposit rejected ({}): {}", rejection.code(), rejection),
        }
        result
    }

    fn try_evaluate(&self, input: &DepositInput, current_fx_rate: Decimal) -> Result<Deposit, Rejection> {
        let principal = rounding::money(input.principal);
        if principal <= Decimal::ZERO {
            return Err(Rejection::NonPositivePrincipal {
                principal: input.principal,
            });
        }
        if principal > MAX_PRINCIPAL {
            return Err(Rejection::out_of_range("principal", input.principal));
        }

        let term_days = (input.end_date - input.start_date).num_days();
        if term_days <= 0 {
            return Err(Rejection::NonPositiveTerm {
                start_date: input.start_date,
                end_date: input.end_date,
            });
        }

        let currency = input.currency_type;
        let rate = rounding::percent(
            input
                .annual_rate_percent
                .unwrap_or_else(|| self.settings.default_rate(currency)),
        );
        if rate < Decimal::ZERO {
            return Err(Rejection::NegativeRate { rate });
        }
        if rate > MAX_RATE_PERCENT {
            return Err(Rejection::out_of_range("annual rate", rate));
        }

        if !self.settings.accepts_bank(&input.bank) {
            return Err(Rejection::UnknownBank {
                bank: input.bank.clone(),
            });
        }

        let withholding = self.withholding_tier(term_days, currency);
        let interest = InterestBreakdown::compute(principal, rate, term_days, withholding)
            .ok_or_else(|| Rejection::out_of_range("principal", principal))?;
        let to_local = |amount: Decimal| {
            amount
                .checked_mul(current_fx_rate)
                .map(rounding::money)
                .ok_or_else(|| Rejection::out_of_range("exchange rate", current_fx_rate))
        };

        let (opening_fx_rate, valuation) = match currency {
            CurrencyType::Local => {
                let (foreign_equivalent_principal, break_even_rate) =
                    local_rate_fields(principal, rate, term_days, withholding, current_fx_rate)?;
                let valuation = LocalValuation {
                    gross_interest: interest.gross,
                    tax_amount: interest.tax,
                    net_interest: interest.net,
                    maturity_payout: interest.payout,
                    foreign_equivalent_principal,
                    break_even_rate,
                };
                (current_fx_rate, Valuation::Local(valuation))
            }
            CurrencyType::Foreign => {
                let opening = match input.opening_fx_rate {
                    Some(r) if r < Decimal::ZERO => {
                        return Err(Rejection::InvalidOpeningRate { rate: r });
                    }
                    Some(r) => rounding::fx_rate(r),
                    None => current_fx_rate,
                };
                check_fx_rate("exchange rate", current_fx_rate)?;
                check_fx_rate("opening exchange rate", opening)?;
                let valuation = ForeignValuation {
                    gross_interest_fx: interest.gross,
                    tax_amount_fx: interest.tax,
                    net_interest_fx: interest.net,
                    maturity_payout_fx: interest.payout,
                    gross_interest_local: to_local(interest.gross)?,
                    tax_amount_local: to_local(interest.tax)?,
                    net_interest_local: to_local(interest.net)?,
                    maturity_payout_local: to_local(interest.payout)?,
                    break_even_rate: break_even_rate(rate, term_days, opening, withholding)
                        .ok_or_else(|| Rejection::out_of_range("opening exchange rate", opening))?,
                };
                (opening, Valuation::Foreign(valuation))
            }
        };

        Ok(Deposit::new(
            input.bank.clone(),
            principal,
            rate,
            input.start_date,
            input.end_date,
            opening_fx_rate,
            withholding,
            valuation,
        ))
    }

    /// Copy of `deposit` with its rate-dependent fields re-derived at `new_fx_rate`.
    ///
    /// Only local deposits change. Native amounts and the withholding rate
    /// are left as they were at creation.
    pub fn refresh(deposit: &Deposit, new_fx_rate: Decimal) -> Result<Deposit, Rejection> {
        let mut refreshed = deposit.clone();
        Self::refresh_in_place(&mut refreshed, new_fx_rate)?;
        Ok(refreshed)
    }

    /// In-place form of [`ValuationEngine::refresh`]. Returns `true` when the
    /// deposit is local and was re-derived. On error the deposit is untouched.
    pub fn refresh_in_place(deposit: &mut Deposit, new_fx_rate: Decimal) -> Result<bool, Rejection> {
        let principal = deposit.principal();
        let rate = deposit.annual_rate_percent();
        let term_days = deposit.original_term_days();
        let withholding = deposit.withholding_rate();
        match deposit.valuation_mut() {
            Valuation::Local(v) => {
                let (equivalent, break_even) =
                    local_rate_fields(principal, rate, term_days, withholding, new_fx_rate)?;
                v.foreign_equivalent_principal = equivalent;
                v.break_even_rate = break_even;
                Ok(true)
            }
            Valuation::Foreign(_) => Ok(false),
        }
    }
}
