//! Build a small deposit portfolio and print its summary.
//!
//! Shows the valuation of a local and a foreign deposit, the effect of an
//! exchange-rate change, and the active-portfolio breakdown.

use chrono::NaiveDate;
use deposit_engine::core::deposit::DepositInput;
use deposit_engine::core::settings::Settings;
use deposit_engine::session::rates::FixedRateProvider;
use deposit_engine::session::store::Session;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  deposit-engine: Basic Portfolio Example ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut session = Session::with_provider(Settings::default(), &FixedRateProvider::new(dec!(30)));
    let today = date(2024, 3, 1);

    // --- Scenario 1: Local deposit ---
    println!("━━━ Scenario 1: Local Deposit ━━━\n");

    let local = session
        .add(&DepositInput::local(
            "Akbank",
            dec!(100_000),
            dec!(50),
            date(2024, 1, 1),
            date(2024, 6, 29),
        ))
        .unwrap()
        .clone();
    let v = local.as_local().unwrap();
    println!("  Principal:         {}", local.principal());
    println!("  Term:              {} days", local.original_term_days());
    println!("  Withholding:       {}%", local.withholding_rate());
    println!("  Gross interest:    {}", v.gross_interest);
    println!("  Tax:               {}", v.tax_amount);
    println!("  Net interest:      {}", v.net_interest);
    println!("  Payout:            {}", v.maturity_payout);
    println!("  Break-even rate:   {}\n", v.break_even_rate);

    // --- Scenario 2: Foreign deposit ---
    println!("━━━ Scenario 2: Foreign Deposit ━━━\n");

    let foreign = session
        .add(
            &DepositInput::foreign("Halkbank", dec!(1_000), dec!(5), date(2024, 1, 1), date(2025, 2, 4))
                .with_opening_fx_rate(dec!(29.5)),
        )
        .unwrap()
        .clone();
    let v = foreign.as_foreign().unwrap();
    println!("  Principal (USD):   {}", foreign.principal());
    println!("  Term:              {} days", foreign.original_term_days());
    println!("  Net interest:      {} USD ({} local)", v.net_interest_fx, v.net_interest_local);
    println!("  Break-even rate:   {} (opened at {})\n", v.break_even_rate, foreign.opening_fx_rate());

    // --- Scenario 3: Rate moves ---
    println!("━━━ Scenario 3: Exchange Rate Moves to 34 ━━━\n");

    let before = session.summary(today);
    session.refresh_rate(&FixedRateProvider::new(dec!(34)));
    let after = session.summary(today);
    println!("  Portfolio value:   {} → {}", before.metrics.total_principal, after.metrics.total_principal);
    println!(
        "  Local break-even:  {} → {}\n",
        local.break_even_rate(),
        session.deposits()[0].break_even_rate()
    );

    println!("{}", after);
}
