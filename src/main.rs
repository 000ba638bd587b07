//! deposit-engine CLI
//!
//! Value fixed-term deposits and summarize a deposit portfolio from the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! # Value a single deposit
//! deposit-engine evaluate --type local --bank Akbank --principal 100000 \
//!     --rate 50 --start 2024-01-01 --end 2024-06-29 --fx-rate 30
//!
//! # Summarize the active portfolio in a JSON file
//! deposit-engine summary --input deposits.json --fx-rate 32.5
//!
//! # Export the workbook
//! deposit-engine export --input deposits.json --output portfolio.json
//!
//! # Generate a random portfolio for testing
//! deposit-engine generate --count 25
//! ```

use chrono::{Local, NaiveDate, Utc};
use deposit_engine::core::currency::CurrencyType;
use deposit_engine::core::deposit::{Deposit, DepositInput, Valuation};
use deposit_engine::core::settings::Settings;
use deposit_engine::export::workbook::Workbook;
use deposit_engine::portfolio::summary::PortfolioSummary;
use deposit_engine::session::rates::{parse_rate, EnvRateProvider, FixedRateProvider, RateProvider, FX_RATE_ENV};
use deposit_engine::session::store::Session;
use deposit_engine::simulation::portfolio_generator::{generate_random_portfolio, PortfolioConfig};
use log::{info, warn};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"deposit-engine — fixed-term deposit valuation and portfolio summaries

USAGE:
    deposit-engine <COMMAND> [OPTIONS]

COMMANDS:
    evaluate    Value a single deposit
    summary     Summarize the deposits in a JSON file
    export      Write the portfolio workbook as JSON
    generate    Generate random deposit inputs (for testing)
    help        Show this message

OPTIONS (evaluate):
    --type <local|foreign>  Currency type (default: local)
    --bank <NAME>           Bank name
    --principal <AMOUNT>    Principal in the deposit's currency
    --rate <PERCENT>        Annual interest rate (default: configured per type)
    --start <YYYY-MM-DD>    Start date
    --end <YYYY-MM-DD>      End date
    --opening-rate <RATE>   Opening exchange rate (foreign deposits)

OPTIONS (summary, export):
    --input <FILE>          Path to JSON deposits file
    --output <FILE>         Write to file instead of stdout (export)
    --all                   Include matured deposits (summary)

COMMON OPTIONS:
    --fx-rate <RATE>        Current exchange rate (default: ${env})
    --as-of <YYYY-MM-DD>    Evaluation date (default: today)
    --config <FILE>         Settings JSON file
    --format <FORMAT>       Output format: text (default) or json

OPTIONS (generate):
    --count <N>             Number of deposits (default: 20)
    --foreign-ratio <F>     Share of foreign deposits, 0-1 (default: 0.3)
    --output <FILE>         Write to file instead of stdout

EXAMPLES:
    deposit-engine evaluate --type foreign --bank Halkbank --principal 1000 --rate 5 \
        --start 2024-01-01 --end 2025-02-04 --fx-rate 30
    deposit-engine summary --input deposits.json --format json
    deposit-engine generate --count 50 --output deposits.json"#,
        env = FX_RATE_ENV
    );
}

/// JSON schema for input deposits.
#[derive(serde::Deserialize, serde::Serialize)]
struct DepositsFile {
    deposits: Vec<DepositInput>,
}

/// Options shared by every command that builds a session.
struct CommonOptions {
    fx_rate: Option<Decimal>,
    as_of: NaiveDate,
    config_path: Option<String>,
    format: String,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            fx_rate: None,
            as_of: Local::now().date_naive(),
            config_path: None,
            format: "text".to_string(),
        }
    }
}

impl CommonOptions {
    /// Consume a common flag at `args[*i]`. Returns `false` if the flag is not common.
    fn parse(&mut self, args: &[String], i: &mut usize) -> bool {
        match args[*i].as_str() {
            "--fx-rate" => {
                let value = take_value(args, i, "--fx-rate", "an exchange rate");
                self.fx_rate = Some(parse_rate(&value).unwrap_or_else(|e| {
                    eprintln!("Invalid --fx-rate: {}", e);
                    process::exit(1);
                }));
            }
            "--as-of" => {
                let value = take_value(args, i, "--as-of", "a date");
                self.as_of = parse_date("--as-of", &value);
            }
            "--config" => {
                self.config_path = Some(take_value(args, i, "--config", "a file path"));
            }
            "--format" => {
                self.format = take_value(args, i, "--format", "'text' or 'json'");
            }
            _ => return false,
        }
        true
    }

    fn settings(&self) -> Settings {
        match &self.config_path {
            Some(path) => Settings::from_json_file(path).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                process::exit(1);
            }),
            None => Settings::default(),
        }
    }

    fn session(&self) -> Session {
        let settings = self.settings();
        match self.fx_rate {
            Some(rate) => Session::with_provider(settings, &FixedRateProvider::new(rate)),
            None => {
                let provider = EnvRateProvider::default();
                info!("no --fx-rate given, reading {}", provider.name());
                Session::with_provider(settings, &provider)
            }
        }
    }

    fn json(&self) -> bool {
        self.format == "json"
    }
}

fn take_value(args: &[String], i: &mut usize, flag: &str, what: &str) -> String {
    *i += 1;
    args.get(*i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, what);
        process::exit(1);
    })
}

fn parse_date(flag: &str, value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or_else(|e| {
        eprintln!("Invalid date for {} '{}': {}", flag, value, e);
        process::exit(1);
    })
}

fn parse_decimal(flag: &str, value: &str) -> Decimal {
    value.parse().unwrap_or_else(|e| {
        eprintln!("Invalid number for {} '{}': {}", flag, value, e);
        process::exit(1);
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    })
}

fn load_session(path: &str, common: &CommonOptions) -> Session {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: DepositsFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "deposits": [
    {{ "currency_type": "LOCAL", "bank": "Akbank", "principal": "100000",
       "annual_rate_percent": "50", "start_date": "2024-01-01", "end_date": "2024-06-29" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let mut session = common.session();
    if session.fx_rate().is_zero() {
        warn!("exchange rate is zero; foreign amounts will convert to zero");
    }
    for (index, rejection) in session.add_all(&file.deposits) {
        eprintln!("Skipping deposit #{}: {} ({})", index, rejection, rejection.code());
    }
    session
}

fn print_deposit(deposit: &Deposit, as_of: NaiveDate) {
    println!("=== {} Deposit ===", deposit.currency_type());
    println!("Bank:               {}", deposit.bank());
    println!("Principal:          {}", deposit.principal());
    println!("Annual Rate:        {}%", deposit.annual_rate_percent());
    println!("Term:               {} → {}", deposit.start_date(), deposit.end_date());
    println!("Original Term:      {} days", deposit.original_term_days());
    println!("Remaining:          {} days", deposit.remaining_days(as_of));
    println!("Withholding Rate:   {}%", deposit.withholding_rate());
    match deposit.valuation() {
        Valuation::Local(v) => {
            println!("Gross Interest:     {}", v.gross_interest);
            println!("Withholding Tax:    {}", v.tax_amount);
            println!("Net Interest:       {}", v.net_interest);
            println!("Maturity Payout:    {}", v.maturity_payout);
            println!("Foreign Equivalent: {}", v.foreign_equivalent_principal);
        }
        Valuation::Foreign(v) => {
            println!("Gross Interest:     {} (local {})", v.gross_interest_fx, v.gross_interest_local);
            println!("Withholding Tax:    {} (local {})", v.tax_amount_fx, v.tax_amount_local);
            println!("Net Interest:       {} (local {})", v.net_interest_fx, v.net_interest_local);
            println!("Maturity Payout:    {} (local {})", v.maturity_payout_fx, v.maturity_payout_local);
        }
    }
    println!("Opening Rate:       {}", deposit.opening_fx_rate());
    println!("Break-even Rate:    {}", deposit.break_even_rate());
}

fn cmd_evaluate(args: &[String]) {
    let mut common = CommonOptions::default();
    let mut currency = CurrencyType::Local;
    let mut bank = None;
    let mut principal = None;
    let mut rate = None;
    let mut start = None;
    let mut end = None;
    let mut opening_rate = None;
    let mut i = 0;
    while i < args.len() {
        if !common.parse(args, &mut i) {
            match args[i].as_str() {
                "--type" => {
                    let value = take_value(args, &mut i, "--type", "'local' or 'foreign'");
                    currency = value.parse().unwrap_or_else(|e| {
                        eprintln!("{}", e);
                        process::exit(1);
                    });
                }
                "--bank" => bank = Some(take_value(args, &mut i, "--bank", "a bank name")),
                "--principal" => {
                    let value = take_value(args, &mut i, "--principal", "an amount");
                    principal = Some(parse_decimal("--principal", &value));
                }
                "--rate" => {
                    let value = take_value(args, &mut i, "--rate", "a percentage");
                    rate = Some(parse_decimal("--rate", &value));
                }
                "--start" => {
                    let value = take_value(args, &mut i, "--start", "a date");
                    start = Some(parse_date("--start", &value));
                }
                "--end" => {
                    let value = take_value(args, &mut i, "--end", "a date");
                    end = Some(parse_date("--end", &value));
                }
                "--opening-rate" => {
                    let value = take_value(args, &mut i, "--opening-rate", "an exchange rate");
                    opening_rate = Some(parse_decimal("--opening-rate", &value));
                }
                _ => {
                    eprintln!("Unknown option: {}", args[i]);
                    process::exit(1);
                }
            }
        }
        i += 1;
    }

    let (bank, principal, start, end) = match (bank, principal, start, end) {
        (Some(b), Some(p), Some(s), Some(e)) => (b, p, s, e),
        _ => {
            eprintln!("Error: --bank, --principal, --start and --end are required");
            process::exit(1);
        }
    };

    let input = DepositInput {
        currency_type: currency,
        bank: bank.as_str().into(),
        principal,
        annual_rate_percent: rate,
        start_date: start,
        end_date: end,
        opening_fx_rate: opening_rate,
    };

    let mut session = common.session();
    let deposit = match session.add(&input) {
        Ok(d) => d,
        Err(rejection) => {
            if common.json() {
                println!("{}", to_json(&rejection));
            } else {
                eprintln!("Rejected: {}", rejection);
            }
            process::exit(2);
        }
    };

    if common.json() {
        println!("{}", to_json(deposit));
    } else {
        print_deposit(deposit, common.as_of);
    }
}

fn cmd_summary(args: &[String]) {
    let mut common = CommonOptions::default();
    let mut input_path = None;
    let mut full_history = false;
    let mut i = 0;
    while i < args.len() {
        if !common.parse(args, &mut i) {
            match args[i].as_str() {
                "--input" => input_path = Some(take_value(args, &mut i, "--input", "a file path")),
                "--all" => full_history = true,
                _ => {
                    eprintln!("Unknown option: {}", args[i]);
                    process::exit(1);
                }
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let session = load_session(&path, &common);
    let summary: PortfolioSummary = if full_history {
        session.overview(common.as_of)
    } else {
        session.summary(common.as_of)
    };

    if common.json() {
        println!("{}", to_json(&summary));
    } else {
        print!("{}", summary);
    }
}

fn cmd_export(args: &[String]) {
    let mut common = CommonOptions::default();
    let mut input_path = None;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        if !common.parse(args, &mut i) {
            match args[i].as_str() {
                "--input" => input_path = Some(take_value(args, &mut i, "--input", "a file path")),
                "--output" => output_path = Some(take_value(args, &mut i, "--output", "a file path")),
                _ => {
                    eprintln!("Unknown option: {}", args[i]);
                    process::exit(1);
                }
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let session = load_session(&path, &common);
    if session.is_empty() {
        eprintln!("Nothing to export: no valid deposits in '{}'", path);
        process::exit(1);
    }

    let summary = session.summary(common.as_of);
    let workbook = Workbook::build(session.deposits(), &summary, Utc::now());

    if let Some(out) = output_path {
        workbook.write_json(&out).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        });
        eprintln!(
            "Exported {} deposits in {} sheets → {}",
            session.len(),
            workbook.sheets.len(),
            out
        );
    } else {
        println!("{}", to_json(&workbook));
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = PortfolioConfig {
        anchor: Local::now().date_naive(),
        ..Default::default()
    };
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--count" => {
                i += 1;
                config.deposit_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--count requires a number");
                        process::exit(1);
                    });
            }
            "--foreign-ratio" => {
                i += 1;
                config.foreign_ratio = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--foreign-ratio requires a number between 0 and 1");
                        process::exit(1);
                    });
            }
            "--output" => {
                output_path = Some(take_value(args, &mut i, "--output", "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let file = DepositsFile {
        deposits: generate_random_portfolio(&config),
    };
    let json = to_json(&file);

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!("Generated {} deposits → {}", file.deposits.len(), path);
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "evaluate" => cmd_evaluate(rest),
        "summary" => cmd_summary(rest),
        "export" => cmd_export(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
