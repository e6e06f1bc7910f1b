//! Scheduled job runner for Akiba.
//!
//! Usage:
//!   sweeper maturity [--as-of YYYY-MM-DD] [--dry-run]
//!       Mature due investments and post their interest.
//!   sweeper annual-interest --year YYYY [--dry-run]
//!       Post the annual 15% interest on uninvested balances.
//!
//! Per-account failures are reported in the summary and never abort the
//! run; the process exits nonzero only on infrastructure failure.

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use akiba_db::{connect, AccrualRepository, InvestmentRepository, LedgerRepository};
use akiba_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "akiba=info,sweeper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    let ledger = LedgerRepository::new(db.clone());

    match args.command {
        Command::Maturity { as_of, dry_run } => {
            let investments = InvestmentRepository::new(db, ledger);
            let summary = investments.sweep_maturities(as_of, dry_run).await?;

            info!(
                as_of = %as_of,
                dry_run,
                processed = summary.processed,
                matured = summary.matured.len(),
                not_yet_due = summary.not_yet_due,
                failed = summary.failures.len(),
                "maturity sweep complete"
            );
            for matured in &summary.matured {
                info!(
                    investment = %matured.investment_id,
                    member = %matured.member_id,
                    interest = %matured.interest,
                    "{}",
                    if dry_run { "would mature" } else { "matured" }
                );
            }
            for failure in &summary.failures {
                warn!(
                    investment = %failure.investment_id,
                    member = %failure.member_id,
                    error = %failure.error,
                    "investment failed"
                );
            }
        }
        Command::AnnualInterest { year, dry_run } => {
            let accrual = AccrualRepository::new(db, ledger);
            let summary = accrual.run(year, dry_run).await?;

            info!(
                year,
                dry_run,
                posted = summary.posted.len(),
                skipped_existing = summary.skipped_existing,
                zero_interest = summary.zero_interest,
                failed = summary.failures.len(),
                "annual interest accrual complete"
            );
            for posting in &summary.posted {
                info!(
                    member = %posting.member_id,
                    amount = %posting.amount,
                    "{}",
                    if dry_run { "would credit" } else { "credited" }
                );
            }
            for failure in &summary.failures {
                warn!(member = %failure.member_id, error = %failure.error, "member failed");
            }
        }
    }

    Ok(())
}

struct Args {
    command: Command,
}

enum Command {
    Maturity { as_of: NaiveDate, dry_run: bool },
    AnnualInterest { year: i32, dry_run: bool },
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let args: Vec<String> = args.collect();
        let Some(command) = args.first() else {
            anyhow::bail!("usage: sweeper <maturity|annual-interest> [options]");
        };

        let mut dry_run = false;
        let mut year: Option<i32> = None;
        let mut as_of: Option<NaiveDate> = None;

        let mut rest = args[1..].iter();
        while let Some(flag) = rest.next() {
            match flag.as_str() {
                "--dry-run" => dry_run = true,
                "--year" => {
                    let value = rest
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--year requires a value"))?;
                    year = Some(value.parse()?);
                }
                "--as-of" => {
                    let value = rest
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--as-of requires a value"))?;
                    as_of = Some(value.parse()?);
                }
                other => anyhow::bail!("unknown flag: {other}"),
            }
        }

        let command = match command.as_str() {
            "maturity" => Command::Maturity {
                as_of: as_of.unwrap_or_else(|| Utc::now().date_naive()),
                dry_run,
            },
            "annual-interest" => Command::AnnualInterest {
                year: year.ok_or_else(|| anyhow::anyhow!("annual-interest requires --year"))?,
                dry_run,
            },
            other => anyhow::bail!("unknown command: {other}"),
        };

        Ok(Self { command })
    }
}
