// CLI module
// Command-line interface, argument parsing and the run pipeline

mod args;

pub use args::{CliArgs, ReportType, StrategyType};

use crate::core::{AccountRegistry, Bank, TellerEngine, TellerStats};
use crate::io::{read_opening_balances, write_accounts_csv, write_branches_csv, SyncReader};
use crate::strategy::create_strategy;
use crate::types::{AccountAmount, AccountNumber, LedgerError, TellerOperation};
use crate::workload;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints a message and exits the
/// process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Outcome of a complete run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: TellerStats,
    /// Operation records skipped because they could not be parsed
    pub skipped_records: u64,
    pub opening_total: AccountAmount,
    pub closing_total: AccountAmount,
}

/// Build the bank, run every operation, audit the result and write the
/// requested report to `output`
///
/// # Errors
///
/// Fatal errors only: unreadable input, an invalid bank, a failed teller
/// runtime, or an audit that finds the ledger inconsistent. Unparseable
/// operation records and rejected operations are logged and counted.
pub fn run(args: &CliArgs, output: &mut dyn Write) -> Result<RunSummary, LedgerError> {
    let bank = build_bank(args)?;
    let (operations, skipped_records) = load_operations(args, &bank)?;

    let engine = Arc::new(TellerEngine::new(Arc::new(bank)));
    let opening_total = engine.bank().snapshot().total()?;

    info!(
        operations = operations.len(),
        strategy = ?args.strategy,
        "processing operations"
    );
    let strategy = create_strategy(args.strategy.clone(), Some(args.to_teller_config()));
    strategy.process(&engine, operations)?;

    let stats = engine.stats();
    let snapshot = engine.bank().snapshot();
    snapshot.verify()?;

    let closing_total = snapshot.total()?;
    let expected = opening_total
        .checked_add(stats.net_external)
        .ok_or_else(|| LedgerError::balance_overflow("expected bank total"))?;
    if closing_total != expected {
        return Err(LedgerError::TotalMismatch {
            expected,
            actual: closing_total,
        });
    }

    info!(
        succeeded = stats.succeeded,
        account_not_found = stats.account_not_found,
        insufficient_funds = stats.insufficient_funds,
        balance_overflow = stats.balance_overflow,
        skipped_records,
        opening_total,
        closing_total,
        "ledger balanced"
    );

    match args.report {
        ReportType::Accounts => write_accounts_csv(&snapshot.accounts, output)?,
        ReportType::Branches => write_branches_csv(&snapshot.branches, output)?,
    }

    Ok(RunSummary {
        stats,
        skipped_records,
        opening_total,
        closing_total,
    })
}

fn build_bank(args: &CliArgs) -> Result<Bank, LedgerError> {
    match &args.accounts_file {
        Some(path) => Bank::from_opening_balances(args.branches, read_opening_balances(path)?),
        None => Bank::uniform(&args.to_bank_config()?),
    }
}

fn load_operations(
    args: &CliArgs,
    bank: &Bank,
) -> Result<(Vec<TellerOperation>, u64), LedgerError> {
    if let Some(config) = args.to_workload_config() {
        let accounts: Vec<AccountNumber> = bank
            .registry()
            .accounts()
            .map(|account| account.number())
            .collect();
        return Ok((workload::generate(&accounts, &config)?, 0));
    }

    let path = args
        .input_file
        .as_deref()
        .ok_or_else(|| LedgerError::invalid_config("no operations file and no --simulate"))?;

    let mut operations = Vec::new();
    let mut skipped = 0;
    for record in SyncReader::new(path)? {
        match record {
            Ok(operation) => operations.push(operation),
            Err(e) => {
                warn!(error = %e, "skipping operation record");
                skipped += 1;
            }
        }
    }

    Ok((operations, skipped))
}
