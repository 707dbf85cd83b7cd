//! CSV format handling for operations, opening balances and reports
//!
//! This module centralizes all CSV format concerns:
//! - `CsvRecord` / `convert_csv_record` for teller operation rows
//!   (`op,account,to,amount`)
//! - `CsvAccountRecord` / `convert_account_record` for opening balance rows
//!   (`account,balance`)
//! - report writers for account and branch balances
//!
//! All functions are pure (no file access) for easy testing. Input amounts
//! are validated here: a negative amount in a file is a bad record, never a
//! call into the teller core.

use crate::types::{
    AccountAmount, AccountBalance, AccountNumber, BranchBalance, LedgerError, TellerOperation,
};
use serde::Deserialize;
use std::io::Write;

/// Teller operation row
///
/// `to` is only meaningful for transfers and may be empty otherwise.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub account: String,
    pub to: Option<String>,
    pub amount: String,
}

/// Opening balance row
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvAccountRecord {
    pub account: String,
    pub balance: String,
}

fn parse_amount(text: &str) -> Result<AccountAmount, LedgerError> {
    match text.trim().parse::<AccountAmount>() {
        Ok(amount) if amount >= 0 => Ok(amount),
        _ => Err(LedgerError::invalid_amount(text)),
    }
}

/// Convert a CsvRecord to a TellerOperation
///
/// Operation names are case-insensitive; `withdrawal` is accepted as an
/// alias of `withdraw`.
///
/// # Errors
///
/// - `InvalidOperation` for an unknown operation name
/// - `InvalidAccountNumber` for a malformed account
/// - `InvalidAmount` for a malformed or negative amount
/// - `MissingCounterparty` for a transfer without a destination
pub fn convert_csv_record(record: CsvRecord) -> Result<TellerOperation, LedgerError> {
    let account: AccountNumber = record.account.parse()?;
    let amount = parse_amount(&record.amount)?;

    match record.op.trim().to_lowercase().as_str() {
        "deposit" => Ok(TellerOperation::Deposit { account, amount }),
        "withdraw" | "withdrawal" => Ok(TellerOperation::Withdraw { account, amount }),
        "transfer" => {
            let to = match record.to.as_deref().map(str::trim) {
                Some(to) if !to.is_empty() => to.parse::<AccountNumber>()?,
                _ => return Err(LedgerError::MissingCounterparty { account }),
            };
            Ok(TellerOperation::Transfer {
                from: account,
                to,
                amount,
            })
        }
        _ => Err(LedgerError::invalid_operation(&record.op)),
    }
}

/// Convert a CsvAccountRecord to an `(account, opening balance)` pair
pub fn convert_account_record(
    record: CsvAccountRecord,
) -> Result<(AccountNumber, AccountAmount), LedgerError> {
    let account: AccountNumber = record.account.parse()?;
    let balance = parse_amount(&record.balance)?;
    Ok((account, balance))
}

/// Write account balances as `account,branch,balance`, sorted by account
pub fn write_accounts_csv(
    accounts: &[AccountBalance],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["account", "branch", "balance"])?;

    let mut sorted = accounts.to_vec();
    sorted.sort_by_key(|row| row.account);

    for row in sorted {
        writer.write_record(&[
            row.account.to_string(),
            row.account.branch().to_string(),
            row.balance.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write branch balances as `branch,balance`, sorted by branch
pub fn write_branches_csv(
    branches: &[BranchBalance],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["branch", "balance"])?;

    let mut sorted = branches.to_vec();
    sorted.sort_by_key(|row| row.branch);

    for row in sorted {
        writer.write_record(&[row.branch.to_string(), row.balance.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}
