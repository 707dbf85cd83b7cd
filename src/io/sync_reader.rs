//! Synchronous CSV readers
//!
//! - [`SyncReader`] streams teller operations from an operations file
//!   (`op,account,to,amount`), one record at a time.
//! - [`read_opening_balances`] loads a whole opening balance file
//!   (`account,balance`) for bank construction.
//!
//! Both delegate record conversion to the `csv_format` module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()` /
//!   `read_opening_balances`
//! - Operation records that fail to parse are yielded as `Err` items carrying
//!   their line number, so callers can log and skip them
//! - A bad opening balance row is fatal: a bank built from a partial account
//!   list would silently lose money

use crate::io::csv_format::{
    convert_account_record, convert_csv_record, CsvAccountRecord, CsvRecord,
};
use crate::types::{AccountAmount, AccountNumber, LedgerError, TellerOperation};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

fn open_csv(path: &Path) -> Result<csv::Reader<File>, LedgerError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LedgerError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LedgerError::from(e),
    })?;

    Ok(ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .buffer_capacity(8 * 1024)
        .from_reader(file))
}

/// Streaming reader of teller operations
///
/// # Examples
///
/// ```no_run
/// use teller_ledger::io::sync_reader::SyncReader;
/// use std::path::Path;
///
/// let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
/// let operations: Vec<_> = reader.filter_map(Result::ok).collect();
/// println!("Parsed {} operations", operations.len());
/// ```
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Open an operations file
    ///
    /// The CSV reader trims whitespace from all fields and allows a missing
    /// trailing `to` column.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        Ok(Self {
            reader: open_csv(path)?,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<TellerOperation, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.reader.deserialize::<CsvRecord>().next()?;
        self.line_num += 1;
        let line = self.line_num;

        Some(match next {
            Ok(record) => convert_csv_record(record)
                .map_err(|e| LedgerError::parse_error(Some(line), e.to_string())),
            Err(e) => Err(LedgerError::parse_error(Some(line), e.to_string())),
        })
    }
}

/// Read every `(account, opening balance)` row of a balances file
///
/// # Errors
///
/// Fails on the first unreadable or invalid row.
pub fn read_opening_balances(
    path: &Path,
) -> Result<Vec<(AccountNumber, AccountAmount)>, LedgerError> {
    let mut reader = open_csv(path)?;
    let mut accounts = Vec::new();

    for (index, row) in reader.deserialize::<CsvAccountRecord>().enumerate() {
        let line = index as u64 + 2;
        let pair = row
            .map_err(LedgerError::from)
            .and_then(convert_account_record)
            .map_err(|e| LedgerError::parse_error(Some(line), e.to_string()))?;
        accounts.push(pair);
    }

    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BranchId;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn account(branch: u32, sequence: u32) -> AccountNumber {
        AccountNumber::new(BranchId::new(branch), sequence)
    }

    #[test]
    fn test_sync_reader_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));
        assert_eq!(
            result.unwrap_err(),
            LedgerError::FileNotFound {
                path: "nonexistent.csv".to_string()
            }
        );
    }

    #[test]
    fn test_sync_reader_iterates_all_operation_kinds() {
        let file = create_temp_csv(
            "op,account,to,amount\n\
             deposit,1:0,,10\n\
             withdraw,1:0,,4\n\
             transfer,1:0,2:0,3\n",
        );

        let operations: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(
            operations,
            vec![
                Ok(TellerOperation::Deposit { account: account(1, 0), amount: 10 }),
                Ok(TellerOperation::Withdraw { account: account(1, 0), amount: 4 }),
                Ok(TellerOperation::Transfer { from: account(1, 0), to: account(2, 0), amount: 3 }),
            ]
        );
    }

    #[test]
    fn test_sync_reader_continues_after_bad_record_with_line_number() {
        let file = create_temp_csv(
            "op,account,to,amount\n\
             deposit,1:0,,10\n\
             deposit,1:0,,-10\n\
             deposit,1:1,,5\n",
        );

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 3);
        assert!(records[0].is_ok());
        assert!(records[2].is_ok());

        let error = records[1].as_ref().unwrap_err().to_string();
        assert!(error.contains("line 3"), "{error}");
        assert!(error.contains("Invalid amount"), "{error}");
    }

    #[test]
    fn test_sync_reader_handles_whitespace_and_short_rows() {
        let file = create_temp_csv("op,account,to,amount\n  deposit ,  0:1 ,  , 7 \n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(
            records,
            vec![Ok(TellerOperation::Deposit { account: account(0, 1), amount: 7 })]
        );
    }

    #[test]
    fn test_sync_reader_empty_file_after_header() {
        let file = create_temp_csv("op,account,to,amount\n");
        assert_eq!(SyncReader::new(file.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_read_opening_balances() {
        let file = create_temp_csv("account,balance\n0:0,100\n1:0, 50\n");

        let accounts = read_opening_balances(file.path()).unwrap();

        assert_eq!(accounts, vec![(account(0, 0), 100), (account(1, 0), 50)]);
    }

    #[test]
    fn test_read_opening_balances_rejects_bad_row() {
        let file = create_temp_csv("account,balance\n0:0,100\n1:0,lots\n");

        let error = read_opening_balances(file.path()).unwrap_err();

        assert!(matches!(error, LedgerError::ParseError { line: Some(3), .. }));
    }
}
