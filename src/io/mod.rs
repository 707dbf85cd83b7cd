//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, report serialization)
//! - `sync_reader` - Streaming operation reader and opening balance loader

pub mod csv_format;
pub mod sync_reader;

pub use csv_format::{
    convert_account_record, convert_csv_record, write_accounts_csv, write_branches_csv,
    CsvAccountRecord, CsvRecord,
};
pub use sync_reader::{read_opening_balances, SyncReader};
