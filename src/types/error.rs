//! Error types for the teller ledger
//!
//! Two error families live here:
//!
//! - [`TellerError`]: the outcome of a teller operation that did not commit.
//!   These are ordinary results reported back to the caller, never retried.
//! - [`LedgerError`]: errors of the surrounding program (file I/O, CSV
//!   parsing, bank construction, configuration, audit failures).

use super::account::{AccountAmount, AccountNumber, BranchId};
use thiserror::Error;

/// Reason a teller operation was rejected
///
/// Every variant is an atomic no-op: no balance was mutated and every lock
/// that was taken has already been released when the caller sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TellerError {
    /// An account number did not resolve through the registry
    ///
    /// Detected before any lock is taken.
    #[error("Account {account} not found")]
    AccountNotFound {
        /// The unresolvable account number
        account: AccountNumber,
    },

    /// The source balance was smaller than the requested amount
    ///
    /// Detected while every lock the operation needs is held.
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account that would have gone negative
        account: AccountNumber,
        /// Balance observed under lock
        balance: AccountAmount,
        /// Requested amount
        requested: AccountAmount,
    },

    /// Moving `delta` would push the account or its branch past the range of
    /// [`AccountAmount`]
    ///
    /// Detected while every lock the operation needs is held, before any
    /// balance is written.
    #[error("Adjusting account {account} by {delta} would overflow its balance or its branch balance")]
    BalanceOverflow {
        /// Account whose adjustment was refused
        account: AccountNumber,
        /// Requested change
        delta: AccountAmount,
    },
}

impl TellerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountNumber) -> Self {
        TellerError::AccountNotFound { account }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(
        account: AccountNumber,
        balance: AccountAmount,
        requested: AccountAmount,
    ) -> Self {
        TellerError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    /// Create a BalanceOverflow error
    pub fn balance_overflow(account: AccountNumber, delta: AccountAmount) -> Self {
        TellerError::BalanceOverflow { account, delta }
    }
}

/// Errors of the program surrounding the teller core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error
    ///
    /// Recoverable for operation files: the record is skipped.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Text that is not a valid account number
    #[error("Invalid account number '{value}'")]
    InvalidAccountNumber {
        /// The offending text
        value: String,
    },

    /// Unknown teller operation name
    #[error("Invalid operation '{op}'")]
    InvalidOperation {
        /// The offending operation name
        op: String,
    },

    /// Amount that is malformed or negative
    #[error("Invalid amount '{amount}'")]
    InvalidAmount {
        /// The offending amount text
        amount: String,
    },

    /// Transfer record without a destination account
    #[error("Transfer from account {account} requires a destination account")]
    MissingCounterparty {
        /// Source account of the incomplete transfer
        account: AccountNumber,
    },

    /// The same account number was registered twice
    #[error("Duplicate account {account}")]
    DuplicateAccount {
        /// The duplicated account number
        account: AccountNumber,
    },

    /// An account decodes to a branch the bank does not have
    #[error("Account {account} belongs to branch {}, but the bank has {branches} branches", account.branch())]
    UnknownBranch {
        /// The misplaced account
        account: AccountNumber,
        /// Number of branches in the bank
        branches: u32,
    },

    /// An account balance is negative
    #[error("Account {account} has negative balance {balance}")]
    NegativeBalance {
        /// The offending account
        account: AccountNumber,
        /// Its balance
        balance: AccountAmount,
    },

    /// A branch aggregate disagrees with the sum of its accounts
    #[error("Branch {branch} balance {recorded} does not match its accounts' total {expected}")]
    BranchMismatch {
        /// The inconsistent branch
        branch: BranchId,
        /// Balance recorded on the branch
        recorded: AccountAmount,
        /// Sum of the branch's account balances
        expected: AccountAmount,
    },

    /// The bank total moved by something other than deposits and withdrawals
    #[error("Bank total {actual} does not match expected total {expected}")]
    TotalMismatch {
        /// Opening total plus net deposits and withdrawals
        expected: AccountAmount,
        /// Total observed at the end of the run
        actual: AccountAmount,
    },

    /// A sum of balances does not fit in [`AccountAmount`]
    #[error("Balance overflow in {scope}")]
    BalanceOverflow {
        /// What was being summed
        scope: String,
    },

    /// Configuration that cannot describe a bank
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// The concurrent runtime failed
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the failure
        message: String,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// Create a ParseError error
    pub fn parse_error(line: Option<u64>, message: impl Into<String>) -> Self {
        LedgerError::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an InvalidAccountNumber error
    pub fn invalid_account_number(value: &str) -> Self {
        LedgerError::InvalidAccountNumber {
            value: value.to_string(),
        }
    }

    /// Create an InvalidOperation error
    pub fn invalid_operation(op: &str) -> Self {
        LedgerError::InvalidOperation { op: op.to_string() }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
        }
    }

    /// Create a BalanceOverflow error
    pub fn balance_overflow(scope: impl Into<String>) -> Self {
        LedgerError::BalanceOverflow {
            scope: scope.into(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        LedgerError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a Runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        LedgerError::Runtime {
            message: message.into(),
        }
    }
}
