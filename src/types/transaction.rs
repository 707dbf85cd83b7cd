//! Teller operation types
//!
//! A [`TellerOperation`] is the unit of externally submitted work: one
//! deposit, withdrawal, or transfer against the bank.

use super::account::{AccountAmount, AccountNumber};
use std::fmt;

/// Kind of teller operation, without its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Deposit,
    Withdraw,
    Transfer,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Deposit => "deposit",
            OperationKind::Withdraw => "withdraw",
            OperationKind::Transfer => "transfer",
        };
        f.write_str(name)
    }
}

/// A teller operation with its arguments
///
/// Amounts are non-negative; the teller core asserts this, so anything
/// built from untrusted input must be validated first (see
/// `io::csv_format::convert_csv_record`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TellerOperation {
    /// Credit `amount` to `account` and its branch
    Deposit {
        account: AccountNumber,
        amount: AccountAmount,
    },

    /// Debit `amount` from `account` and its branch, if the balance allows it
    Withdraw {
        account: AccountNumber,
        amount: AccountAmount,
    },

    /// Move `amount` from `from` to `to`, if the source balance allows it
    Transfer {
        from: AccountNumber,
        to: AccountNumber,
        amount: AccountAmount,
    },
}

impl TellerOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            TellerOperation::Deposit { .. } => OperationKind::Deposit,
            TellerOperation::Withdraw { .. } => OperationKind::Withdraw,
            TellerOperation::Transfer { .. } => OperationKind::Transfer,
        }
    }

    pub fn amount(&self) -> AccountAmount {
        match *self {
            TellerOperation::Deposit { amount, .. }
            | TellerOperation::Withdraw { amount, .. }
            | TellerOperation::Transfer { amount, .. } => amount,
        }
    }
}
