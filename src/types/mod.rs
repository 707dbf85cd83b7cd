//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: identifiers, amounts and balance rows
//! - `transaction`: teller operations
//! - `error`: teller outcomes and ledger errors

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{AccountAmount, AccountBalance, AccountNumber, BranchBalance, BranchId};
pub use error::{LedgerError, TellerError};
pub use transaction::{OperationKind, TellerOperation};
