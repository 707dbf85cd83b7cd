//! Teller Ledger Library
//!
//! # Overview
//!
//! A concurrent bank ledger. Tellers run deposits, withdrawals and transfers
//! in parallel against accounts grouped into branches. There is no bank-wide
//! lock: every account and every branch has its own lock, and a single global
//! acquisition order makes the protocol deadlock-free.
//!
//! # Architecture
//!
//! - [`types`] - Identifiers, operations and errors
//! - [`core`] - The ledger:
//!   - [`core::bank`] - Bank, branch and account state
//!   - [`core::locking`] - Global lock order and RAII lock sets
//!   - [`core::teller`] - Deposit, withdraw and transfer
//!   - [`core::audit`] - Consistent snapshots and balance validation
//!   - [`core::engine`] - Operation dispatch and outcome counters
//! - [`io`] - CSV input and reports
//! - [`strategy`] - Single-teller and multi-teller execution
//! - [`workload`] - Seeded random operation streams
//! - [`cli`] - Argument parsing and the run pipeline
//!
//! # Invariants
//!
//! - No committed operation leaves an account negative
//! - At a quiescent point every branch balance equals the sum of its accounts
//! - Transfers never change the bank total
//! - Every lock an operation takes is released on every exit path
//!
//! # Example
//!
//! ```
//! use teller_ledger::core::Bank;
//! use teller_ledger::types::{AccountNumber, BranchId, TellerError};
//!
//! let a1 = AccountNumber::new(BranchId::new(1), 0);
//! let b1 = AccountNumber::new(BranchId::new(2), 0);
//! let bank = Bank::from_opening_balances(3, [(a1, 100), (b1, 50)]).unwrap();
//!
//! bank.transfer(a1, b1, 30).unwrap();
//! assert!(matches!(
//!     bank.withdraw(a1, 1000),
//!     Err(TellerError::InsufficientFunds { balance: 70, .. })
//! ));
//! assert_eq!(bank.snapshot().verify(), Ok(()));
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;
pub mod workload;

pub use core::{Bank, BankConfig, LedgerSnapshot, TellerEngine, TellerStats};
pub use io::{write_accounts_csv, write_branches_csv};
pub use types::{
    AccountAmount, AccountNumber, BranchId, LedgerError, TellerError, TellerOperation,
};
