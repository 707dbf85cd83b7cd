//! Core ledger module
//!
//! This module contains the concurrent ledger:
//! - `traits` - The account registry abstraction
//! - `bank` - Bank, branch and account state, bank construction
//! - `registry` - Sorted account registry
//! - `locking` - The global lock order and RAII lock sets
//! - `teller` - Deposit, withdraw and transfer
//! - `audit` - Consistent snapshots and balance validation
//! - `engine` - Operation dispatch and outcome counters

pub mod audit;
pub mod bank;
pub mod engine;
pub mod locking;
pub mod registry;
pub mod teller;
pub mod traits;

pub use audit::LedgerSnapshot;
pub use bank::{Account, Bank, BankConfig, Branch};
pub use engine::{TellerEngine, TellerStats};
pub use locking::{HeldLocks, LockKey, LockRequest};
pub use registry::SortedRegistry;
pub use traits::AccountRegistry;
