//! Teller engine
//!
//! The `TellerEngine` dispatches [`TellerOperation`]s to the bank's teller
//! operations and counts their outcomes. It is shared by reference (or
//! through an `Arc`) between every teller thread of a run.

use crate::core::bank::Bank;
use crate::types::{AccountAmount, TellerError, TellerOperation};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Outcome counters of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TellerStats {
    pub succeeded: u64,
    pub account_not_found: u64,
    pub insufficient_funds: u64,
    pub balance_overflow: u64,
    /// Committed deposits minus committed withdrawals
    pub net_external: AccountAmount,
}

impl TellerStats {
    pub fn processed(&self) -> u64 {
        self.succeeded + self.account_not_found + self.insufficient_funds + self.balance_overflow
    }
}

#[derive(Debug, Default)]
struct Counters {
    succeeded: AtomicU64,
    account_not_found: AtomicU64,
    insufficient_funds: AtomicU64,
    balance_overflow: AtomicU64,
    net_external: AtomicI64,
}

/// Dispatches operations against a shared bank
#[derive(Debug)]
pub struct TellerEngine {
    bank: Arc<Bank>,
    counters: Counters,
}

impl TellerEngine {
    pub fn new(bank: Arc<Bank>) -> Self {
        TellerEngine {
            bank,
            counters: Counters::default(),
        }
    }

    pub fn bank(&self) -> &Arc<Bank> {
        &self.bank
    }

    /// Run one operation and record its outcome
    pub fn process(&self, operation: &TellerOperation) -> Result<(), TellerError> {
        let result = match *operation {
            TellerOperation::Deposit { account, amount } => self.bank.deposit(account, amount),
            TellerOperation::Withdraw { account, amount } => self.bank.withdraw(account, amount),
            TellerOperation::Transfer { from, to, amount } => self.bank.transfer(from, to, amount),
        };

        let counter = match &result {
            Ok(()) => &self.counters.succeeded,
            Err(TellerError::AccountNotFound { .. }) => &self.counters.account_not_found,
            Err(TellerError::InsufficientFunds { .. }) => &self.counters.insufficient_funds,
            Err(TellerError::BalanceOverflow { .. }) => &self.counters.balance_overflow,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        match (&result, operation) {
            (Ok(()), TellerOperation::Deposit { amount, .. }) => {
                self.counters.net_external.fetch_add(*amount, Ordering::Relaxed);
            }
            (Ok(()), TellerOperation::Withdraw { amount, .. }) => {
                self.counters.net_external.fetch_sub(*amount, Ordering::Relaxed);
            }
            (Err(e), _) => {
                debug!(operation = %operation.kind(), error = %e, "operation rejected");
            }
            (Ok(()), TellerOperation::Transfer { .. }) => {}
        }

        result
    }

    /// Counters so far
    ///
    /// Exact once every teller has finished; a moving estimate before that.
    pub fn stats(&self) -> TellerStats {
        TellerStats {
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            account_not_found: self.counters.account_not_found.load(Ordering::Relaxed),
            insufficient_funds: self.counters.insufficient_funds.load(Ordering::Relaxed),
            balance_overflow: self.counters.balance_overflow.load(Ordering::Relaxed),
            net_external: self.counters.net_external.load(Ordering::Relaxed),
        }
    }
}
