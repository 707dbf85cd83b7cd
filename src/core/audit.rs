//! Consistent ledger snapshots and balance validation
//!
//! [`Bank::snapshot`] locks every account cell and then every branch cell in
//! the global lock order, reads them all, and releases them. Because it climbs
//! the same order as the teller operations it can run while tellers are busy;
//! the balances it reports form a quiescent cut of the ledger.

use crate::core::bank::Bank;
use crate::core::locking::{LockKey, LockRequest};
use crate::core::traits::AccountRegistry;
use crate::types::{AccountAmount, AccountBalance, BranchBalance, LedgerError};
use std::collections::BTreeMap;
use tracing::debug;

/// Every account and branch balance at one consistent point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// Account balances in ascending account order
    pub accounts: Vec<AccountBalance>,
    /// Branch balances in ascending branch order
    pub branches: Vec<BranchBalance>,
}

impl LedgerSnapshot {
    /// Sum of all account balances
    ///
    /// # Errors
    ///
    /// `BalanceOverflow` if the sum does not fit in [`AccountAmount`].
    pub fn total(&self) -> Result<AccountAmount, LedgerError> {
        self.accounts
            .iter()
            .try_fold(0, |sum: AccountAmount, row| sum.checked_add(row.balance))
            .ok_or_else(|| LedgerError::balance_overflow("bank total"))
    }

    /// Check that no account is negative and that every branch balance equals
    /// the sum of its accounts
    ///
    /// # Errors
    ///
    /// The first violation found, as `NegativeBalance`, `BalanceOverflow`
    /// (the accounts of a branch sum past [`AccountAmount`]) or
    /// `BranchMismatch`.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let mut expected: BTreeMap<_, AccountAmount> = BTreeMap::new();

        for row in &self.accounts {
            if row.balance < 0 {
                return Err(LedgerError::NegativeBalance {
                    account: row.account,
                    balance: row.balance,
                });
            }
            let branch = row.account.branch();
            let sum = expected.entry(branch).or_default();
            *sum = sum
                .checked_add(row.balance)
                .ok_or_else(|| LedgerError::balance_overflow(format!("branch {branch}")))?;
        }

        for row in &self.branches {
            let sum = expected.remove(&row.branch).unwrap_or_default();
            if sum != row.balance {
                return Err(LedgerError::BranchMismatch {
                    branch: row.branch,
                    recorded: row.balance,
                    expected: sum,
                });
            }
        }

        Ok(())
    }
}

impl<R: AccountRegistry> Bank<R> {
    /// Take a consistent snapshot of every balance
    ///
    /// Blocks until every lock in the bank is held at once.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let request = self
            .registry()
            .accounts()
            .fold(
                LockRequest::with_capacity(self.num_accounts() + self.num_branches()),
                LockRequest::account,
            );
        let locks = self.branches().iter().fold(request, LockRequest::branch).acquire();

        let mut snapshot = LedgerSnapshot {
            accounts: Vec::with_capacity(self.num_accounts()),
            branches: Vec::with_capacity(self.num_branches()),
        };

        for key in locks.keys() {
            let balance = locks.balance(key);
            match key {
                LockKey::Account(account) => {
                    snapshot.accounts.push(AccountBalance { account, balance })
                }
                LockKey::Branch(branch) => {
                    snapshot.branches.push(BranchBalance { branch, balance })
                }
            }
        }

        debug!(
            accounts = snapshot.accounts.len(),
            branches = snapshot.branches.len(),
            "snapshot taken"
        );
        snapshot
    }
}
