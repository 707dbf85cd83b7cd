//! Bank, branch and account state
//!
//! The [`Bank`] is the explicit context object every teller operation runs
//! against. It owns a fixed table of [`Branch`]es and, through its
//! [`AccountRegistry`], every [`Account`]. There is no bank-wide lock: each
//! account and each branch carries its own balance cell, and concurrency
//! safety comes entirely from taking those cells in the order defined in
//! [`crate::core::locking`].
//!
//! Balances live *inside* their mutex, so a balance can only be read or
//! written through a held guard.

use crate::core::registry::SortedRegistry;
use crate::core::traits::AccountRegistry;
use crate::types::{AccountAmount, AccountNumber, BranchId, LedgerError};
use parking_lot::Mutex;
use tracing::{info, warn};

/// A single account: its number and its locked balance cell
#[derive(Debug)]
pub struct Account {
    number: AccountNumber,
    balance: Mutex<AccountAmount>,
}

impl Account {
    pub fn new(number: AccountNumber, opening_balance: AccountAmount) -> Self {
        Account {
            number,
            balance: Mutex::new(opening_balance),
        }
    }

    pub fn number(&self) -> AccountNumber {
        self.number
    }

    pub(crate) fn cell(&self) -> &Mutex<AccountAmount> {
        &self.balance
    }
}

/// A branch and its aggregate balance cell
#[derive(Debug)]
pub struct Branch {
    id: BranchId,
    balance: Mutex<AccountAmount>,
}

impl Branch {
    fn new(id: BranchId, balance: AccountAmount) -> Self {
        Branch {
            id,
            balance: Mutex::new(balance),
        }
    }

    pub fn id(&self) -> BranchId {
        self.id
    }

    pub(crate) fn cell(&self) -> &Mutex<AccountAmount> {
        &self.balance
    }
}

/// Shape of a generated bank: every branch gets the same number of accounts
/// with the same opening balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankConfig {
    pub branches: u32,
    pub accounts_per_branch: u32,
    pub initial_balance: AccountAmount,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            branches: 4,
            accounts_per_branch: 16,
            initial_balance: 1000,
        }
    }
}

impl BankConfig {
    /// Create a BankConfig, falling back to defaults for zero counts
    ///
    /// A negative opening balance cannot be repaired and is rejected.
    pub fn new(
        branches: u32,
        accounts_per_branch: u32,
        initial_balance: AccountAmount,
    ) -> Result<Self, LedgerError> {
        let default = Self::default();

        if initial_balance < 0 {
            return Err(LedgerError::invalid_config(format!(
                "initial balance must be non-negative, got {initial_balance}"
            )));
        }

        let branches = if branches == 0 {
            warn!(
                branches,
                fallback = default.branches,
                "invalid branch count, using default"
            );
            default.branches
        } else {
            branches
        };

        let accounts_per_branch = if accounts_per_branch == 0 {
            warn!(
                accounts_per_branch,
                fallback = default.accounts_per_branch,
                "invalid accounts per branch, using default"
            );
            default.accounts_per_branch
        } else {
            accounts_per_branch
        };

        Ok(Self {
            branches,
            accounts_per_branch,
            initial_balance,
        })
    }
}

/// The ledger: a fixed set of branches plus the account registry
#[derive(Debug)]
pub struct Bank<R = SortedRegistry> {
    branches: Vec<Branch>,
    registry: R,
}

impl<R: AccountRegistry> Bank<R> {
    /// Build a bank around an already populated registry
    ///
    /// Every account must decode to one of the `num_branches` branches and
    /// hold a non-negative opening balance. Each branch balance starts as the
    /// sum of its accounts, which must fit in [`AccountAmount`].
    pub fn with_registry(num_branches: u32, registry: R) -> Result<Self, LedgerError> {
        let mut totals: Vec<AccountAmount> = vec![0; num_branches as usize];

        for account in registry.accounts() {
            let number = account.number();
            let balance = *account.cell().lock();

            let total = totals
                .get_mut(number.branch().index())
                .ok_or(LedgerError::UnknownBranch {
                    account: number,
                    branches: num_branches,
                })?;

            if balance < 0 {
                return Err(LedgerError::NegativeBalance {
                    account: number,
                    balance,
                });
            }

            *total = total.checked_add(balance).ok_or_else(|| {
                LedgerError::balance_overflow(format!("branch {}", number.branch()))
            })?;
        }

        let branches = totals
            .into_iter()
            .zip(0..num_branches)
            .map(|(balance, id)| Branch::new(BranchId::new(id), balance))
            .collect();

        info!(
            branches = num_branches,
            accounts = registry.len(),
            "bank opened"
        );

        Ok(Bank { branches, registry })
    }

    pub fn num_branches(&self) -> usize {
        self.branches.len()
    }

    pub fn num_accounts(&self) -> usize {
        self.registry.len()
    }

    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id.index())
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Branch owning `number`
    ///
    /// Only called for accounts that resolved through the registry, and
    /// construction guarantees every registered account has a branch.
    pub(crate) fn branch_of(&self, number: AccountNumber) -> &Branch {
        &self.branches[number.branch().index()]
    }
}

impl Bank<SortedRegistry> {
    /// Build a bank from `(account, opening balance)` pairs
    pub fn from_opening_balances<I>(num_branches: u32, accounts: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (AccountNumber, AccountAmount)>,
    {
        let registry = SortedRegistry::from_accounts(
            accounts
                .into_iter()
                .map(|(number, balance)| Account::new(number, balance)),
        )?;
        Self::with_registry(num_branches, registry)
    }

    /// Build a bank with `config.accounts_per_branch` accounts in each branch
    pub fn uniform(config: &BankConfig) -> Result<Self, LedgerError> {
        let accounts = (0..config.branches).flat_map(|branch| {
            (0..config.accounts_per_branch).map(move |sequence| {
                (
                    AccountNumber::new(BranchId::new(branch), sequence),
                    config.initial_balance,
                )
            })
        });
        Self::from_opening_balances(config.branches, accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(branch: u32, sequence: u32) -> AccountNumber {
        AccountNumber::new(BranchId::new(branch), sequence)
    }

    #[test]
    fn test_branch_balances_start_as_account_sums() {
        let bank = Bank::from_opening_balances(
            3,
            [(account(0, 0), 100), (account(0, 1), 50), (account(2, 0), 7)],
        )
        .unwrap();

        let balances: Vec<AccountAmount> =
            bank.branches().iter().map(|b| *b.cell().lock()).collect();
        assert_eq!(balances, vec![150, 0, 7]);
        assert_eq!(bank.num_branches(), 3);
        assert_eq!(bank.num_accounts(), 3);
    }

    #[test]
    fn test_account_in_missing_branch_is_rejected() {
        let result = Bank::from_opening_balances(2, [(account(2, 0), 10)]);

        assert_eq!(
            result.unwrap_err(),
            LedgerError::UnknownBranch {
                account: account(2, 0),
                branches: 2
            }
        );
    }

    #[test]
    fn test_negative_opening_balance_is_rejected() {
        let result = Bank::from_opening_balances(1, [(account(0, 0), -1)]);

        assert_eq!(
            result.unwrap_err(),
            LedgerError::NegativeBalance {
                account: account(0, 0),
                balance: -1
            }
        );
    }

    #[test]
    fn test_branch_sum_overflow_is_rejected() {
        let result = Bank::from_opening_balances(
            2,
            [(account(1, 0), AccountAmount::MAX), (account(1, 1), 1)],
        );

        assert_eq!(result.unwrap_err(), LedgerError::balance_overflow("branch 1"));
    }

    #[test]
    fn test_uniform_bank_layout() {
        let config = BankConfig::new(3, 5, 20).unwrap();
        let bank = Bank::uniform(&config).unwrap();

        assert_eq!(bank.num_branches(), 3);
        assert_eq!(bank.num_accounts(), 15);
        for branch in bank.branches() {
            assert_eq!(*branch.cell().lock(), 100);
        }
        assert!(bank.registry().lookup(account(2, 4)).is_some());
        assert!(bank.registry().lookup(account(2, 5)).is_none());
    }

    #[test]
    fn test_branch_lookup_out_of_range() {
        let bank = Bank::uniform(&BankConfig::default()).unwrap();
        assert!(bank.branch(BranchId::new(3)).is_some());
        assert!(bank.branch(BranchId::new(4)).is_none());
    }

    #[test]
    fn test_config_zero_counts_fall_back_to_defaults() {
        let config = BankConfig::new(0, 0, 5).unwrap();
        let default = BankConfig::default();

        assert_eq!(config.branches, default.branches);
        assert_eq!(config.accounts_per_branch, default.accounts_per_branch);
        assert_eq!(config.initial_balance, 5);
    }

    #[test]
    fn test_config_rejects_negative_initial_balance() {
        assert!(matches!(
            BankConfig::new(1, 1, -10),
            Err(LedgerError::InvalidConfig { .. })
        ));
    }
}
