//! Sorted account registry
//!
//! Accounts are created once, sorted by number, and never moved again; a
//! lookup is a binary search over the sorted slice. Iteration order is the
//! ascending account order the locking protocol relies on, which lets a
//! snapshot lock every account without sorting.

use crate::core::bank::Account;
use crate::core::traits::AccountRegistry;
use crate::types::{AccountNumber, LedgerError};

/// Immutable, sorted index of accounts
#[derive(Debug, Default)]
pub struct SortedRegistry {
    accounts: Box<[Account]>,
}

impl SortedRegistry {
    /// Build a registry from a set of accounts
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccount` if two accounts share a number.
    pub fn from_accounts<I>(accounts: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = Account>,
    {
        let mut accounts: Vec<Account> = accounts.into_iter().collect();
        accounts.sort_unstable_by_key(Account::number);

        if let Some(pair) = accounts
            .windows(2)
            .find(|pair| pair[0].number() == pair[1].number())
        {
            return Err(LedgerError::DuplicateAccount {
                account: pair[0].number(),
            });
        }

        Ok(SortedRegistry {
            accounts: accounts.into_boxed_slice(),
        })
    }
}

impl AccountRegistry for SortedRegistry {
    fn lookup(&self, number: AccountNumber) -> Option<&Account> {
        self.accounts
            .binary_search_by_key(&number, Account::number)
            .ok()
            .map(|index| &self.accounts[index])
    }

    fn accounts(&self) -> impl Iterator<Item = &Account> + '_ {
        self.accounts.iter()
    }

    fn len(&self) -> usize {
        self.accounts.len()
    }
}
