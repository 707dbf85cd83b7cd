//! Core traits for the teller ledger
//!
//! The teller core depends on the account index only through
//! [`AccountRegistry`], so the bank can be built around any index that can
//! hand out stable references to its accounts.

use crate::core::bank::Account;
use crate::types::AccountNumber;

/// Index from account number to account
///
/// Implementations must never move an account while the registry is
/// borrowed: teller operations hold guards into the account's balance cell
/// for the duration of a borrow of `&self`.
pub trait AccountRegistry: Send + Sync {
    /// Resolve an account number, or `None` if it is not registered
    fn lookup(&self, number: AccountNumber) -> Option<&Account>;

    /// Every registered account, in ascending account number order
    fn accounts(&self) -> impl Iterator<Item = &Account> + '_;

    /// Number of registered accounts
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
