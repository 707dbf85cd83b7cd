//! Deadlock-free lock acquisition for teller operations
//!
//! Every balance cell in the bank (one per account, one per branch) is named
//! by a [`LockKey`]. The derived ordering on `LockKey` is the single global
//! lock order:
//!
//! 1. every account lock comes before every branch lock;
//! 2. accounts are ordered by [`AccountNumber`];
//! 3. branches are ordered by [`BranchId`].
//!
//! A [`LockRequest`] collects the cells an operation needs and
//! [`LockRequest::acquire`] takes them strictly in that order, whatever order
//! they were requested in and whichever account is the logical source. Since
//! every thread climbs the same order, no thread can hold a lock while waiting
//! for one that sorts below it, and the wait-for graph stays acyclic.
//!
//! [`HeldLocks`] owns the guards. Dropping it releases them in exact reverse
//! acquisition order, so every exit path of an operation (commit, rejection,
//! or panic unwinding) leaves no lock behind.

use crate::core::bank::{Account, Branch};
use crate::types::{AccountAmount, AccountNumber, BranchId, TellerError};
use parking_lot::{Mutex, MutexGuard};
use smallvec::SmallVec;
use std::fmt;
use tracing::trace;

/// Locks a single teller operation can need: two accounts and two branches
const INLINE_LOCKS: usize = 4;

/// Name of one lockable balance cell
///
/// Variant order is significant: the derived `Ord` puts every `Account`
/// before every `Branch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockKey {
    Account(AccountNumber),
    Branch(BranchId),
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockKey::Account(number) => write!(f, "account {number}"),
            LockKey::Branch(id) => write!(f, "branch {id}"),
        }
    }
}

/// Set of balance cells to lock, not yet acquired
#[derive(Default)]
pub struct LockRequest<'a> {
    cells: SmallVec<[(LockKey, &'a Mutex<AccountAmount>); INLINE_LOCKS]>,
}

impl<'a> LockRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        LockRequest {
            cells: SmallVec::with_capacity(capacity),
        }
    }

    /// Add an account's balance cell
    pub fn account(mut self, account: &'a Account) -> Self {
        self.cells
            .push((LockKey::Account(account.number()), account.cell()));
        self
    }

    /// Add a branch's balance cell
    pub fn branch(mut self, branch: &'a Branch) -> Self {
        self.cells.push((LockKey::Branch(branch.id()), branch.cell()));
        self
    }

    /// Block until every requested cell is locked, in global lock order
    ///
    /// # Panics
    ///
    /// Panics if the same cell was requested twice; locking it a second time
    /// from the same thread would never return.
    pub fn acquire(mut self) -> HeldLocks<'a> {
        self.cells.sort_unstable_by_key(|(key, _)| *key);

        if let Some(pair) = self.cells.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            panic!("{} requested twice in one lock set", pair[0].0);
        }

        let mut guards = SmallVec::with_capacity(self.cells.len());
        for (key, cell) in self.cells {
            trace!(%key, "acquiring");
            guards.push((key, cell.lock()));
        }

        HeldLocks { guards }
    }
}

/// Guards for a set of balance cells, held in acquisition order
///
/// Balances are only reachable through this type, so holding a `HeldLocks`
/// is what entitles a caller to read or adjust them.
pub struct HeldLocks<'a> {
    guards: SmallVec<[(LockKey, MutexGuard<'a, AccountAmount>); INLINE_LOCKS]>,
}

impl HeldLocks<'_> {
    /// Keys in the order they were acquired
    pub fn keys(&self) -> impl Iterator<Item = LockKey> + '_ {
        self.guards.iter().map(|(key, _)| *key)
    }

    pub fn holds(&self, key: LockKey) -> bool {
        self.position(key).is_some()
    }

    /// Current balance of a locked cell
    ///
    /// # Panics
    ///
    /// Panics if `key` is not part of this lock set.
    pub fn balance(&self, key: LockKey) -> AccountAmount {
        *self.guards[self.expect_position(key)].1
    }

    /// Move an account's balance by `delta`, and its branch's balance too
    /// when `affects_branch` is set
    ///
    /// Takes no locks of its own: the account cell, and the branch cell when
    /// `affects_branch` is set, must already be in this lock set. Every new
    /// balance is computed before any cell is written, so an overflow leaves
    /// both cells untouched.
    ///
    /// # Errors
    ///
    /// `BalanceOverflow` if either cell would leave the range of
    /// [`AccountAmount`].
    ///
    /// # Panics
    ///
    /// Panics if a required cell is not held.
    pub fn adjust(
        &mut self,
        account: AccountNumber,
        delta: AccountAmount,
        affects_branch: bool,
    ) -> Result<(), TellerError> {
        let writes = self
            .plan(account, delta, affects_branch)
            .ok_or(TellerError::balance_overflow(account, delta))?;

        for (slot, balance) in writes {
            *self.guards[slot].1 = balance;
        }
        Ok(())
    }

    /// Whether [`HeldLocks::adjust`] with the same arguments would succeed
    ///
    /// # Panics
    ///
    /// Panics if a required cell is not held.
    pub fn can_adjust(&self, account: AccountNumber, delta: AccountAmount, affects_branch: bool) -> bool {
        self.plan(account, delta, affects_branch).is_some()
    }

    /// Slots and balances an adjustment would write, or `None` on overflow
    fn plan(
        &self,
        account: AccountNumber,
        delta: AccountAmount,
        affects_branch: bool,
    ) -> Option<SmallVec<[(usize, AccountAmount); 2]>> {
        let mut writes = SmallVec::new();

        let slot = self.expect_position(LockKey::Account(account));
        writes.push((slot, self.guards[slot].1.checked_add(delta)?));

        if affects_branch {
            let slot = self.expect_position(LockKey::Branch(account.branch()));
            writes.push((slot, self.guards[slot].1.checked_add(delta)?));
        }

        Some(writes)
    }

    fn position(&self, key: LockKey) -> Option<usize> {
        self.guards.iter().position(|(held, _)| *held == key)
    }

    fn expect_position(&self, key: LockKey) -> usize {
        self.position(key)
            .unwrap_or_else(|| panic!("{key} is not held by this lock set"))
    }
}

impl Drop for HeldLocks<'_> {
    fn drop(&mut self) {
        while let Some((key, guard)) = self.guards.pop() {
            drop(guard);
            trace!(%key, "released");
        }
    }
}
