//! Teller operations: deposit, withdraw and transfer
//!
//! Each operation follows the same shape:
//!
//! 1. resolve every account through the registry (`AccountNotFound`, no lock
//!    taken, if any is missing);
//! 2. lock the account and branch cells it touches through
//!    [`LockRequest::acquire`];
//! 3. validate against balances read under those locks, including that no
//!    credited cell would overflow;
//! 4. apply [`HeldLocks::adjust`];
//! 5. release by dropping the [`HeldLocks`].
//!
//! Sufficient-funds checks only ever happen in step 3. Checking before the
//! locks are held would let two tellers both approve a debit of the same
//! balance.
//!
//! A negative amount is a caller bug, not a runtime outcome, and panics.

use crate::core::bank::{Account, Bank};
use crate::core::locking::{LockKey, LockRequest};
use crate::core::traits::AccountRegistry;
use crate::types::{AccountAmount, AccountNumber, TellerError};
use tracing::debug;

impl<R: AccountRegistry> Bank<R> {
    /// Credit `amount` to an account and its branch
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if `number` is not registered.
    /// - `BalanceOverflow` if the account or branch balance would overflow;
    ///   nothing is mutated.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative.
    pub fn deposit(&self, number: AccountNumber, amount: AccountAmount) -> Result<(), TellerError> {
        assert!(amount >= 0, "deposit amount must be non-negative, got {amount}");
        debug!(account = %number, amount, "deposit");

        let account = self.resolve(number)?;

        let mut locks = LockRequest::new()
            .account(account)
            .branch(self.branch_of(number))
            .acquire();

        locks.adjust(number, amount, true)
    }

    /// Debit `amount` from an account and its branch
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if `number` is not registered.
    /// - `InsufficientFunds` if the balance is below `amount`; nothing is
    ///   mutated.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative.
    pub fn withdraw(&self, number: AccountNumber, amount: AccountAmount) -> Result<(), TellerError> {
        assert!(amount >= 0, "withdraw amount must be non-negative, got {amount}");
        debug!(account = %number, amount, "withdraw");

        let account = self.resolve(number)?;

        let mut locks = LockRequest::new()
            .account(account)
            .branch(self.branch_of(number))
            .acquire();

        let balance = locks.balance(LockKey::Account(number));
        if amount > balance {
            return Err(TellerError::insufficient_funds(number, balance, amount));
        }

        locks.adjust(number, -amount, true)
    }

    /// Move `amount` from `src` to `dst`
    ///
    /// A transfer to the same account succeeds without touching any lock.
    /// Branch balances only change when the two accounts live in different
    /// branches; an intra-branch transfer does not lock its branch at all.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if either account is not registered.
    /// - `InsufficientFunds` if the source balance is below `amount`; nothing
    ///   is mutated.
    /// - `BalanceOverflow` if crediting `dst` (or its branch) would overflow;
    ///   nothing is mutated.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative.
    pub fn transfer(
        &self,
        src: AccountNumber,
        dst: AccountNumber,
        amount: AccountAmount,
    ) -> Result<(), TellerError> {
        assert!(amount >= 0, "transfer amount must be non-negative, got {amount}");
        debug!(src = %src, dst = %dst, amount, "transfer");

        let src_account = self.resolve(src)?;
        let dst_account = self.resolve(dst)?;

        if src == dst {
            return Ok(());
        }

        let inter_branch = !src.same_branch(dst);

        let mut request = LockRequest::new().account(src_account).account(dst_account);
        if inter_branch {
            request = request
                .branch(self.branch_of(src))
                .branch(self.branch_of(dst));
        }
        let mut locks = request.acquire();

        let balance = locks.balance(LockKey::Account(src));
        if amount > balance {
            return Err(TellerError::insufficient_funds(src, balance, amount));
        }

        // The credit is the side that can overflow; check it before debiting
        if !locks.can_adjust(dst, amount, inter_branch) {
            return Err(TellerError::balance_overflow(dst, amount));
        }

        locks.adjust(src, -amount, inter_branch)?;
        locks.adjust(dst, amount, inter_branch)
    }

    fn resolve(&self, number: AccountNumber) -> Result<&Account, TellerError> {
        self.registry()
            .lookup(number)
            .ok_or(TellerError::account_not_found(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BranchId;
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use std::thread;

    fn account(branch: u32, sequence: u32) -> AccountNumber {
        AccountNumber::new(BranchId::new(branch), sequence)
    }

    const A1: AccountNumber = AccountNumber::new(BranchId::new(1), 0);
    const A2: AccountNumber = AccountNumber::new(BranchId::new(1), 1);
    const B1: AccountNumber = AccountNumber::new(BranchId::new(2), 0);
    const MISSING: AccountNumber = AccountNumber::new(BranchId::new(2), 9);

    /// Branch 0 is empty; branch 1 holds A1 (100) and A2 (0); branch 2 holds B1 (50)
    #[fixture]
    fn bank() -> Bank {
        Bank::from_opening_balances(3, [(A1, 100), (A2, 0), (B1, 50)]).unwrap()
    }

    fn balance(bank: &Bank, number: AccountNumber) -> AccountAmount {
        *bank.registry().lookup(number).unwrap().cell().lock()
    }

    fn branch_balance(bank: &Bank, id: u32) -> AccountAmount {
        *bank.branch(BranchId::new(id)).unwrap().cell().lock()
    }

    fn assert_unlocked(bank: &Bank) {
        for account in bank.registry().accounts() {
            assert!(account.cell().try_lock().is_some(), "{} left locked", account.number());
        }
        for branch in bank.branches() {
            assert!(branch.cell().try_lock().is_some(), "branch {} left locked", branch.id());
        }
    }

    #[rstest]
    fn test_inter_branch_transfer_then_overdraft(bank: Bank) {
        assert_eq!(bank.transfer(A1, B1, 30), Ok(()));
        assert_eq!(balance(&bank, A1), 70);
        assert_eq!(balance(&bank, B1), 80);
        assert_eq!(branch_balance(&bank, 1), 70);
        assert_eq!(branch_balance(&bank, 2), 80);

        assert_eq!(
            bank.withdraw(A1, 1000),
            Err(TellerError::insufficient_funds(A1, 70, 1000))
        );
        assert_eq!(balance(&bank, A1), 70);
        assert_eq!(branch_balance(&bank, 1), 70);
        assert_unlocked(&bank);
    }

    #[rstest]
    fn test_deposit_then_withdraw_to_zero(bank: Bank) {
        bank.transfer(A1, B1, 30).unwrap();

        assert_eq!(bank.deposit(A1, 10), Ok(()));
        assert_eq!(bank.withdraw(A1, 80), Ok(()));
        assert_eq!(balance(&bank, A1), 0);
        assert_eq!(branch_balance(&bank, 1), 0);
    }

    #[rstest]
    #[case::zero(0)]
    #[case::within_balance(40)]
    #[case::beyond_balance(1_000_000)]
    fn test_self_transfer_is_a_no_op(bank: Bank, #[case] amount: AccountAmount) {
        assert_eq!(bank.transfer(A1, A1, amount), Ok(()));
        assert_eq!(balance(&bank, A1), 100);
        assert_eq!(branch_balance(&bank, 1), 100);
    }

    #[rstest]
    fn test_intra_branch_transfer_leaves_branch_untouched(bank: Bank) {
        assert_eq!(bank.transfer(A1, A2, 25), Ok(()));

        assert_eq!(balance(&bank, A1), 75);
        assert_eq!(balance(&bank, A2), 25);
        assert_eq!(branch_balance(&bank, 1), 100);
        assert_eq!(branch_balance(&bank, 2), 50);
    }

    #[rstest]
    fn test_intra_branch_transfer_runs_while_branch_is_locked(bank: Bank) {
        let _branch_guard = bank.branch(BranchId::new(1)).unwrap().cell().lock();

        // Would block forever if the transfer tried to take the branch lock
        assert_eq!(bank.transfer(A1, A2, 1), Ok(()));
    }

    #[rstest]
    fn test_transfer_with_insufficient_funds_mutates_nothing(bank: Bank) {
        assert_eq!(
            bank.transfer(B1, A1, 51),
            Err(TellerError::insufficient_funds(B1, 50, 51))
        );

        assert_eq!(balance(&bank, A1), 100);
        assert_eq!(balance(&bank, B1), 50);
        assert_eq!(branch_balance(&bank, 1), 100);
        assert_eq!(branch_balance(&bank, 2), 50);
        assert_unlocked(&bank);
    }

    #[rstest]
    fn test_withdraw_exact_balance_succeeds(bank: Bank) {
        assert_eq!(bank.withdraw(B1, 50), Ok(()));
        assert_eq!(balance(&bank, B1), 0);
        assert_eq!(
            bank.withdraw(B1, 1),
            Err(TellerError::insufficient_funds(B1, 0, 1))
        );
    }

    #[rstest]
    #[case::deposit(|bank: &Bank| bank.deposit(MISSING, 1))]
    #[case::withdraw(|bank: &Bank| bank.withdraw(MISSING, 1))]
    #[case::transfer_source(|bank: &Bank| bank.transfer(MISSING, A1, 1))]
    #[case::transfer_destination(|bank: &Bank| bank.transfer(A1, MISSING, 1))]
    #[case::self_transfer(|bank: &Bank| bank.transfer(MISSING, MISSING, 1))]
    fn test_unknown_account_is_rejected_before_locking(
        bank: Bank,
        #[case] operation: fn(&Bank) -> Result<(), TellerError>,
    ) {
        // Every cell is locked by this thread: any acquisition attempt would hang
        let _guards: Vec<_> = bank
            .registry()
            .accounts()
            .map(|a| a.cell().lock())
            .chain(bank.branches().iter().map(|b| b.cell().lock()))
            .collect();

        assert_eq!(operation(&bank), Err(TellerError::account_not_found(MISSING)));
    }

    const NEAR_MAX: AccountAmount = AccountAmount::MAX - 5;
    const HALF_MAX: AccountAmount = AccountAmount::MAX / 2;

    /// Overflow scenarios: `(opening balances, operation, expected error)`
    #[rstest]
    #[case::deposit_overflows_account(
        vec![(A1, NEAR_MAX), (B1, 10)],
        |bank: &Bank| bank.deposit(A1, 10),
        TellerError::balance_overflow(A1, 10)
    )]
    #[case::deposit_overflows_branch_only(
        vec![(A1, HALF_MAX), (A2, HALF_MAX), (B1, 10)],
        |bank: &Bank| bank.deposit(A1, 10),
        TellerError::balance_overflow(A1, 10)
    )]
    #[case::transfer_overflows_destination_account(
        vec![(A1, NEAR_MAX), (B1, 10)],
        |bank: &Bank| bank.transfer(B1, A1, 10),
        TellerError::balance_overflow(A1, 10)
    )]
    #[case::transfer_overflows_destination_branch(
        vec![(A1, HALF_MAX), (A2, HALF_MAX), (B1, 10)],
        |bank: &Bank| bank.transfer(B1, A1, 10),
        TellerError::balance_overflow(A1, 10)
    )]
    fn test_overflow_is_rejected_without_mutation(
        #[case] opening: Vec<(AccountNumber, AccountAmount)>,
        #[case] operation: fn(&Bank) -> Result<(), TellerError>,
        #[case] expected: TellerError,
    ) {
        let bank = Bank::from_opening_balances(3, opening).unwrap();
        let before = bank.snapshot();

        assert_eq!(operation(&bank), Err(expected));

        let after = bank.snapshot();
        assert_eq!(after, before);
        assert_eq!(after.verify(), Ok(()));
        assert_unlocked(&bank);
    }

    #[rstest]
    #[should_panic(expected = "must be non-negative")]
    fn test_negative_deposit_panics(bank: Bank) {
        let _ = bank.deposit(A1, -1);
    }

    #[rstest]
    #[should_panic(expected = "must be non-negative")]
    fn test_negative_transfer_panics(bank: Bank) {
        let _ = bank.transfer(A1, B1, -1);
    }

    #[test]
    fn test_concurrent_withdrawals_never_overdraw() {
        let bank = Arc::new(Bank::from_opening_balances(1, [(account(0, 0), 1_000)]).unwrap());
        let mut handles = vec![];

        for _ in 0..16 {
            let bank = Arc::clone(&bank);
            handles.push(thread::spawn(move || {
                (0..200)
                    .filter(|_| bank.withdraw(account(0, 0), 1).is_ok())
                    .count()
            }));
        }

        let succeeded: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(succeeded, 1_000);
        assert_eq!(balance(&bank, account(0, 0)), 0);
        assert_eq!(branch_balance(&bank, 0), 0);
    }

    #[test]
    fn test_concurrent_crossing_transfers_conserve_money() {
        let bank = Arc::new(
            Bank::from_opening_balances(
                2,
                [(account(0, 0), 500), (account(0, 1), 500), (account(1, 0), 500)],
            )
            .unwrap(),
        );
        let accounts = [account(0, 0), account(0, 1), account(1, 0)];
        let mut handles = vec![];

        for t in 0..6 {
            let bank = Arc::clone(&bank);
            handles.push(thread::spawn(move || {
                for i in 0..2_000 {
                    let src = accounts[(t + i) % 3];
                    let dst = accounts[(t + i + 1 + t % 2) % 3];
                    let _ = bank.transfer(src, dst, 7);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let total: AccountAmount = accounts.iter().map(|&n| balance(&bank, n)).sum();
        assert_eq!(total, 1_500);
        assert_eq!(
            branch_balance(&bank, 0),
            balance(&bank, account(0, 0)) + balance(&bank, account(0, 1))
        );
        assert_eq!(branch_balance(&bank, 1), balance(&bank, account(1, 0)));
        for &n in &accounts {
            assert!(balance(&bank, n) >= 0);
        }
    }
}
