//! Random teller workloads
//!
//! Generates a reproducible stream of teller operations over the accounts of
//! a bank, for simulations, stress tests and benchmarks. The same seed over
//! the same account list always yields the same operations.

use crate::types::{AccountAmount, AccountNumber, LedgerError, TellerOperation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shape of a generated workload
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig {
    /// Number of operations to generate
    pub operations: usize,
    /// Amounts are drawn uniformly from `0..=max_amount`
    pub max_amount: AccountAmount,
    /// Generate transfers only, so the bank total must not change
    pub transfers_only: bool,
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            max_amount: 100,
            transfers_only: false,
            seed: 0,
        }
    }
}

/// Generate operations over `accounts`
///
/// Mixed workloads are half transfers, a quarter deposits and a quarter
/// withdrawals. Transfer endpoints are drawn independently, so self-transfers
/// occur too.
///
/// # Errors
///
/// `InvalidConfig` if there are no accounts or `max_amount` is negative.
pub fn generate(
    accounts: &[AccountNumber],
    config: &WorkloadConfig,
) -> Result<Vec<TellerOperation>, LedgerError> {
    if accounts.is_empty() {
        return Err(LedgerError::invalid_config(
            "cannot generate a workload for a bank without accounts",
        ));
    }
    if config.max_amount < 0 {
        return Err(LedgerError::invalid_config(format!(
            "max amount must be non-negative, got {}",
            config.max_amount
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let pick = |rng: &mut StdRng| accounts[rng.gen_range(0..accounts.len())];

    let operations = (0..config.operations)
        .map(|_| {
            let amount = rng.gen_range(0..=config.max_amount);
            let roll = if config.transfers_only {
                0
            } else {
                rng.gen_range(0..4)
            };

            match roll {
                0 | 1 => TellerOperation::Transfer {
                    from: pick(&mut rng),
                    to: pick(&mut rng),
                    amount,
                },
                2 => TellerOperation::Deposit {
                    account: pick(&mut rng),
                    amount,
                },
                _ => TellerOperation::Withdraw {
                    account: pick(&mut rng),
                    amount,
                },
            }
        })
        .collect();

    Ok(operations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BranchId, OperationKind};

    fn accounts() -> Vec<AccountNumber> {
        (0..3)
            .flat_map(|b| (0..4).map(move |s| AccountNumber::new(BranchId::new(b), s)))
            .collect()
    }

    #[test]
    fn test_same_seed_same_workload() {
        let config = WorkloadConfig { operations: 500, seed: 42, ..Default::default() };

        assert_eq!(
            generate(&accounts(), &config).unwrap(),
            generate(&accounts(), &config).unwrap()
        );
    }

    #[test]
    fn test_operations_reference_known_accounts_and_amounts() {
        let config = WorkloadConfig { operations: 1_000, max_amount: 9, seed: 7, ..Default::default() };
        let accounts = accounts();

        for op in generate(&accounts, &config).unwrap() {
            assert!((0..=9).contains(&op.amount()));
            match op {
                TellerOperation::Deposit { account, .. } | TellerOperation::Withdraw { account, .. } => {
                    assert!(accounts.contains(&account))
                }
                TellerOperation::Transfer { from, to, .. } => {
                    assert!(accounts.contains(&from));
                    assert!(accounts.contains(&to));
                }
            }
        }
    }

    #[test]
    fn test_mixed_workload_has_every_kind() {
        let ops = generate(&accounts(), &WorkloadConfig { operations: 400, ..Default::default() }).unwrap();

        for kind in [OperationKind::Deposit, OperationKind::Withdraw, OperationKind::Transfer] {
            assert!(ops.iter().any(|op| op.kind() == kind), "no {kind} generated");
        }
    }

    #[test]
    fn test_transfers_only() {
        let config = WorkloadConfig { operations: 300, transfers_only: true, ..Default::default() };

        let ops = generate(&accounts(), &config).unwrap();
        assert!(ops.iter().all(|op| op.kind() == OperationKind::Transfer));
    }

    #[test]
    fn test_empty_account_list_is_rejected() {
        assert!(matches!(
            generate(&[], &WorkloadConfig::default()),
            Err(LedgerError::InvalidConfig { .. })
        ));
    }
}
