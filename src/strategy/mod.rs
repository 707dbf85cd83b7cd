//! Processing strategy module
//!
//! A strategy decides how a list of teller operations is spread over
//! tellers. Both strategies drive the same shared [`TellerEngine`]; they only
//! differ in how many threads call into it.

use crate::cli::StrategyType;
use crate::core::TellerEngine;
use crate::types::{LedgerError, TellerOperation};
use std::sync::Arc;

pub mod concurrent;
pub mod sync;

pub use concurrent::{ConcurrentProcessingStrategy, TellerConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for running teller operations
pub trait ProcessingStrategy: Send + Sync {
    /// Run every operation through `engine`
    ///
    /// Rejected operations (unknown account, insufficient funds) are counted
    /// by the engine and do not stop the run.
    ///
    /// # Errors
    ///
    /// Returns an error only if the run itself failed (a teller thread could
    /// not be started or did not finish).
    fn process(
        &self,
        engine: &Arc<TellerEngine>,
        operations: Vec<TellerOperation>,
    ) -> Result<(), LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is ignored by the sync strategy.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<TellerConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Concurrent => {
            let config = config.unwrap_or_default();
            Box::new(ConcurrentProcessingStrategy::new(config))
        }
    }
}
