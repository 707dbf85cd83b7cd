//! Synchronous processing strategy
//!
//! A single teller runs every operation on the calling thread, in input
//! order. The result is deterministic, which makes this strategy the
//! reference the concurrent one is checked against.

use crate::core::TellerEngine;
use crate::strategy::ProcessingStrategy;
use crate::types::{LedgerError, TellerOperation};
use std::sync::Arc;

/// Single-teller strategy
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use teller_ledger::core::{Bank, BankConfig, TellerEngine};
/// use teller_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
///
/// let bank = Bank::uniform(&BankConfig::default()).unwrap();
/// let engine = Arc::new(TellerEngine::new(Arc::new(bank)));
///
/// SyncProcessingStrategy.process(&engine, Vec::new()).unwrap();
/// assert_eq!(engine.stats().processed(), 0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        engine: &Arc<TellerEngine>,
        operations: Vec<TellerOperation>,
    ) -> Result<(), LedgerError> {
        for operation in &operations {
            // Rejections are counted by the engine
            let _ = engine.process(operation);
        }
        Ok(())
    }
}
