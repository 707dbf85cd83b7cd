//! Concurrent multi-teller strategy
//!
//! Operations are dealt round-robin to `tellers` queues. Each queue is worked
//! by its own teller on a dedicated blocking thread of a tokio multi-threaded
//! runtime; teller operations block on account and branch locks, so they
//! never run on the async worker threads.
//!
//! ```text
//! ConcurrentProcessingStrategy
//!     ├── TellerConfig (tellers)
//!     └── tokio runtime
//!         └── spawn_blocking × tellers ──► Arc<TellerEngine> ──► Arc<Bank>
//! ```
//!
//! Operations within one queue keep their input order. Across queues there
//! is no ordering guarantee, so when operations compete for the same funds
//! which one is rejected depends on scheduling; the audited invariants hold
//! either way.

use crate::core::TellerEngine;
use crate::strategy::ProcessingStrategy;
use crate::types::{LedgerError, TellerOperation};
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for concurrent processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TellerConfig {
    /// Number of tellers working in parallel
    pub tellers: usize,
}

impl Default for TellerConfig {
    fn default() -> Self {
        Self {
            tellers: num_cpus::get(),
        }
    }
}

impl TellerConfig {
    /// Create a TellerConfig, falling back to the default for zero tellers
    pub fn new(tellers: usize) -> Self {
        let default = Self::default();

        let tellers = if tellers == 0 {
            warn!(tellers, fallback = default.tellers, "invalid teller count, using default");
            default.tellers
        } else {
            tellers
        };

        Self { tellers }
    }
}

/// Multi-teller strategy
#[derive(Debug, Clone)]
pub struct ConcurrentProcessingStrategy {
    config: TellerConfig,
}

impl ConcurrentProcessingStrategy {
    pub fn new(config: TellerConfig) -> Self {
        Self { config }
    }

    /// Deal operations round-robin into one queue per teller
    pub fn partition(&self, operations: Vec<TellerOperation>) -> Vec<Vec<TellerOperation>> {
        let tellers = self.config.tellers.max(1);
        let mut queues: Vec<Vec<TellerOperation>> = (0..tellers)
            .map(|_| Vec::with_capacity(operations.len() / tellers + 1))
            .collect();

        for (index, operation) in operations.into_iter().enumerate() {
            queues[index % tellers].push(operation);
        }

        queues
    }
}

impl ProcessingStrategy for ConcurrentProcessingStrategy {
    fn process(
        &self,
        engine: &Arc<TellerEngine>,
        operations: Vec<TellerOperation>,
    ) -> Result<(), LedgerError> {
        let queues = self.partition(operations);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(queues.len())
            .thread_name("teller")
            .build()
            .map_err(|e| LedgerError::runtime(format!("failed to create tokio runtime: {e}")))?;

        runtime.block_on(async {
            let tasks = queues.into_iter().enumerate().map(|(teller, queue)| {
                let engine = Arc::clone(engine);
                tokio::task::spawn_blocking(move || {
                    debug!(teller, operations = queue.len(), "teller started");
                    for operation in &queue {
                        // Rejections are counted by the engine
                        let _ = engine.process(operation);
                    }
                    debug!(teller, "teller finished");
                })
            });

            for result in futures::future::join_all(tasks).await {
                result.map_err(|e| LedgerError::runtime(format!("teller failed: {e}")))?;
            }

            Ok(())
        })
    }
}
