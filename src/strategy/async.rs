//! Asynchronous batch processing strategy
//!
//! Multi-threaded implementation of the ProcessingStrategy trait.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (account partitioning + blocking tasks)
//!     └── LedgerEngine (shared, thread-safe)
//!         ├── AccountLedger (per-account locks)
//!         └── TransactionRecorder (append-only records)
//! ```
//!
//! Batches are processed one after another, so commands on the same account keep
//! file order across batch boundaries. Inside a batch, groups of commands that
//! share no account run in parallel.

use crate::core::{BatchProcessor, LedgerConfig, LedgerEngine};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_accounts_csv;
use crate::strategy::ProcessingStrategy;
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Number of commands per batch
    pub batch_size: usize,
    /// Most command groups running at once; also the runtime's worker count
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                default = default.batch_size,
                "Invalid batch_size (0), using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                default = default.max_concurrent_batches,
                "Invalid max_concurrent_batches (0), using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone, Default)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    ledger_config: LedgerConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig, ledger_config: LedgerConfig) -> Self {
        Self {
            config,
            ledger_config,
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Read batches, run each one through the batch processor, write balances
    ///
    /// Fatal errors (file not found, runtime errors) are returned immediately.
    /// Row and command errors are logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = build_runtime(&self.config)?;

        let engine = LedgerEngine::with_config(&self.ledger_config);
        let processor = BatchProcessor::new(engine.clone());

        runtime.block_on(async {
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| LedgerError::open_failed(input_path, e).to_string())?;

            // csv-async reads futures::io, not tokio::io
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut batches = 0usize;
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                // finish this batch before reading the next one
                processor.process_batch(batch).await;
                batches += 1;
            }
            debug!(batches, "Command file processed");

            Ok::<(), String>(())
        })?;

        let accounts = engine.accounts().map_err(|e| e.to_string())?;
        write_accounts_csv(&accounts, output)?;

        Ok(())
    }
}

/// Runtime whose blocking pool holds at most `max_concurrent_batches` threads
///
/// Command groups run on `spawn_blocking`, so the blocking pool is what bounds
/// how many of them execute in parallel.
fn build_runtime(config: &BatchConfig) -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.max_concurrent_batches)
        .max_blocking_threads(config.max_concurrent_batches)
        .build()
        .map_err(|e| format!("Failed to create tokio runtime: {}", e))
}
