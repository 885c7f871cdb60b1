//! Processing strategy module for command files
//!
//! This module defines the Strategy pattern for complete command-file pipelines,
//! covering both CSV parsing and ledger processing. Different implementations
//! (synchronous, asynchronous batch) can be selected at runtime and must produce
//! identical output for the same input.

use crate::cli::StrategyType;
use crate::core::LedgerConfig;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete command-file pipelines
///
/// Each strategy reads commands from a CSV file, executes them against a fresh
/// ledger, and writes the final account balances to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Process commands from input file and write balances to output
    ///
    /// # Returns
    ///
    /// * `Ok(())` if processing completed (rejected commands included)
    /// * `Err(String)` if a fatal error occurred
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - The async runtime cannot be started
    /// - Output cannot be written
    ///
    /// Rows that fail to parse and commands the ledger rejects are logged and
    /// skipped; they never abort the run.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `batch_config` - Optional configuration for async batch processing (ignored for sync)
/// * `ledger_config` - Ledger configuration shared by both strategies
pub fn create_strategy(
    strategy_type: StrategyType,
    batch_config: Option<BatchConfig>,
    ledger_config: LedgerConfig,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(ledger_config)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            batch_config.unwrap_or_default(),
            ledger_config,
        )),
    }
}
