//! Synchronous processing strategy
//!
//! Single-threaded implementation of the ProcessingStrategy trait. Commands are
//! executed one at a time, in file order.
//!
//! # Design
//!
//! The SyncProcessingStrategy only orchestrates, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Command execution to `LedgerEngine`
//! - CSV output to `csv_format::write_accounts_csv`
//!
//! Memory use is O(accounts + records): rows are streamed, never loaded at once.

use crate::core::{LedgerConfig, LedgerEngine};
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use ledger_engine::core::LedgerConfig;
/// use ledger_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(LedgerConfig::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("commands.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    ledger_config: LedgerConfig,
}

impl SyncProcessingStrategy {
    pub fn new(ledger_config: LedgerConfig) -> Self {
        Self { ledger_config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Stream rows through a fresh engine, then write the final balances
    ///
    /// Fatal errors (file not found, output errors) are returned immediately.
    /// Row and command errors are logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let engine = LedgerEngine::with_config(&self.ledger_config);
        let reader = SyncReader::new(input_path)?;

        let mut executed = 0usize;
        for result in reader {
            match result {
                Ok(command) => match engine.execute(&command) {
                    Ok(()) => executed += 1,
                    Err(e) => warn!(?command, error = %e, "Command rejected"),
                },
                Err(e) => warn!(error = %e, "CSV parsing error"),
            }
        }
        debug!(executed, "Command file processed");

        let accounts = engine.accounts().map_err(|e| e.to_string())?;
        write_accounts_csv(&accounts, output)?;

        Ok(())
    }
}
