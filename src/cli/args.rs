use crate::core::LedgerConfig;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Apply a file of ledger commands and print the final balances
#[derive(Parser, Debug)]
#[command(name = "ledger-engine")]
#[command(about = "Apply a file of ledger commands and print the final balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing commands
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for batched parallel"
    )]
    pub strategy: StrategyType,

    /// Number of commands per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Most command groups processed in parallel (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Most command groups processed in parallel (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Longest wait for a single account lock
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MILLIS",
        help = "Account lock timeout in milliseconds (default: 2000)"
    )]
    pub lock_timeout_ms: Option<u64>,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Build a BatchConfig from the arguments, defaulting what was not given
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Build a LedgerConfig from the arguments
    pub fn to_ledger_config(&self) -> LedgerConfig {
        match self.lock_timeout_ms {
            Some(millis) => LedgerConfig::new(Duration::from_millis(millis)),
            None => LedgerConfig::default(),
        }
    }
}
