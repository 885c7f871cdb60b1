//! Benchmark suite for comparing processing strategies
//!
//! Compares the synchronous and asynchronous strategies using divan.
//!
//! ```bash
//! cargo bench
//! ```
//!
//! Input files are generated into temp files: `accounts` accounts are opened,
//! then a deterministic mix of deposits, withdrawals and transfers follows.
//! Fewer accounts means more commands end up in the same partition.

use ledger_engine::cli::StrategyType;
use ledger_engine::core::LedgerConfig;
use ledger_engine::strategy::{create_strategy, BatchConfig};
use std::fmt::Write as _;
use std::io::Write;
use tempfile::NamedTempFile;

fn main() {
    divan::main();
}

const COMMANDS: usize = 10_000;

fn generate_commands(accounts: usize) -> NamedTempFile {
    let mut csv = String::from("type,account,target,amount\n");
    for account in 0..accounts {
        let _ = writeln!(csv, "open,ACC-{},,1000", account);
    }
    for i in 0..COMMANDS {
        let account = i % accounts;
        let _ = match i % 4 {
            0 => writeln!(csv, "deposit,ACC-{},,{}.25", account, i % 50 + 1),
            1 => writeln!(csv, "withdraw,ACC-{},,{}", account, i % 30 + 1),
            _ => writeln!(
                csv,
                "transfer,ACC-{},ACC-{},{}",
                account,
                (account * 7 + 3) % accounts,
                i % 20 + 1
            ),
        };
    }

    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(csv.as_bytes())
        .expect("Failed to write benchmark input");
    file
}

#[divan::bench(args = [10, 1_000])]
fn sync_strategy(bencher: divan::Bencher, accounts: usize) {
    let input = generate_commands(accounts);
    let strategy = create_strategy(StrategyType::Sync, None, LedgerConfig::default());

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(input.path(), &mut output)
            .expect("Processing failed");
    });
}

#[divan::bench(args = [10, 1_000])]
fn async_strategy(bencher: divan::Bencher, accounts: usize) {
    let input = generate_commands(accounts);
    let strategy = create_strategy(
        StrategyType::Async,
        Some(BatchConfig::default()),
        LedgerConfig::default(),
    );

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(input.path(), &mut output)
            .expect("Processing failed");
    });
}
