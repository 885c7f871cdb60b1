//! Ledger Engine Library
//! # Overview
//!
//! A consistency core for account balances: deposits, withdrawals and atomic
//! transfers with per-account serialization, deterministic lock ordering, bounded
//! lock waits and rollback. A CSV front end drives it with a sync or an async
//! batch strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, TransactionRecord, requests, LedgerError)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - The consistency core:
//!   - [`core::account_ledger`] - Account balances and per-account locks
//!   - [`core::transaction_recorder`] - Append-only transaction records
//!   - [`core::unit_of_work`] - Atomic boundary with undo log
//!   - [`core::engine`] - Deposit / withdraw / transfer orchestration
//!   - [`core::batch_processor`] - Concurrent batches partitioned by account
//! - [`io`] - CSV reading and output
//! - [`strategy`] - Sync and async command-file pipelines
//!
//! # Operations
//!
//! - **Open**: Create an account with an opening balance
//! - **Deposit**: Credit an account
//! - **Withdraw**: Debit an account (never below zero)
//! - **Transfer**: Debit one account and credit another, all or nothing
//!
//! # Example
//!
//! ```
//! use ledger_engine::LedgerEngine;
//! use rust_decimal::Decimal;
//!
//! let engine = LedgerEngine::default();
//! engine.open_account("A", Decimal::new(1000, 0)).unwrap();
//! engine.open_account("B", Decimal::new(500, 0)).unwrap();
//!
//! let receipt = engine.transfer("A", "B", Decimal::new(400, 0)).unwrap();
//! assert_eq!(receipt.from_balance, Decimal::new(600, 0));
//! assert_eq!(receipt.to_balance, Decimal::new(900, 0));
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{AccountLedger, LedgerConfig, LedgerEngine, TransactionRecorder, TransferState};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountNumber, Command, LedgerError, RecordId, TransactionKind, TransactionRecord,
};
