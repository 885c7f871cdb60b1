//! Core business logic module
//!
//! This module contains the ledger consistency core:
//! - `account_ledger` - Account balances and the per-account serialization point
//! - `transaction_recorder` - Append-only record of completed movements
//! - `unit_of_work` - Explicit atomic boundary with undo log and staged records
//! - `transfer` - Transfer state machine and receipt
//! - `engine` - Deposit / withdraw / transfer orchestration
//! - `batch_processor` - Concurrent batch execution partitioned by account

pub mod account_ledger;
pub mod batch_processor;
pub mod engine;
pub mod transaction_recorder;
pub mod transfer;
pub mod unit_of_work;

pub use account_ledger::{AccountLedger, LedgerConfig, LockSet};
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::{LedgerEngine, Reconciliation};
pub use transaction_recorder::TransactionRecorder;
pub use transfer::{TransferReceipt, TransferState};
pub use unit_of_work::UnitOfWork;
