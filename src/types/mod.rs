//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and the per-account balance mutation
//! - `transaction`: Transaction records and identifiers
//! - `request`: Validated ingress requests and the `Command` enum
//! - `error`: Error types for the ledger engine

pub mod account;
pub mod error;
pub mod request;
pub mod transaction;

pub use account::{Account, AccountNumber};
pub use error::LedgerError;
pub use request::{AccountRequest, Command, OpenAccountRequest, TransferRequest};
pub use transaction::{NewRecord, RecordId, TransactionKind, TransactionRecord};
