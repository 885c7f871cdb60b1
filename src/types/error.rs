//! Error types for the ledger engine
//!
//! This module defines every error the consistency core and its CSV front end can
//! return. Errors carry the account numbers and amounts involved so that a
//! rejected command can be diagnosed from the log line alone.
//!
//! # Error Categories
//!
//! - **Ledger Errors**: duplicate or missing accounts, invalid amounts, insufficient funds
//! - **Concurrency Errors**: lock acquisition timed out (the only retryable error)
//! - **Front-end Errors**: file not found, I/O failures, malformed CSV

use rust_decimal::Decimal;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// Main error type for the ledger engine
///
/// Every core operation either succeeds completely or returns one of these
/// variants with no partial mutation left behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// An account with this number already exists
    #[error("Account {account} already exists")]
    DuplicateAccount {
        /// The account number that was opened twice
        account: String,
    },

    /// No account exists with this number
    #[error("Account {account} not found")]
    AccountNotFound {
        /// The account number that was looked up
        account: String,
    },

    /// Account number is empty or whitespace only
    #[error("Invalid account number '{account}'")]
    InvalidAccountNumber {
        /// The rejected account number
        account: String,
    },

    /// Amount is zero or negative where a strictly positive amount is required
    #[error("Invalid amount {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Applying the delta would leave the balance negative
    ///
    /// The balance is left unchanged.
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account number
        account: String,
        /// Balance at the time of the check
        balance: Decimal,
        /// Amount that was requested
        requested: Decimal,
    },

    /// Source and destination of a transfer are the same account
    #[error("Cannot transfer from account {account} to itself")]
    SameAccountTransfer {
        /// The account number used on both sides
        account: String,
    },

    /// Balance arithmetic would overflow the decimal range
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account number
        account: String,
    },

    /// The account lock could not be acquired within the configured timeout
    ///
    /// No mutation happened, so the request can be retried as is.
    #[error("Timed out waiting for lock on account {account}")]
    LockTimeout {
        /// Account whose lock was contended
        account: String,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing or conversion error
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// Whether the failed request may be retried unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::LockTimeout { .. })
    }

    pub fn duplicate_account(account: &str) -> Self {
        LedgerError::DuplicateAccount {
            account: account.to_string(),
        }
    }

    pub fn account_not_found(account: &str) -> Self {
        LedgerError::AccountNotFound {
            account: account.to_string(),
        }
    }

    pub fn invalid_account_number(account: &str) -> Self {
        LedgerError::InvalidAccountNumber {
            account: account.to_string(),
        }
    }

    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    pub fn insufficient_funds(account: &str, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account: account.to_string(),
            balance,
            requested,
        }
    }

    pub fn same_account_transfer(account: &str) -> Self {
        LedgerError::SameAccountTransfer {
            account: account.to_string(),
        }
    }

    pub fn arithmetic_overflow(operation: &str, account: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }

    pub fn lock_timeout(account: &str) -> Self {
        LedgerError::LockTimeout {
            account: account.to_string(),
        }
    }

    /// Classify a failure to open an input file
    pub fn open_failed(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            ErrorKind::NotFound => LedgerError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => LedgerError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), error),
            },
        }
    }

    pub fn parse_error(line: Option<u64>, message: impl Into<String>) -> Self {
        LedgerError::ParseError {
            line,
            message: message.into(),
        }
    }
}
