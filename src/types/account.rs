//! Account-related types for the ledger engine
//!
//! This module defines the Account structure and the single balance mutation
//! that the ledger serializes per account.

use super::error::LedgerError;
use rust_decimal::Decimal;

/// Account number
///
/// Free-form, non-blank identifier. Ordering on account numbers is the global
/// lock acquisition order.
pub type AccountNumber = String;

/// Balance-bearing account
///
/// Instances handed out by the ledger are snapshots; the live value sits behind
/// the account's lock.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Unique, immutable account number
    pub number: AccountNumber,

    /// Current balance, never negative
    pub balance: Decimal,

    /// Balance the account was opened with
    ///
    /// Kept so the balance can be reconciled against the record trail.
    pub opening_balance: Decimal,
}

impl Account {
    /// Create a new account holding its opening balance
    pub fn new(number: AccountNumber, opening_balance: Decimal) -> Self {
        Account {
            number,
            balance: opening_balance,
            opening_balance,
        }
    }

    /// Apply a signed delta to the balance
    ///
    /// Positive deltas credit the account, negative deltas debit it. The balance
    /// is only written when the result is representable and non-negative.
    ///
    /// # Errors
    ///
    /// - `InsufficientFunds` if the new balance would be negative
    /// - `ArithmeticOverflow` if the addition overflows
    pub fn apply_delta(&mut self, delta: Decimal) -> Result<Decimal, LedgerError> {
        let operation = if delta.is_sign_negative() {
            "debit"
        } else {
            "credit"
        };

        let new_balance = self
            .balance
            .checked_add(delta)
            .ok_or_else(|| LedgerError::arithmetic_overflow(operation, &self.number))?;

        if new_balance < Decimal::ZERO {
            return Err(LedgerError::insufficient_funds(
                &self.number,
                self.balance,
                delta.abs(),
            ));
        }

        self.balance = new_balance;
        Ok(new_balance)
    }
}
