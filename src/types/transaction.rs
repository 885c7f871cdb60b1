//! Transaction record types for the ledger engine
//!
//! Records are the immutable audit trail of completed money movements. A
//! `NewRecord` is what an operation stages; the recorder turns it into a
//! `TransactionRecord` by assigning the next sequence id.

use super::account::AccountNumber;
use rust_decimal::Decimal;

/// Record sequence identifier
///
/// Assigned by the recorder, starting at 1 and strictly increasing in append order.
pub type RecordId = u64;

/// Kinds of money movement recorded by the ledger
///
/// A transfer is not a kind of its own: it is recorded as a withdrawal on the
/// source, a deposit on the destination, and a withdrawal audit record that
/// names the destination as its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Funds credited to the source account
    Deposit,

    /// Funds debited from the source account
    Withdrawal,
}

/// A record waiting to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub source: AccountNumber,
    pub target: Option<AccountNumber>,
}

impl NewRecord {
    pub fn deposit(account: &str, amount: Decimal) -> Self {
        NewRecord {
            kind: TransactionKind::Deposit,
            amount,
            source: account.to_string(),
            target: None,
        }
    }

    pub fn withdrawal(account: &str, amount: Decimal) -> Self {
        NewRecord {
            kind: TransactionKind::Withdrawal,
            amount,
            source: account.to_string(),
            target: None,
        }
    }

    /// Withdrawal on `from` tagged with the transfer destination
    pub fn transfer_audit(from: &str, to: &str, amount: Decimal) -> Self {
        NewRecord {
            kind: TransactionKind::Withdrawal,
            amount,
            source: from.to_string(),
            target: Some(to.to_string()),
        }
    }
}

/// Immutable, appended transaction record
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Sequence id assigned at append time
    pub id: RecordId,

    /// Deposit or withdrawal
    pub kind: TransactionKind,

    /// Positive amount moved
    pub amount: Decimal,

    /// Account the movement was applied to
    pub source: AccountNumber,

    /// Transfer destination, present on transfer audit records only
    pub target: Option<AccountNumber>,
}

impl TransactionRecord {
    /// Whether this is a transfer audit record
    ///
    /// Audit records document a movement that the paired withdrawal and deposit
    /// records already account for, so they carry no balance effect of their own.
    pub fn is_audit(&self) -> bool {
        self.target.is_some()
    }

    /// Signed effect of this record on its source account's balance
    pub fn applied_delta(&self) -> Decimal {
        if self.is_audit() {
            return Decimal::ZERO;
        }
        match self.kind {
            TransactionKind::Deposit => self.amount,
            TransactionKind::Withdrawal => -self.amount,
        }
    }
}
