//! Transfer state machine
//!
//! A transfer moves through `Validating → Debited → Credited → Committed`. Any
//! failure before `Committed` moves it to `RolledBack`, after the unit of work
//! has undone whatever was applied. Only `Committed` and `RolledBack` are ever
//! observable from outside the engine.

use crate::types::{AccountNumber, TransactionRecord};
use rust_decimal::Decimal;
use tracing::debug;

/// Progress of a single transfer request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Inputs checked, accounts resolved and locked
    Validating,
    /// Source debited inside the unit of work
    Debited,
    /// Destination credited inside the unit of work
    Credited,
    /// Balances and records persisted together
    Committed,
    /// Every applied delta undone, nothing persisted
    RolledBack,
}

impl TransferState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferState::Committed | TransferState::RolledBack)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_advance_to(self, next: TransferState) -> bool {
        use TransferState::*;

        match (self, next) {
            (Validating, Debited) | (Debited, Credited) | (Credited, Committed) => true,
            (state, RolledBack) => !state.is_terminal(),
            _ => false,
        }
    }
}

/// Trail of states a transfer went through
#[derive(Debug, Clone)]
pub(crate) struct TransferProgress {
    trail: Vec<TransferState>,
}

impl TransferProgress {
    pub(crate) fn new() -> Self {
        Self {
            trail: vec![TransferState::Validating],
        }
    }

    pub(crate) fn state(&self) -> TransferState {
        // The trail always starts with Validating
        self.trail[self.trail.len() - 1]
    }

    pub(crate) fn advance(&mut self, next: TransferState) {
        debug_assert!(
            self.state().can_advance_to(next),
            "illegal transfer transition {:?} -> {:?}",
            self.state(),
            next
        );
        debug!(from = ?self.state(), to = ?next, "Transfer state");
        self.trail.push(next);
    }

    pub(crate) fn trail(&self) -> &[TransferState] {
        &self.trail
    }
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub from: AccountNumber,
    pub to: AccountNumber,
    pub amount: Decimal,

    /// Source balance after the debit
    pub from_balance: Decimal,

    /// Destination balance after the credit
    pub to_balance: Decimal,

    /// Withdrawal, deposit and audit record, in append order
    pub records: Vec<TransactionRecord>,

    /// States the transfer went through, ending in `Committed`
    pub trail: Vec<TransferState>,
}

#[cfg(test)]
mod tests {
    use super::TransferState::*;
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::validate_to_debit(Validating, Debited, true)]
    #[case::debit_to_credit(Debited, Credited, true)]
    #[case::credit_to_commit(Credited, Committed, true)]
    #[case::validating_fails(Validating, RolledBack, true)]
    #[case::debited_fails(Debited, RolledBack, true)]
    #[case::credited_fails(Credited, RolledBack, true)]
    #[case::skip_credit(Debited, Committed, false)]
    #[case::skip_debit(Validating, Credited, false)]
    #[case::commit_is_final(Committed, RolledBack, false)]
    #[case::rollback_is_final(RolledBack, Validating, false)]
    #[case::no_going_back(Credited, Debited, false)]
    fn test_transitions(
        #[case] from: TransferState,
        #[case] to: TransferState,
        #[case] legal: bool,
    ) {
        assert_eq!(from.can_advance_to(to), legal);
    }

    #[test]
    fn test_progress_trail() {
        let mut progress = TransferProgress::new();
        progress.advance(Debited);
        progress.advance(RolledBack);

        assert_eq!(progress.state(), RolledBack);
        assert!(progress.state().is_terminal());
        assert_eq!(progress.trail(), &[Validating, Debited, RolledBack]);
    }

    #[test]
    #[should_panic(expected = "illegal transfer transition")]
    #[cfg(debug_assertions)]
    fn test_progress_rejects_illegal_transition() {
        let mut progress = TransferProgress::new();
        progress.advance(Committed);
    }
}
