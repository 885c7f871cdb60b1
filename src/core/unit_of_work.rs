//! Explicit unit of work
//!
//! A `UnitOfWork` is the atomic boundary of every money movement. It holds the
//! locks of all accounts the operation touches for its whole lifetime, applies
//! balance deltas while keeping an undo log, and stages records instead of
//! writing them.
//!
//! - `commit` appends the staged records in one batch while the account locks are
//!   still held, then releases the locks.
//! - `rollback` restores every touched balance, newest first, and discards the
//!   staged records.
//! - Dropping a unit of work that was neither committed nor rolled back rolls it
//!   back.
//!
//! Because readers take the same account locks, nothing applied inside a unit of
//! work is observable until it commits.

use crate::core::transaction_recorder::TransactionRecorder;
use crate::types::{Account, LedgerError, NewRecord, TransactionRecord};
use parking_lot::MutexGuard;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Locked accounts plus pending changes
pub struct UnitOfWork<'a> {
    /// Locked accounts, in lock order
    accounts: Vec<MutexGuard<'a, Account>>,

    /// (account index, balance before the delta), oldest first
    undo: Vec<(usize, Decimal)>,

    /// Records to append on commit
    staged: Vec<NewRecord>,

    /// Set once committed or rolled back
    finished: bool,
}

impl<'a> UnitOfWork<'a> {
    pub(crate) fn new(accounts: Vec<MutexGuard<'a, Account>>) -> Self {
        Self {
            accounts,
            undo: Vec::new(),
            staged: Vec::new(),
            finished: false,
        }
    }

    /// Current (uncommitted) view of a locked account
    pub fn account(&self, number: &str) -> Result<&Account, LedgerError> {
        let index = self.position(number)?;
        Ok(&*self.accounts[index])
    }

    /// Copies of every locked account, in lock order
    pub fn snapshot(&self) -> Vec<Account> {
        self.accounts.iter().map(|guard| (**guard).clone()).collect()
    }

    /// Apply a signed delta to a locked account
    ///
    /// On error the balance is unchanged and nothing is added to the undo log.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account is not part of this unit of work
    /// - `InsufficientFunds` / `ArithmeticOverflow` from the balance check
    pub fn apply_delta(&mut self, number: &str, delta: Decimal) -> Result<Decimal, LedgerError> {
        let index = self.position(number)?;
        let before = self.accounts[index].balance;
        let after = self.accounts[index].apply_delta(delta)?;
        self.undo.push((index, before));
        Ok(after)
    }

    /// Queue a record for the commit
    pub fn stage(&mut self, record: NewRecord) {
        self.staged.push(record);
    }

    pub fn staged(&self) -> &[NewRecord] {
        &self.staged
    }

    /// Number of deltas applied so far
    pub fn applied(&self) -> usize {
        self.undo.len()
    }

    /// Make the applied deltas and staged records permanent
    ///
    /// # Returns
    ///
    /// The appended records with their sequence ids.
    pub fn commit(mut self, recorder: &TransactionRecorder) -> Vec<TransactionRecord> {
        let staged = std::mem::take(&mut self.staged);
        let records = recorder.append_all(staged);
        self.undo.clear();
        self.finished = true;

        debug!(records = records.len(), "Committed unit of work");
        records
    }

    /// Undo every applied delta and discard staged records
    pub fn rollback(mut self) {
        self.undo_all();
        self.finished = true;
    }

    fn undo_all(&mut self) {
        let reverted = self.undo.len();
        while let Some((index, before)) = self.undo.pop() {
            self.accounts[index].balance = before;
        }
        self.staged.clear();

        if reverted > 0 {
            warn!(reverted, "Rolled back unit of work");
        }
    }

    fn position(&self, number: &str) -> Result<usize, LedgerError> {
        self.accounts
            .iter()
            .position(|account| account.number == number)
            .ok_or_else(|| LedgerError::account_not_found(number))
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.undo_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::account_ledger::{AccountLedger, LedgerConfig};
    use crate::core::transaction_recorder::TransactionRecorder;
    use crate::types::{LedgerError, NewRecord};
    use rust_decimal::Decimal;

    fn ledger_with(accounts: &[(&str, i64)]) -> AccountLedger {
        let ledger = AccountLedger::new(&LedgerConfig::default());
        for (number, balance) in accounts {
            ledger.open(number, Decimal::new(*balance, 0)).unwrap();
        }
        ledger
    }

    #[test]
    fn test_commit_persists_deltas_and_records() {
        let ledger = ledger_with(&[("A", 100), ("B", 1)]);
        let recorder = TransactionRecorder::new();

        let locks = ledger.lock_in_order(&["A", "B"]).unwrap();
        let mut work = locks.begin().unwrap();
        work.apply_delta("A", Decimal::new(-40, 0)).unwrap();
        work.apply_delta("B", Decimal::new(40, 0)).unwrap();
        work.stage(NewRecord::withdrawal("A", Decimal::new(40, 0)));
        work.stage(NewRecord::deposit("B", Decimal::new(40, 0)));
        let records = work.commit(&recorder);

        assert_eq!(records.len(), 2);
        assert_eq!(ledger.get("A").unwrap().balance, Decimal::new(60, 0));
        assert_eq!(ledger.get("B").unwrap().balance, Decimal::new(41, 0));
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_rollback_restores_balances_and_discards_records() {
        let ledger = ledger_with(&[("A", 100), ("B", 5)]);
        let recorder = TransactionRecorder::new();

        let locks = ledger.lock_in_order(&["A", "B"]).unwrap();
        let mut work = locks.begin().unwrap();
        work.apply_delta("A", Decimal::new(-40, 0)).unwrap();
        work.apply_delta("A", Decimal::new(-10, 0)).unwrap();
        work.apply_delta("B", Decimal::new(50, 0)).unwrap();
        work.stage(NewRecord::withdrawal("A", Decimal::new(50, 0)));
        assert_eq!(work.applied(), 3);
        work.rollback();

        assert_eq!(ledger.get("A").unwrap().balance, Decimal::new(100, 0));
        assert_eq!(ledger.get("B").unwrap().balance, Decimal::new(5, 0));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_drop_without_commit_rolls_back() {
        let ledger = ledger_with(&[("A", 100)]);

        {
            let locks = ledger.lock_in_order(&["A"]).unwrap();
            let mut work = locks.begin().unwrap();
            work.apply_delta("A", Decimal::new(-99, 0)).unwrap();
            assert_eq!(work.account("A").unwrap().balance, Decimal::ONE);
        }

        assert_eq!(ledger.get("A").unwrap().balance, Decimal::new(100, 0));
    }

    #[test]
    fn test_failed_delta_is_not_logged_for_undo() {
        let ledger = ledger_with(&[("A", 10)]);
        let locks = ledger.lock_in_order(&["A"]).unwrap();
        let mut work = locks.begin().unwrap();

        let result = work.apply_delta("A", Decimal::new(-11, 0));

        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(work.applied(), 0);
        assert_eq!(work.account("A").unwrap().balance, Decimal::new(10, 0));
    }

    #[test]
    fn test_apply_delta_outside_lock_set() {
        let ledger = ledger_with(&[("A", 10), ("B", 10)]);
        let locks = ledger.lock_in_order(&["A"]).unwrap();
        let mut work = locks.begin().unwrap();

        assert_eq!(
            work.apply_delta("B", Decimal::ONE),
            Err(LedgerError::account_not_found("B"))
        );
    }
}
