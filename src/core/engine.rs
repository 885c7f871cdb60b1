//! Ledger engine
//!
//! This module provides the `LedgerEngine`, which orchestrates every money
//! movement by coordinating the `AccountLedger` and the `TransactionRecorder`.
//!
//! Each operation runs inside one [`UnitOfWork`](crate::core::unit_of_work::UnitOfWork):
//! the touched accounts are locked in account-number order, deltas are applied,
//! records are staged, and the whole unit either commits or rolls back before
//! the operation returns. Callers never see a half-applied operation.
//!
//! The engine enforces business rules such as:
//! - Strictly positive amounts for every movement
//! - Distinct, existing accounts on both sides of a transfer
//! - Non-negative balances (checked by the ledger under the account lock)

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use crate::core::account_ledger::{AccountLedger, LedgerConfig};
use crate::core::transaction_recorder::TransactionRecorder;
use crate::core::transfer::{TransferProgress, TransferReceipt, TransferState};
use crate::types::request::require_positive;
use crate::types::{Account, Command, LedgerError, NewRecord, TransactionRecord};

/// Result of replaying an account's records against its balance
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub account: String,

    /// Balance held by the ledger
    pub balance: Decimal,

    /// Opening balance plus every applied deposit minus every applied withdrawal
    pub replayed: Decimal,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.balance == self.replayed
    }
}

/// Orchestrator for deposits, withdrawals and transfers
///
/// Cheap to clone: both stores are shared handles, so clones can be moved into
/// worker threads or blocking tasks and operate on the same ledger.
#[derive(Debug, Clone)]
pub struct LedgerEngine {
    /// Account balances
    ledger: Arc<AccountLedger>,

    /// Append-only audit trail
    recorder: Arc<TransactionRecorder>,
}

impl LedgerEngine {
    /// Create an engine over existing store handles
    pub fn new(ledger: Arc<AccountLedger>, recorder: Arc<TransactionRecorder>) -> Self {
        Self { ledger, recorder }
    }

    /// Create an engine with fresh, empty stores
    pub fn with_config(config: &LedgerConfig) -> Self {
        Self::new(
            Arc::new(AccountLedger::new(config)),
            Arc::new(TransactionRecorder::new()),
        )
    }

    pub fn ledger(&self) -> &Arc<AccountLedger> {
        &self.ledger
    }

    pub fn recorder(&self) -> &Arc<TransactionRecorder> {
        &self.recorder
    }

    /// Validate and execute a single ingress command
    ///
    /// # Errors
    ///
    /// Validation errors (`InvalidAccountNumber`, `InvalidAmount`) are returned
    /// before the core is touched; everything else comes from the operation.
    pub fn execute(&self, command: &Command) -> Result<(), LedgerError> {
        command.validate()?;

        match command {
            Command::Open(request) => self
                .open_account(&request.account_number, request.initial_balance)
                .map(|_| ()),
            Command::Deposit(request) => self
                .deposit(&request.account_number, request.amount)
                .map(|_| ()),
            Command::Withdraw(request) => self
                .withdraw(&request.account_number, request.amount)
                .map(|_| ()),
            Command::Transfer(request) => self
                .transfer(&request.from_account, &request.to_account, request.amount)
                .map(|_| ()),
        }
    }

    /// Open a new account
    pub fn open_account(
        &self,
        number: &str,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        self.ledger.open(number, initial_balance)
    }

    /// Snapshot of one account
    pub fn account(&self, number: &str) -> Result<Account, LedgerError> {
        self.ledger.get(number)
    }

    /// Snapshots of all accounts, sorted by account number
    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.ledger.list()
    }

    /// Every record in append order
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.recorder.list_all()
    }

    /// Records applied to one account, in append order
    pub fn records_for(&self, number: &str) -> Vec<TransactionRecord> {
        self.recorder.list_by_source_account(number)
    }

    /// Credit an account and record a deposit
    ///
    /// # Returns
    ///
    /// The new balance.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not strictly positive
    /// - `AccountNotFound`, `LockTimeout`, `ArithmeticOverflow`
    ///
    /// No record is written when the credit fails.
    #[instrument(skip(self), level = "debug")]
    pub fn deposit(&self, number: &str, amount: Decimal) -> Result<Decimal, LedgerError> {
        self.move_funds(number, amount, NewRecord::deposit(number, amount))
    }

    /// Debit an account and record a withdrawal
    ///
    /// # Returns
    ///
    /// The new balance.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not strictly positive
    /// - `InsufficientFunds` if `amount` exceeds the balance; the balance is unchanged
    /// - `AccountNotFound`, `LockTimeout`
    #[instrument(skip(self), level = "debug")]
    pub fn withdraw(&self, number: &str, amount: Decimal) -> Result<Decimal, LedgerError> {
        self.move_funds(number, -amount, NewRecord::withdrawal(number, amount))
    }

    fn move_funds(
        &self,
        number: &str,
        delta: Decimal,
        record: NewRecord,
    ) -> Result<Decimal, LedgerError> {
        require_positive(record.amount)?;

        let locks = self.ledger.lock_in_order(&[number])?;
        let mut work = locks.begin()?;
        let balance = work.apply_delta(number, delta)?;
        work.stage(record);
        work.commit(&self.recorder);

        debug!(account = number, balance = %balance, "Balance updated");
        Ok(balance)
    }

    /// Move funds from one account to another as a single unit
    ///
    /// The source is debited, the destination credited, and three records are
    /// written: a withdrawal on `from`, a deposit on `to`, and a withdrawal audit
    /// record on `from` whose target is `to`. Either all of that commits or none
    /// of it does.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not strictly positive
    /// - `SameAccountTransfer` if `from == to`
    /// - `AccountNotFound` if either account is missing (checked before any mutation)
    /// - `InsufficientFunds` if the source cannot cover `amount`
    /// - `ArithmeticOverflow` if the destination cannot hold the credit; the
    ///   debit is rolled back
    /// - `LockTimeout` if either lock is not acquired in time
    #[instrument(skip(self), level = "debug")]
    pub fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        let mut progress = TransferProgress::new();
        self.transfer_tracked(from, to, amount, &mut progress)
    }

    /// Run a transfer, recording every state it passes through in `progress`
    ///
    /// On failure `progress` ends in `RolledBack`.
    pub(crate) fn transfer_tracked(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        progress: &mut TransferProgress,
    ) -> Result<TransferReceipt, LedgerError> {
        match self.run_transfer(from, to, amount, progress) {
            Ok((from_balance, to_balance, records)) => Ok(TransferReceipt {
                from: from.to_string(),
                to: to.to_string(),
                amount,
                from_balance,
                to_balance,
                records,
                trail: progress.trail().to_vec(),
            }),
            Err(error) => {
                progress.advance(TransferState::RolledBack);
                warn!(from, to, amount = %amount, error = %error, "Transfer rolled back");
                Err(error)
            }
        }
    }

    fn run_transfer(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        progress: &mut TransferProgress,
    ) -> Result<(Decimal, Decimal, Vec<TransactionRecord>), LedgerError> {
        require_positive(amount)?;
        if from == to {
            return Err(LedgerError::same_account_transfer(from));
        }

        let locks = self.ledger.lock_in_order(&[from, to])?;
        let mut work = locks.begin()?;

        let from_balance = work.apply_delta(from, -amount)?;
        work.stage(NewRecord::withdrawal(from, amount));
        progress.advance(TransferState::Debited);

        let to_balance = match work.apply_delta(to, amount) {
            Ok(balance) => balance,
            Err(error) => {
                work.rollback();
                return Err(error);
            }
        };
        work.stage(NewRecord::deposit(to, amount));
        progress.advance(TransferState::Credited);

        work.stage(NewRecord::transfer_audit(from, to, amount));
        let records = work.commit(&self.recorder);
        progress.advance(TransferState::Committed);

        Ok((from_balance, to_balance, records))
    }

    /// Replay an account's records and compare with its balance
    ///
    /// Runs under the account lock, so the balance and the records it is
    /// compared with belong to the same committed state.
    pub fn reconcile(&self, number: &str) -> Result<Reconciliation, LedgerError> {
        let locks = self.ledger.lock_in_order(&[number])?;
        let work = locks.begin()?;
        let account = work.account(number)?;

        let replayed = self
            .recorder
            .list_by_source_account(number)
            .iter()
            .try_fold(account.opening_balance, |total, record| {
                total.checked_add(record.applied_delta())
            })
            .ok_or_else(|| LedgerError::arithmetic_overflow("reconcile", number))?;

        Ok(Reconciliation {
            account: number.to_string(),
            balance: account.balance,
            replayed,
        })
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::with_config(&LedgerConfig::default())
    }
}
