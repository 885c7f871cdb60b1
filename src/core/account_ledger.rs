//! Account ledger
//!
//! This module provides the `AccountLedger`, which owns every account balance and
//! is the single serialization point for balance mutation.
//!
//! # Design
//!
//! Accounts live in a `DashMap` keyed by account number. Each value is an
//! `Arc<Mutex<Account>>`: the map only guards membership, while the per-account
//! mutex guards the balance. Handles are cloned out of the map before locking so
//! no map shard is held while waiting on an account.
//!
//! # Lock Discipline
//!
//! - Every lock wait is bounded by the configured timeout and fails with the
//!   retryable `LockTimeout` error.
//! - Multi-account operations acquire locks in ascending account-number order
//!   through [`LockSet`], so two transfers in opposite directions between the same
//!   pair of accounts cannot deadlock.
//! - Readers take the same lock as writers, so a snapshot never shows a balance
//!   from inside an uncommitted unit of work.

use crate::core::unit_of_work::UnitOfWork;
use crate::types::{Account, AccountNumber, LedgerError};
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Shared, lockable account
pub type AccountHandle = Arc<Mutex<Account>>;

/// Configuration for the consistency core
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerConfig {
    /// Longest time any operation waits for a single account lock
    pub lock_timeout: Duration,
}

impl LedgerConfig {
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(2000);

    pub fn new(lock_timeout: Duration) -> Self {
        if lock_timeout.is_zero() {
            tracing::warn!(
                default_ms = Self::DEFAULT_LOCK_TIMEOUT.as_millis() as u64,
                "Invalid lock timeout (0), using default"
            );
            return Self::default();
        }
        Self { lock_timeout }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
        }
    }
}

/// Owner of all account balances
#[derive(Debug)]
pub struct AccountLedger {
    /// Account handles by account number
    accounts: DashMap<AccountNumber, AccountHandle>,

    /// Upper bound on every account lock wait
    lock_timeout: Duration,
}

impl AccountLedger {
    /// Create an empty ledger
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            accounts: DashMap::new(),
            lock_timeout: config.lock_timeout,
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Open a new account
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `initial_balance` is zero or negative
    /// - `DuplicateAccount` if the number is taken; the existing account is untouched
    pub fn open(&self, number: &str, initial_balance: Decimal) -> Result<Account, LedgerError> {
        if initial_balance <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(initial_balance));
        }

        let account = Account::new(number.to_string(), initial_balance);
        let mut created = false;
        self.accounts.entry(number.to_string()).or_insert_with(|| {
            created = true;
            Arc::new(Mutex::new(account.clone()))
        });

        if !created {
            return Err(LedgerError::duplicate_account(number));
        }

        debug!(account = number, balance = %initial_balance, "Opened account");
        Ok(account)
    }

    /// Snapshot of a single account
    pub fn get(&self, number: &str) -> Result<Account, LedgerError> {
        let handle = self.handle(number)?;
        let account = self.lock(number, &handle)?;
        Ok(account.clone())
    }

    /// Snapshots of every account, sorted by account number
    ///
    /// All accounts are locked together, in lock order, before any is read, so
    /// the listing is one consistent state: a concurrent transfer shows up on
    /// both sides or on neither.
    ///
    /// # Errors
    ///
    /// `LockTimeout` if any account lock is not acquired in time.
    pub fn list(&self) -> Result<Vec<Account>, LedgerError> {
        let numbers: Vec<AccountNumber> = self
            .accounts
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        let numbers: Vec<&str> = numbers.iter().map(String::as_str).collect();

        let locks = self.lock_in_order(&numbers)?;
        let work = locks.begin()?;
        Ok(work.snapshot())
    }

    /// Number of open accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Atomically apply a signed delta to one account
    ///
    /// Reads the balance, checks that `balance + delta` is non-negative and writes
    /// it back, all under the account lock. Concurrent callers on the same account
    /// are serialized, so no update is lost and no two debits can both succeed
    /// against a balance that only covers one of them.
    ///
    /// # Returns
    ///
    /// The new balance.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account does not exist
    /// - `LockTimeout` if the account lock is not acquired in time
    /// - `InsufficientFunds` if the balance would go negative
    /// - `ArithmeticOverflow` if the balance would overflow
    pub fn apply_delta(&self, number: &str, delta: Decimal) -> Result<Decimal, LedgerError> {
        let handle = self.handle(number)?;
        let mut account = self.lock(number, &handle)?;
        account.apply_delta(delta)
    }

    /// Resolve accounts and order them for locking
    ///
    /// Duplicates are collapsed. Locks are not taken until [`LockSet::begin`].
    ///
    /// # Errors
    ///
    /// `AccountNotFound` for the first number that does not resolve.
    pub fn lock_in_order(&self, numbers: &[&str]) -> Result<LockSet, LedgerError> {
        let mut handles = numbers
            .iter()
            .map(|number| self.handle(number).map(|handle| (number.to_string(), handle)))
            .collect::<Result<Vec<_>, LedgerError>>()?;
        handles.sort_by(|a, b| a.0.cmp(&b.0));
        handles.dedup_by(|a, b| a.0 == b.0);

        Ok(LockSet {
            handles,
            lock_timeout: self.lock_timeout,
        })
    }

    fn handle(&self, number: &str) -> Result<AccountHandle, LedgerError> {
        self.accounts
            .get(number)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::account_not_found(number))
    }

    fn lock<'a>(
        &self,
        number: &str,
        handle: &'a Mutex<Account>,
    ) -> Result<MutexGuard<'a, Account>, LedgerError> {
        handle
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| LedgerError::lock_timeout(number))
    }
}

/// Accounts resolved and sorted for deadlock-free locking
#[derive(Debug)]
pub struct LockSet {
    handles: Vec<(AccountNumber, AccountHandle)>,
    lock_timeout: Duration,
}

impl LockSet {
    /// Account numbers in lock order
    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.handles.iter().map(|(number, _)| number.as_str())
    }

    /// Lock every account in order and open a unit of work over them
    ///
    /// If any lock times out, the locks already taken are released before
    /// `LockTimeout` is returned, so nothing is held on failure.
    pub fn begin(&self) -> Result<UnitOfWork<'_>, LedgerError> {
        let mut guards = Vec::with_capacity(self.handles.len());
        for (number, handle) in &self.handles {
            let guard = handle
                .try_lock_for(self.lock_timeout)
                .ok_or_else(|| LedgerError::lock_timeout(number))?;
            guards.push(guard);
        }
        Ok(UnitOfWork::new(guards))
    }
}
