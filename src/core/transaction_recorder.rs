//! Append-only transaction recorder
//!
//! This module provides the `TransactionRecorder`, the audit trail of every
//! committed money movement.
//!
//! # Ordering
//!
//! Sequence ids are assigned under the write lock, so id order is append order.
//! A batch passed to [`TransactionRecorder::append_all`] receives consecutive ids
//! and becomes visible to readers all at once.

use crate::types::{NewRecord, RecordId, TransactionKind, TransactionRecord};
use parking_lot::RwLock;
use rust_decimal::Decimal;

/// Append-only store of transaction records
#[derive(Debug, Default)]
pub struct TransactionRecorder {
    /// Records in append order; a record's id is its position plus one
    records: RwLock<Vec<TransactionRecord>>,
}

impl TransactionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single record
    pub fn record(
        &self,
        kind: TransactionKind,
        amount: Decimal,
        source: &str,
        target: Option<&str>,
    ) -> TransactionRecord {
        let record = NewRecord {
            kind,
            amount,
            source: source.to_string(),
            target: target.map(str::to_string),
        };
        // One record in, one record out
        self.append_all(vec![record]).remove(0)
    }

    /// Append a batch of records with consecutive ids
    ///
    /// # Returns
    ///
    /// The appended records, in the order given.
    pub fn append_all(&self, records: Vec<NewRecord>) -> Vec<TransactionRecord> {
        let mut log = self.records.write();
        let mut appended = Vec::with_capacity(records.len());

        for new in records {
            let record = TransactionRecord {
                id: log.len() as RecordId + 1,
                kind: new.kind,
                amount: new.amount,
                source: new.source,
                target: new.target,
            };
            log.push(record.clone());
            appended.push(record);
        }

        appended
    }

    /// Every record in append order
    pub fn list_all(&self) -> Vec<TransactionRecord> {
        self.records.read().clone()
    }

    /// Records applied to `account`, in append order
    pub fn list_by_source_account(&self, account: &str) -> Vec<TransactionRecord> {
        self.filtered(|record| record.source == account)
    }

    /// Transfer audit records that name `account` as destination
    pub fn list_by_target_account(&self, account: &str) -> Vec<TransactionRecord> {
        self.filtered(|record| record.target.as_deref() == Some(account))
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn filtered<F>(&self, predicate: F) -> Vec<TransactionRecord>
    where
        F: Fn(&TransactionRecord) -> bool,
    {
        self.records
            .read()
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_assigns_increasing_ids() {
        let recorder = TransactionRecorder::new();

        let first = recorder.record(TransactionKind::Deposit, Decimal::TEN, "A", None);
        let second = recorder.record(TransactionKind::Withdrawal, Decimal::ONE, "A", None);

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_append_all_is_consecutive_and_ordered() {
        let recorder = TransactionRecorder::new();
        recorder.record(TransactionKind::Deposit, Decimal::TEN, "C", None);

        let appended = recorder.append_all(vec![
            NewRecord::withdrawal("A", Decimal::TEN),
            NewRecord::deposit("B", Decimal::TEN),
            NewRecord::transfer_audit("A", "B", Decimal::TEN),
        ]);

        let ids: Vec<RecordId> = appended.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(recorder.list_all()[1..], appended[..]);
    }

    #[test]
    fn test_list_by_account() {
        let recorder = TransactionRecorder::new();
        recorder.append_all(vec![
            NewRecord::withdrawal("A", Decimal::TEN),
            NewRecord::deposit("B", Decimal::TEN),
            NewRecord::transfer_audit("A", "B", Decimal::TEN),
        ]);
        recorder.record(TransactionKind::Deposit, Decimal::ONE, "B", None);

        let from_a = recorder.list_by_source_account("A");
        let to_b = recorder.list_by_target_account("B");

        assert_eq!(from_a.len(), 2);
        assert!(from_a.iter().all(|record| record.source == "A"));
        assert_eq!(to_b.len(), 1);
        assert_eq!(to_b[0].id, 3);
        assert!(recorder.list_by_source_account("nobody").is_empty());
    }

    #[test]
    fn test_concurrent_appends_keep_ids_unique_and_dense() {
        let recorder = Arc::new(TransactionRecorder::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let recorder = Arc::clone(&recorder);
                thread::spawn(move || {
                    for _ in 0..50 {
                        recorder.record(
                            TransactionKind::Deposit,
                            Decimal::ONE,
                            &format!("ACC-{}", i),
                            None,
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let ids: Vec<RecordId> = recorder.list_all().iter().map(|record| record.id).collect();
        assert_eq!(ids, (1..=400).collect::<Vec<RecordId>>());
    }
}
