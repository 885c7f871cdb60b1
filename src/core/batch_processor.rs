//! Batch processing with account-based partitioning
//!
//! This module provides the `BatchProcessor`, which runs a batch of commands
//! concurrently without changing its outcome.
//!
//! # Partitioning
//!
//! Commands that share an account are put in the same group, transitively: a
//! transfer A→B joins the groups of A and B. Groups therefore touch disjoint sets
//! of accounts, so running them in parallel gives the same result as running the
//! whole batch in file order. Within a group, commands keep their file order.
//!
//! ```text
//! batch:   open A | open B | deposit C | transfer A→B | withdraw C
//! groups:  [open A, open B, transfer A→B]   [deposit C, withdraw C]
//! ```

use std::collections::{BTreeMap, HashMap};

use tracing::{error, warn};

use crate::core::engine::LedgerEngine;
use crate::types::{Command, LedgerError};

/// Result of processing a single command
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The command that was processed
    pub command: Command,

    /// The result of processing (success or error)
    pub result: Result<(), LedgerError>,
}

/// Batch processor with account-based partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    engine: LedgerEngine,
}

impl BatchProcessor {
    pub fn new(engine: LedgerEngine) -> Self {
        Self { engine }
    }

    /// Split a batch into groups that share no account
    ///
    /// # Guarantees
    ///
    /// - Each command appears in exactly one group
    /// - Commands within a group keep their original relative order
    /// - Groups are ordered by the position of their first command
    pub fn partition_by_accounts(&self, batch: Vec<Command>) -> Vec<Vec<Command>> {
        let mut parent: Vec<usize> = (0..batch.len()).collect();

        let roots: Vec<usize> = {
            let mut owner: HashMap<&str, usize> = HashMap::new();
            for (index, command) in batch.iter().enumerate() {
                for account in command.accounts() {
                    match owner.get(account) {
                        Some(&first) => union(&mut parent, first, index),
                        None => {
                            owner.insert(account, index);
                        }
                    }
                }
            }
            (0..batch.len()).map(|index| find(&mut parent, index)).collect()
        };

        let mut groups: BTreeMap<usize, Vec<Command>> = BTreeMap::new();
        for (command, root) in batch.into_iter().zip(roots) {
            groups.entry(root).or_default().push(command);
        }
        groups.into_values().collect()
    }

    /// Process one group of commands sequentially, in order
    ///
    /// Failed commands are logged and do not stop the group.
    pub fn process_group(&self, commands: Vec<Command>) -> Vec<ProcessingResult> {
        commands
            .into_iter()
            .map(|command| {
                let result = self.engine.execute(&command);
                if let Err(e) = &result {
                    warn!(?command, error = %e, "Command rejected");
                }
                ProcessingResult { command, result }
            })
            .collect()
    }

    /// Process a batch with its groups running concurrently
    ///
    /// Each group runs on a tokio blocking task, since account locks are
    /// blocking; the runtime's blocking pool size bounds how many run at once.
    /// Returns once every group has finished.
    pub async fn process_batch(&self, batch: Vec<Command>) -> Vec<ProcessingResult> {
        let groups = self.partition_by_accounts(batch);

        let tasks: Vec<_> = groups
            .into_iter()
            .map(|group| {
                let processor = self.clone();
                tokio::task::spawn_blocking(move || processor.process_group(group))
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(group_results) => results.extend(group_results),
                Err(e) => error!(error = %e, "Batch task panicked"),
            }
        }

        results
    }
}

fn find(parent: &mut [usize], mut index: usize) -> usize {
    while parent[index] != index {
        parent[index] = parent[parent[index]];
        index = parent[index];
    }
    index
}

/// Merge two groups, keeping the smaller index as root
fn union(parent: &mut [usize], a: usize, b: usize) {
    let (root_a, root_b) = (find(parent, a), find(parent, b));
    if root_a != root_b {
        let (low, high) = (root_a.min(root_b), root_a.max(root_b));
        parent[high] = low;
    }
}
