//! Batch processing with account-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which runs a batch of
//! ledger operations concurrently while keeping the result identical to
//! applying them one by one in input order.
//!
//! # Design
//!
//! Two operations can only affect each other if they share an account, so a
//! batch is split into groups of operations connected through shared accounts
//! (a transfer links its origin and destination). Groups run concurrently on
//! tokio's blocking pool, since engine calls wait on `parking_lot` locks for
//! up to the lock timeout; each group runs sequentially in input order.
//!
//! `reset` touches every account, so it acts as a barrier: everything before
//! it finishes, the reset runs alone, and only then does the rest of the
//! batch start.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<AsyncLedgerEngine>  (shared ledger)
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinError;
use tracing::{debug, error};

use super::AsyncLedgerEngine;
use crate::types::{LedgerError, Operation, OperationOutcome};

/// An operation tagged with its position in the batch
pub type IndexedOperation = (usize, Operation);

/// Result of processing a single operation
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// Position of the operation in its batch
    pub index: usize,

    /// The operation that was processed
    pub operation: Operation,

    /// The outcome of processing (success or error)
    pub result: Result<OperationOutcome, LedgerError>,
}

/// Union-find over batch positions
#[derive(Debug)]
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            // Keep the earlier position as root so group order follows input order
            let (low, high) = (root_a.min(root_b), root_a.max(root_b));
            self.parent[high] = low;
        }
    }
}

/// Batch processor with account-based partitioning
///
/// Cloning is cheap; clones share the same engine.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    /// Shared ledger engine
    engine: Arc<AsyncLedgerEngine>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `engine` - Arc-wrapped AsyncLedgerEngine that operations run against
    pub fn new(engine: Arc<AsyncLedgerEngine>) -> Self {
        Self { engine }
    }

    /// Partition operations into groups connected through shared accounts
    ///
    /// # Guarantees
    ///
    /// - Each operation appears in exactly one group
    /// - Two operations naming the same account are in the same group
    /// - Operations keep their relative order within a group
    /// - Groups are ordered by their first operation
    ///
    /// `Reset` names no accounts; callers split batches at resets before
    /// partitioning.
    pub fn partition_by_accounts(
        &self,
        segment: Vec<IndexedOperation>,
    ) -> Vec<Vec<IndexedOperation>> {
        let mut sets = DisjointSet::new(segment.len());

        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        for (position, (_, operation)) in segment.iter().enumerate() {
            for account in operation.accounts() {
                match first_seen.entry(account) {
                    Entry::Occupied(entry) => sets.union(*entry.get(), position),
                    Entry::Vacant(entry) => {
                        entry.insert(position);
                    }
                }
            }
        }
        drop(first_seen);

        let mut groups: Vec<Vec<IndexedOperation>> = Vec::new();
        let mut group_of_root: HashMap<usize, usize> = HashMap::new();
        for (position, operation) in segment.into_iter().enumerate() {
            let root = sets.find(position);
            let group = *group_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push(operation);
        }

        groups
    }

    /// Process one group sequentially, in order
    ///
    /// Every operation runs even if earlier ones fail; failures are captured
    /// in the results. This blocks on engine locks, so async callers run it
    /// on the blocking pool.
    pub fn process_group(&self, operations: Vec<IndexedOperation>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(operations.len());

        for (index, operation) in operations {
            let result = self.engine.apply(operation.clone());
            results.push(ProcessingResult {
                index,
                operation,
                result,
            });
        }

        results
    }

    async fn process_segment(&self, segment: Vec<IndexedOperation>) -> Vec<ProcessingResult> {
        if segment.is_empty() {
            return Vec::new();
        }

        let groups = self.partition_by_accounts(segment);
        debug!(groups = groups.len(), "Processing segment");

        let mut tasks = Vec::with_capacity(groups.len());
        for group in groups {
            let processor = self.clone();
            let submitted = group.clone();
            tasks.push((
                submitted,
                tokio::task::spawn_blocking(move || processor.process_group(group)),
            ));
        }

        let mut results = Vec::new();
        for (submitted, task) in tasks {
            results.extend(group_results(submitted, task.await));
        }

        results
    }

    async fn process_reset(&self) -> Result<OperationOutcome, LedgerError> {
        let engine = Arc::clone(&self.engine);
        match tokio::task::spawn_blocking(move || engine.reset()).await {
            Ok(result) => result.map(|()| OperationOutcome::Reset),
            Err(e) => {
                error!(error = %e, "Reset task failed");
                Err(LedgerError::internal(format!("reset task failed: {e}")))
            }
        }
    }

    /// Process a batch of operations
    ///
    /// # Returns
    ///
    /// One `ProcessingResult` per operation, sorted by batch position.
    ///
    /// # Guarantees
    ///
    /// - Final balances equal those of applying the batch sequentially
    /// - Operations sharing an account run in input order
    /// - A `Reset` sees every earlier operation and none of the later ones
    pub async fn process_batch(&self, batch: Vec<Operation>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());
        let mut pending: Vec<IndexedOperation> = Vec::new();

        for (index, operation) in batch.into_iter().enumerate() {
            if matches!(operation, Operation::Reset) {
                let segment = std::mem::take(&mut pending);
                results.extend(self.process_segment(segment).await);

                let result = self.process_reset().await;
                results.push(ProcessingResult {
                    index,
                    operation,
                    result,
                });
            } else {
                pending.push((index, operation));
            }
        }
        results.extend(self.process_segment(pending).await);

        results.sort_by_key(|processed| processed.index);
        results
    }
}

/// Results of a finished group task
///
/// A task that panicked or was cancelled leaves the outcome of its operations
/// unknown; each one is reported as an internal error so none go missing.
fn group_results(
    submitted: Vec<IndexedOperation>,
    joined: Result<Vec<ProcessingResult>, JoinError>,
) -> Vec<ProcessingResult> {
    match joined {
        Ok(results) => results,
        Err(e) => {
            error!(error = %e, operations = submitted.len(), "Group task failed");
            submitted
                .into_iter()
                .map(|(index, operation)| ProcessingResult {
                    index,
                    operation,
                    result: Err(LedgerError::internal(format!("group task failed: {e}"))),
                })
                .collect()
        }
    }
}
