//! Append-only transaction history
//!
//! This module provides the TransactionLog component that records one
//! immutable entry per committed ledger operation. Records are appended in
//! commit order and are never modified; the only way to remove them is
//! [`TransactionLog::clear`], used by a ledger reset.

use crate::types::{Posting, TransactionId, TransactionRecord};
use chrono::Utc;
use rust_decimal::Decimal;

/// Append-only transaction log
///
/// Record ids are assigned sequentially starting at 1 and restart after a
/// clear.
#[derive(Debug)]
pub struct TransactionLog {
    /// Records in commit order
    records: Vec<TransactionRecord>,

    /// Id handed to the next appended record
    next_id: TransactionId,
}

impl TransactionLog {
    /// Create a new empty transaction log
    pub fn new() -> Self {
        TransactionLog {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a record for a committed operation
    ///
    /// # Arguments
    ///
    /// * `posting` - The accounts involved and the operation kind
    /// * `amount` - The validated, positive amount
    ///
    /// # Returns
    ///
    /// A reference to the stored record
    pub fn append(&mut self, posting: Posting, amount: Decimal) -> &TransactionRecord {
        let record = TransactionRecord {
            id: self.next_id,
            posting,
            amount,
            created_at: Utc::now(),
        };
        self.next_id += 1;

        let index = self.records.len();
        self.records.push(record);
        &self.records[index]
    }

    /// Remove every record and restart id assignment
    pub fn clear(&mut self) {
        self.records.clear();
        self.next_id = 1;
    }

    /// All records in commit order
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}
