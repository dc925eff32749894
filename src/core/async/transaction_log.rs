//! Thread-safe transaction log for the concurrent ledger engine
//!
//! Wraps the single-owner [`TransactionLog`] in a `parking_lot::Mutex`. The
//! engine takes this lock after the account locks of an operation and holds
//! it until the balances are written, so records appear in commit order and
//! ids stay sequential.

use crate::core::transaction_log::TransactionLog;
use crate::types::{LedgerError, TransactionRecord};
use parking_lot::{Mutex, MutexGuard};
use std::time::Duration;

/// Thread-safe append-only transaction log
#[derive(Debug, Default)]
pub struct AsyncTransactionLog {
    log: Mutex<TransactionLog>,
}

impl AsyncTransactionLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self {
            log: Mutex::new(TransactionLog::new()),
        }
    }

    /// Lock the log, giving up after `timeout`
    ///
    /// # Errors
    ///
    /// `StorageUnavailable` if the lock was not acquired in time.
    pub fn lock(&self, timeout: Duration) -> Result<MutexGuard<'_, TransactionLog>, LedgerError> {
        self.log
            .try_lock_for(timeout)
            .ok_or_else(|| LedgerError::storage_unavailable("transaction log", timeout))
    }

    /// Copy of every record in commit order
    pub fn snapshot(&self, timeout: Duration) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self.lock(timeout)?.records().to_vec())
    }
}
