//! Thread-safe account storage for the concurrent ledger engine
//!
//! This module provides the `AsyncAccountStore` struct, which holds one
//! lockable cell per account so that operations on different accounts run in
//! parallel while operations on the same account are serialized.
//!
//! # Design
//!
//! `DashMap` guards membership (which identifiers exist) with sharded locks,
//! and each account sits behind its own `parking_lot::Mutex`. Map references
//! are never held while waiting on an account lock: lookups clone the cell's
//! `Arc` and release the shard immediately.
//!
//! The store also owns the ledger gate, an `RwLock<()>` held shared by every
//! account operation and exclusively by reset and snapshots. It lives here
//! rather than in the engine so that every engine sharing this store also
//! shares the gate.
//!
//! New accounts are not inserted on lookup. The engine builds a detached
//! record, and [`AsyncAccountStore::publish`] inserts it only if the
//! identifier is still vacant, which keeps identifiers unique even when two
//! callers create the same account at once.

use crate::types::{Account, AccountId, LedgerError};
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;
use std::time::Duration;

/// A lockable account record shared between the store and in-flight operations
pub type AccountCell = Arc<Mutex<Account>>;

/// Thread-safe account store
#[derive(Debug)]
pub struct AsyncAccountStore {
    /// Concurrent map from account identifier to its cell
    accounts: DashMap<AccountId, AccountCell>,

    /// Shared by account operations, exclusive for reset and snapshots
    gate: RwLock<()>,
}

impl AsyncAccountStore {
    /// Create a new empty AsyncAccountStore
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            gate: RwLock::new(()),
        }
    }

    /// Hold the gate shared, giving up after `timeout`
    ///
    /// # Errors
    ///
    /// `StorageUnavailable` if a reset or snapshot kept the gate past `timeout`.
    pub fn shared_gate(&self, timeout: Duration) -> Result<RwLockReadGuard<'_, ()>, LedgerError> {
        self.gate
            .try_read_for(timeout)
            .ok_or_else(|| LedgerError::storage_unavailable("ledger", timeout))
    }

    /// Hold the gate exclusively, giving up after `timeout`
    ///
    /// # Errors
    ///
    /// `StorageUnavailable` if in-flight operations kept the gate past `timeout`.
    pub fn exclusive_gate(
        &self,
        timeout: Duration,
    ) -> Result<RwLockWriteGuard<'_, ()>, LedgerError> {
        self.gate
            .try_write_for(timeout)
            .ok_or_else(|| LedgerError::storage_unavailable("ledger", timeout))
    }

    /// Look up an account cell without creating it
    pub fn find(&self, account_id: &str) -> Option<AccountCell> {
        self.accounts
            .get(account_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Insert a detached account if its identifier is still vacant
    ///
    /// # Returns
    ///
    /// * `true` if the account was inserted
    /// * `false` if another caller published the same identifier first; the
    ///   existing record is left untouched
    pub fn publish(&self, account: Account) -> bool {
        let mut inserted = false;
        let account_id = account.id.clone();

        self.accounts.entry(account_id).or_insert_with(|| {
            inserted = true;
            Arc::new(Mutex::new(account))
        });

        inserted
    }

    /// Remove every account
    pub fn clear(&self) {
        self.accounts.clear();
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// All cells sorted by account identifier
    pub fn cells(&self) -> Vec<(AccountId, AccountCell)> {
        let mut cells: Vec<(AccountId, AccountCell)> = self
            .accounts
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        cells.sort_by(|a, b| a.0.cmp(&b.0));
        cells
    }
}

impl Default for AsyncAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock an account cell, giving up after `timeout`
///
/// # Errors
///
/// `StorageUnavailable` naming the account if the lock was not acquired in
/// time.
pub fn lock_account<'a>(
    cell: &'a AccountCell,
    account_id: &str,
    timeout: Duration,
) -> Result<MutexGuard<'a, Account>, LedgerError> {
    cell.try_lock_for(timeout)
        .ok_or_else(|| LedgerError::storage_unavailable(&format!("account {account_id}"), timeout))
}
