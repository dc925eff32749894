//! Concurrent ledger engine
//!
//! This module provides the `AsyncLedgerEngine` struct, which runs ledger
//! operations from many tasks at once over the thread-safe
//! `AsyncAccountStore` and `AsyncTransactionLog`.
//!
//! # Architecture
//!
//! ```text
//! AsyncLedgerEngine
//!     ├── Arc<AsyncAccountStore>   (one Mutex per account, ledger gate)
//!     ├── Arc<AsyncTransactionLog> (Mutex around the log)
//!     └── LedgerConfig             (lock timeout, create retries)
//! ```
//!
//! # Locking protocol
//!
//! 1. The store's gate is held shared by every account operation and
//!    exclusively by `reset` and `accounts`, so those never observe a
//!    half-applied operation. Engines built over the same store share the
//!    gate, so a reset through one engine also waits for the others.
//! 2. Account locks are taken next. A transfer between two existing accounts
//!    locks them in identifier order, so two opposing transfers cannot
//!    deadlock.
//! 3. The log lock is taken last, after every funds and overflow check and
//!    before the first write. Nothing after it can fail, so each operation
//!    commits its balances and its record together or not at all.
//!
//! Every acquisition is bounded by `LedgerConfig::lock_timeout`; a timeout
//! surfaces as `StorageUnavailable` with nothing written.
//!
//! Accounts that an operation would create are built detached and published
//! while the log lock is held. If another task published the same identifier
//! first, the operation starts over against the existing account.

use std::sync::Arc;

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::account_store::{lock_account, AsyncAccountStore};
use super::transaction_log::AsyncTransactionLog;
use crate::core::config::LedgerConfig;
use crate::core::traits::Ledger;
use crate::types::{
    validate_amount, Account, LedgerError, Operation, OperationOutcome, Posting,
    TransactionRecord, TransferOutcome,
};

/// Ledger engine safe to share across threads and tasks
///
/// Clones share the same stores.
#[derive(Debug, Clone)]
pub struct AsyncLedgerEngine {
    accounts: Arc<AsyncAccountStore>,
    log: Arc<AsyncTransactionLog>,
    config: LedgerConfig,
}

impl AsyncLedgerEngine {
    /// Create a new AsyncLedgerEngine
    ///
    /// # Arguments
    ///
    /// * `accounts` - Arc-wrapped AsyncAccountStore holding balances
    /// * `log` - Arc-wrapped AsyncTransactionLog holding the history
    /// * `config` - Lock timeout and creation retry settings
    ///
    /// Engines built over the same stores stay serializable with each other:
    /// they share the store's gate and per-account locks.
    pub fn new(
        accounts: Arc<AsyncAccountStore>,
        log: Arc<AsyncTransactionLog>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            accounts,
            log,
            config,
        }
    }

    /// Create an engine with empty stores
    pub fn with_config(config: LedgerConfig) -> Self {
        Self::new(
            Arc::new(AsyncAccountStore::new()),
            Arc::new(AsyncTransactionLog::new()),
            config,
        )
    }

    /// The configuration this engine was built with
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn shared_gate(&self) -> Result<RwLockReadGuard<'_, ()>, LedgerError> {
        self.accounts.shared_gate(self.config.lock_timeout)
    }

    fn exclusive_gate(&self) -> Result<RwLockWriteGuard<'_, ()>, LedgerError> {
        self.accounts.exclusive_gate(self.config.lock_timeout)
    }

    fn creation_conflict(&self, account_id: &str) -> LedgerError {
        warn!(
            account = account_id,
            attempts = self.config.create_retries + 1,
            "Account creation kept conflicting"
        );
        LedgerError::storage_unavailable(&format!("account {account_id}"), self.config.lock_timeout)
    }

    /// Current balance, or `None` if the account does not exist
    pub fn get_balance(&self, account_id: &str) -> Result<Option<Decimal>, LedgerError> {
        let _gate = self.shared_gate()?;

        match self.accounts.find(account_id) {
            Some(cell) => {
                let account = lock_account(&cell, account_id, self.config.lock_timeout)?;
                Ok(Some(account.balance))
            }
            None => Ok(None),
        }
    }

    /// Credit `amount` to `account_id`, creating the account if needed
    pub fn deposit(&self, account_id: &str, amount: Decimal) -> Result<Account, LedgerError> {
        let amount = validate_amount(amount)?;
        let _gate = self.shared_gate()?;
        let timeout = self.config.lock_timeout;

        for _ in 0..=self.config.create_retries {
            match self.accounts.find(account_id) {
                Some(cell) => {
                    let mut account = lock_account(&cell, account_id, timeout)?;
                    let balance = account.checked_adjust(amount)?;

                    let mut log = self.log.lock(timeout)?;
                    account.set_balance(balance);
                    let record = log.append(
                        Posting::Deposit {
                            destination: account_id.to_string(),
                        },
                        amount,
                    );

                    debug!(tx = record.id, account = account_id, %amount, %balance, "Deposit committed");
                    return Ok(account.clone());
                }
                None => {
                    let mut fresh = Account::new(account_id);
                    let balance = fresh.checked_adjust(amount)?;
                    fresh.set_balance(balance);

                    let mut log = self.log.lock(timeout)?;
                    if !self.accounts.publish(fresh.clone()) {
                        debug!(account = account_id, "Lost account creation race, retrying");
                        continue;
                    }
                    let record = log.append(
                        Posting::Deposit {
                            destination: account_id.to_string(),
                        },
                        amount,
                    );

                    debug!(tx = record.id, account = account_id, %amount, "Deposit committed to new account");
                    return Ok(fresh);
                }
            }
        }

        Err(self.creation_conflict(account_id))
    }

    /// Debit `amount` from an existing account
    pub fn withdraw(&self, account_id: &str, amount: Decimal) -> Result<Account, LedgerError> {
        let amount = validate_amount(amount)?;
        let _gate = self.shared_gate()?;
        let timeout = self.config.lock_timeout;

        let cell = self
            .accounts
            .find(account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))?;
        let mut account = lock_account(&cell, account_id, timeout)?;
        let balance = account.checked_adjust(-amount)?;

        let mut log = self.log.lock(timeout)?;
        account.set_balance(balance);
        let record = log.append(
            Posting::Withdraw {
                origin: account_id.to_string(),
            },
            amount,
        );

        debug!(tx = record.id, account = account_id, %amount, %balance, "Withdrawal committed");
        Ok(account.clone())
    }

    /// Move `amount` from an existing origin to a destination, creating the
    /// destination if needed
    ///
    /// A transfer to the same account is allowed when the origin holds at
    /// least `amount`; the balance is unchanged and one record is logged.
    pub fn transfer(
        &self,
        origin_id: &str,
        destination_id: &str,
        amount: Decimal,
    ) -> Result<TransferOutcome, LedgerError> {
        let amount = validate_amount(amount)?;
        let _gate = self.shared_gate()?;
        let timeout = self.config.lock_timeout;
        let posting = || Posting::Transfer {
            origin: origin_id.to_string(),
            destination: destination_id.to_string(),
        };

        for _ in 0..=self.config.create_retries {
            let origin_cell = self
                .accounts
                .find(origin_id)
                .ok_or_else(|| LedgerError::account_not_found(origin_id))?;

            if origin_id == destination_id {
                let mut account = lock_account(&origin_cell, origin_id, timeout)?;
                account.checked_adjust(-amount)?;

                let mut log = self.log.lock(timeout)?;
                account.touch();
                let record = log.append(posting(), amount);

                debug!(tx = record.id, account = origin_id, %amount, "Self-transfer committed");
                return Ok(TransferOutcome {
                    origin: account.clone(),
                    destination: account.clone(),
                });
            }

            match self.accounts.find(destination_id) {
                Some(destination_cell) => {
                    let (mut origin, mut destination) = if origin_id < destination_id {
                        let origin = lock_account(&origin_cell, origin_id, timeout)?;
                        let destination =
                            lock_account(&destination_cell, destination_id, timeout)?;
                        (origin, destination)
                    } else {
                        let destination =
                            lock_account(&destination_cell, destination_id, timeout)?;
                        let origin = lock_account(&origin_cell, origin_id, timeout)?;
                        (origin, destination)
                    };

                    let origin_balance = origin.checked_adjust(-amount)?;
                    let destination_balance = destination.checked_adjust(amount)?;

                    let mut log = self.log.lock(timeout)?;
                    origin.set_balance(origin_balance);
                    destination.set_balance(destination_balance);
                    let record = log.append(posting(), amount);

                    debug!(
                        tx = record.id,
                        origin = origin_id,
                        destination = destination_id,
                        %amount,
                        "Transfer committed"
                    );
                    return Ok(TransferOutcome {
                        origin: origin.clone(),
                        destination: destination.clone(),
                    });
                }
                None => {
                    let mut origin = lock_account(&origin_cell, origin_id, timeout)?;
                    let origin_balance = origin.checked_adjust(-amount)?;

                    let mut fresh = Account::new(destination_id);
                    let destination_balance = fresh.checked_adjust(amount)?;
                    fresh.set_balance(destination_balance);

                    let mut log = self.log.lock(timeout)?;
                    if !self.accounts.publish(fresh.clone()) {
                        debug!(account = destination_id, "Lost account creation race, retrying");
                        continue;
                    }
                    origin.set_balance(origin_balance);
                    let record = log.append(posting(), amount);

                    debug!(
                        tx = record.id,
                        origin = origin_id,
                        destination = destination_id,
                        %amount,
                        "Transfer committed to new account"
                    );
                    return Ok(TransferOutcome {
                        origin: origin.clone(),
                        destination: fresh,
                    });
                }
            }
        }

        Err(self.creation_conflict(destination_id))
    }

    /// Clear the transaction log and every account
    ///
    /// Waits for in-flight operations to finish and blocks new ones until the
    /// ledger is empty.
    pub fn reset(&self) -> Result<(), LedgerError> {
        let _gate = self.exclusive_gate()?;
        let mut log = self.log.lock(self.config.lock_timeout)?;

        let accounts = self.accounts.len();
        let transactions = log.len();
        log.clear();
        self.accounts.clear();

        info!(accounts, transactions, "Ledger reset");
        Ok(())
    }

    /// Consistent snapshot of all accounts, sorted by id
    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let _gate = self.exclusive_gate()?;

        self.accounts
            .cells()
            .iter()
            .map(|(account_id, cell)| {
                lock_account(cell, account_id, self.config.lock_timeout)
                    .map(|account| account.clone())
            })
            .collect()
    }

    /// Snapshot of the transaction log, in commit order
    pub fn transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.log.snapshot(self.config.lock_timeout)
    }

    /// Dispatch a single operation
    pub fn apply(&self, operation: Operation) -> Result<OperationOutcome, LedgerError> {
        match operation {
            Operation::Deposit {
                destination,
                amount,
            } => self
                .deposit(&destination, amount)
                .map(|destination| OperationOutcome::Deposited { destination }),
            Operation::Withdraw { origin, amount } => self
                .withdraw(&origin, amount)
                .map(|origin| OperationOutcome::Withdrawn { origin }),
            Operation::Transfer {
                origin,
                destination,
                amount,
            } => self
                .transfer(&origin, &destination, amount)
                .map(OperationOutcome::from),
            Operation::Reset => self.reset().map(|()| OperationOutcome::Reset),
        }
    }
}

impl Default for AsyncLedgerEngine {
    fn default() -> Self {
        Self::with_config(LedgerConfig::default())
    }
}

impl Ledger for AsyncLedgerEngine {
    fn get_balance(&self, account_id: &str) -> Result<Option<Decimal>, LedgerError> {
        AsyncLedgerEngine::get_balance(self, account_id)
    }

    fn deposit(&mut self, account_id: &str, amount: Decimal) -> Result<Account, LedgerError> {
        AsyncLedgerEngine::deposit(self, account_id, amount)
    }

    fn withdraw(&mut self, account_id: &str, amount: Decimal) -> Result<Account, LedgerError> {
        AsyncLedgerEngine::withdraw(self, account_id, amount)
    }

    fn transfer(
        &mut self,
        origin_id: &str,
        destination_id: &str,
        amount: Decimal,
    ) -> Result<TransferOutcome, LedgerError> {
        AsyncLedgerEngine::transfer(self, origin_id, destination_id, amount)
    }

    fn reset(&mut self) -> Result<(), LedgerError> {
        AsyncLedgerEngine::reset(self)
    }

    fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        AsyncLedgerEngine::accounts(self)
    }

    fn transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        AsyncLedgerEngine::transactions(self)
    }

    fn apply(&mut self, operation: Operation) -> Result<OperationOutcome, LedgerError> {
        AsyncLedgerEngine::apply(self, operation)
    }
}
