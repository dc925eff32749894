//! Account store module
//!
//! This module provides the `AccountStore` struct which holds one balance
//! record per account identifier for a single-owner ledger.
//!
//! The AccountStore is responsible for:
//! - Lookup without side effects
//! - Lazily creating accounts with a zero balance
//! - Applying signed balance adjustments that never go below zero
//! - Providing sorted account listings for output

use crate::types::{Account, LedgerError};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Holds every account record
///
/// Keyed by account identifier, so at most one record per identifier can
/// exist. Exclusive access through `&mut self` is what makes each adjustment
/// atomic here; the concurrent store lives in `core::async`.
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Map of account IDs to account records
    accounts: HashMap<String, Account>,
}

impl AccountStore {
    /// Create a new AccountStore with no accounts
    pub fn new() -> Self {
        AccountStore {
            accounts: HashMap::new(),
        }
    }

    /// Look up an account without creating it
    pub fn find(&self, account_id: &str) -> Option<&Account> {
        self.accounts.get(account_id)
    }

    /// Get or create an account
    ///
    /// If no record exists for `account_id`, one is created with a zero
    /// balance.
    ///
    /// # Returns
    ///
    /// A mutable reference to the account for the specified identifier
    pub fn get_or_create(&mut self, account_id: &str) -> &mut Account {
        self.accounts
            .entry(account_id.to_string())
            .or_insert_with(|| Account::new(account_id))
    }

    /// Apply a signed delta to an existing account's balance
    ///
    /// # Returns
    ///
    /// The new balance
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account does not exist
    /// - `InsufficientFunds` if the delta would make the balance negative
    /// - `ArithmeticOverflow` if the addition overflows
    ///
    /// On error the stored balance is unchanged.
    pub fn adjust(&mut self, account_id: &str, delta: Decimal) -> Result<Decimal, LedgerError> {
        let account = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))?;

        let new_balance = account.checked_adjust(delta)?;
        account.set_balance(new_balance);

        Ok(account.balance)
    }

    /// Remove every account
    pub fn clear(&mut self) {
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

    /// Get all accounts sorted by account ID
    ///
    /// Sorting gives deterministic output for CSV generation.
    pub fn get_all_accounts(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        accounts
    }
}
