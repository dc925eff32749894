//! Account-related types for the account ledger
//!
//! This module defines the Account structure and the balance arithmetic
//! shared by every store implementation.

use super::amount::{max_balance, AMOUNT_SCALE};
use super::error::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Externally assigned account identifier
///
/// Unique per account; this is not a storage key, just the name callers use.
pub type AccountId = String;

/// Account balance record
///
/// One record exists per `id`. The balance is a fixed-point decimal kept at
/// two fractional digits, never negative and never above [`max_balance`]
/// after a committed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The externally assigned account identifier
    pub id: AccountId,

    /// Current balance, always at scale 2
    pub balance: Decimal,

    /// When the store first created this record
    pub created_at: DateTime<Utc>,

    /// When the balance was last written
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance
    ///
    /// # Arguments
    ///
    /// * `id` - The account identifier for this record
    pub fn new(id: impl Into<AccountId>) -> Self {
        let now = Utc::now();
        Account {
            id: id.into(),
            balance: Decimal::new(0, AMOUNT_SCALE),
            created_at: now,
            updated_at: now,
        }
    }

    /// Compute the balance that applying `delta` would produce
    ///
    /// This is a pure check: the account is not modified. Stores call it while
    /// holding whatever isolation they provide and then commit the result with
    /// [`Account::set_balance`], so the funds check and the write see the same
    /// balance.
    ///
    /// # Errors
    ///
    /// - `InsufficientFunds` if a negative delta would drive the balance below zero
    /// - `ArithmeticOverflow` if the addition overflows or the result exceeds
    ///   [`max_balance`]
    pub fn checked_adjust(&self, delta: Decimal) -> Result<Decimal, LedgerError> {
        let operation = if delta.is_sign_negative() {
            "debit"
        } else {
            "credit"
        };

        let new_balance = self
            .balance
            .checked_add(delta)
            .filter(|balance| *balance <= max_balance())
            .ok_or_else(|| LedgerError::arithmetic_overflow(operation, &self.id))?;

        if new_balance < Decimal::ZERO {
            return Err(LedgerError::insufficient_funds(
                &self.id,
                self.balance,
                delta.abs(),
            ));
        }

        Ok(new_balance)
    }

    /// Write a balance previously computed by [`Account::checked_adjust`]
    pub fn set_balance(&mut self, balance: Decimal) {
        let mut balance = balance;
        balance.rescale(AMOUNT_SCALE);
        self.balance = balance;
        self.updated_at = Utc::now();
    }

    /// Mark the record as written without changing its balance
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
