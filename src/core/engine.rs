//! Ledger engine for a single owner
//!
//! This module provides the LedgerEngine that orchestrates the ledger
//! operations by coordinating between the AccountStore and TransactionLog.
//!
//! The engine enforces business rules such as:
//! - Amount validation before any store access
//! - Origin accounts must exist for withdrawals and transfers
//! - Balances never go negative
//! - One transaction record per committed operation, written with the balances
//!
//! Every rule is checked before the first write, so a failed operation leaves
//! both stores untouched. Exclusive `&mut self` access makes each operation
//! one isolated unit; use [`crate::core::r#async::AsyncLedgerEngine`] when
//! many callers share a ledger.

use crate::core::account_store::AccountStore;
use crate::core::traits::Ledger;
use crate::core::transaction_log::TransactionLog;
use crate::types::{
    validate_amount, Account, LedgerError, Posting, TransactionRecord, TransferOutcome,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Single-owner ledger engine
#[derive(Debug, Default)]
pub struct LedgerEngine {
    accounts: AccountStore,
    log: TransactionLog,
}

impl LedgerEngine {
    /// Create a new LedgerEngine with no accounts or transaction records
    pub fn new() -> Self {
        LedgerEngine {
            accounts: AccountStore::new(),
            log: TransactionLog::new(),
        }
    }

    /// Number of records in the transaction log
    pub fn transaction_count(&self) -> usize {
        self.log.len()
    }

    fn snapshot(&self, account_id: &str) -> Result<Account, LedgerError> {
        self.accounts
            .find(account_id)
            .cloned()
            .ok_or_else(|| LedgerError::internal(format!("account {account_id} vanished")))
    }
}

impl Ledger for LedgerEngine {
    fn get_balance(&self, account_id: &str) -> Result<Option<Decimal>, LedgerError> {
        Ok(self.accounts.find(account_id).map(|account| account.balance))
    }

    fn deposit(&mut self, account_id: &str, amount: Decimal) -> Result<Account, LedgerError> {
        let amount = validate_amount(amount)?;

        // Limit check before the account can be created
        match self.accounts.find(account_id) {
            Some(account) => account.checked_adjust(amount)?,
            None => Account::new(account_id).checked_adjust(amount)?,
        };

        self.accounts.get_or_create(account_id);
        let balance = self.accounts.adjust(account_id, amount)?;
        let record = self.log.append(
            Posting::Deposit {
                destination: account_id.to_string(),
            },
            amount,
        );

        debug!(tx = record.id, account = account_id, %amount, %balance, "Deposit committed");
        self.snapshot(account_id)
    }

    fn withdraw(&mut self, account_id: &str, amount: Decimal) -> Result<Account, LedgerError> {
        let amount = validate_amount(amount)?;

        let balance = self.accounts.adjust(account_id, -amount)?;
        let record = self.log.append(
            Posting::Withdraw {
                origin: account_id.to_string(),
            },
            amount,
        );

        debug!(tx = record.id, account = account_id, %amount, %balance, "Withdrawal committed");
        self.snapshot(account_id)
    }

    fn transfer(
        &mut self,
        origin_id: &str,
        destination_id: &str,
        amount: Decimal,
    ) -> Result<TransferOutcome, LedgerError> {
        let amount = validate_amount(amount)?;

        let origin = self
            .accounts
            .find(origin_id)
            .ok_or_else(|| LedgerError::account_not_found(origin_id))?;
        origin.checked_adjust(-amount)?;

        if origin_id != destination_id {
            if let Some(destination) = self.accounts.find(destination_id) {
                destination.checked_adjust(amount)?;
            }
        }

        // All checks passed; neither adjustment below can fail. A
        // self-transfer debits and credits the same record, net zero.
        self.accounts.get_or_create(destination_id);
        self.accounts.adjust(origin_id, -amount)?;
        self.accounts.adjust(destination_id, amount)?;
        let record = self.log.append(
            Posting::Transfer {
                origin: origin_id.to_string(),
                destination: destination_id.to_string(),
            },
            amount,
        );

        debug!(
            tx = record.id,
            origin = origin_id,
            destination = destination_id,
            %amount,
            "Transfer committed"
        );

        Ok(TransferOutcome {
            origin: self.snapshot(origin_id)?,
            destination: self.snapshot(destination_id)?,
        })
    }

    fn reset(&mut self) -> Result<(), LedgerError> {
        let accounts = self.accounts.len();
        let transactions = self.log.len();

        self.log.clear();
        self.accounts.clear();

        info!(accounts, transactions, "Ledger reset");
        Ok(())
    }

    fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self
            .accounts
            .get_all_accounts()
            .into_iter()
            .cloned()
            .collect())
    }

    fn transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self.log.records().to_vec())
    }
}
