//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account record and balance arithmetic
//! - `amount`: Fixed-point amount validation and the balance limit
//! - `transaction`: Operations, postings, and transaction records
//! - `error`: Error types for the ledger

pub mod account;
pub mod amount;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountId};
pub use amount::{max_balance, validate_amount, AMOUNT_SCALE, BALANCE_PRECISION};
pub use error::{ErrorKind, LedgerError};
pub use transaction::{
    Operation, OperationOutcome, Posting, TransactionId, TransactionKind, TransactionRecord,
    TransferOutcome,
};
