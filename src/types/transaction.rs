//! Transaction-related types for the account ledger
//!
//! This module defines the operations callers submit, the immutable records
//! the ledger appends for each committed operation, and the outcomes returned
//! to callers.
//!
//! Which account fields a record carries depends on its kind, so the record is
//! modelled as a tagged [`Posting`] rather than a struct with optional origin
//! and destination columns.

use super::account::{Account, AccountId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction record identifier
///
/// Assigned sequentially by the transaction log in commit order.
pub type TransactionId = u64;

/// The three kinds of balance-changing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Credit funds to an account, creating it on first use
    Deposit,

    /// Debit funds from an existing account
    Withdraw,

    /// Move funds from an existing account to another, creating the
    /// destination on first use
    Transfer,
}

impl TransactionKind {
    /// Lowercase name used in CSV files and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accounts touched by a committed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Posting {
    /// Funds entered `destination` from outside the ledger
    Deposit { destination: AccountId },

    /// Funds left `origin` to outside the ledger
    Withdraw { origin: AccountId },

    /// Funds moved from `origin` to `destination`
    Transfer {
        origin: AccountId,
        destination: AccountId,
    },
}

impl Posting {
    /// The kind of transaction this posting records
    pub fn kind(&self) -> TransactionKind {
        match self {
            Posting::Deposit { .. } => TransactionKind::Deposit,
            Posting::Withdraw { .. } => TransactionKind::Withdraw,
            Posting::Transfer { .. } => TransactionKind::Transfer,
        }
    }

    /// The debited account, absent for deposits
    pub fn origin(&self) -> Option<&str> {
        match self {
            Posting::Deposit { .. } => None,
            Posting::Withdraw { origin } | Posting::Transfer { origin, .. } => {
                Some(origin.as_str())
            }
        }
    }

    /// The credited account, absent for withdrawals
    pub fn destination(&self) -> Option<&str> {
        match self {
            Posting::Withdraw { .. } => None,
            Posting::Deposit { destination } | Posting::Transfer { destination, .. } => {
                Some(destination.as_str())
            }
        }
    }
}

/// Immutable record appended to the transaction log
///
/// Exactly one record exists per committed operation. Records are never
/// updated; only a reset removes them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Position in the log, starting at 1
    pub id: TransactionId,

    /// The accounts involved and the kind of operation
    pub posting: Posting,

    /// The positive amount moved, at scale 2
    pub amount: Decimal,

    /// When the operation committed
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// The kind of transaction this record describes
    pub fn kind(&self) -> TransactionKind {
        self.posting.kind()
    }
}

/// A single request against the ledger
///
/// This is what the surrounding layer (CSV replay here, an HTTP handler
/// elsewhere) hands to [`crate::core::traits::Ledger::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Deposit {
        destination: AccountId,
        amount: Decimal,
    },
    Withdraw {
        origin: AccountId,
        amount: Decimal,
    },
    Transfer {
        origin: AccountId,
        destination: AccountId,
        amount: Decimal,
    },
    /// Clear every account and transaction record
    Reset,
}

impl Operation {
    /// Account identifiers this operation reads or writes
    ///
    /// Empty for `Reset`, which touches the whole ledger instead.
    pub fn accounts(&self) -> Vec<&str> {
        match self {
            Operation::Deposit { destination, .. } => vec![destination.as_str()],
            Operation::Withdraw { origin, .. } => vec![origin.as_str()],
            Operation::Transfer {
                origin,
                destination,
                ..
            } => vec![origin.as_str(), destination.as_str()],
            Operation::Reset => Vec::new(),
        }
    }

    /// Short lowercase label for logging
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Deposit { .. } => TransactionKind::Deposit.as_str(),
            Operation::Withdraw { .. } => TransactionKind::Withdraw.as_str(),
            Operation::Transfer { .. } => TransactionKind::Transfer.as_str(),
            Operation::Reset => "reset",
        }
    }
}

/// Both sides of a committed transfer, after the transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub origin: Account,
    pub destination: Account,
}

/// Result of applying an [`Operation`]
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Deposited { destination: Account },
    Withdrawn { origin: Account },
    Transferred { origin: Account, destination: Account },
    Reset,
}

impl From<TransferOutcome> for OperationOutcome {
    fn from(outcome: TransferOutcome) -> Self {
        OperationOutcome::Transferred {
            origin: outcome.origin,
            destination: outcome.destination,
        }
    }
}
