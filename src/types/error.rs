//! Error types for the account ledger
//!
//! Every failure the engine can report is a variant of [`LedgerError`].
//! Variants fall into the categories reported by [`LedgerError::kind`]:
//!
//! - **Caller errors**: invalid amount, unknown origin account, insufficient funds.
//!   Detected before anything is written; never worth retrying.
//! - **Storage unavailable**: a lock or store access did not complete in time.
//!   Nothing was written, so the caller may retry.
//! - **Internal**: arithmetic overflow or another unexpected failure.

use rust_decimal::Decimal;
use thiserror::Error;

/// Coarse classification of a [`LedgerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidAmount,
    AccountNotFound,
    InsufficientFunds,
    StorageUnavailable,
    Internal,
}

/// Main error type for the ledger engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount is zero, negative, or finer than two fractional digits
    #[error("Invalid amount '{amount}': must be positive with at most 2 decimal places")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// The origin account of a withdrawal or transfer does not exist
    #[error("Account {account} not found")]
    AccountNotFound {
        /// The missing account identifier
        account: String,
    },

    /// The requested debit exceeds the current balance
    #[error("Insufficient funds for account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account identifier
        account: String,
        /// Balance at the time of the check
        balance: Decimal,
        /// Requested debit
        requested: Decimal,
    },

    /// The store could not be reached within the configured timeout
    ///
    /// No state was changed; the operation may be retried.
    #[error("Storage unavailable: {resource} not acquired within {timeout_ms}ms")]
    StorageUnavailable {
        /// What the operation was waiting for
        resource: String,
        /// The timeout that elapsed
        timeout_ms: u64,
    },

    /// Balance arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account identifier
        account: String,
    },

    /// Unexpected failure
    #[error("Internal error: {message}")]
    Internal {
        /// Description for logs; not meant for end users
        message: String,
    },
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account: &str) -> Self {
        LedgerError::AccountNotFound {
            account: account.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: &str, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account: account.to_string(),
            balance,
            requested,
        }
    }

    /// Create a StorageUnavailable error
    pub fn storage_unavailable(resource: &str, timeout: std::time::Duration) -> Self {
        LedgerError::StorageUnavailable {
            resource: resource.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        LedgerError::Internal {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            LedgerError::AccountNotFound { .. } => ErrorKind::AccountNotFound,
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::StorageUnavailable { .. } => ErrorKind::StorageUnavailable,
            LedgerError::ArithmeticOverflow { .. } | LedgerError::Internal { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::StorageUnavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[case::invalid_amount(
        LedgerError::InvalidAmount { amount: Decimal::new(-500, 2) },
        "Invalid amount '-5.00': must be positive with at most 2 decimal places"
    )]
    #[case::account_not_found(
        LedgerError::AccountNotFound { account: "100".to_string() },
        "Account 100 not found"
    )]
    #[case::insufficient_funds(
        LedgerError::InsufficientFunds {
            account: "100".to_string(),
            balance: Decimal::new(500, 2),
            requested: Decimal::new(1000, 2),
        },
        "Insufficient funds for account 100: balance 5.00, requested 10.00"
    )]
    #[case::storage_unavailable(
        LedgerError::StorageUnavailable { resource: "account 100".to_string(), timeout_ms: 250 },
        "Storage unavailable: account 100 not acquired within 250ms"
    )]
    #[case::arithmetic_overflow(
        LedgerError::ArithmeticOverflow { operation: "credit".to_string(), account: "7".to_string() },
        "Arithmetic overflow in credit for account 7"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::invalid_amount(LedgerError::invalid_amount(Decimal::ZERO), ErrorKind::InvalidAmount, false)]
    #[case::not_found(LedgerError::account_not_found("1"), ErrorKind::AccountNotFound, false)]
    #[case::insufficient(
        LedgerError::insufficient_funds("1", Decimal::ZERO, Decimal::ONE),
        ErrorKind::InsufficientFunds,
        false
    )]
    #[case::storage(
        LedgerError::storage_unavailable("ledger", Duration::from_millis(10)),
        ErrorKind::StorageUnavailable,
        true
    )]
    #[case::overflow(LedgerError::arithmetic_overflow("credit", "1"), ErrorKind::Internal, false)]
    #[case::internal(LedgerError::internal("boom"), ErrorKind::Internal, false)]
    fn test_kind_and_retryability(
        #[case] error: LedgerError,
        #[case] kind: ErrorKind,
        #[case] retryable: bool,
    ) {
        assert_eq!(error.kind(), kind);
        assert_eq!(error.is_retryable(), retryable);
    }

    #[test]
    fn test_storage_unavailable_records_timeout() {
        let error = LedgerError::storage_unavailable("transaction log", Duration::from_secs(2));
        assert_eq!(
            error,
            LedgerError::StorageUnavailable {
                resource: "transaction log".to_string(),
                timeout_ms: 2000,
            }
        );
    }
}
