//! Account Ledger Library
//! # Overview
//!
//! This library provides an account ledger: named accounts with fixed-point
//! balances, an append-only transaction log, and an engine that applies
//! deposits, withdrawals, transfers and resets as atomic units of work. A
//! CSV replay pipeline drives the engine with a sync or an async strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Operation, TransactionRecord, LedgerError)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Ledger components:
//!   - [`core::engine`] - Single-owner ledger engine
//!   - [`core::account_store`] - Account balances
//!   - [`core::transaction_log`] - Append-only transaction history
//!   - [`core::r#async`] - Thread-safe engine and batch processor
//! - [`io`] - CSV input and output
//! - [`strategy`] - Complete replay pipelines
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Operations
//!
//! - **Deposit**: Credit funds to an account, creating it on first use
//! - **Withdraw**: Debit funds from an existing account with sufficient balance
//! - **Transfer**: Move funds between accounts; the destination is created on first use
//! - **Reset**: Remove every account and transaction record
//!
//! # Invariants
//!
//! - Balances are never negative
//! - Every committed operation appends exactly one transaction record
//! - A failed operation changes nothing
//! - Transfers conserve the total of all balances

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use crate::core::{AsyncLedgerEngine, Ledger, LedgerConfig, LedgerEngine};
pub use io::{write_accounts_csv, write_journal_csv};
pub use types::{
    Account, AccountId, ErrorKind, LedgerError, Operation, OperationOutcome, Posting,
    TransactionId, TransactionKind, TransactionRecord, TransferOutcome,
};
