//! Core business logic module
//!
//! This module contains the ledger components:
//! - `traits` - The `Ledger` trait shared by both engines
//! - `engine` - Single-owner ledger engine
//! - `account_store` - Account balances and lazy account creation
//! - `transaction_log` - Append-only transaction history
//! - `config` - Lock timeout and retry settings
//! - `async` - Thread-safe implementations for shared ledgers

pub mod account_store;
pub mod r#async;
pub mod config;
pub mod engine;
pub mod traits;
pub mod transaction_log;

pub use account_store::AccountStore;
pub use config::LedgerConfig;
pub use engine::LedgerEngine;
pub use r#async::{AsyncAccountStore, AsyncLedgerEngine, AsyncTransactionLog, BatchProcessor};
pub use traits::Ledger;
pub use transaction_log::TransactionLog;
