//! Concurrent implementations of core components
//!
//! This module provides thread-safe versions of the ledger components for
//! callers that share one ledger across threads or tokio tasks.
//!
//! # Architecture
//!
//! The concurrent implementations expose the same operations as the
//! single-owner versions, over concurrent data structures:
//!
//! - **AsyncAccountStore**: DashMap of per-account `parking_lot` mutexes
//! - **AsyncTransactionLog**: Mutex-guarded append-only log
//! - **AsyncLedgerEngine**: Runs operations under the locking protocol
//! - **BatchProcessor**: Partitions batches by shared accounts and runs the
//!   partitions on tokio tasks
//!
//! # Thread Safety
//!
//! - Operations on different accounts proceed in parallel
//! - Operations on the same account are serialized
//! - Reset and account snapshots exclude every other operation

pub mod account_store;
pub mod batch_processor;
pub mod engine;
pub mod transaction_log;

pub use account_store::{AccountCell, AsyncAccountStore};
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::AsyncLedgerEngine;
pub use transaction_log::AsyncTransactionLog;
