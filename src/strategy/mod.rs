//! Processing strategy module for ledger replay
//!
//! This module defines the Strategy pattern for complete processing pipelines,
//! encompassing both CSV parsing and ledger engine processing. This allows
//! different implementations (synchronous, asynchronous batch) to be selected
//! at runtime.

use crate::cli::StrategyType;
use crate::core::LedgerConfig;
use crate::types::TransactionRecord;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete ledger replay pipelines
///
/// Each strategy reads operations from a CSV file, applies them through its
/// ledger engine, and writes the final balances to output. Every strategy
/// must produce the same balances for the same input.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from input file and write balances to output
    ///
    /// # Returns
    ///
    /// * `Ok(records)` with the transaction log after the last operation, in
    ///   commit order
    /// * `Err(String)` if a fatal error occurred (file not found, I/O error, etc.)
    ///
    /// Rejected operations and malformed rows are logged and skipped; they
    /// never cause this method to return an error.
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<Vec<TransactionRecord>, String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `ledger_config` - Lock settings for the concurrent engine (ignored for sync)
/// * `batch_config` - Optional batch settings (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    ledger_config: LedgerConfig,
    batch_config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            batch_config.unwrap_or_default(),
            ledger_config,
        )),
    }
}
