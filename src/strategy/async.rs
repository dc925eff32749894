//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Operations are read in batches and each batch is
//! partitioned by shared accounts for parallel processing.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── LedgerConfig (lock timeout, create retries)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (account partitioning + tokio tasks)
//!     └── AsyncLedgerEngine (thread-safe ledger)
//!         ├── AsyncAccountStore
//!         └── AsyncTransactionLog
//! ```
//!
//! Batches run one after another, so an account's operations keep their file
//! order across batch boundaries. Within a batch, groups of operations that
//! share no account run in parallel on the tokio multi-threaded runtime.

use crate::core::r#async::{AsyncLedgerEngine, BatchProcessor};
use crate::core::LedgerConfig;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_accounts_csv;
use crate::strategy::ProcessingStrategy;
use crate::types::TransactionRecord;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for batch processing
///
/// Controls how operations are batched and the number of worker threads
/// for parallel processing within each batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                default = default.batch_size,
                "Invalid batch_size (0), using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                default = default.max_concurrent_batches,
                "Invalid max_concurrent_batches (0), using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    /// Batch processing configuration
    config: BatchConfig,

    /// Lock settings for the shared engine
    ledger_config: LedgerConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    pub fn new(config: BatchConfig, ledger_config: LedgerConfig) -> Self {
        Self {
            config,
            ledger_config,
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process operations from input file and write balances to output
    ///
    /// 1. Builds a multi-threaded tokio runtime and a shared AsyncLedgerEngine
    /// 2. Reads operations in batches from CSV using AsyncReader
    /// 3. Processes each batch to completion before reading the next
    /// 4. Writes the final balances using the csv_format module
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<Vec<TransactionRecord>, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let engine = Arc::new(AsyncLedgerEngine::with_config(self.ledger_config.clone()));
            let processor = BatchProcessor::new(Arc::clone(&engine));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let (mut applied, mut rejected, mut batches) = (0usize, 0usize, 0usize);
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }
                batches += 1;
                debug!(batch = batches, size = batch.len(), "Processing batch");

                for processed in processor.process_batch(batch).await {
                    match processed.result {
                        Ok(_) => applied += 1,
                        Err(e) => {
                            rejected += 1;
                            warn!(
                                operation = processed.operation.label(),
                                kind = ?e.kind(),
                                error = %e,
                                "Operation rejected"
                            );
                        }
                    }
                }
            }
            info!(applied, rejected, batches, "Replay complete");

            let accounts = engine.accounts().map_err(|e| e.to_string())?;
            write_accounts_csv(&accounts, output)?;

            engine.transactions().map_err(|e| e.to_string())
        })
    }
}
