//! Synchronous processing strategy
//!
//! Single-threaded replay: the `SyncReader` streams operations one row at a
//! time into a `LedgerEngine`, and the final balances go to
//! `csv_format::write_accounts_csv`. Memory use is proportional to the number
//! of accounts and records, not to the file size.

use crate::core::{Ledger, LedgerEngine};
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::TransactionRecord;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use account_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<Vec<TransactionRecord>, String> {
        let mut engine = LedgerEngine::new();
        let reader = SyncReader::new(input_path)?;

        let (mut applied, mut rejected) = (0usize, 0usize);
        for result in reader {
            match result {
                Ok(operation) => {
                    let label = operation.label();
                    match engine.apply(operation) {
                        Ok(_) => applied += 1,
                        Err(e) => {
                            rejected += 1;
                            warn!(operation = label, kind = ?e.kind(), error = %e, "Operation rejected");
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Skipping record"),
            }
        }
        info!(applied, rejected, "Replay complete");

        let accounts = engine.accounts().map_err(|e| e.to_string())?;
        write_accounts_csv(&accounts, output)?;

        engine.transactions().map_err(|e| e.to_string())
    }
}
