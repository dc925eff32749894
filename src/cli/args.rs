use crate::core::LedgerConfig;
use crate::logging::LogFormat;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Replay ledger operations from CSV and print final balances
#[derive(Parser, Debug)]
#[command(name = "account-ledger")]
#[command(about = "Replay deposits, withdrawals, transfers and resets against an account ledger", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operations
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for single-threaded or 'async' for batched parallel"
    )]
    pub strategy: StrategyType,

    /// Number of operations per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Where to write the transaction journal
    #[arg(
        long = "journal",
        value_name = "PATH",
        help = "Also write the transaction log as CSV to this file"
    )]
    pub journal: Option<PathBuf>,

    /// Lock timeout for the concurrent engine
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MILLIS",
        env = "LEDGER_LOCK_TIMEOUT_MS",
        help = "Longest wait for a ledger lock before an operation fails (default: 5000)"
    )]
    pub lock_timeout_ms: Option<u64>,

    /// Log level filter, overridden by RUST_LOG
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        env = "LEDGER_LOG",
        default_value = "warn"
    )]
    pub log_level: String,

    /// Log line format
    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values take their defaults; zero values fall back to the
    /// defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a LedgerConfig from CLI arguments
    pub fn to_ledger_config(&self) -> LedgerConfig {
        match self.lock_timeout_ms {
            Some(millis) => LedgerConfig::with_lock_timeout(Duration::from_millis(millis)),
            None => LedgerConfig::default(),
        }
    }
}
