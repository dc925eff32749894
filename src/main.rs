//! Account Ledger CLI
//!
//! Replays ledger operations from a CSV file and prints the final balances.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > balances.csv
//! cargo run -- --strategy sync operations.csv > balances.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > balances.csv
//! cargo run -- --journal journal.csv --log-level info operations.csv > balances.csv
//! ```
//!
//! Balances go to stdout; logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use account_ledger::cli;
use account_ledger::io::write_journal_csv;
use account_ledger::logging;
use account_ledger::strategy;
use std::fs::File;
use std::io::BufWriter;
use std::process;

fn main() {
    let args = cli::parse_args();
    logging::init(&args.log_level, args.log_format);

    let strategy = {
        let batch_config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), args.to_ledger_config(), batch_config)
    };

    let mut output = std::io::stdout();
    let records = match strategy.process(&args.input_file, &mut output) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = &args.journal {
        let written = File::create(path)
            .map_err(|e| format!("Failed to create journal '{}': {}", path.display(), e))
            .and_then(|file| write_journal_csv(&records, &mut BufWriter::new(file)));
        if let Err(e) = written {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
