//! CSV format handling for ledger operations and ledger output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to ledger operations
//! - Balance and journal serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{Account, Operation, TransactionRecord};
use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, origin, destination, amount.
/// Which columns are required depends on the operation type, so all but the
/// type are optional here and checked in [`convert_csv_record`].
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub op_type: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

fn required_field(value: Option<String>, field: &str, op_type: &str) -> Result<String, String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(format!("{op_type} operation requires {field}")),
    }
}

fn required_amount(value: Option<String>, op_type: &str) -> Result<Decimal, String> {
    let amount = required_field(value, "an amount", op_type)?;
    Decimal::from_str(&amount).map_err(|_| format!("Invalid amount '{amount}' for {op_type}"))
}

/// Convert a CsvRecord to an Operation
///
/// This function:
/// - Parses the operation type case-insensitively
/// - Checks that the account columns the type needs are present
/// - Parses the amount string into a Decimal
///
/// Amount rules (positive, at most two decimal places) are left to the ledger,
/// so a parseable but invalid amount still reaches it and is rejected there.
///
/// # Returns
///
/// Result containing either:
/// - Ok(Operation) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Operation, String> {
    let op_type = csv_record.op_type.trim().to_lowercase();

    match op_type.as_str() {
        "deposit" => Ok(Operation::Deposit {
            destination: required_field(csv_record.destination, "a destination", &op_type)?,
            amount: required_amount(csv_record.amount, &op_type)?,
        }),
        "withdraw" | "withdrawal" => Ok(Operation::Withdraw {
            origin: required_field(csv_record.origin, "an origin", &op_type)?,
            amount: required_amount(csv_record.amount, &op_type)?,
        }),
        "transfer" => Ok(Operation::Transfer {
            origin: required_field(csv_record.origin, "an origin", &op_type)?,
            destination: required_field(csv_record.destination, "a destination", &op_type)?,
            amount: required_amount(csv_record.amount, &op_type)?,
        }),
        "reset" => Ok(Operation::Reset),
        _ => Err(format!(
            "Invalid operation type: '{}'",
            csv_record.op_type
        )),
    }
}

/// Write account balances to CSV format
///
/// Writes accounts in CSV format with columns: account, balance.
/// Accounts are sorted by account ID for deterministic output and balances
/// always carry two decimal places.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts: Vec<&Account> = accounts.iter().collect();
    sorted_accounts.sort_by(|a, b| a.id.cmp(&b.id));

    for account in sorted_accounts {
        writer
            .write_record(&[account.id.clone(), format!("{:.2}", account.balance)])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write transaction records to CSV format
///
/// Columns: id, type, origin, destination, amount, created_at. Records are
/// written in the order given, which for a ledger snapshot is commit order.
/// Timestamps are RFC 3339 in UTC with microsecond precision.
pub fn write_journal_csv(
    records: &[TransactionRecord],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["id", "type", "origin", "destination", "amount", "created_at"])
        .map_err(|e| format!("Failed to write journal header: {}", e))?;

    for record in records {
        writer
            .write_record(&[
                record.id.to_string(),
                record.kind().to_string(),
                record.posting.origin().unwrap_or_default().to_string(),
                record.posting.destination().unwrap_or_default().to_string(),
                format!("{:.2}", record.amount),
                record
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
            ])
            .map_err(|e| format!("Failed to write journal record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush journal: {}", e))?;

    Ok(())
}
