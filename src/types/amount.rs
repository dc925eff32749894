//! Monetary amount validation
//!
//! Amounts are fixed-point decimals with two fractional digits. Nothing in
//! the ledger touches binary floating point.

use super::error::LedgerError;
use rust_decimal::Decimal;

/// Number of fractional digits carried by amounts and balances
pub const AMOUNT_SCALE: u32 = 2;

/// Total significant digits a balance may carry, fractional digits included
pub const BALANCE_PRECISION: u32 = 10;

/// Largest balance an account can hold: 99,999,999.99
pub fn max_balance() -> Decimal {
    Decimal::new(10i64.pow(BALANCE_PRECISION) - 1, AMOUNT_SCALE)
}

/// Validate an operation amount and bring it to the ledger scale
///
/// Accepts strictly positive values with at most two significant fractional
/// digits. Trailing zeros beyond the scale are fine (`10.500` is `10.50`),
/// anything finer (`10.005`) is rejected rather than rounded.
///
/// # Errors
///
/// Returns `InvalidAmount` if the amount is zero, negative, or too precise.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount));
    }

    let mut normalized = amount.normalize();
    if normalized.scale() > AMOUNT_SCALE {
        return Err(LedgerError::invalid_amount(amount));
    }

    normalized.rescale(AMOUNT_SCALE);
    Ok(normalized)
}
