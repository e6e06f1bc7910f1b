//! Money rounding and amount validation.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary values are `rust_decimal::Decimal` with 2 fractional digits.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Number of fractional digits carried by every posted monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Errors raised when an amount fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// Amount must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    NonPositive(Decimal),

    /// Amount carries more than 2 fractional digits.
    #[error("Amount {0} has more than {MONEY_SCALE} fractional digits")]
    ExcessPrecision(Decimal),
}

/// Rounds a monetary value to 2 fractional digits, half-up.
///
/// This is the rounding applied to every value that reaches the ledger.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validates an amount submitted to the ledger.
///
/// # Errors
///
/// Returns `AmountError::NonPositive` for zero or negative amounts, and
/// `AmountError::ExcessPrecision` for amounts with more than 2 fractional
/// digits (sub-cent values never round silently on the write path).
pub fn validate_amount(amount: Decimal) -> Result<(), AmountError> {
    if amount <= Decimal::ZERO {
        return Err(AmountError::NonPositive(amount));
    }
    if round_money(amount) != amount {
        return Err(AmountError::ExcessPrecision(amount));
    }
    Ok(())
}
