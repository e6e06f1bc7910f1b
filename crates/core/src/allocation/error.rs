//! Allocation error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while allocating a deposit against weekly targets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// Deposit amount must be strictly positive.
    #[error("Deposit amount must be positive, got {0}")]
    NonPositiveDeposit(Decimal),

    /// Deposit amount carries more than 2 fractional digits.
    #[error("Deposit amount {0} has more than 2 fractional digits")]
    ExcessPrecision(Decimal),

    /// Prior next-week pointer is outside the valid 1..=53 range.
    #[error("Next-week pointer {0} is outside 1..=53")]
    InvalidStartWeek(u32),
}
