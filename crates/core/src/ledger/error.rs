//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger entry validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Entry amount must be strictly positive.
    #[error("Entry amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Entry amount carries more than 2 fractional digits.
    #[error("Entry amount {0} has more than 2 fractional digits")]
    ExcessPrecision(Decimal),
}

impl LedgerError {
    /// Returns the error code for operator-facing summaries.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::ExcessPrecision(_) => "EXCESS_PRECISION",
        }
    }
}
