//! Investment error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur when creating an investment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvestmentError {
    /// Principal must be strictly positive.
    #[error("Principal must be positive, got {0}")]
    NonPositivePrincipal(Decimal),

    /// Principal carries more than 2 fractional digits.
    #[error("Principal {0} has more than 2 fractional digits")]
    ExcessPrecision(Decimal),

    /// Annual rate must be within 0..=100 percent.
    #[error("Annual rate {0}% is outside 0..=100")]
    RateOutOfRange(Decimal),

    /// Term must be at least one month.
    #[error("Term of {0} months is invalid; terms are at least one month")]
    InvalidTerm(u32),
}
