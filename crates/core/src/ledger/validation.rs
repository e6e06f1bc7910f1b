//! Ledger entry validation.
//!
//! Validation happens before anything touches the database: a failing amount
//! aborts the write and no partial entry is ever persisted.

use rust_decimal::Decimal;

use akiba_shared::types::money::{validate_amount, AmountError};

use super::error::LedgerError;

/// Validates the amount for a new ledger entry of any kind.
///
/// # Errors
///
/// Returns `LedgerError::NonPositiveAmount` for zero or negative amounts and
/// `LedgerError::ExcessPrecision` for amounts finer than 2 fractional digits.
pub fn validate_new_entry(amount: Decimal) -> Result<(), LedgerError> {
    validate_amount(amount).map_err(|err| match err {
        AmountError::NonPositive(value) => LedgerError::NonPositiveAmount(value),
        AmountError::ExcessPrecision(value) => LedgerError::ExcessPrecision(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_accepts_valid_amounts() {
        assert!(validate_new_entry(dec!(10000)).is_ok());
        assert!(validate_new_entry(dec!(0.01)).is_ok());
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(
            validate_new_entry(dec!(0)),
            Err(LedgerError::NonPositiveAmount(dec!(0)))
        );
        assert_eq!(
            validate_new_entry(dec!(-1)),
            Err(LedgerError::NonPositiveAmount(dec!(-1)))
        );
    }

    #[test]
    fn test_rejects_sub_cent_amounts() {
        assert_eq!(
            validate_new_entry(dec!(9.999)),
            Err(LedgerError::ExcessPrecision(dec!(9.999)))
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::NonPositiveAmount(dec!(0)).error_code(),
            "NON_POSITIVE_AMOUNT"
        );
        assert_eq!(
            LedgerError::ExcessPrecision(dec!(0.001)).error_code(),
            "EXCESS_PRECISION"
        );
    }
}
