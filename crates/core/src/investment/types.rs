//! Investment domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use akiba_shared::types::money::{validate_amount, AmountError};
use akiba_shared::types::{add_months, InvestmentId, MemberId};

use super::error::InvestmentError;

/// Validates investment terms without constructing an investment.
///
/// # Errors
///
/// Rejects a non-positive or sub-cent principal, a rate outside 0..=100%,
/// and a zero-month term.
pub fn validate_terms(
    principal: Decimal,
    annual_rate_pct: Decimal,
    term_months: u32,
) -> Result<(), InvestmentError> {
    validate_amount(principal).map_err(|err| match err {
        AmountError::NonPositive(value) => InvestmentError::NonPositivePrincipal(value),
        AmountError::ExcessPrecision(value) => InvestmentError::ExcessPrecision(value),
    })?;
    if annual_rate_pct < Decimal::ZERO || annual_rate_pct > Decimal::ONE_HUNDRED {
        return Err(InvestmentError::RateOutOfRange(annual_rate_pct));
    }
    if term_months == 0 {
        return Err(InvestmentError::InvalidTerm(term_months));
    }
    Ok(())
}

/// Status of a fixed-term investment.
///
/// Transitions only `Fixed` -> `Matured`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStatus {
    /// Funds are committed for the term.
    Fixed,
    /// The term has ended; interest is realizable. Terminal.
    Matured,
}

/// A member's fixed-term investment with simple annual interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    /// Unique identifier.
    pub id: InvestmentId,
    /// The member account that owns this investment.
    pub member_id: MemberId,
    /// Principal committed.
    pub principal: Decimal,
    /// Annual simple-interest rate in percent (e.g. 30.00 for 30%).
    pub annual_rate_pct: Decimal,
    /// Term length in whole months.
    pub term_months: u32,
    /// Date the funds were committed.
    pub start_date: NaiveDate,
    /// Current status.
    pub status: InvestmentStatus,
    /// Whether maturity interest has been posted to the ledger.
    pub interest_posted: bool,
}

impl Investment {
    /// Creates a new fixed investment after validating its terms.
    ///
    /// # Errors
    ///
    /// Rejects a non-positive or sub-cent principal, a rate outside
    /// 0..=100%, and a zero-month term.
    pub fn new(
        id: InvestmentId,
        member_id: MemberId,
        principal: Decimal,
        annual_rate_pct: Decimal,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Result<Self, InvestmentError> {
        validate_terms(principal, annual_rate_pct, term_months)?;

        Ok(Self {
            id,
            member_id,
            principal,
            annual_rate_pct,
            term_months,
            start_date,
            status: InvestmentStatus::Fixed,
            interest_posted: false,
        })
    }

    /// The date the term ends, with the day clamped to the target month's
    /// last valid day.
    #[must_use]
    pub fn maturity_date(&self) -> NaiveDate {
        add_months(self.start_date, self.term_months)
    }

    /// True once the current date has reached the maturity date.
    #[must_use]
    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        as_of >= self.maturity_date()
    }

    /// Days remaining until maturity (negative once past it).
    #[must_use]
    pub fn days_until_maturity(&self, as_of: NaiveDate) -> i64 {
        akiba_shared::types::days_between(as_of, self.maturity_date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn investment(principal: Decimal, rate: Decimal, months: u32) -> Investment {
        Investment::new(
            InvestmentId::new(),
            MemberId::new(),
            principal,
            rate,
            months,
            d(2025, 1, 31),
        )
        .unwrap()
    }

    #[test]
    fn test_new_investment_starts_fixed() {
        let inv = investment(dec!(1000000), dec!(30), 8);
        assert_eq!(inv.status, InvestmentStatus::Fixed);
        assert!(!inv.interest_posted);
    }

    #[test]
    fn test_maturity_date_clamps_day() {
        // Jan 31 + 1 month clamps to Feb 28 (2025 is not a leap year).
        let inv = investment(dec!(1000000), dec!(30), 1);
        assert_eq!(inv.maturity_date(), d(2025, 2, 28));
    }

    #[test]
    fn test_is_due() {
        let inv = investment(dec!(1000000), dec!(30), 8);
        assert_eq!(inv.maturity_date(), d(2025, 9, 30));
        assert!(!inv.is_due(d(2025, 9, 29)));
        assert!(inv.is_due(d(2025, 9, 30)));
        assert!(inv.is_due(d(2026, 1, 1)));
    }

    #[test]
    fn test_days_until_maturity_goes_negative() {
        let inv = investment(dec!(1000000), dec!(30), 8);
        assert_eq!(inv.days_until_maturity(d(2025, 9, 29)), 1);
        assert_eq!(inv.days_until_maturity(d(2025, 10, 1)), -1);
    }

    #[test]
    fn test_rejects_invalid_terms() {
        let id = InvestmentId::new();
        let member = MemberId::new();

        assert_eq!(
            Investment::new(id, member, dec!(0), dec!(30), 8, d(2025, 1, 1)),
            Err(InvestmentError::NonPositivePrincipal(dec!(0)))
        );
        assert_eq!(
            Investment::new(id, member, dec!(100.005), dec!(30), 8, d(2025, 1, 1)),
            Err(InvestmentError::ExcessPrecision(dec!(100.005)))
        );
        assert_eq!(
            Investment::new(id, member, dec!(1000), dec!(101), 8, d(2025, 1, 1)),
            Err(InvestmentError::RateOutOfRange(dec!(101)))
        );
        assert_eq!(
            Investment::new(id, member, dec!(1000), dec!(-1), 8, d(2025, 1, 1)),
            Err(InvestmentError::RateOutOfRange(dec!(-1)))
        );
        assert_eq!(
            Investment::new(id, member, dec!(1000), dec!(30), 0, d(2025, 1, 1)),
            Err(InvestmentError::InvalidTerm(0))
        );
    }
}
