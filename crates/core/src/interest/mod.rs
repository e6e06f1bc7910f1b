//! Annual interest on uninvested balances.
//!
//! Uninvested savings earn a flat 15% once per challenge year, posted as a
//! single deposit at the year's cutover date (Dec 31). The year-to-date
//! figure is a display-only estimate and is never posted.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use akiba_shared::types::{cutover_date, round_money};

/// Annual rate applied to uninvested balances (15%).
pub const ANNUAL_UNINVESTED_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

const DAYS_PER_YEAR: u32 = 365;

/// The interest posted at the cutover for a given uninvested balance.
#[must_use]
pub fn annual_uninvested_interest(uninvested: Decimal) -> Decimal {
    round_money(uninvested * ANNUAL_UNINVESTED_RATE)
}

/// Display-only year-to-date estimate: the current uninvested balance
/// accruing linearly at 15%/365 since Jan 1. Never posted to the ledger.
#[must_use]
pub fn uninvested_interest_ytd_estimate(uninvested: Decimal, as_of: NaiveDate) -> Decimal {
    if uninvested <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let jan_first = NaiveDate::from_ymd_opt(as_of.year(), 1, 1).expect("Jan 1 is always valid");
    let days = (as_of - jan_first).num_days();
    round_money(uninvested * ANNUAL_UNINVESTED_RATE / Decimal::from(DAYS_PER_YEAR) * Decimal::from(days))
}

/// True once the date has reached its year's cutover (Dec 31).
#[must_use]
pub fn has_cutover_passed(as_of: NaiveDate) -> bool {
    as_of >= cutover_date(as_of.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_rate_constant_is_fifteen_percent() {
        assert_eq!(ANNUAL_UNINVESTED_RATE, dec!(0.15));
    }

    #[test]
    fn test_annual_uninvested_interest() {
        assert_eq!(annual_uninvested_interest(dec!(100000)), dec!(15000.00));
        assert_eq!(annual_uninvested_interest(dec!(0)), dec!(0));
        // 333.33 * 0.15 = 49.9995 -> 50.00 half-up.
        assert_eq!(annual_uninvested_interest(dec!(333.33)), dec!(50.00));
    }

    #[test]
    fn test_ytd_estimate_grows_with_days() {
        // 365,000 at 15%/365 = 150.00 per day.
        assert_eq!(
            uninvested_interest_ytd_estimate(dec!(365000), d(2025, 1, 1)),
            dec!(0)
        );
        assert_eq!(
            uninvested_interest_ytd_estimate(dec!(365000), d(2025, 1, 11)),
            dec!(1500.00)
        );
    }

    #[test]
    fn test_ytd_estimate_zero_for_non_positive_balance() {
        assert_eq!(
            uninvested_interest_ytd_estimate(dec!(0), d(2025, 6, 1)),
            dec!(0)
        );
        assert_eq!(
            uninvested_interest_ytd_estimate(dec!(-100), d(2025, 6, 1)),
            dec!(0)
        );
    }

    #[test]
    fn test_cutover_predicate() {
        assert!(!has_cutover_passed(d(2025, 12, 30)));
        assert!(has_cutover_passed(d(2025, 12, 31)));
        // Jan 1 belongs to the next year, whose cutover is eleven months out.
        assert!(!has_cutover_passed(d(2026, 1, 1)));
    }
}
