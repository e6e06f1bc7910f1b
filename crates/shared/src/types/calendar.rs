//! Calendar arithmetic for term maturities and challenge-year boundaries.
//!
//! All dates in the engine are calendar dates (`NaiveDate`); creation
//! timestamps exist only for same-day tie-breaking and live in the
//! persistence layer.

use chrono::{Datelike, NaiveDate};

/// Adds `months` to a date, clamping the day to the last valid day of the
/// target month (Jan 31 + 1 month -> Feb 28/29).
#[must_use]
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let zero_based = date.month0() + months;
    let year = date.year() + i32::try_from(zero_based / 12).expect("month count fits in i32");
    let month = zero_based % 12 + 1;
    let day = date.day().min(days_in_month(year, month));
    // Valid by construction: month is 1..=12 and day is clamped.
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is valid for target month")
}

/// Number of days in the given month, leap years included.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if year % 400 == 0 || (year % 4 == 0 && year % 100 != 0) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// First and last day of a challenge year (calendar year).
#[must_use]
pub fn challenge_year_bounds(year: i32) -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(year, 1, 1).expect("Jan 1 is always valid"),
        NaiveDate::from_ymd_opt(year, 12, 31).expect("Dec 31 is always valid"),
    )
}

/// The annual interest cutover date: Dec 31 of the given year.
#[must_use]
pub fn cutover_date(year: i32) -> NaiveDate {
    challenge_year_bounds(year).1
}

/// Signed number of days from `from` to `to`.
#[must_use]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
