//! Simple-interest accrual and the maturity transition.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use akiba_shared::types::{days_between, round_money};

use super::types::{Investment, InvestmentStatus};

const DAYS_PER_YEAR: u32 = 365;
const MONTHS_PER_YEAR: u32 = 12;

/// Outcome of a maturity check.
///
/// Re-checking is always safe: only the first check past the maturity date
/// yields `Matured`, and it is never an error to check again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaturityCheck {
    /// The term has not ended yet; nothing changed.
    NotYetMature,
    /// The investment was already matured; nothing changed.
    AlreadyMatured,
    /// The investment transitioned to matured just now. The caller must
    /// post `interest` to the ledger exactly once, guarded by the
    /// investment's idempotency key.
    Matured {
        /// The total expected interest to realize into the ledger.
        interest: Decimal,
    },
}

impl Investment {
    /// Total simple interest over the full term: `P * r * (months/12)`,
    /// rounded half-up to 2 decimals. Known as soon as the term is; not
    /// day-dependent.
    #[must_use]
    pub fn total_interest_expected(&self) -> Decimal {
        let rate = self.annual_rate_pct / Decimal::ONE_HUNDRED;
        let years = Decimal::from(self.term_months) / Decimal::from(MONTHS_PER_YEAR);
        round_money(self.principal * rate * years)
    }

    /// Display-only linear estimate of interest accrued so far.
    ///
    /// `P * (r/365) * min(days elapsed, days in term)`. This value is never
    /// written to the ledger; realized interest is posted once at maturity
    /// via [`Investment::check_maturity`].
    #[must_use]
    pub fn interest_accrued(&self, as_of: NaiveDate) -> Decimal {
        if as_of < self.start_date {
            return Decimal::ZERO;
        }
        let days_elapsed = days_between(self.start_date, as_of).min(self.days_in_term());
        if days_elapsed <= 0 {
            return Decimal::ZERO;
        }
        round_money(self.daily_interest() * Decimal::from(days_elapsed))
    }

    /// Interest earned on a single day, zero outside the investment's life.
    #[must_use]
    pub fn interest_earned_on(&self, day: NaiveDate) -> Decimal {
        if day < self.start_date || day > self.maturity_date() {
            return Decimal::ZERO;
        }
        round_money(self.daily_interest())
    }

    /// Interest earned over a date range, clamped to the investment's life.
    /// Both endpoints are inclusive. Display-only.
    #[must_use]
    pub fn interest_for_period(&self, from: NaiveDate, to: NaiveDate) -> Decimal {
        if to < from {
            return Decimal::ZERO;
        }
        let period_start = from.max(self.start_date);
        let period_end = to.min(self.maturity_date());
        if period_start > period_end {
            return Decimal::ZERO;
        }
        let days = days_between(period_start, period_end) + 1;
        round_money(self.daily_interest() * Decimal::from(days))
    }

    /// Percentage of the total expected interest accrued so far, capped
    /// implicitly by the day clamp. Zero when no interest is expected.
    #[must_use]
    pub fn progress_percent(&self, as_of: NaiveDate) -> Decimal {
        let expected = self.total_interest_expected();
        if expected <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_money(self.interest_accrued(as_of) / expected * Decimal::ONE_HUNDRED)
    }

    /// Checks for maturity and transitions `Fixed` -> `Matured` when due.
    ///
    /// The status change happens in memory; the caller persists it together
    /// with the single interest posting. Multiple independent triggers
    /// (dashboard check, scheduled sweep) may race harmlessly; the ledger
    /// write is keyed on the investment's identity.
    pub fn check_maturity(&mut self, as_of: NaiveDate) -> MaturityCheck {
        if self.status == InvestmentStatus::Matured {
            return MaturityCheck::AlreadyMatured;
        }
        if !self.is_due(as_of) {
            return MaturityCheck::NotYetMature;
        }
        self.status = InvestmentStatus::Matured;
        MaturityCheck::Matured {
            interest: self.total_interest_expected(),
        }
    }

    fn days_in_term(&self) -> i64 {
        days_between(self.start_date, self.maturity_date())
    }

    fn daily_interest(&self) -> Decimal {
        let rate = self.annual_rate_pct / Decimal::ONE_HUNDRED;
        self.principal * rate / Decimal::from(DAYS_PER_YEAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use akiba_shared::types::{InvestmentId, MemberId};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn investment(principal: Decimal, rate: Decimal, months: u32, start: NaiveDate) -> Investment {
        Investment::new(InvestmentId::new(), MemberId::new(), principal, rate, months, start)
            .unwrap()
    }

    #[test]
    fn test_total_interest_expected() {
        // 1,000,000 at 30% over 8 months = 1,000,000 * 0.30 * (8/12).
        let inv = investment(dec!(1000000), dec!(30), 8, d(2025, 1, 1));
        assert_eq!(inv.total_interest_expected(), dec!(200000.00));
    }

    #[test]
    fn test_total_interest_expected_rounds_half_up() {
        // 1,000 * 0.0725 * (5/12) = 30.2083... -> 30.21
        let inv = investment(dec!(1000), dec!(7.25), 5, d(2025, 1, 1));
        assert_eq!(inv.total_interest_expected(), dec!(30.21));
    }

    #[test]
    fn test_interest_accrued_before_start_is_zero() {
        let inv = investment(dec!(1000000), dec!(30), 8, d(2025, 6, 1));
        assert_eq!(inv.interest_accrued(d(2025, 5, 31)), dec!(0));
        assert_eq!(inv.interest_accrued(d(2025, 6, 1)), dec!(0));
    }

    #[test]
    fn test_interest_accrued_linear_in_days() {
        let inv = investment(dec!(1000000), dec!(30), 8, d(2025, 1, 1));
        // 10 days: 1,000,000 * 0.30 / 365 * 10 = 8,219.178... -> 8,219.18
        assert_eq!(inv.interest_accrued(d(2025, 1, 11)), dec!(8219.18));
    }

    #[test]
    fn test_interest_accrued_caps_at_term() {
        let inv = investment(dec!(1000000), dec!(30), 8, d(2025, 1, 1));
        let at_maturity = inv.interest_accrued(d(2025, 9, 1));
        // Days stop counting past maturity.
        assert_eq!(inv.interest_accrued(d(2026, 5, 1)), at_maturity);
    }

    #[test]
    fn test_interest_earned_on_single_day() {
        let inv = investment(dec!(365000), dec!(10), 12, d(2025, 1, 1));
        // 365,000 * 0.10 / 365 = 100.00 per day.
        assert_eq!(inv.interest_earned_on(d(2025, 6, 1)), dec!(100.00));
        assert_eq!(inv.interest_earned_on(d(2024, 12, 31)), dec!(0));
        assert_eq!(inv.interest_earned_on(d(2026, 1, 2)), dec!(0));
    }

    #[test]
    fn test_interest_for_period_clamps_to_life() {
        let inv = investment(dec!(365000), dec!(10), 12, d(2025, 1, 1));
        // Jan 1-10 inclusive: 10 days at 100.00.
        assert_eq!(
            inv.interest_for_period(d(2025, 1, 1), d(2025, 1, 10)),
            dec!(1000.00)
        );
        // Range entirely before start.
        assert_eq!(
            inv.interest_for_period(d(2024, 1, 1), d(2024, 12, 31)),
            dec!(0)
        );
        // Reversed range.
        assert_eq!(
            inv.interest_for_period(d(2025, 2, 1), d(2025, 1, 1)),
            dec!(0)
        );
    }

    #[test]
    fn test_progress_percent() {
        let inv = investment(dec!(1000000), dec!(30), 8, d(2025, 1, 1));
        assert_eq!(inv.progress_percent(d(2025, 1, 1)), dec!(0));
        let at_end = inv.progress_percent(d(2026, 1, 1));
        // Day-count accrual over 243 days vs the 8/12-year expected figure.
        assert!(at_end > dec!(99) && at_end < dec!(101));
    }

    #[test]
    fn test_progress_percent_zero_rate() {
        let inv = investment(dec!(1000000), dec!(0), 8, d(2025, 1, 1));
        assert_eq!(inv.progress_percent(d(2025, 6, 1)), dec!(0));
    }

    #[test]
    fn test_check_maturity_transitions_once() {
        let mut inv = investment(dec!(1000000), dec!(30), 8, d(2025, 1, 1));

        assert_eq!(inv.check_maturity(d(2025, 8, 31)), MaturityCheck::NotYetMature);
        assert_eq!(inv.status, InvestmentStatus::Fixed);

        assert_eq!(
            inv.check_maturity(d(2025, 9, 1)),
            MaturityCheck::Matured {
                interest: dec!(200000.00)
            }
        );
        assert_eq!(inv.status, InvestmentStatus::Matured);

        // Second check is a no-op, never an error.
        assert_eq!(inv.check_maturity(d(2025, 9, 2)), MaturityCheck::AlreadyMatured);
        assert_eq!(inv.status, InvestmentStatus::Matured);
    }
}
