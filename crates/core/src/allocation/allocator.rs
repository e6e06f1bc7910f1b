//! The weekly allocation function.

use rust_decimal::Decimal;

use akiba_shared::types::money::{validate_amount, AmountError};

use super::error::AllocationError;
use super::types::{AllocationOutcome, AllocationState, WeekCoverage};

/// The weekly target unit: week N's target is `N * 10_000`.
pub const WEEKLY_UNIT: u32 = 10_000;

/// The last week of the challenge.
pub const FINAL_WEEK: u32 = 52;

/// Sentinel next-week value meaning every week is covered.
pub const CHALLENGE_COMPLETE: u32 = 53;

/// Sum of all 52 weekly targets (52 * 53 / 2 * 10_000).
pub const CHALLENGE_TOTAL_TARGET: u32 = 13_780_000;

/// Target amount for a given week.
#[must_use]
pub fn week_target(week: u32) -> Decimal {
    Decimal::from(week) * Decimal::from(WEEKLY_UNIT)
}

/// Allocates a deposit (plus prior carry-forward) against the weekly targets.
///
/// Weeks are funded whole, in order, starting from `prior.next_week`. The
/// allocation stops at the first week that cannot be fully funded; the
/// shortfall is never split across weeks and is retained entirely as
/// carry-forward. Deposits arriving after completion (`next_week == 53`)
/// cover no new weeks and accumulate carry-forward.
///
/// The function is deterministic and total for valid inputs, so snapshots can
/// be recomputed in tests without a ledger.
///
/// # Errors
///
/// Rejects non-positive deposits, deposits with more than 2 fractional
/// digits, and a `prior.next_week` outside 1..=53. Nothing else fails.
pub fn allocate(
    prior: AllocationState,
    deposit: Decimal,
) -> Result<AllocationOutcome, AllocationError> {
    validate_amount(deposit).map_err(|err| match err {
        AmountError::NonPositive(amount) => AllocationError::NonPositiveDeposit(amount),
        AmountError::ExcessPrecision(amount) => AllocationError::ExcessPrecision(amount),
    })?;
    if prior.next_week == 0 || prior.next_week > CHALLENGE_COMPLETE {
        return Err(AllocationError::InvalidStartWeek(prior.next_week));
    }

    let total_available = prior.carry_forward + deposit;
    let mut remaining = total_available;
    let mut covered_weeks = Vec::new();

    let start_week = prior.next_week;
    let mut week = start_week;
    while week <= FINAL_WEEK {
        let target = week_target(week);
        // Never partially fund a week: if the target is unaffordable, stop
        // and keep the whole remainder as carry-forward.
        if remaining < target {
            break;
        }
        remaining -= target;
        covered_weeks.push(WeekCoverage {
            week,
            target,
            allocated: target,
            fully_covered: true,
            brought_forward: if week == start_week {
                prior.carry_forward
            } else {
                Decimal::ZERO
            },
            cumulative: total_available - remaining,
        });
        week += 1;
    }

    let next_week = if week > FINAL_WEEK {
        CHALLENGE_COMPLETE
    } else {
        week
    };

    Ok(AllocationOutcome {
        covered_weeks,
        carry_forward: remaining,
        cumulative_total: total_available,
        next_week,
    })
}
