//! Allocation domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allocator::CHALLENGE_COMPLETE;

/// The allocation state a member carries between deposits.
///
/// Read from the member's most recent deposit entry within the same
/// challenge year; defaults apply when no such entry exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationState {
    /// Funds brought forward from earlier deposits, not yet enough to fund
    /// the next weekly target.
    pub carry_forward: Decimal,
    /// The first week still needing funding (1..=52, or 53 once complete).
    pub next_week: u32,
}

impl AllocationState {
    /// The state of a member with no prior deposits this challenge year.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            carry_forward: Decimal::ZERO,
            next_week: 1,
        }
    }
}

impl Default for AllocationState {
    fn default() -> Self {
        Self::initial()
    }
}

/// One fully covered week in a deposit's allocation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekCoverage {
    /// Week number (1..=52).
    pub week: u32,
    /// The week's target (`week * 10_000`).
    pub target: Decimal,
    /// Amount allocated to this week; always equals `target`.
    pub allocated: Decimal,
    /// Whether the week is fully covered; always true for emitted rows
    /// (partial weeks never occur).
    pub fully_covered: bool,
    /// Carry-forward applied to the first week covered by this deposit;
    /// zero for subsequent weeks.
    pub brought_forward: Decimal,
    /// Running total of funds consumed out of this round's available pool
    /// after this week was funded.
    pub cumulative: Decimal,
}

/// The result of allocating one deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    /// Weeks fully covered by this deposit, in ascending order.
    pub covered_weeks: Vec<WeekCoverage>,
    /// Funds left over after the last affordable week; retained whole, never
    /// split into a partial week.
    pub carry_forward: Decimal,
    /// Total funds available this round (prior carry-forward + deposit).
    pub cumulative_total: Decimal,
    /// The first week still needing funding after this deposit
    /// (53 = challenge complete).
    pub next_week: u32,
}

impl AllocationOutcome {
    /// True once all 52 weeks are covered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.next_week == CHALLENGE_COMPLETE
    }

    /// Funds accumulating beyond the week-52 target.
    ///
    /// `Some` only once the challenge is complete; there is no week-53
    /// target, so this carry-forward can only grow. Reporting layers may
    /// label it as an unallocated surplus.
    #[must_use]
    pub fn surplus(&self) -> Option<Decimal> {
        self.is_complete().then_some(self.carry_forward)
    }

    /// The state the member's next deposit starts from.
    #[must_use]
    pub fn next_state(&self) -> AllocationState {
        AllocationState {
            carry_forward: self.carry_forward,
            next_week: self.next_week,
        }
    }
}
