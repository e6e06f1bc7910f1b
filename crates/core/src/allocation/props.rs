//! Property-based tests for the weekly allocator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::allocator::{allocate, week_target, CHALLENGE_COMPLETE, FINAL_WEEK};
use super::types::AllocationState;

/// Strategy for deposit amounts (0.01 to 15,000,000.00 in whole cents).
fn deposit_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_500_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a sequence of deposits.
fn deposit_sequence(max_len: usize) -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(deposit_amount(), 1..=max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Conservation: for any deposit sequence, everything paid in is either
    /// allocated to fully covered weeks or sits in the final carry-forward.
    #[test]
    fn prop_conservation(deposits in deposit_sequence(12)) {
        let mut state = AllocationState::initial();
        let mut allocated_total = Decimal::ZERO;

        for deposit in &deposits {
            let outcome = allocate(state, *deposit).unwrap();
            allocated_total += outcome
                .covered_weeks
                .iter()
                .map(|c| c.allocated)
                .sum::<Decimal>();
            state = outcome.next_state();
        }

        let deposited: Decimal = deposits.iter().copied().sum();
        prop_assert_eq!(
            allocated_total + state.carry_forward,
            deposited,
            "allocated + carry-forward must equal total deposited"
        );
    }

    /// No partial weeks: every emitted coverage row is fully covered and
    /// allocated exactly its week's target.
    #[test]
    fn prop_no_partial_weeks(deposits in deposit_sequence(12)) {
        let mut state = AllocationState::initial();

        for deposit in &deposits {
            let outcome = allocate(state, *deposit).unwrap();
            for coverage in &outcome.covered_weeks {
                prop_assert!(coverage.fully_covered);
                prop_assert_eq!(coverage.allocated, week_target(coverage.week));
                prop_assert!(coverage.week >= 1 && coverage.week <= FINAL_WEEK);
            }
            state = outcome.next_state();
        }
    }

    /// Monotonic progress: next_week never decreases across a deposit
    /// sequence, and never exceeds the completion sentinel.
    #[test]
    fn prop_next_week_monotonic(deposits in deposit_sequence(12)) {
        let mut state = AllocationState::initial();
        let mut previous = state.next_week;

        for deposit in &deposits {
            let outcome = allocate(state, *deposit).unwrap();
            prop_assert!(outcome.next_week >= previous);
            prop_assert!(outcome.next_week <= CHALLENGE_COMPLETE);
            previous = outcome.next_week;
            state = outcome.next_state();
        }
    }

    /// Covered weeks form a contiguous run starting at the prior next_week.
    #[test]
    fn prop_covered_weeks_contiguous(deposits in deposit_sequence(12)) {
        let mut state = AllocationState::initial();

        for deposit in &deposits {
            let outcome = allocate(state, *deposit).unwrap();
            for (offset, coverage) in outcome.covered_weeks.iter().enumerate() {
                prop_assert_eq!(
                    coverage.week as usize,
                    state.next_week as usize + offset,
                    "weeks must be covered in order with no gaps"
                );
            }
            state = outcome.next_state();
        }
    }

    /// Determinism: the same input state and deposit always produce the
    /// same outcome.
    #[test]
    fn prop_deterministic(deposit in deposit_amount()) {
        let state = AllocationState::initial();
        let first = allocate(state, deposit).unwrap();
        let second = allocate(state, deposit).unwrap();
        prop_assert_eq!(first, second);
    }

    /// The carry-forward is always strictly below the next week's target
    /// while the challenge is incomplete (otherwise the week would have
    /// been funded).
    #[test]
    fn prop_carry_below_next_target(deposits in deposit_sequence(12)) {
        let mut state = AllocationState::initial();

        for deposit in &deposits {
            let outcome = allocate(state, *deposit).unwrap();
            if outcome.next_week <= FINAL_WEEK {
                prop_assert!(outcome.carry_forward < week_target(outcome.next_week));
            }
            state = outcome.next_state();
        }
    }
}
