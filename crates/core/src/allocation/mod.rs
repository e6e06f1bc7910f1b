//! Weekly savings-challenge allocation.
//!
//! This module implements the 52-week challenge allocation:
//! - Week targets (`week * 10_000`)
//! - Whole-week allocation with strict carry-forward (shortfalls are never
//!   split across weeks)
//! - The completion sentinel (week 53) and post-completion surplus
//!
//! The allocator is a pure function: identical inputs always yield identical
//! outputs, so the persistence layer can compute each deposit's snapshot once
//! and store it immutably.

pub mod allocator;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use allocator::{
    allocate, week_target, CHALLENGE_COMPLETE, CHALLENGE_TOTAL_TARGET, FINAL_WEEK, WEEKLY_UNIT,
};
pub use error::AllocationError;
pub use types::{AllocationOutcome, AllocationState, WeekCoverage};
