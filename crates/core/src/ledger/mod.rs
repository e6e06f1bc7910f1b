//! Ledger entry domain types and balance calculation.
//!
//! This module implements the read-side and validation core of the savings
//! ledger:
//! - Ledger entries (deposits, withdrawals, contributions) with their
//!   immutable allocation snapshots
//! - Entry validation (positive amounts, money precision)
//! - Balance calculation: net balance, invested/uninvested split,
//!   prior-year matured total, pending holds, available balance
//! - Challenge progress reporting

pub mod balance;
pub mod entry;
pub mod error;
pub mod validation;

#[cfg(test)]
mod balance_props;

pub use balance::{AccountSummary, BalanceCalculator, ChallengeProgress};
pub use entry::{AllocationSnapshot, EntryKind, LedgerEntry};
pub use error::LedgerError;
pub use validation::validate_new_entry;
