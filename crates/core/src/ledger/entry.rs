//! Ledger entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use akiba_shared::types::{LedgerEntryId, MemberId};

use crate::allocation::{AllocationOutcome, WeekCoverage};

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money paid into the member's savings.
    Deposit,
    /// An approved withdrawal leaving the member's savings.
    Withdrawal,
    /// An approved contribution (e.g. a group levy) leaving the savings.
    Contribution,
}

/// The allocation snapshot computed once when a deposit is recorded.
///
/// Withdrawals and contributions do not participate in challenge-progress
/// accounting and carry an empty snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSnapshot {
    /// Weeks fully covered by this deposit.
    pub covered_weeks: Vec<WeekCoverage>,
    /// Carry-forward remaining after this deposit.
    pub carry_forward: Decimal,
    /// Total funds available during this allocation round.
    pub cumulative_total: Decimal,
    /// First week still needing funding after this deposit (53 = complete).
    pub next_week: u32,
}

impl AllocationSnapshot {
    /// The empty snapshot carried by non-deposit entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            covered_weeks: Vec::new(),
            carry_forward: Decimal::ZERO,
            cumulative_total: Decimal::ZERO,
            next_week: 1,
        }
    }
}

impl From<AllocationOutcome> for AllocationSnapshot {
    fn from(outcome: AllocationOutcome) -> Self {
        Self {
            covered_weeks: outcome.covered_weeks,
            carry_forward: outcome.carry_forward,
            cumulative_total: outcome.cumulative_total,
            next_week: outcome.next_week,
        }
    }
}

/// An immutable record of a single money movement against one member account.
///
/// Entries are created once and never updated; the allocation snapshot is
/// computed at creation time from the member's prior entries and never
/// recomputed retroactively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// The member account this entry belongs to.
    pub member_id: MemberId,
    /// Whether this is a deposit, withdrawal, or contribution.
    pub kind: EntryKind,
    /// Amount moved; always positive, direction comes from `kind`.
    pub amount: Decimal,
    /// Calendar date of the movement.
    pub entry_date: NaiveDate,
    /// Identity of the external approval request (or interest posting key)
    /// that produced this entry; used for idempotent posting.
    pub external_ref: Option<String>,
    /// The deposit's allocation snapshot; empty for non-deposits.
    pub allocation: AllocationSnapshot,
    /// Creation timestamp; used only for same-day tie-breaking order.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the signed amount (positive for deposits, negative for
    /// withdrawals and contributions).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            EntryKind::Deposit => self.amount,
            EntryKind::Withdrawal | EntryKind::Contribution => -self.amount,
        }
    }

    /// True if this entry is dated inside the given challenge year.
    #[must_use]
    pub fn in_challenge_year(&self, year: i32) -> bool {
        let (start, end) = akiba_shared::types::challenge_year_bounds(year);
        self.entry_date >= start && self.entry_date <= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(kind: EntryKind, amount: Decimal) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            member_id: MemberId::new(),
            kind,
            amount,
            entry_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            external_ref: None,
            allocation: AllocationSnapshot::empty(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_signed_amount_by_kind() {
        assert_eq!(entry(EntryKind::Deposit, dec!(100)).signed_amount(), dec!(100));
        assert_eq!(
            entry(EntryKind::Withdrawal, dec!(100)).signed_amount(),
            dec!(-100)
        );
        assert_eq!(
            entry(EntryKind::Contribution, dec!(40)).signed_amount(),
            dec!(-40)
        );
    }

    #[test]
    fn test_in_challenge_year_uses_entry_date() {
        let e = entry(EntryKind::Deposit, dec!(100));
        assert!(e.in_challenge_year(2025));
        assert!(!e.in_challenge_year(2024));
        assert!(!e.in_challenge_year(2026));
    }

    #[test]
    fn test_snapshot_from_allocation_outcome() {
        let outcome = crate::allocation::allocate(
            crate::allocation::AllocationState::initial(),
            dec!(25000),
        )
        .unwrap();
        let snapshot = AllocationSnapshot::from(outcome.clone());

        assert_eq!(snapshot.covered_weeks, outcome.covered_weeks);
        assert_eq!(snapshot.carry_forward, dec!(15000));
        assert_eq!(snapshot.next_week, 2);
    }
}
