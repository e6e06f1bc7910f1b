//! Property-based tests for balance calculation.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use akiba_shared::types::{LedgerEntryId, MemberId};

use super::balance::BalanceCalculator;
use super::entry::{AllocationSnapshot, EntryKind, LedgerEntry};

/// Strategy for monetary amounts in whole cents (0.01 to 100,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for an entry kind.
fn entry_kind() -> impl Strategy<Value = EntryKind> {
    prop_oneof![
        Just(EntryKind::Deposit),
        Just(EntryKind::Withdrawal),
        Just(EntryKind::Contribution),
    ]
}

/// Strategy for an entry date across three challenge years.
fn entry_date() -> impl Strategy<Value = NaiveDate> {
    (2024i32..=2026, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn ledger_entry() -> impl Strategy<Value = LedgerEntry> {
    (entry_kind(), amount(), entry_date()).prop_map(|(kind, amount, date)| LedgerEntry {
        id: LedgerEntryId::new(),
        member_id: MemberId::new(),
        kind,
        amount,
        entry_date: date,
        external_ref: None,
        allocation: AllocationSnapshot::empty(),
        created_at: Utc::now(),
    })
}

fn entries() -> impl Strategy<Value = Vec<LedgerEntry>> {
    prop::collection::vec(ledger_entry(), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    /// Available balance stays within its bounds for any history and any
    /// hold total: 0 <= available <= prior-year matured total.
    #[test]
    fn prop_available_balance_bounds(
        entries in entries(),
        holds in amount(),
        as_of in entry_date(),
    ) {
        let summary = BalanceCalculator::summarize(&entries, &[], holds, as_of);

        prop_assert!(summary.available_balance >= Decimal::ZERO);
        prop_assert!(summary.available_balance <= summary.prior_year_matured_total);
    }

    /// The prior-year matured total is never negative.
    #[test]
    fn prop_matured_total_non_negative(entries in entries(), as_of in entry_date()) {
        prop_assert!(
            BalanceCalculator::prior_year_matured_total(&entries, as_of) >= Decimal::ZERO
        );
    }

    /// Net balance decomposes exactly into the three per-kind sums.
    #[test]
    fn prop_net_balance_decomposition(entries in entries(), as_of in entry_date()) {
        let summary = BalanceCalculator::summarize(&entries, &[], Decimal::ZERO, as_of);

        prop_assert_eq!(
            summary.net_ledger_balance,
            summary.gross_deposits - summary.total_withdrawals - summary.total_contributions
        );
    }

    /// Uninvested balance is never negative.
    #[test]
    fn prop_uninvested_non_negative(entries in entries(), as_of in entry_date()) {
        let summary = BalanceCalculator::summarize(&entries, &[], Decimal::ZERO, as_of);
        prop_assert!(summary.uninvested_balance >= Decimal::ZERO);
    }

    /// Raising holds can only lower availability, and never below zero.
    #[test]
    fn prop_holds_monotone(
        entries in entries(),
        holds in amount(),
        extra in amount(),
        as_of in entry_date(),
    ) {
        let base = BalanceCalculator::summarize(&entries, &[], holds, as_of);
        let more = BalanceCalculator::summarize(&entries, &[], holds + extra, as_of);

        prop_assert!(more.available_balance <= base.available_balance);
        prop_assert!(more.available_balance >= Decimal::ZERO);
    }
}
