//! Account balance calculation.
//!
//! Everything here is derived on demand from ledger entries and investment
//! state; nothing is stored, so the figures can never go stale. The results
//! are order-independent over the entry slice.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use akiba_shared::types::round_money;

use crate::allocation::CHALLENGE_TOTAL_TARGET;
use crate::interest::{annual_uninvested_interest, has_cutover_passed};
use crate::investment::{Investment, InvestmentStatus};

use super::entry::{EntryKind, LedgerEntry};

/// The aggregate view of one member account at a point in time.
///
/// Recomputed on demand; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Sum of all deposit amounts.
    pub gross_deposits: Decimal,
    /// Sum of all withdrawal amounts.
    pub total_withdrawals: Decimal,
    /// Sum of all contribution amounts.
    pub total_contributions: Decimal,
    /// Deposits minus withdrawals minus contributions.
    pub net_ledger_balance: Decimal,
    /// Principal currently locked in fixed-term investments.
    pub total_invested: Decimal,
    /// Net balance not locked in investments (floored at zero).
    pub uninvested_balance: Decimal,
    /// Unposted linear interest estimate across fixed investments.
    /// Display-only; never written to the ledger.
    pub accrued_interest_estimate: Decimal,
    /// Net balance plus unrealized interest estimates, plus the annual
    /// uninvested-interest projection once the cutover date has passed.
    /// Realized interest is already inside `net_ledger_balance` via its
    /// ledger entries.
    pub total_savings: Decimal,
    /// Prior challenge year's deposits net of all withdrawals and
    /// contributions; the only funds eligible for withdrawal.
    pub prior_year_matured_total: Decimal,
    /// Total amount of pending (not yet approved) requests.
    pub pending_holds: Decimal,
    /// Funds available for new withdrawal/contribution requests.
    pub available_balance: Decimal,
}

/// Member progress through the 52-week challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    /// Total deposited so far.
    pub total_saved: Decimal,
    /// Target for the full challenge (13,780,000).
    pub total_target: Decimal,
    /// Saved-vs-target percentage, capped at 100.
    pub progress_percent: Decimal,
    /// Distinct weeks fully covered, in ascending order.
    pub covered_weeks: Vec<u32>,
    /// Number of distinct weeks fully covered.
    pub weeks_completed: usize,
}

/// Pure read-side aggregation over a member's entries and investments.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Computes the full aggregate view for one member account.
    ///
    /// `pending_holds` is the summed amount of the member's pending
    /// withdrawal, contribution, and investment requests; holds are always
    /// subtracted before reporting availability so two concurrent requests
    /// can never both claim the same funds.
    #[must_use]
    pub fn summarize(
        entries: &[LedgerEntry],
        investments: &[Investment],
        pending_holds: Decimal,
        as_of: NaiveDate,
    ) -> AccountSummary {
        let gross_deposits = Self::sum_kind(entries, EntryKind::Deposit);
        let total_withdrawals = Self::sum_kind(entries, EntryKind::Withdrawal);
        let total_contributions = Self::sum_kind(entries, EntryKind::Contribution);
        let net_ledger_balance = gross_deposits - total_withdrawals - total_contributions;

        let total_invested: Decimal = investments
            .iter()
            .filter(|inv| inv.status == InvestmentStatus::Fixed)
            .map(|inv| inv.principal)
            .sum();
        let uninvested_balance = (net_ledger_balance - total_invested).max(Decimal::ZERO);

        let accrued_interest_estimate: Decimal = investments
            .iter()
            .filter(|inv| inv.status == InvestmentStatus::Fixed)
            .map(|inv| inv.interest_accrued(as_of))
            .sum();

        let mut total_savings = net_ledger_balance + accrued_interest_estimate;
        if has_cutover_passed(as_of) {
            total_savings += annual_uninvested_interest(uninvested_balance);
        }

        let prior_year_matured_total = Self::prior_year_matured_total(entries, as_of);
        let available_balance = (prior_year_matured_total - pending_holds).max(Decimal::ZERO);

        AccountSummary {
            gross_deposits,
            total_withdrawals,
            total_contributions,
            net_ledger_balance,
            total_invested,
            uninvested_balance,
            accrued_interest_estimate,
            total_savings,
            prior_year_matured_total,
            pending_holds,
            available_balance,
        }
    }

    /// Net ledger balance: deposits minus withdrawals minus contributions.
    #[must_use]
    pub fn net_ledger_balance(entries: &[LedgerEntry]) -> Decimal {
        entries.iter().map(LedgerEntry::signed_amount).sum()
    }

    /// Funds that matured out of the prior challenge year.
    ///
    /// Deposits dated in the prior challenge year (which include any
    /// interest posted for that year, since interest lands as deposit
    /// entries dated inside it), net of all withdrawals and contributions
    /// regardless of year. Current-year deposits stay locked until the
    /// year-end collapse. Floored at zero.
    #[must_use]
    pub fn prior_year_matured_total(entries: &[LedgerEntry], as_of: NaiveDate) -> Decimal {
        let prior_year = as_of.year() - 1;
        let prior_year_deposits: Decimal = entries
            .iter()
            .filter(|e| e.kind == EntryKind::Deposit && e.in_challenge_year(prior_year))
            .map(|e| e.amount)
            .sum();
        let outflows: Decimal = entries
            .iter()
            .filter(|e| e.kind != EntryKind::Deposit)
            .map(|e| e.amount)
            .sum();

        (prior_year_deposits - outflows).max(Decimal::ZERO)
    }

    /// Progress through the 52-week challenge, unioned across all deposit
    /// snapshots.
    #[must_use]
    pub fn challenge_progress(entries: &[LedgerEntry]) -> ChallengeProgress {
        let total_saved = Self::sum_kind(entries, EntryKind::Deposit);
        let total_target = Decimal::from(CHALLENGE_TOTAL_TARGET);

        let covered: BTreeSet<u32> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::Deposit)
            .flat_map(|e| e.allocation.covered_weeks.iter())
            .filter(|c| c.fully_covered)
            .map(|c| c.week)
            .collect();

        let progress_percent =
            round_money(total_saved / total_target * Decimal::ONE_HUNDRED).min(Decimal::ONE_HUNDRED);

        ChallengeProgress {
            total_saved,
            total_target,
            progress_percent,
            weeks_completed: covered.len(),
            covered_weeks: covered.into_iter().collect(),
        }
    }

    fn sum_kind(entries: &[LedgerEntry], kind: EntryKind) -> Decimal {
        entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use akiba_shared::types::{InvestmentId, LedgerEntryId, MemberId};

    use crate::allocation::{allocate, AllocationState};
    use crate::ledger::entry::AllocationSnapshot;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn entry(kind: EntryKind, amount: Decimal, date: NaiveDate) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            member_id: MemberId::new(),
            kind,
            amount,
            entry_date: date,
            external_ref: None,
            allocation: AllocationSnapshot::empty(),
            created_at: Utc::now(),
        }
    }

    fn deposit_with_snapshot(amount: Decimal, date: NaiveDate, prior: AllocationState) -> LedgerEntry {
        let mut e = entry(EntryKind::Deposit, amount, date);
        e.allocation = allocate(prior, amount).unwrap().into();
        e
    }

    fn fixed_investment(principal: Decimal, start: NaiveDate) -> Investment {
        Investment::new(
            InvestmentId::new(),
            MemberId::new(),
            principal,
            dec!(30),
            8,
            start,
        )
        .unwrap()
    }

    #[test]
    fn test_net_ledger_balance() {
        let entries = vec![
            entry(EntryKind::Deposit, dec!(100000), d(2025, 2, 1)),
            entry(EntryKind::Withdrawal, dec!(30000), d(2025, 3, 1)),
            entry(EntryKind::Contribution, dec!(20000), d(2025, 4, 1)),
        ];
        assert_eq!(BalanceCalculator::net_ledger_balance(&entries), dec!(50000));
    }

    #[test]
    fn test_summarize_invested_split() {
        let entries = vec![entry(EntryKind::Deposit, dec!(500000), d(2025, 2, 1))];
        let investments = vec![fixed_investment(dec!(200000), d(2025, 3, 1))];

        let summary =
            BalanceCalculator::summarize(&entries, &investments, dec!(0), d(2025, 3, 1));

        assert_eq!(summary.net_ledger_balance, dec!(500000));
        assert_eq!(summary.total_invested, dec!(200000));
        assert_eq!(summary.uninvested_balance, dec!(300000));
    }

    #[test]
    fn test_uninvested_floors_at_zero() {
        // Over-invested relative to the ledger (withdrawals since investing).
        let entries = vec![
            entry(EntryKind::Deposit, dec!(100000), d(2025, 2, 1)),
            entry(EntryKind::Withdrawal, dec!(50000), d(2025, 3, 1)),
        ];
        let investments = vec![fixed_investment(dec!(80000), d(2025, 2, 15))];

        let summary =
            BalanceCalculator::summarize(&entries, &investments, dec!(0), d(2025, 3, 1));

        assert_eq!(summary.uninvested_balance, dec!(0));
    }

    #[test]
    fn test_matured_investment_excluded_from_invested() {
        let entries = vec![entry(EntryKind::Deposit, dec!(500000), d(2024, 2, 1))];
        let mut inv = fixed_investment(dec!(200000), d(2024, 3, 1));
        // 8-month term matured 2024-11-01.
        let _ = inv.check_maturity(d(2025, 1, 10));
        assert_eq!(inv.status, InvestmentStatus::Matured);

        let summary = BalanceCalculator::summarize(&entries, &[inv], dec!(0), d(2025, 1, 10));

        assert_eq!(summary.total_invested, dec!(0));
        assert_eq!(summary.uninvested_balance, dec!(500000));
        assert_eq!(summary.accrued_interest_estimate, dec!(0));
    }

    #[test]
    fn test_total_savings_adds_cutover_interest_only_after_cutover() {
        let entries = vec![entry(EntryKind::Deposit, dec!(100000), d(2025, 2, 1))];

        let before = BalanceCalculator::summarize(&entries, &[], dec!(0), d(2025, 12, 30));
        assert_eq!(before.total_savings, dec!(100000));

        let at_cutover = BalanceCalculator::summarize(&entries, &[], dec!(0), d(2025, 12, 31));
        // 100,000 + 15% of uninvested 100,000.
        assert_eq!(at_cutover.total_savings, dec!(115000.00));
    }

    #[test]
    fn test_prior_year_matured_total() {
        let entries = vec![
            entry(EntryKind::Deposit, dec!(300000), d(2024, 6, 1)),
            entry(EntryKind::Deposit, dec!(500000), d(2025, 2, 1)), // current year, locked
            entry(EntryKind::Withdrawal, dec!(50000), d(2025, 3, 1)),
            entry(EntryKind::Contribution, dec!(25000), d(2024, 9, 1)),
        ];

        let matured = BalanceCalculator::prior_year_matured_total(&entries, d(2025, 6, 1));

        // 300,000 prior-year deposits - 50,000 - 25,000 outflows (any year).
        assert_eq!(matured, dec!(225000));
    }

    #[test]
    fn test_prior_year_matured_total_floors_at_zero() {
        let entries = vec![
            entry(EntryKind::Deposit, dec!(10000), d(2024, 6, 1)),
            entry(EntryKind::Withdrawal, dec!(50000), d(2025, 3, 1)),
        ];
        assert_eq!(
            BalanceCalculator::prior_year_matured_total(&entries, d(2025, 6, 1)),
            dec!(0)
        );
    }

    #[test]
    fn test_available_balance_subtracts_holds() {
        let entries = vec![entry(EntryKind::Deposit, dec!(300000), d(2024, 6, 1))];

        let summary = BalanceCalculator::summarize(&entries, &[], dec!(120000), d(2025, 6, 1));

        assert_eq!(summary.prior_year_matured_total, dec!(300000));
        assert_eq!(summary.available_balance, dec!(180000));
    }

    #[test]
    fn test_available_balance_never_negative() {
        let entries = vec![entry(EntryKind::Deposit, dec!(100000), d(2024, 6, 1))];

        let summary = BalanceCalculator::summarize(&entries, &[], dec!(500000), d(2025, 6, 1));

        assert_eq!(summary.available_balance, dec!(0));
    }

    #[test]
    fn test_challenge_progress_unions_snapshots() {
        let first = deposit_with_snapshot(dec!(10000), d(2025, 1, 6), AllocationState::initial());
        let second = deposit_with_snapshot(
            dec!(25000),
            d(2025, 1, 13),
            AllocationState {
                carry_forward: first.allocation.carry_forward,
                next_week: first.allocation.next_week,
            },
        );

        let progress = BalanceCalculator::challenge_progress(&[first, second]);

        assert_eq!(progress.total_saved, dec!(35000));
        assert_eq!(progress.covered_weeks, vec![1, 2]);
        assert_eq!(progress.weeks_completed, 2);
        // 35,000 / 13,780,000 = 0.25%
        assert_eq!(progress.progress_percent, dec!(0.25));
    }

    #[test]
    fn test_challenge_progress_percent_caps_at_100() {
        let entries = vec![entry(EntryKind::Deposit, dec!(20000000), d(2025, 2, 1))];
        let progress = BalanceCalculator::challenge_progress(&entries);
        assert_eq!(progress.progress_percent, dec!(100));
    }
}
