//! Annual uninvested-interest accrual batch.
//!
//! Once per challenge year, every member's uninvested balance earns a flat
//! 15%, posted as a single deposit dated at the cutover (Dec 31) and keyed
//! `UNINV-INT-<year>` per member. The batch is resumable: already-posted
//! members are skipped, and one member's failure never halts the rest of
//! the cohort.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use akiba_core::interest::annual_uninvested_interest;
use akiba_shared::types::{add_months, cutover_date};

use crate::entities::{
    investments, ledger_entries, members,
    sea_orm_active_enums::EntryKind,
};

use super::ledger::LedgerRepository;

/// Error types for the accrual batch itself (per-member failures are
/// collected in the summary instead).
#[derive(Debug, thiserror::Error)]
pub enum AccrualError {
    /// Database error while setting up the batch.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccrualError> for akiba_shared::AppError {
    fn from(err: AccrualError) -> Self {
        match err {
            AccrualError::Database(_) => Self::Database(err.to_string()),
        }
    }
}

/// One interest posting made (or previewed) by the batch.
#[derive(Debug, Clone)]
pub struct AccrualPosting {
    /// The member credited.
    pub member_id: Uuid,
    /// The interest amount.
    pub amount: Decimal,
}

/// One member the batch failed to process.
#[derive(Debug, Clone)]
pub struct AccrualFailure {
    /// The member that failed.
    pub member_id: Uuid,
    /// Why it failed.
    pub error: String,
}

/// Summary of one accrual batch run.
#[derive(Debug, Clone)]
pub struct AccrualRunSummary {
    /// The challenge year processed.
    pub year: i32,
    /// Whether this was a preview only.
    pub dry_run: bool,
    /// Postings made, or that would be made under `dry_run`.
    pub posted: Vec<AccrualPosting>,
    /// Members skipped because their interest for this year already exists.
    pub skipped_existing: u64,
    /// Members whose uninvested balance earned nothing.
    pub zero_interest: u64,
    /// Per-member failures; the batch continued past them.
    pub failures: Vec<AccrualFailure>,
}

/// Annual accrual batch repository.
#[derive(Debug, Clone)]
pub struct AccrualRepository {
    db: DatabaseConnection,
    ledger: LedgerRepository,
}

impl AccrualRepository {
    /// Creates a new accrual repository sharing the given recorder.
    #[must_use]
    pub const fn new(db: DatabaseConnection, ledger: LedgerRepository) -> Self {
        Self { db, ledger }
    }

    /// Runs the annual accrual for every member.
    ///
    /// `dry_run` computes and reports without persisting anything.
    /// Re-running a year is idempotent: members already credited are
    /// skipped, so an interrupted batch can simply be restarted.
    ///
    /// # Errors
    ///
    /// Returns an error only when the batch itself cannot run (e.g. the
    /// member list cannot be loaded); per-member failures are collected in
    /// the summary.
    pub async fn run(&self, year: i32, dry_run: bool) -> Result<AccrualRunSummary, AccrualError> {
        let cutover = cutover_date(year);
        let external_ref = year_ref(year);

        let member_ids: Vec<Uuid> = members::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|member| member.id)
            .collect();

        tracing::info!(year, dry_run, members = member_ids.len(), "annual accrual started");

        let mut summary = AccrualRunSummary {
            year,
            dry_run,
            posted: Vec::new(),
            skipped_existing: 0,
            zero_interest: 0,
            failures: Vec::new(),
        };

        for member_id in member_ids {
            match self
                .accrue_member(member_id, cutover, &external_ref, dry_run)
                .await
            {
                Ok(MemberAccrual::Posted(amount)) => {
                    summary.posted.push(AccrualPosting { member_id, amount });
                }
                Ok(MemberAccrual::AlreadyCredited) => summary.skipped_existing += 1,
                Ok(MemberAccrual::NothingEarned) => summary.zero_interest += 1,
                Err(err) => {
                    tracing::warn!(
                        member = %member_id,
                        year,
                        error = %err,
                        "annual accrual failed for member"
                    );
                    summary.failures.push(AccrualFailure {
                        member_id,
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            year,
            dry_run,
            posted = summary.posted.len(),
            skipped = summary.skipped_existing,
            zero = summary.zero_interest,
            failed = summary.failures.len(),
            "annual accrual finished"
        );
        Ok(summary)
    }

    /// Processes one member; isolated so a failure maps to one summary row.
    async fn accrue_member(
        &self,
        member_id: Uuid,
        cutover: NaiveDate,
        external_ref: &str,
        dry_run: bool,
    ) -> Result<MemberAccrual, super::ledger::RecorderError> {
        if self
            .ledger
            .find_by_external_ref(member_id, external_ref)
            .await?
            .is_some()
        {
            return Ok(MemberAccrual::AlreadyCredited);
        }

        let uninvested = self.uninvested_balance_as_of(member_id, cutover).await?;
        let interest = annual_uninvested_interest(uninvested);
        if interest <= Decimal::ZERO {
            return Ok(MemberAccrual::NothingEarned);
        }

        if dry_run {
            return Ok(MemberAccrual::Posted(interest));
        }

        match self
            .ledger
            .record_keyed_deposit(member_id, interest, cutover, external_ref)
            .await?
        {
            Some(entry) => Ok(MemberAccrual::Posted(entry.amount)),
            // Lost a race with a concurrent run; the other posting stands.
            None => Ok(MemberAccrual::AlreadyCredited),
        }
    }

    /// Net ledger balance minus principal still fixed, as of a date.
    async fn uninvested_balance_as_of(
        &self,
        member_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Decimal, DbErr> {
        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::MemberId.eq(member_id))
            .filter(ledger_entries::Column::EntryDate.lte(as_of))
            .all(&self.db)
            .await?;

        let net: Decimal = entries
            .iter()
            .map(|entry| match entry.kind {
                EntryKind::Deposit => entry.amount,
                EntryKind::Withdrawal | EntryKind::Contribution => -entry.amount,
            })
            .sum();

        // An investment counts as fixed on `as_of` when it had started and
        // not yet reached maturity by then.
        let invested: Decimal = investments::Entity::find()
            .filter(investments::Column::MemberId.eq(member_id))
            .filter(investments::Column::StartDate.lte(as_of))
            .all(&self.db)
            .await?
            .into_iter()
            .filter(|inv| {
                add_months(inv.start_date, u32::try_from(inv.term_months).unwrap_or(1)) > as_of
            })
            .map(|inv| inv.principal)
            .sum();

        Ok((net - invested).max(Decimal::ZERO))
    }
}

/// Idempotency key for a year's uninvested-interest posting.
#[must_use]
pub fn year_ref(year: i32) -> String {
    format!("UNINV-INT-{year}")
}

enum MemberAccrual {
    Posted(Decimal),
    AlreadyCredited,
    NothingEarned,
}
