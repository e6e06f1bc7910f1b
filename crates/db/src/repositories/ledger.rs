//! Ledger recorder: the single write path for ledger entries.
//!
//! Deposits are a read-modify-write: the member's latest same-year snapshot
//! feeds the allocator, and the new entry is persisted with its snapshot in
//! one transaction. Concurrent deposits for one member are serialized by a
//! per-member mutex; different members never contend.
//!
//! Withdrawals, contributions, and keyed (interest) deposits are idempotent
//! when an external reference is supplied: a duplicate reference returns
//! `None` instead of double-posting, so approval workflows and sweeps may
//! retry safely.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use akiba_core::allocation::{allocate, AllocationError, AllocationState};
use akiba_core::ledger::validate_new_entry;
use akiba_shared::types::challenge_year_bounds;

use crate::entities::{ledger_entries, members, sea_orm_active_enums::EntryKind};

/// Error types for recorder operations.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    /// Member account not found; accounts are never created implicitly.
    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),

    /// Entry amount failed validation.
    #[error("Invalid entry: {0}")]
    Validation(#[from] akiba_core::ledger::LedgerError),

    /// Allocation snapshot computation failed; nothing was persisted.
    #[error("Allocation failed: {0}")]
    Allocation(#[from] AllocationError),

    /// Snapshot could not be serialized for storage.
    #[error("Snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<RecorderError> for akiba_shared::AppError {
    fn from(err: RecorderError) -> Self {
        match err {
            RecorderError::MemberNotFound(_) => Self::NotFound(err.to_string()),
            RecorderError::Validation(_) | RecorderError::Allocation(_) => {
                Self::Validation(err.to_string())
            }
            RecorderError::Snapshot(_) => Self::Internal(err.to_string()),
            RecorderError::Database(_) => Self::Database(err.to_string()),
        }
    }
}

/// Ledger repository: records entries and reads them back chronologically.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
    /// Per-member write locks; clones share the map so every recorder
    /// instance in the process serializes the same member.
    member_locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            member_locks: Arc::new(DashMap::new()),
        }
    }

    /// Records a member deposit and its allocation snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the member does not exist, the amount is invalid,
    /// or the database write fails. No partial entry is ever persisted.
    pub async fn record_deposit(
        &self,
        member_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
    ) -> Result<ledger_entries::Model, RecorderError> {
        // Without an external ref there is nothing to conflict with.
        self.insert_deposit(member_id, amount, entry_date, None)
            .await?
            .ok_or(RecorderError::Database(DbErr::RecordNotInserted))
    }

    /// Records an interest deposit keyed for idempotency.
    ///
    /// Returns `None` when an entry with the same `(member, external_ref)`
    /// already exists; duplicates are silently skipped, never an error.
    pub async fn record_keyed_deposit(
        &self,
        member_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
        external_ref: &str,
    ) -> Result<Option<ledger_entries::Model>, RecorderError> {
        self.insert_deposit(member_id, amount, entry_date, Some(external_ref.to_string()))
            .await
    }

    /// Records an approved withdrawal.
    ///
    /// When `external_ref` carries the approval request's identity, a second
    /// call with the same reference returns `None` instead of double-posting.
    pub async fn record_withdrawal(
        &self,
        member_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
        external_ref: Option<&str>,
    ) -> Result<Option<ledger_entries::Model>, RecorderError> {
        self.insert_movement(EntryKind::Withdrawal, member_id, amount, entry_date, external_ref)
            .await
    }

    /// Records an approved contribution.
    ///
    /// Same idempotency semantics as [`LedgerRepository::record_withdrawal`].
    pub async fn record_contribution(
        &self,
        member_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
        external_ref: Option<&str>,
    ) -> Result<Option<ledger_entries::Model>, RecorderError> {
        self.insert_movement(EntryKind::Contribution, member_id, amount, entry_date, external_ref)
            .await
    }

    /// All entries for a member in chronological order (entry date, then
    /// creation time for same-day ordering).
    pub async fn entries_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<ledger_entries::Model>, RecorderError> {
        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::MemberId.eq(member_id))
            .order_by_asc(ledger_entries::Column::EntryDate)
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    /// A member's entries dated within one challenge year, chronological.
    pub async fn entries_for_member_in_year(
        &self,
        member_id: Uuid,
        year: i32,
    ) -> Result<Vec<ledger_entries::Model>, RecorderError> {
        let (start, end) = challenge_year_bounds(year);
        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::MemberId.eq(member_id))
            .filter(ledger_entries::Column::EntryDate.gte(start))
            .filter(ledger_entries::Column::EntryDate.lte(end))
            .order_by_asc(ledger_entries::Column::EntryDate)
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    /// Looks up an entry by its idempotency key.
    pub async fn find_by_external_ref(
        &self,
        member_id: Uuid,
        external_ref: &str,
    ) -> Result<Option<ledger_entries::Model>, RecorderError> {
        let entry = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::MemberId.eq(member_id))
            .filter(ledger_entries::Column::ExternalRef.eq(external_ref))
            .one(&self.db)
            .await?;
        Ok(entry)
    }

    /// Deposit write path: read prior snapshot, allocate, persist, as one
    /// atomic unit per member.
    async fn insert_deposit(
        &self,
        member_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
        external_ref: Option<String>,
    ) -> Result<Option<ledger_entries::Model>, RecorderError> {
        validate_new_entry(amount)?;
        self.ensure_member_exists(member_id).await?;

        let lock = self.lock_for_member(member_id);
        let _guard = lock.lock().await;

        let txn = self.db.begin().await?;

        if let Some(ref key) = external_ref {
            let existing = ledger_entries::Entity::find()
                .filter(ledger_entries::Column::MemberId.eq(member_id))
                .filter(ledger_entries::Column::ExternalRef.eq(key.as_str()))
                .one(&txn)
                .await?;
            if existing.is_some() {
                return Ok(None);
            }
        }

        let prior = Self::prior_allocation_state(&txn, member_id, entry_date.year()).await?;
        let outcome = allocate(prior, amount)?;
        let covered_weeks = serde_json::to_value(&outcome.covered_weeks)?;

        let now = Utc::now().into();
        let entry = ledger_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(member_id),
            kind: Set(EntryKind::Deposit),
            amount: Set(amount),
            entry_date: Set(entry_date),
            external_ref: Set(external_ref),
            covered_weeks: Set(covered_weeks),
            carry_forward: Set(outcome.carry_forward),
            cumulative_total: Set(outcome.cumulative_total),
            next_week: Set(i32::try_from(outcome.next_week).unwrap_or(1)),
            created_at: Set(now),
        };

        let inserted = match entry.insert(&txn).await {
            Ok(model) => model,
            // A concurrent process won the unique-key race; not an error.
            Err(err) if is_unique_violation(&err) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        txn.commit().await?;

        tracing::debug!(
            member = %member_id,
            amount = %amount,
            next_week = inserted.next_week,
            "deposit recorded"
        );
        Ok(Some(inserted))
    }

    /// Write path for withdrawals and contributions: no snapshot, no prior
    /// read, just an idempotent insert.
    async fn insert_movement(
        &self,
        kind: EntryKind,
        member_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
        external_ref: Option<&str>,
    ) -> Result<Option<ledger_entries::Model>, RecorderError> {
        validate_new_entry(amount)?;
        self.ensure_member_exists(member_id).await?;

        if let Some(key) = external_ref {
            if self.find_by_external_ref(member_id, key).await?.is_some() {
                return Ok(None);
            }
        }

        let entry = ledger_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(member_id),
            kind: Set(kind),
            amount: Set(amount),
            entry_date: Set(entry_date),
            external_ref: Set(external_ref.map(ToString::to_string)),
            covered_weeks: Set(serde_json::Value::Array(Vec::new())),
            carry_forward: Set(Decimal::ZERO),
            cumulative_total: Set(Decimal::ZERO),
            next_week: Set(1),
            created_at: Set(Utc::now().into()),
        };

        match entry.insert(&self.db).await {
            Ok(model) => Ok(Some(model)),
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Reads the allocation state carried by the member's most recent
    /// deposit within the challenge year; defaults when none exists.
    async fn prior_allocation_state(
        txn: &impl ConnectionTrait,
        member_id: Uuid,
        year: i32,
    ) -> Result<AllocationState, RecorderError> {
        let (start, end) = challenge_year_bounds(year);
        let latest = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::MemberId.eq(member_id))
            .filter(ledger_entries::Column::Kind.eq(EntryKind::Deposit))
            .filter(ledger_entries::Column::EntryDate.gte(start))
            .filter(ledger_entries::Column::EntryDate.lte(end))
            .order_by_desc(ledger_entries::Column::EntryDate)
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .one(txn)
            .await?;

        Ok(latest.map_or_else(AllocationState::initial, |entry| AllocationState {
            carry_forward: entry.carry_forward,
            next_week: u32::try_from(entry.next_week).unwrap_or(1),
        }))
    }

    async fn ensure_member_exists(&self, member_id: Uuid) -> Result<(), RecorderError> {
        members::Entity::find_by_id(member_id)
            .one(&self.db)
            .await?
            .ok_or(RecorderError::MemberNotFound(member_id))?;
        Ok(())
    }

    fn lock_for_member(&self, member_id: Uuid) -> Arc<Mutex<()>> {
        self.member_locks
            .entry(member_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use akiba_shared::AppError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_recorder_errors_map_to_app_errors() {
        let missing = Uuid::new_v4();
        let app: AppError = RecorderError::MemberNotFound(missing).into();
        assert_eq!(app.error_code(), "NOT_FOUND");

        let app: AppError = RecorderError::Validation(
            akiba_core::ledger::LedgerError::NonPositiveAmount(dec!(0)),
        )
        .into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");

        let app: AppError = RecorderError::Allocation(AllocationError::InvalidStartWeek(54)).into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");

        let app: AppError = RecorderError::Database(DbErr::RecordNotInserted).into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");
    }
}
