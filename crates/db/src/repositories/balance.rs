//! Balance repository: loads a member's ledger state and delegates to the
//! pure balance calculator.
//!
//! Nothing here is cached or stored; every figure is derived from the
//! entries, investments, and pending requests at call time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use akiba_core::investment::Investment;
use akiba_core::ledger::{AccountSummary, BalanceCalculator, ChallengeProgress, LedgerEntry};

use crate::entities::{
    approval_requests, investments, ledger_entries,
    sea_orm_active_enums::RequestStatus,
};

/// Error types for balance reads.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// A stored allocation snapshot could not be deserialized.
    #[error("Corrupt allocation snapshot on entry {entry_id}: {source}")]
    CorruptSnapshot {
        /// The entry whose snapshot failed to parse.
        entry_id: Uuid,
        /// The underlying deserialization error.
        source: serde_json::Error,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BalanceError> for akiba_shared::AppError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::CorruptSnapshot { .. } => Self::Internal(err.to_string()),
            BalanceError::Database(_) => Self::Database(err.to_string()),
        }
    }
}

/// Read-side repository over one member's ledger, investments, and holds.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The full aggregate view of a member account as of a date.
    ///
    /// Maturity transitions are lazy: callers wanting freshly matured
    /// interest reflected should trigger the maturity check first.
    pub async fn account_summary(
        &self,
        member_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<AccountSummary, BalanceError> {
        let entries = self.load_entries(member_id).await?;
        let investments = self.load_investments(member_id).await?;
        let holds = self.pending_holds(member_id).await?;

        Ok(BalanceCalculator::summarize(&entries, &investments, holds, as_of))
    }

    /// A member's progress through the 52-week challenge.
    pub async fn challenge_progress(
        &self,
        member_id: Uuid,
    ) -> Result<ChallengeProgress, BalanceError> {
        let entries = self.load_entries(member_id).await?;
        Ok(BalanceCalculator::challenge_progress(&entries))
    }

    /// Total amount of the member's pending requests (withdrawal,
    /// contribution, and investment alike); these funds are excluded from
    /// availability until decided.
    pub async fn pending_holds(&self, member_id: Uuid) -> Result<Decimal, BalanceError> {
        let pending = approval_requests::Entity::find()
            .filter(approval_requests::Column::MemberId.eq(member_id))
            .filter(approval_requests::Column::Status.eq(RequestStatus::Pending))
            .all(&self.db)
            .await?;

        Ok(pending.iter().map(|request| request.amount).sum())
    }

    async fn load_entries(&self, member_id: Uuid) -> Result<Vec<LedgerEntry>, BalanceError> {
        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::MemberId.eq(member_id))
            .all(&self.db)
            .await?;

        models
            .into_iter()
            .map(|model| {
                let entry_id = model.id;
                LedgerEntry::try_from(model)
                    .map_err(|source| BalanceError::CorruptSnapshot { entry_id, source })
            })
            .collect()
    }

    async fn load_investments(&self, member_id: Uuid) -> Result<Vec<Investment>, BalanceError> {
        let models = investments::Entity::find()
            .filter(investments::Column::MemberId.eq(member_id))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Investment::from).collect())
    }
}
