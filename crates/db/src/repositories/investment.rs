//! Investment repository: creation, maturity checks, and the maturity sweep.
//!
//! The maturity transition posts exactly one interest entry per investment.
//! The posting is keyed `INV-INT-<investment-id>` and happens before the
//! status flip, so a crash between the two converges on the next check
//! instead of double-posting.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use akiba_core::investment::{Investment, InvestmentError, MaturityCheck};
use akiba_shared::types::{InvestmentId, MemberId};

use crate::entities::{investments, sea_orm_active_enums::InvestmentStatus};

use super::ledger::{LedgerRepository, RecorderError};

/// Error types for investment operations.
#[derive(Debug, thiserror::Error)]
pub enum InvestmentRepoError {
    /// Investment not found.
    #[error("Investment not found: {0}")]
    NotFound(Uuid),

    /// Investment terms failed validation.
    #[error("Invalid investment: {0}")]
    Validation(#[from] InvestmentError),

    /// Interest posting failed.
    #[error("Interest posting failed: {0}")]
    Recorder(#[from] RecorderError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<InvestmentRepoError> for akiba_shared::AppError {
    fn from(err: InvestmentRepoError) -> Self {
        match err {
            InvestmentRepoError::NotFound(_) => Self::NotFound(err.to_string()),
            InvestmentRepoError::Validation(_) => Self::Validation(err.to_string()),
            InvestmentRepoError::Recorder(inner) => inner.into(),
            InvestmentRepoError::Database(_) => Self::Database(err.to_string()),
        }
    }
}

/// One investment matured by a sweep.
#[derive(Debug, Clone)]
pub struct MaturedInvestment {
    /// The investment that matured.
    pub investment_id: Uuid,
    /// The owning member.
    pub member_id: Uuid,
    /// Interest posted to the ledger (zero when the rate was zero).
    pub interest: Decimal,
}

/// One investment the sweep failed to process.
#[derive(Debug, Clone)]
pub struct SweepFailure {
    /// The investment that failed.
    pub investment_id: Uuid,
    /// The owning member.
    pub member_id: Uuid,
    /// Why it failed.
    pub error: String,
}

/// Summary of a maturity sweep run.
#[derive(Debug, Clone, Default)]
pub struct MaturitySweepSummary {
    /// Investments examined.
    pub processed: u64,
    /// Investments matured (and posted) by this run.
    pub matured: Vec<MaturedInvestment>,
    /// Investments whose term has not ended yet.
    pub not_yet_due: u64,
    /// Per-investment failures; the sweep continues past them.
    pub failures: Vec<SweepFailure>,
}

/// Investment repository.
#[derive(Debug, Clone)]
pub struct InvestmentRepository {
    db: DatabaseConnection,
    ledger: LedgerRepository,
}

impl InvestmentRepository {
    /// Creates a new investment repository sharing the given recorder.
    #[must_use]
    pub const fn new(db: DatabaseConnection, ledger: LedgerRepository) -> Self {
        Self { db, ledger }
    }

    /// Commits member funds to a new fixed-term investment.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive principal, a rate
    /// outside 0..=100, or a zero-month term; nothing is persisted then.
    pub async fn create_investment(
        &self,
        member_id: Uuid,
        principal: Decimal,
        annual_rate_pct: Decimal,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Result<investments::Model, InvestmentRepoError> {
        self.insert_investment(member_id, principal, annual_rate_pct, term_months, start_date, None)
            .await?
            .ok_or(InvestmentRepoError::Database(DbErr::RecordNotInserted))
    }

    /// Opens an investment on behalf of an approved request.
    ///
    /// Keyed by the request identity: a retried approval returns `None`
    /// instead of opening a second investment.
    pub async fn create_for_request(
        &self,
        member_id: Uuid,
        principal: Decimal,
        annual_rate_pct: Decimal,
        term_months: u32,
        start_date: NaiveDate,
        request_id: Uuid,
    ) -> Result<Option<investments::Model>, InvestmentRepoError> {
        self.insert_investment(
            member_id,
            principal,
            annual_rate_pct,
            term_months,
            start_date,
            Some(request_id),
        )
        .await
    }

    /// Gets an investment by ID.
    pub async fn get_investment(
        &self,
        investment_id: Uuid,
    ) -> Result<investments::Model, InvestmentRepoError> {
        investments::Entity::find_by_id(investment_id)
            .one(&self.db)
            .await?
            .ok_or(InvestmentRepoError::NotFound(investment_id))
    }

    /// Lists a member's investments, newest first.
    pub async fn list_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<investments::Model>, InvestmentRepoError> {
        use sea_orm::QueryOrder;
        Ok(investments::Entity::find()
            .filter(investments::Column::MemberId.eq(member_id))
            .order_by_desc(investments::Column::StartDate)
            .all(&self.db)
            .await?)
    }

    /// Checks one investment for maturity, transitioning and posting its
    /// interest when due.
    ///
    /// Returns the interest ledger entry when this call posted one; `None`
    /// when the investment is not yet due, was already matured and posted,
    /// or earned zero interest. Re-checking is never an error.
    pub async fn check_maturity(
        &self,
        investment_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Option<crate::entities::ledger_entries::Model>, InvestmentRepoError> {
        let model = self.get_investment(investment_id).await?;
        self.mature_and_post(model, as_of).await
    }

    /// Sweeps every investment with unposted interest, maturing those whose
    /// term has ended. Per-investment failures are collected and logged;
    /// one bad investment never halts the sweep. `dry_run` reports what
    /// would mature without changing anything.
    pub async fn sweep_maturities(
        &self,
        as_of: NaiveDate,
        dry_run: bool,
    ) -> Result<MaturitySweepSummary, InvestmentRepoError> {
        let candidates = investments::Entity::find()
            .filter(investments::Column::InterestPosted.eq(false))
            .all(&self.db)
            .await?;

        let mut summary = MaturitySweepSummary::default();
        for model in candidates {
            summary.processed += 1;
            let investment_id = model.id;
            let member_id = model.member_id;
            let investment = Investment::from(model.clone());

            if !investment.is_due(as_of) {
                summary.not_yet_due += 1;
                continue;
            }

            let matured = MaturedInvestment {
                investment_id,
                member_id,
                interest: investment.total_interest_expected(),
            };
            if dry_run {
                summary.matured.push(matured);
                continue;
            }

            match self.mature_and_post(model, as_of).await {
                Ok(_) => summary.matured.push(matured),
                Err(err) => {
                    tracing::warn!(
                        investment = %investment_id,
                        member = %member_id,
                        error = %err,
                        "maturity sweep failed for investment"
                    );
                    summary.failures.push(SweepFailure {
                        investment_id,
                        member_id,
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(summary)
    }

    /// Matures a due investment: post interest first (idempotent), then flip
    /// status and the posted flag.
    async fn mature_and_post(
        &self,
        model: investments::Model,
        as_of: NaiveDate,
    ) -> Result<Option<crate::entities::ledger_entries::Model>, InvestmentRepoError> {
        let mut investment = Investment::from(model.clone());

        let interest = match investment.check_maturity(as_of) {
            MaturityCheck::NotYetMature => return Ok(None),
            MaturityCheck::AlreadyMatured if model.interest_posted => return Ok(None),
            // Matured now, or matured earlier with the posting still owed.
            MaturityCheck::AlreadyMatured => investment.total_interest_expected(),
            MaturityCheck::Matured { interest } => interest,
        };

        let posted = if interest > Decimal::ZERO {
            self.ledger
                .record_keyed_deposit(
                    model.member_id,
                    interest,
                    investment.maturity_date(),
                    &interest_ref(investment.id),
                )
                .await?
        } else {
            // Zero-rate terms mature without a ledger posting.
            None
        };

        let mut active: investments::ActiveModel = model.into();
        active.status = Set(InvestmentStatus::Matured);
        active.interest_posted = Set(true);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        if let Some(entry) = &posted {
            tracing::info!(
                investment = %investment.id,
                member = %investment.member_id,
                interest = %entry.amount,
                "investment matured, interest posted"
            );
        }
        Ok(posted)
    }

    async fn insert_investment(
        &self,
        member_id: Uuid,
        principal: Decimal,
        annual_rate_pct: Decimal,
        term_months: u32,
        start_date: NaiveDate,
        request_id: Option<Uuid>,
    ) -> Result<Option<investments::Model>, InvestmentRepoError> {
        // Validate terms through the domain type before touching the database.
        let investment = Investment::new(
            InvestmentId::new(),
            MemberId::from_uuid(member_id),
            principal,
            annual_rate_pct,
            term_months,
            start_date,
        )?;

        let now = Utc::now().into();
        let active = investments::ActiveModel {
            id: Set(investment.id.into_inner()),
            member_id: Set(member_id),
            principal: Set(principal),
            annual_rate_pct: Set(annual_rate_pct),
            term_months: Set(i32::try_from(term_months).unwrap_or(1)),
            start_date: Set(start_date),
            status: Set(InvestmentStatus::Fixed),
            interest_posted: Set(false),
            request_id: Set(request_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match active.insert(&self.db).await {
            Ok(model) => Ok(Some(model)),
            // Same request approved twice; the first insert stands.
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Idempotency key for an investment's single interest posting.
#[must_use]
pub fn interest_ref(investment_id: InvestmentId) -> String {
    format!("INV-INT-{investment_id}")
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
