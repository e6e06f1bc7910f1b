//! Approval request lifecycle.
//!
//! Pending requests hold funds against availability; approving a withdrawal
//! or contribution posts the ledger entry directly (with the request's
//! identity as the idempotency key), and approving an investment request
//! opens the investment keyed by the same identity. All side effects are
//! explicit calls; nothing happens inside a hidden save hook.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use uuid::Uuid;

use akiba_core::ledger::validate_new_entry;

use crate::entities::{
    approval_requests, investments, ledger_entries,
    sea_orm_active_enums::{RequestKind, RequestStatus},
};

use super::balance::{BalanceError, BalanceRepository};
use super::investment::{InvestmentRepoError, InvestmentRepository};
use super::ledger::{LedgerRepository, RecorderError};

/// Error types for approval operations.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// Request not found.
    #[error("Approval request not found: {0}")]
    NotFound(Uuid),

    /// The request would draw more than the member has available.
    #[error("Requested {requested} exceeds available balance {available}")]
    InsufficientAvailable {
        /// Amount requested.
        requested: Decimal,
        /// Funds currently available (net of other holds).
        available: Decimal,
    },

    /// An investment request is missing its rate or term.
    #[error("Investment request {0} is missing its rate or term")]
    MissingInvestmentTerms(Uuid),

    /// Request amount failed validation.
    #[error("Invalid request: {0}")]
    Validation(#[from] akiba_core::ledger::LedgerError),

    /// Investment terms failed validation, or the investment write failed.
    #[error("Investment error: {0}")]
    Investment(#[from] InvestmentRepoError),

    /// Ledger posting failed.
    #[error("Ledger posting failed: {0}")]
    Recorder(#[from] RecorderError),

    /// Balance computation failed.
    #[error("Balance computation failed: {0}")]
    Balance(#[from] BalanceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ApprovalError> for akiba_shared::AppError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::NotFound(_) => Self::NotFound(err.to_string()),
            ApprovalError::InsufficientAvailable { .. } => Self::BusinessRule(err.to_string()),
            ApprovalError::MissingInvestmentTerms(_) | ApprovalError::Validation(_) => {
                Self::Validation(err.to_string())
            }
            ApprovalError::Investment(inner) => inner.into(),
            ApprovalError::Recorder(inner) => inner.into(),
            ApprovalError::Balance(inner) => inner.into(),
            ApprovalError::Database(_) => Self::Database(err.to_string()),
        }
    }
}

/// What an approval call did.
#[derive(Debug, Clone)]
pub enum ApprovalOutcome {
    /// The request had already been decided; nothing changed.
    AlreadyDecided,
    /// A withdrawal or contribution entry was posted (or recovered from an
    /// earlier interrupted approval).
    Posted(ledger_entries::Model),
    /// An investment was opened (or recovered from an earlier interrupted
    /// approval).
    InvestmentOpened(investments::Model),
}

/// Approval request repository.
#[derive(Debug, Clone)]
pub struct ApprovalRepository {
    db: DatabaseConnection,
    ledger: LedgerRepository,
    investments: InvestmentRepository,
    balances: BalanceRepository,
}

impl ApprovalRepository {
    /// Creates a new approval repository sharing the given recorder.
    #[must_use]
    pub fn new(db: DatabaseConnection, ledger: LedgerRepository) -> Self {
        Self {
            investments: InvestmentRepository::new(db.clone(), ledger.clone()),
            balances: BalanceRepository::new(db.clone()),
            ledger,
            db,
        }
    }

    /// Submits a withdrawal request, holding the amount.
    ///
    /// # Errors
    ///
    /// Refuses amounts exceeding the member's current available balance,
    /// which already excludes every other pending hold, so two requests can
    /// never both claim the same funds.
    pub async fn request_withdrawal(
        &self,
        member_id: Uuid,
        amount: Decimal,
        as_of: NaiveDate,
    ) -> Result<approval_requests::Model, ApprovalError> {
        validate_new_entry(amount)?;
        self.ensure_available(member_id, amount, as_of).await?;
        self.insert_request(member_id, RequestKind::Withdrawal, amount, None, None)
            .await
    }

    /// Submits a contribution request, holding the amount.
    ///
    /// Same availability rules as [`ApprovalRepository::request_withdrawal`].
    pub async fn request_contribution(
        &self,
        member_id: Uuid,
        amount: Decimal,
        as_of: NaiveDate,
    ) -> Result<approval_requests::Model, ApprovalError> {
        validate_new_entry(amount)?;
        self.ensure_available(member_id, amount, as_of).await?;
        self.insert_request(member_id, RequestKind::Contribution, amount, None, None)
            .await
    }

    /// Submits an investment request, holding the amount.
    ///
    /// Investments draw on the current cycle's funds, so no availability
    /// check applies; the terms are validated up front.
    pub async fn request_investment(
        &self,
        member_id: Uuid,
        amount: Decimal,
        annual_rate_pct: Decimal,
        term_months: u32,
    ) -> Result<approval_requests::Model, ApprovalError> {
        akiba_core::investment::validate_terms(amount, annual_rate_pct, term_months)
            .map_err(InvestmentRepoError::Validation)?;
        self.insert_request(
            member_id,
            RequestKind::Investment,
            amount,
            Some(annual_rate_pct),
            Some(term_months),
        )
        .await
    }

    /// Approves a pending request, performing its side effect.
    ///
    /// - Withdrawal/contribution: posts the ledger entry with the request's
    ///   identity as the idempotency key.
    /// - Investment: opens the investment keyed by the request's identity.
    ///
    /// Retrying after a crash converges: the posting is recovered instead of
    /// duplicated, and the request is then marked approved.
    pub async fn approve(
        &self,
        request_id: Uuid,
        effective_date: NaiveDate,
    ) -> Result<ApprovalOutcome, ApprovalError> {
        let request = self.get_request(request_id).await?;
        if request.status != RequestStatus::Pending {
            return Ok(ApprovalOutcome::AlreadyDecided);
        }

        let external_ref = request_id.to_string();
        let outcome = match request.kind {
            RequestKind::Withdrawal => {
                self.check_approval_funds(&request, effective_date).await?;
                let entry = match self
                    .ledger
                    .record_withdrawal(
                        request.member_id,
                        request.amount,
                        effective_date,
                        Some(&external_ref),
                    )
                    .await?
                {
                    Some(entry) => entry,
                    None => self.recover_entry(request.member_id, &external_ref).await?,
                };
                ApprovalOutcome::Posted(entry)
            }
            RequestKind::Contribution => {
                self.check_approval_funds(&request, effective_date).await?;
                let entry = match self
                    .ledger
                    .record_contribution(
                        request.member_id,
                        request.amount,
                        effective_date,
                        Some(&external_ref),
                    )
                    .await?
                {
                    Some(entry) => entry,
                    None => self.recover_entry(request.member_id, &external_ref).await?,
                };
                ApprovalOutcome::Posted(entry)
            }
            RequestKind::Investment => {
                let (rate, term) = match (request.annual_rate_pct, request.term_months) {
                    (Some(rate), Some(term)) => (rate, u32::try_from(term).unwrap_or(1)),
                    _ => return Err(ApprovalError::MissingInvestmentTerms(request_id)),
                };
                let investment = match self
                    .investments
                    .create_for_request(
                        request.member_id,
                        request.amount,
                        rate,
                        term,
                        effective_date,
                        request_id,
                    )
                    .await?
                {
                    Some(model) => model,
                    None => self.recover_investment(request_id).await?,
                };
                ApprovalOutcome::InvestmentOpened(investment)
            }
        };

        self.mark_decided(request, RequestStatus::Approved, None).await?;
        Ok(outcome)
    }

    /// Rejects a pending request, releasing its hold.
    ///
    /// Returns false when the request was already decided.
    pub async fn reject(
        &self,
        request_id: Uuid,
        admin_notes: Option<String>,
    ) -> Result<bool, ApprovalError> {
        let request = self.get_request(request_id).await?;
        if request.status != RequestStatus::Pending {
            return Ok(false);
        }
        self.mark_decided(request, RequestStatus::Rejected, admin_notes)
            .await?;
        Ok(true)
    }

    /// Gets a request by ID.
    pub async fn get_request(
        &self,
        request_id: Uuid,
    ) -> Result<approval_requests::Model, ApprovalError> {
        approval_requests::Entity::find_by_id(request_id)
            .one(&self.db)
            .await?
            .ok_or(ApprovalError::NotFound(request_id))
    }

    /// Availability check at submission time.
    async fn ensure_available(
        &self,
        member_id: Uuid,
        amount: Decimal,
        as_of: NaiveDate,
    ) -> Result<(), ApprovalError> {
        let summary = self.balances.account_summary(member_id, as_of).await?;
        if amount > summary.available_balance {
            return Err(ApprovalError::InsufficientAvailable {
                requested: amount,
                available: summary.available_balance,
            });
        }
        Ok(())
    }

    /// Availability re-check at approval time. The request's own hold is
    /// still counted in `pending_holds`, so it is added back before
    /// comparing.
    async fn check_approval_funds(
        &self,
        request: &approval_requests::Model,
        as_of: NaiveDate,
    ) -> Result<(), ApprovalError> {
        let summary = self
            .balances
            .account_summary(request.member_id, as_of)
            .await?;
        let available_without_own_hold = (summary.prior_year_matured_total
            - (summary.pending_holds - request.amount))
            .max(Decimal::ZERO);
        if request.amount > available_without_own_hold {
            return Err(ApprovalError::InsufficientAvailable {
                requested: request.amount,
                available: available_without_own_hold,
            });
        }
        Ok(())
    }

    async fn insert_request(
        &self,
        member_id: Uuid,
        kind: RequestKind,
        amount: Decimal,
        annual_rate_pct: Option<Decimal>,
        term_months: Option<u32>,
    ) -> Result<approval_requests::Model, ApprovalError> {
        let request = approval_requests::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(member_id),
            kind: Set(kind),
            amount: Set(amount),
            status: Set(RequestStatus::Pending),
            term_months: Set(term_months.map(|term| i32::try_from(term).unwrap_or(1))),
            annual_rate_pct: Set(annual_rate_pct),
            admin_notes: Set(None),
            requested_at: Set(Utc::now().into()),
            decided_at: Set(None),
        };
        Ok(request.insert(&self.db).await?)
    }

    async fn mark_decided(
        &self,
        request: approval_requests::Model,
        status: RequestStatus,
        admin_notes: Option<String>,
    ) -> Result<(), ApprovalError> {
        let mut active: approval_requests::ActiveModel = request.into();
        active.status = Set(status);
        active.decided_at = Set(Some(Utc::now().into()));
        if admin_notes.is_some() {
            active.admin_notes = Set(admin_notes);
        }
        active.update(&self.db).await?;
        Ok(())
    }

    /// Fetches the entry a previous interrupted approval already posted.
    async fn recover_entry(
        &self,
        member_id: Uuid,
        external_ref: &str,
    ) -> Result<ledger_entries::Model, ApprovalError> {
        self.ledger
            .find_by_external_ref(member_id, external_ref)
            .await?
            .ok_or(ApprovalError::Database(DbErr::RecordNotFound(format!(
                "entry for external ref {external_ref}"
            ))))
    }

    /// Fetches the investment a previous interrupted approval already opened.
    async fn recover_investment(
        &self,
        request_id: Uuid,
    ) -> Result<investments::Model, ApprovalError> {
        use sea_orm::{ColumnTrait, QueryFilter};
        investments::Entity::find()
            .filter(investments::Column::RequestId.eq(request_id))
            .one(&self.db)
            .await?
            .ok_or(ApprovalError::Database(DbErr::RecordNotFound(format!(
                "investment for request {request_id}"
            ))))
    }
}
