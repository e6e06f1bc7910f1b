//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Side effects are always explicit: approving a request or
//! maturing an investment calls the ledger recorder directly, never through
//! a hidden save hook.

pub mod accrual;
pub mod approval;
pub mod balance;
pub mod investment;
pub mod ledger;
pub mod member;

pub use accrual::{AccrualError, AccrualFailure, AccrualPosting, AccrualRepository, AccrualRunSummary};
pub use approval::{ApprovalError, ApprovalOutcome, ApprovalRepository};
pub use balance::{BalanceError, BalanceRepository};
pub use investment::{
    InvestmentRepoError, InvestmentRepository, MaturedInvestment, MaturitySweepSummary,
    SweepFailure,
};
pub use ledger::{LedgerRepository, RecorderError};
pub use member::{MemberError, MemberRepository};
