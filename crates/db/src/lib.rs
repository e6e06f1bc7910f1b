//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for members, ledger entries, investments,
//!   and approval requests
//! - Repository abstractions for data access (the ledger recorder, the
//!   maturity sweep, the annual accrual batch)
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccrualRepository, ApprovalRepository, BalanceRepository, InvestmentRepository,
    LedgerRepository, MemberRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
