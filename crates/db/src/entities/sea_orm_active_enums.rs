//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_kind")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money paid into the member's savings.
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// An approved withdrawal leaving the member's savings.
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    /// An approved contribution leaving the member's savings.
    #[sea_orm(string_value = "contribution")]
    Contribution,
}

impl From<EntryKind> for akiba_core::ledger::EntryKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Deposit => Self::Deposit,
            EntryKind::Withdrawal => Self::Withdrawal,
            EntryKind::Contribution => Self::Contribution,
        }
    }
}

impl From<akiba_core::ledger::EntryKind> for EntryKind {
    fn from(kind: akiba_core::ledger::EntryKind) -> Self {
        match kind {
            akiba_core::ledger::EntryKind::Deposit => Self::Deposit,
            akiba_core::ledger::EntryKind::Withdrawal => Self::Withdrawal,
            akiba_core::ledger::EntryKind::Contribution => Self::Contribution,
        }
    }
}

/// Status of a fixed-term investment.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "investment_status")]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStatus {
    /// Funds are committed for the term.
    #[sea_orm(string_value = "fixed")]
    Fixed,
    /// The term has ended. Terminal.
    #[sea_orm(string_value = "matured")]
    Matured,
}

impl From<InvestmentStatus> for akiba_core::investment::InvestmentStatus {
    fn from(status: InvestmentStatus) -> Self {
        match status {
            InvestmentStatus::Fixed => Self::Fixed,
            InvestmentStatus::Matured => Self::Matured,
        }
    }
}

impl From<akiba_core::investment::InvestmentStatus> for InvestmentStatus {
    fn from(status: akiba_core::investment::InvestmentStatus) -> Self {
        match status {
            akiba_core::investment::InvestmentStatus::Fixed => Self::Fixed,
            akiba_core::investment::InvestmentStatus::Matured => Self::Matured,
        }
    }
}

/// Kind of approval request.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_kind")]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Request to withdraw available funds.
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    /// Request to contribute available funds to a group levy.
    #[sea_orm(string_value = "contribution")]
    Contribution,
    /// Request to commit funds to a fixed-term investment.
    #[sea_orm(string_value = "investment")]
    Investment,
}

/// Status of an approval request.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_status")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting a decision; the amount is held against availability.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved and posted; the hold is released.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected; the hold is released.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}
