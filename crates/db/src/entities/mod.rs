//! `SeaORM` entity definitions.

pub mod approval_requests;
pub mod investments;
pub mod ledger_entries;
pub mod members;
pub mod sea_orm_active_enums;
