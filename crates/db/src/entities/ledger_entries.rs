//! `SeaORM` Entity for the ledger_entries table.
//!
//! Rows are immutable once inserted; the allocation snapshot is computed at
//! creation time and never recomputed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use akiba_core::allocation::WeekCoverage;
use akiba_core::ledger::{AllocationSnapshot, LedgerEntry};
use akiba_shared::types::{LedgerEntryId, MemberId};

use super::sea_orm_active_enums::EntryKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_id: Uuid,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub entry_date: Date,
    /// Identity of the external approval request or interest posting key;
    /// unique per member when present.
    pub external_ref: Option<String>,
    /// JSONB snapshot of the weeks fully covered by this deposit.
    pub covered_weeks: Json,
    pub carry_forward: Decimal,
    pub cumulative_total: Decimal,
    pub next_week: i32,
    /// Used only for same-day tie-breaking order.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for LedgerEntry {
    type Error = serde_json::Error;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let covered_weeks: Vec<WeekCoverage> = serde_json::from_value(model.covered_weeks)?;
        Ok(Self {
            id: LedgerEntryId::from_uuid(model.id),
            member_id: MemberId::from_uuid(model.member_id),
            kind: model.kind.into(),
            amount: model.amount,
            entry_date: model.entry_date,
            external_ref: model.external_ref,
            allocation: AllocationSnapshot {
                covered_weeks,
                carry_forward: model.carry_forward,
                cumulative_total: model.cumulative_total,
                next_week: u32::try_from(model.next_week).unwrap_or(1),
            },
            created_at: model.created_at.to_utc(),
        })
    }
}
