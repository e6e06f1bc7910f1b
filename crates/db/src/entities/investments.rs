//! `SeaORM` Entity for the investments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use akiba_core::investment::Investment;
use akiba_shared::types::{InvestmentId, MemberId};

use super::sea_orm_active_enums::InvestmentStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_id: Uuid,
    pub principal: Decimal,
    pub annual_rate_pct: Decimal,
    pub term_months: i32,
    pub start_date: Date,
    pub status: InvestmentStatus,
    pub interest_posted: bool,
    /// The approval request that opened this investment, when there was one;
    /// unique so a retried approval cannot open a second investment.
    pub request_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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

impl From<Model> for Investment {
    fn from(model: Model) -> Self {
        Self {
            id: InvestmentId::from_uuid(model.id),
            member_id: MemberId::from_uuid(model.member_id),
            principal: model.principal,
            annual_rate_pct: model.annual_rate_pct,
            term_months: u32::try_from(model.term_months).unwrap_or(1),
            start_date: model.start_date,
            status: model.status.into(),
            interest_posted: model.interest_posted,
        }
    }
}
