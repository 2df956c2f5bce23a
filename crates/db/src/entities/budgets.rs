//! `SeaORM` Entity for the budgets table.
//!
//! Totals are mutated only through atomic in-place arithmetic inside a
//! transition's transaction (or by the recalculation job), never by
//! read-modify-write from handlers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub department: String,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    /// Ceiling in reporting-currency minor units.
    pub amount: i64,
    /// Aggregated spend, reporting-currency minor units.
    pub spent: i64,
    /// Aggregated receipts, reporting-currency minor units.
    pub received: i64,
    /// Raw per-currency spend.
    pub spent_gbp: i64,
    pub spent_cny: i64,
    /// Raw per-currency receipts.
    pub received_gbp: i64,
    pub received_cny: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::requests::Entity")]
    Requests,
}

impl Related<super::requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
