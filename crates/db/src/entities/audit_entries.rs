//! `SeaORM` Entity for the audit_entries table.
//!
//! Rows are append-only: entries are inserted as part of a transition and
//! never updated or deleted. `seq` is a database sequence used to break
//! timestamp ties.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub request_id: Uuid,
    pub actor_id: Uuid,
    /// Insertion sequence (database-assigned).
    pub seq: i64,
    /// Action name; see `bursar_core::workflow::Action`.
    pub action: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    /// Opaque attachment handles from the external file store.
    pub attachments: Json,
    /// Receipt amount in the request's currency (income receipts only).
    pub amount: Option<i64>,
    pub timestamp: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::requests::Entity",
        from = "Column::RequestId",
        to = "super::requests::Column::Id"
    )]
    Requests,
}

impl Related<super::requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
