//! `SeaORM` Entity for the requests table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// "expense" or "income".
    pub kind: String,
    pub owner_id: Uuid,
    pub owner_department: String,
    pub department: String,
    pub category: Option<String>,
    pub budget_id: Option<Uuid>,
    pub currency: String,
    /// Minor units, always positive.
    pub amount: i64,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub payee_name: String,
    pub platform: Option<String>,
    pub sort_code: Option<String>,
    pub account_number: Option<String>,
    pub business: bool,
    pub card_number: Option<String>,
    pub bank_name: Option<String>,
    /// Approval-state level; see `bursar_core::workflow::Cursor`.
    pub cursor: i16,
    /// Income partial receipts, minor units per currency.
    pub received_gbp: i64,
    pub received_cny: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id"
    )]
    Budgets,
    #[sea_orm(has_many = "super::audit_entries::Entity")]
    AuditEntries,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::audit_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
