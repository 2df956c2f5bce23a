//! `SeaORM` Entity for the destinations table (saved payee profiles).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "destinations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// "bank" or "card".
    pub platform: String,
    pub sort_code: Option<String>,
    pub account_number: Option<String>,
    pub business: bool,
    pub card_number: Option<String>,
    pub bank_name: Option<String>,
    /// Visible to every member, not just the owner.
    pub public: bool,
    /// Pinned in the owner's payee list.
    pub star: bool,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
