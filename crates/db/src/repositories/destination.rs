//! Destination repository: saved payee profiles.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use bursar_core::destination::PaymentDetails;

use crate::entities::destinations;

/// Input for saving a payee profile.
///
/// `details` must already be validated against its platform.
#[derive(Debug, Clone)]
pub struct CreateDestinationInput {
    /// Owning actor.
    pub owner_id: Uuid,
    /// Validated payment details.
    pub details: PaymentDetails,
    /// Visible to every member.
    pub public: bool,
    /// Pinned in the owner's payee list.
    pub star: bool,
}

/// Destination repository.
#[derive(Debug, Clone)]
pub struct DestinationRepository {
    db: DatabaseConnection,
}

impl DestinationRepository {
    /// Creates a new destination repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Saves a payee profile.
    pub async fn create(
        &self,
        input: CreateDestinationInput,
    ) -> Result<destinations::Model, DbErr> {
        let platform = input
            .details
            .platform
            .map(|p| p.as_str().to_string())
            .unwrap_or_default();
        destinations::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(input.owner_id),
            name: Set(input.details.name),
            platform: Set(platform),
            sort_code: Set(input.details.sort_code),
            account_number: Set(input.details.account_number),
            business: Set(input.details.business),
            card_number: Set(input.details.card_number),
            bank_name: Set(input.details.bank_name),
            public: Set(input.public),
            star: Set(input.star),
            active: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Fetches a destination by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<destinations::Model>, DbErr> {
        destinations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all public destinations.
    pub async fn list_public(&self) -> Result<Vec<destinations::Model>, DbErr> {
        destinations::Entity::find()
            .filter(destinations::Column::Public.eq(true))
            .filter(destinations::Column::Active.eq(true))
            .order_by_asc(destinations::Column::Name)
            .all(&self.db)
            .await
    }

    /// Lists an actor's own destinations, starred first.
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<destinations::Model>, DbErr> {
        destinations::Entity::find()
            .filter(destinations::Column::OwnerId.eq(owner_id))
            .order_by_desc(destinations::Column::Star)
            .order_by_asc(destinations::Column::Name)
            .all(&self.db)
            .await
    }
}
