//! Exchange rate repository.
//!
//! Stores daily closing rates from the external feed, one row per
//! (pair, working day). Lookups are exact-date; the working-day
//! adjustment happens in `bursar_core::currency::rate_lookup_date`.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use bursar_shared::types::Currency;

use crate::entities::exchange_rates;

/// Input for storing a daily rate.
#[derive(Debug, Clone)]
pub struct UpsertRateInput {
    /// Source currency.
    pub from_currency: Currency,
    /// Target currency.
    pub to_currency: Currency,
    /// 1 from = rate to.
    pub rate: Decimal,
    /// Working day the rate closed on.
    pub effective_date: NaiveDate,
}

/// Exchange rate repository.
#[derive(Debug, Clone)]
pub struct ExchangeRateRepository {
    db: DatabaseConnection,
}

impl ExchangeRateRepository {
    /// Creates a new exchange rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Looks up the stored rate for a pair on an exact date.
    pub async fn get_rate(
        &self,
        from: Currency,
        to: Currency,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, DbErr> {
        if from == to {
            return Ok(Some(Decimal::ONE));
        }
        let row = exchange_rates::Entity::find()
            .filter(exchange_rates::Column::FromCurrency.eq(from.as_str()))
            .filter(exchange_rates::Column::ToCurrency.eq(to.as_str()))
            .filter(exchange_rates::Column::EffectiveDate.eq(date))
            .one(&self.db)
            .await?;
        Ok(row.map(|r| r.rate))
    }

    /// Lists every stored rate into `to`, for bulk lookups (e.g. budget
    /// recalculation preloads all rates once).
    pub async fn list_to(&self, to: Currency) -> Result<Vec<exchange_rates::Model>, DbErr> {
        exchange_rates::Entity::find()
            .filter(exchange_rates::Column::ToCurrency.eq(to.as_str()))
            .all(&self.db)
            .await
    }

    /// Inserts or replaces the rate for a (pair, date).
    pub async fn upsert_rate(&self, input: UpsertRateInput) -> Result<(), DbErr> {
        let active = exchange_rates::ActiveModel {
            id: Set(Uuid::new_v4()),
            from_currency: Set(input.from_currency.as_str().to_string()),
            to_currency: Set(input.to_currency.as_str().to_string()),
            rate: Set(input.rate),
            effective_date: Set(input.effective_date),
            created_at: Set(Utc::now().into()),
        };
        exchange_rates::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    exchange_rates::Column::FromCurrency,
                    exchange_rates::Column::ToCurrency,
                    exchange_rates::Column::EffectiveDate,
                ])
                .update_column(exchange_rates::Column::Rate)
                .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
