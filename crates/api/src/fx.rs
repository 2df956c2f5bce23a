//! Exchange-rate resolution for ledger conversions.
//!
//! Rate sourcing is an external collaborator: a daily-close feed keyed by
//! working day. Resolution order is in-process cache → exchange_rates
//! table → one feed fetch (persisting the whole series). A rate that
//! cannot be resolved fails closed; the caller's transition aborts rather
//! than commit a stale or zero delta.

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use moka::sync::Cache;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::{debug, warn};

use bursar_core::currency::rate_lookup_date;
use bursar_db::repositories::exchange_rate::{ExchangeRateRepository, UpsertRateInput};
use bursar_shared::config::FxConfig;
use bursar_shared::types::Currency;
use bursar_shared::{AppError, AppResult};

const CACHE_CAPACITY: u64 = 4096;
const CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Resolves exchange rates into the reporting currency.
pub struct RateService {
    repo: ExchangeRateRepository,
    cache: Cache<(Currency, NaiveDate), Decimal>,
    http: reqwest::Client,
    config: FxConfig,
}

impl RateService {
    /// Creates a rate service over the given database and feed config.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: FxConfig) -> Self {
        Self {
            repo: ExchangeRateRepository::new(db),
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Resolves the reporting-currency rate for amounts dated `on`.
    ///
    /// The lookup uses the first working day strictly before `on`,
    /// matching the feed's daily-close convention. The reporting
    /// currency converts at par without any lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConversionUnavailable` when no rate can be
    /// resolved.
    pub async fn rate_on(&self, currency: Currency, on: NaiveDate) -> AppResult<Decimal> {
        if currency == Currency::reporting() {
            return Ok(Decimal::ONE);
        }
        let date = rate_lookup_date(on);
        if let Some(rate) = self.cache.get(&(currency, date)) {
            return Ok(rate);
        }
        if let Some(rate) = self.lookup_stored(currency, date).await? {
            return Ok(rate);
        }

        // One fetch persists the whole daily series, so the next miss on
        // any nearby date is served from the table.
        self.fetch_series(currency).await?;
        if let Some(rate) = self.lookup_stored(currency, date).await? {
            return Ok(rate);
        }
        Err(AppError::ConversionUnavailable(format!(
            "no {currency} rate for {date}"
        )))
    }

    /// Converts a minor-unit amount dated `on` into the reporting
    /// currency.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConversionUnavailable` when no rate resolves.
    pub async fn convert_on(&self, amount: i64, currency: Currency, on: NaiveDate) -> AppResult<i64> {
        let rate = self.rate_on(currency, on).await?;
        Ok(bursar_core::currency::convert_minor(amount, rate))
    }

    async fn lookup_stored(
        &self,
        currency: Currency,
        date: NaiveDate,
    ) -> AppResult<Option<Decimal>> {
        let rate = self
            .repo
            .get_rate(currency, Currency::reporting(), date)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if let Some(rate) = rate {
            self.cache.insert((currency, date), rate);
        }
        Ok(rate)
    }

    /// Fetches the daily series for `currency` → reporting currency from
    /// the configured feed and persists every day it returns.
    async fn fetch_series(&self, currency: Currency) -> AppResult<()> {
        let Some(url) = self.config.provider_url.as_deref() else {
            return Ok(());
        };

        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let response = self
            .http
            .get(url)
            .query(&[
                ("function", "FX_DAILY"),
                ("from_symbol", currency.as_str()),
                ("to_symbol", Currency::reporting().as_str()),
                ("outputsize", "full"),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(|e| AppError::ConversionUnavailable(format!("rate feed: {e}")))?;

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::ConversionUnavailable(format!("rate feed: {e}")))?;

        let Some(series) = payload
            .get("Time Series FX (Daily)")
            .and_then(|v| v.as_object())
        else {
            warn!(%currency, "rate feed returned no daily series");
            return Ok(());
        };

        let mut stored = 0usize;
        for (day, fields) in series {
            let Ok(date) = NaiveDate::from_str(day) else {
                continue;
            };
            let Some(rate) = fields
                .get("4. close")
                .and_then(|v| v.as_str())
                .and_then(|s| Decimal::from_str(s).ok())
            else {
                continue;
            };
            self.repo
                .upsert_rate(UpsertRateInput {
                    from_currency: currency,
                    to_currency: Currency::reporting(),
                    rate,
                    effective_date: date,
                })
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            stored += 1;
        }
        debug!(%currency, stored, "persisted rate series from feed");
        Ok(())
    }
}
