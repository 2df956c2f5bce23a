//! Budget repository: envelopes per department and their running totals.
//!
//! Totals are written only by transition deltas (see the request
//! repository) and by `recalculate`, which rebuilds every budget from the
//! audit trail the way the incremental rules would have.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use bursar_core::currency::{convert_minor, rate_lookup_date};
use bursar_core::ledger::{BudgetDelta, LedgerService};
use bursar_core::workflow::{Action, RequestKind};
use bursar_shared::types::{Currency, Department};

use crate::entities::{audit_entries, budgets, requests};

/// Errors from budget operations.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Budget not found.
    #[error("Budget {0} not found")]
    NotFound(Uuid),

    /// No stored rate for a currency/date needed by recalculation.
    #[error("No exchange rate for {currency} on {date}")]
    RateUnavailable {
        /// The currency missing a rate.
        currency: Currency,
        /// The lookup date.
        date: NaiveDate,
    },

    /// Stored enum column failed to parse.
    #[error("Corrupt data: {0}")]
    Corrupt(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl BudgetError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::RateUnavailable { .. } => 502,
            Self::Corrupt(_) | Self::Database(_) => 500,
        }
    }
}

/// Input for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetInput {
    /// Department the envelope belongs to.
    pub department: Department,
    /// What the budget is for.
    pub reason: String,
    /// Ceiling in reporting-currency minor units.
    pub amount: i64,
}

/// Budget repository.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a budget envelope with zeroed totals.
    pub async fn create(&self, input: CreateBudgetInput) -> Result<budgets::Model, BudgetError> {
        let now = Utc::now();
        budgets::ActiveModel {
            id: Set(Uuid::new_v4()),
            department: Set(input.department.as_str().to_string()),
            reason: Set(input.reason),
            amount: Set(input.amount),
            spent: Set(0),
            received: Set(0),
            spent_gbp: Set(0),
            spent_cny: Set(0),
            received_gbp: Set(0),
            received_cny: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)
    }

    /// Fetches a budget by id.
    pub async fn get(&self, budget_id: Uuid) -> Result<Option<budgets::Model>, BudgetError> {
        budgets::Entity::find_by_id(budget_id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists all budgets ordered by department.
    pub async fn list(&self) -> Result<Vec<budgets::Model>, BudgetError> {
        budgets::Entity::find()
            .order_by_asc(budgets::Column::Department)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Rebuilds every budget's totals from the audit trail.
    ///
    /// Replays the delta rules over all recorded entries, converting each
    /// qualifying entry at its own timestamp date. The result must match
    /// what the incremental updates produced; this is the recovery path
    /// when they are suspected to have drifted.
    ///
    /// # Errors
    ///
    /// Fails closed with `BudgetError::RateUnavailable` when a needed
    /// rate is missing; no totals are written in that case.
    pub async fn recalculate<F>(&self, rate_lookup: F) -> Result<usize, BudgetError>
    where
        F: Fn(Currency, NaiveDate) -> Option<Decimal>,
    {
        let budget_rows = budgets::Entity::find().all(&self.db).await.map_err(db_err)?;
        let request_rows = requests::Entity::find()
            .filter(requests::Column::BudgetId.is_not_null())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut totals: std::collections::HashMap<Uuid, BudgetDelta> = budget_rows
            .iter()
            .map(|b| (b.id, BudgetDelta::default()))
            .collect();

        for request in &request_rows {
            let Some(budget_id) = request.budget_id else {
                continue;
            };
            let Some(total) = totals.get_mut(&budget_id) else {
                continue;
            };
            let kind = RequestKind::parse(&request.kind)
                .ok_or_else(|| BudgetError::Corrupt(format!("request kind {:?}", request.kind)))?;
            let currency = Currency::parse(&request.currency).ok_or_else(|| {
                BudgetError::Corrupt(format!("request currency {:?}", request.currency))
            })?;

            let entries = audit_entries::Entity::find()
                .filter(audit_entries::Column::RequestId.eq(request.id))
                .order_by_asc(audit_entries::Column::Timestamp)
                .order_by_asc(audit_entries::Column::Seq)
                .all(&self.db)
                .await
                .map_err(db_err)?;

            for entry in entries {
                let action = Action::parse(&entry.action)
                    .ok_or_else(|| BudgetError::Corrupt(format!("action {:?}", entry.action)))?;
                // Receipts carry their own amount; create/reverse deltas
                // use the request amount. A plain comment has neither.
                let amount = match action {
                    Action::Comment => entry.amount.unwrap_or(0),
                    _ => request.amount,
                };
                // Probe with a zero conversion so only qualifying entries
                // force a rate lookup.
                if LedgerService::delta(kind, action, currency, amount, 0).is_none() {
                    continue;
                }
                let date = rate_lookup_date(entry.timestamp.date_naive());
                let rate = lookup_rate(&rate_lookup, currency, date)?;
                let converted = convert_minor(amount, rate);
                if let Some(delta) = LedgerService::delta(kind, action, currency, amount, converted)
                {
                    total.spent += delta.spent;
                    total.received += delta.received;
                    for c in Currency::ALL {
                        total.spent_actual.add(c, delta.spent_actual.get(c));
                        total.received_actual.add(c, delta.received_actual.get(c));
                    }
                }
            }
        }

        let now = Utc::now();
        let count = budget_rows.len();
        tracing::debug!(budgets = count, "writing recalculated totals");
        for budget in budget_rows {
            let total = totals.remove(&budget.id).unwrap_or_default();
            let mut active: budgets::ActiveModel = budget.into();
            active.spent = Set(total.spent);
            active.received = Set(total.received);
            active.spent_gbp = Set(total.spent_actual.gbp);
            active.spent_cny = Set(total.spent_actual.cny);
            active.received_gbp = Set(total.received_actual.gbp);
            active.received_cny = Set(total.received_actual.cny);
            active.updated_at = Set(now.into());
            active.update(&self.db).await.map_err(db_err)?;
        }

        Ok(count)
    }
}

fn lookup_rate<F>(rate_lookup: &F, currency: Currency, date: NaiveDate) -> Result<Decimal, BudgetError>
where
    F: Fn(Currency, NaiveDate) -> Option<Decimal>,
{
    if currency == Currency::reporting() {
        return Ok(Decimal::ONE);
    }
    rate_lookup(currency, date).ok_or(BudgetError::RateUnavailable { currency, date })
}

fn db_err(e: sea_orm::DbErr) -> BudgetError {
    BudgetError::Database(e.to_string())
}
