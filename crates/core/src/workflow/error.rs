//! Workflow error types for the request lifecycle.

use thiserror::Error;
use uuid::Uuid;

use crate::workflow::types::{Action, Cursor};

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The action is not legal from the request's current state.
    #[error("Action {action} is not legal from state {from}")]
    InvalidTransition {
        /// The attempted action.
        action: Action,
        /// The request's current cursor.
        from: Cursor,
    },

    /// The actor is not allowed to perform the action.
    #[error("Not authorized to {action} this request")]
    NotAuthorized {
        /// The attempted action.
        action: Action,
    },

    /// A receipt or request amount must be positive.
    #[error("Amount {amount} is not a positive number of minor units")]
    InvalidAmount {
        /// The offending amount.
        amount: i64,
    },

    /// Request not found.
    #[error("Request {0} not found")]
    RequestNotFound(Uuid),

    /// Budget not found.
    #[error("Budget {0} not found")]
    BudgetNotFound(Uuid),

    /// A concurrent transition won the race; the cursor moved underneath.
    #[error("Request {0} was modified concurrently")]
    TransitionConflict(Uuid),

    /// No exchange rate was available for a qualifying ledger delta; the
    /// transition fails rather than commit a stale or zero delta.
    #[error("No exchange rate available to convert the ledger delta")]
    ConversionUnavailable,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } => 422,
            Self::NotAuthorized { .. } => 403,
            Self::InvalidAmount { .. } => 400,
            Self::RequestNotFound(_) | Self::BudgetNotFound(_) => 404,
            Self::TransitionConflict(_) => 409,
            Self::ConversionUnavailable => 502,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotAuthorized { .. } => "NOT_AUTHORIZED",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::BudgetNotFound(_) => "BUDGET_NOT_FOUND",
            Self::TransitionConflict(_) => "TRANSITION_CONFLICT",
            Self::ConversionUnavailable => "CONVERSION_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
