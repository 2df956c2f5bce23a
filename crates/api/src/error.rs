//! API error responses.
//!
//! Maps the domain error taxonomies onto HTTP responses with a stable
//! `{error, message}` JSON body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use bursar_core::destination::DestinationError;
use bursar_core::workflow::WorkflowError;
use bursar_db::repositories::budget::BudgetError;
use bursar_shared::AppError;

/// Response-convertible wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "error": self.0.error_code(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        let app = match err {
            WorkflowError::InvalidTransition { .. } => AppError::InvalidTransition(message),
            WorkflowError::NotAuthorized { .. } => AppError::Forbidden(message),
            WorkflowError::InvalidAmount { .. } => AppError::Validation(message),
            WorkflowError::RequestNotFound(_) | WorkflowError::BudgetNotFound(_) => {
                AppError::NotFound(message)
            }
            WorkflowError::TransitionConflict(_) => AppError::Conflict(message),
            WorkflowError::ConversionUnavailable => AppError::ConversionUnavailable(message),
            WorkflowError::Database(_) => AppError::Database(message),
        };
        Self(app)
    }
}

impl From<BudgetError> for ApiError {
    fn from(err: BudgetError) -> Self {
        let message = err.to_string();
        let app = match err {
            BudgetError::NotFound(_) => AppError::NotFound(message),
            BudgetError::RateUnavailable { .. } => AppError::ConversionUnavailable(message),
            BudgetError::Corrupt(_) | BudgetError::Database(_) => AppError::Database(message),
        };
        Self(app)
    }
}

impl From<DestinationError> for ApiError {
    fn from(err: DestinationError) -> Self {
        Self(AppError::Validation(err.to_string()))
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bursar_core::workflow::{Action, Cursor};
    use uuid::Uuid;

    #[test]
    fn test_workflow_error_mapping() {
        let err: ApiError = WorkflowError::NotAuthorized {
            action: Action::Approve,
        }
        .into();
        assert_eq!(err.0.status_code(), 403);

        let err: ApiError = WorkflowError::InvalidTransition {
            action: Action::Complete,
            from: Cursor::Declined,
        }
        .into();
        assert_eq!(err.0.status_code(), 422);

        let err: ApiError = WorkflowError::RequestNotFound(Uuid::nil()).into();
        assert_eq!(err.0.status_code(), 404);

        let err: ApiError = WorkflowError::TransitionConflict(Uuid::nil()).into();
        assert_eq!(err.0.status_code(), 409);

        let err: ApiError = WorkflowError::ConversionUnavailable.into();
        assert_eq!(err.0.status_code(), 502);
    }

    #[test]
    fn test_destination_error_is_validation() {
        let err: ApiError = DestinationError::BadSortCode.into();
        assert_eq!(err.0.status_code(), 400);
        assert_eq!(err.0.error_code(), "VALIDATION_ERROR");
    }
}
