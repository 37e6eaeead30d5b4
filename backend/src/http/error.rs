//! HTTP error handling and response types.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::forms::FormErrors;
use crate::scheduler::SchedulerError;
use crate::services::ServiceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Field errors of a failed form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FormErrors>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            errors: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_errors(mut self, errors: FormErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request
    BadRequest(String),
    /// Submitted form failed validation
    Validation(FormErrors),
    /// Job queue unreachable
    Unavailable(String),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("VALIDATION_ERROR", "Submitted data is invalid").with_errors(errors),
            ),
            AppError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new("SERVICE_UNAVAILABLE", msg),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => {
                let details = e.context().to_string();
                let status = match &e {
                    RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
                    RepositoryError::Conflict { .. } => StatusCode::CONFLICT,
                    RepositoryError::ConnectionError { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let code = match status {
                    StatusCode::NOT_FOUND => "NOT_FOUND",
                    StatusCode::CONFLICT => "CONFLICT",
                    _ => "REPOSITORY_ERROR",
                };
                if status.is_server_error() {
                    tracing::error!("Repository failure: {}", e);
                }
                (status, ApiError::new(code, e.to_string()).with_details(details))
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Repository(e)
            | ServiceError::Scheduler(SchedulerError::Repository(e)) => AppError::Repository(e),
            ServiceError::Scheduler(e @ SchedulerError::Unavailable(_)) => {
                AppError::Unavailable(e.to_string())
            }
            ServiceError::Scheduler(e) => AppError::Internal(e.to_string()),
            ServiceError::Validation(errors) => AppError::Validation(errors),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
