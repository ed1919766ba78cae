//! API error types with structured JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::types::ViolationBody;
use crate::core_state::CoreError;
use crate::db::DatabaseError;
use crate::scheduling::{ServiceError, Violation};

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationBody>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Concurrent modification: {0}")]
    ConcurrencyConflict(String),
    #[error("Scheduling rejected: {} violation(s)", .0.len())]
    Rejected(Vec<Violation>),
    #[error("Database unavailable: {0}")]
    Unavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut violations = Vec::new();
        let (status, code, message) = match &self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::ConcurrencyConflict(detail) => (
                StatusCode::CONFLICT,
                "CONCURRENCY_CONFLICT",
                format!("{detail}. Re-fetch the appointment and retry"),
            ),
            ApiError::Rejected(list) => {
                violations = list.iter().map(ViolationBody::from).collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "SCHEDULING_REJECTED",
                    "Appointment violates scheduling rules".to_string(),
                )
            }
            ApiError::Unavailable(detail) => {
                tracing::error!(detail, "Database unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "DATABASE_UNAVAILABLE",
                    "The database is unavailable".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                violations,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Database(e) => ApiError::Unavailable(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} not found"))
            }
            DatabaseError::ConstraintViolation(detail) => ApiError::Conflict(detail),
            e @ DatabaseError::StaleVersion { .. } => ApiError::ConcurrencyConflict(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            e @ (ServiceError::Input(_)
            | ServiceError::UnknownDoctor(_)
            | ServiceError::UnknownPatient(_)
            | ServiceError::IdMismatch { .. }) => ApiError::BadRequest(e.to_string()),
            e @ ServiceError::NotFound(_) => ApiError::NotFound(e.to_string()),
            e @ ServiceError::ConcurrencyConflict { .. } => {
                ApiError::ConcurrencyConflict(e.to_string())
            }
            ServiceError::Database(e) => e.into(),
        }
    }
}
