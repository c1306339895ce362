//! API error handling
//!
//! Every failure renders as `{ error, message, entity?, field?, retryable }`
//! so the client can show which field failed, on which entity, and whether
//! trying again with different input can succeed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_kernel::CoreError;
use infra_db::{DatabaseError, ErrorKind};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::export::ExportError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error on '{field}': {message}")]
    Validation {
        entity: Option<String>,
        field: String,
        message: String,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub retryable: bool,
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            entity: None,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the same request can succeed with corrected input
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Validation { .. } | ApiError::Conflict(_) | ApiError::BadRequest(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation { .. } => "validation_error",
            ApiError::Unavailable(_) => "storage_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let (entity, field, message) = match &self {
            ApiError::Validation { entity, field, message } => {
                (entity.clone(), Some(field.clone()), message.clone())
            }
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unavailable(msg)
            | ApiError::Internal(msg) => (None, None, msg.clone()),
            ApiError::Unauthorized => (None, None, "Unauthorized".to_string()),
        };

        let body = ErrorResponse {
            error: self.error_type().to_string(),
            message,
            entity,
            field,
            retryable: self.is_retryable(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err.kind() {
            ErrorKind::Validation => ApiError::Validation {
                entity: err.entity().map(str::to_string),
                field: err.field().unwrap_or("record").to_string(),
                message: err.to_string(),
            },
            ErrorKind::Conflict => ApiError::Conflict(err.to_string()),
            ErrorKind::NotFound => ApiError::NotFound(err.to_string()),
            ErrorKind::StorageUnavailable => ApiError::Unavailable(err.to_string()),
            ErrorKind::Internal => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, message } => ApiError::validation(field, message),
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            CoreError::Temporal(e) => ApiError::validation("window", e.to_string()),
            CoreError::Money(e) => ApiError::validation("amount", e.to_string()),
            CoreError::InvalidStateTransition(msg) => ApiError::validation("status", msg),
            CoreError::Configuration(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let first = field_errors
            .iter()
            .min_by_key(|(field, _)| field.to_string());
        match first {
            Some((field, errs)) => {
                let message = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                ApiError::validation(field.to_string(), message)
            }
            None => ApiError::BadRequest(errors.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Empty => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_validation_keeps_field_and_entity() {
        let api: ApiError = DatabaseError::unresolved("seizure", "violation_id", 9999).into();
        match &api {
            ApiError::Validation { entity, field, .. } => {
                assert_eq!(entity.as_deref(), Some("seizure"));
                assert_eq!(field, "violation_id");
            }
            other => panic!("expected validation, got {:?}", other),
        }
        assert_eq!(api.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(api.is_retryable());
    }

    #[test]
    fn test_conflict_and_unavailable_statuses() {
        let conflict: ApiError = DatabaseError::duplicate("violation", "violation_number", "V1").into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert!(conflict.is_retryable());

        let down: ApiError = DatabaseError::ConnectionFailed("gone".into()).into();
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!down.is_retryable());
    }

    #[test]
    fn test_out_of_domain_enum_is_validation() {
        let err: ApiError = "speeding".parse::<domain_case::ViolationType>().unwrap_err().into();
        match err {
            ApiError::Validation { field, .. } => assert_eq!(field, "violation_type"),
            other => panic!("expected validation, got {:?}", other),
        }
    }
}
