//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::{CoreError, PortError};
use domain_billing::BillingError;
use domain_claims::ClaimError;
use domain_party::PartyError;
use domain_policy::PolicyError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Option<Vec<String>>,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, "validation_error", message, details)
            }
            ApiError::Internal(msg) => {
                error!(detail = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
            ApiError::Database(msg) => {
                error!(detail = %msg, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} not found"))
            }
            PortError::Validation { message, field } => ApiError::Validation {
                message,
                details: field.map(|f| vec![f]),
            },
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Connection { message, .. } => ApiError::Database(message),
            PortError::Internal { message, .. } => ApiError::Internal(message),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            CoreError::InvalidStateTransition(msg) => ApiError::BadRequest(msg),
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl From<PartyError> for ApiError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::InvalidCredentials | PartyError::InactiveAccount => {
                ApiError::Unauthorized(err.to_string())
            }
            PartyError::Core(core) => core.into(),
            PartyError::InvalidData(msg) => ApiError::validation(msg),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Core(core) => core.into(),
            PolicyError::Validation(msg) => ApiError::validation(msg),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Core(core) => core.into(),
            BillingError::Validation(msg) => ApiError::validation(msg),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Core(core) => core.into(),
            ClaimError::Validation(msg) => ApiError::validation(msg),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        details.sort();
        ApiError::Validation {
            message: "Request validation failed".to_string(),
            details: Some(details),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_port_errors_map_to_status() {
        assert_eq!(status_of(PortError::not_found("Policy", "x")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(PortError::conflict("taken")), StatusCode::CONFLICT);
        assert_eq!(status_of(PortError::validation("bad")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(PortError::connection("down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_errors_are_bad_requests() {
        assert_eq!(
            status_of(PolicyError::NotCancellable(domain_policy::PolicyStatus::Active)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ClaimError::ApprovedExceedsClaimed {
                approved: dec!(6000),
                claimed: dec!(5000),
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BillingError::Overpayment {
                outstanding: dec!(100),
                attempted: dec!(200),
            }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_login_failures_are_unauthorized() {
        assert_eq!(status_of(PartyError::InactiveAccount), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(PartyError::InvalidCredentials), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_internal_detail_not_leaked() {
        let response = ApiError::Database("relation \"policies\" does not exist".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "An unexpected error occurred");
        assert!(body.get("details").is_none());
    }
}
