//! # API Error Types
//!
//! Every handler returns `Result<_, AppError>`. The response body is always
//!
//! ```json
//! {"error": {"code": "CONFLICT", "message": "...", "details": {...}}}
//! ```
//!
//! `details` appears only where a client can act on it: the offending
//! field of a validation failure, or the wait before retrying after a 429.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use clubsync_core::{TransitionError, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `NOT_FOUND` or `VALIDATION_ERROR`.
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown record, or a club the caller does not belong to (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// A field failed validation (422).
    #[error("validation error: {0}")]
    InvalidInput(#[from] ValidationError),

    /// A cross-record check failed, such as a member id from another club (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed JSON or query string (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing, expired or revoked session (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller's club role is insufficient (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness or lifecycle conflict (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The client used up its request window (429).
    #[error("rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Persistence or other server-side failure (500). Logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::InvalidInput(_) | Self::Validation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// `NotFound` for a record kind and id.
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{kind} {id} not found"))
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::InvalidInput(err) => err.field().map(|field| json!({ "field": field })),
            Self::RateLimited { retry_after_secs } => {
                Some(json!({ "retry_after_secs": retry_after_secs }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                "An internal error occurred".to_string()
            }
            Self::NotFound(m)
            | Self::Validation(m)
            | Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::Conflict(m) => m.clone(),
            Self::InvalidInput(err) => err.to_string(),
            Self::RateLimited { .. } => self.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };
        let mut response = (status, Json(body)).into_response();
        if let Self::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        Self::Conflict(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, Option<HeaderValue>, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let retry_after = response.headers().get(header::RETRY_AFTER).cloned();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, retry_after, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn codes_follow_the_taxonomy() {
        let cases = [
            (AppError::not_found("task", 7), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::Validation("event 1 does not belong to this club".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (
                AppError::RateLimited { retry_after_secs: 3 },
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err}");
        }
    }

    #[tokio::test]
    async fn validation_failure_names_the_field() {
        let err = AppError::from(ValidationError::TooLong {
            field: "title",
            max: 200,
        });
        let (status, _, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.message, "title must not exceed 200 characters");
        assert_eq!(body.error.details, Some(json!({ "field": "title" })));
    }

    #[tokio::test]
    async fn cross_record_validation_has_no_details() {
        let (_, _, body) =
            response_parts(AppError::Validation("member 1 does not belong to this club".into()))
                .await;
        assert!(body.error.details.is_none());
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("details"));
    }

    #[tokio::test]
    async fn rate_limited_sets_retry_after() {
        let (status, retry_after, body) =
            response_parts(AppError::RateLimited { retry_after_secs: 42 }).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(retry_after, Some(HeaderValue::from(42u64)));
        assert_eq!(body.error.details, Some(json!({ "retry_after_secs": 42 })));
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let (status, _, body) =
            response_parts(AppError::Internal("snapshot write failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.message, "An internal error occurred");
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn message_omits_the_log_prefix() {
        let (_, _, body) = response_parts(AppError::not_found("member", "m-1")).await;
        assert_eq!(body.error.code, "NOT_FOUND");
        assert_eq!(body.error.message, "member m-1 not found");
    }

    #[test]
    fn transition_error_is_a_conflict() {
        let err = AppError::from(TransitionError::AlreadyDecided {
            kind: "join request",
            state: "approved".into(),
        });
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
        assert!(err.to_string().contains("already been approved"));
    }
}
