//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from fin-core and fin-state to HTTP status codes and
//! JSON error bodies. Internal error details are never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fin_state::{DisbursementError, LifecycleError};
use serde::{Deserialize, Serialize};
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
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials valid but not permitted (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<fin_core::ValidationError> for AppError {
    fn from(err: fin_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Status conflicts are 409; a missing rejection reason is a 422.
impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match &err {
            LifecycleError::InvalidTransition { .. } | LifecycleError::Terminal { .. } => {
                Self::Conflict(err.to_string())
            }
            LifecycleError::MissingReason => Self::Validation(err.to_string()),
        }
    }
}

impl From<DisbursementError> for AppError {
    fn from(err: DisbursementError) -> Self {
        match &err {
            DisbursementError::NotApproved { .. } => Self::Conflict(err.to_string()),
            DisbursementError::AmountMismatch { .. }
            | DisbursementError::MethodMismatch { .. }
            | DisbursementError::MissingSignature
            | DisbursementError::MissingReceiver
            | DisbursementError::MissingTransactionRef { .. }
            | DisbursementError::InvalidSignature(_) => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fin_core::{Amount, PaymentMethod, RequestStatus};
    use http_body_util::BodyExt;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code));
        }
    }

    #[test]
    fn lifecycle_errors_map_to_conflict_or_validation() {
        let conflict = AppError::from(LifecycleError::Terminal {
            state: RequestStatus::Paid,
        });
        assert!(matches!(conflict, AppError::Conflict(ref m) if m.contains("PAID")));
        let invalid = AppError::from(LifecycleError::InvalidTransition {
            from: RequestStatus::Approved,
            to: RequestStatus::Rejected,
        });
        assert!(matches!(invalid, AppError::Conflict(_)));
        assert!(matches!(
            AppError::from(LifecycleError::MissingReason),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn disbursement_errors_map() {
        assert!(matches!(
            AppError::from(DisbursementError::NotApproved {
                status: RequestStatus::Pending
            }),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(DisbursementError::AmountMismatch {
                expected: Amount::from_major(1),
                given: Amount::from_major(2),
            }),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(DisbursementError::MissingTransactionRef {
                method: PaymentMethod::Pos
            }),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn validation_error_from_core() {
        let err = AppError::from(fin_core::ValidationError::InvalidMonth("2024-13".into()));
        match err {
            AppError::Validation(msg) => assert!(msg.contains("2024-13")),
            other => panic!("expected Validation, got: {other:?}"),
        }
    }

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_conflict() {
        let (status, body) = response_parts(AppError::Conflict("already paid".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error.code, "CONFLICT");
        assert!(body.error.message.contains("already paid"));
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("db connection failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert_eq!(body.error.message, "An internal error occurred");
    }

    #[test]
    fn error_body_skips_empty_details() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "TEST".to_string(),
                message: "test message".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("TEST"));
        assert!(!json.contains("details"));
    }
}
