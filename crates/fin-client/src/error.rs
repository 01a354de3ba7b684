//! Client error types.

use serde::Deserialize;

/// Errors from finance API calls.
#[derive(Debug, thiserror::Error)]
pub enum FinApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl FinApiError {
    /// HTTP status of an API rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable error code from the service's error body, e.g.
    /// `NOT_FOUND` or `CONFLICT`.
    pub fn code(&self) -> Option<String> {
        self.envelope().map(|e| e.error.code)
    }

    /// Human-readable message from the service's error body.
    pub fn message(&self) -> Option<String> {
        self.envelope().map(|e| e.error.message)
    }

    fn envelope(&self) -> Option<ErrorEnvelope> {
        match self {
            Self::ApiError { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}
