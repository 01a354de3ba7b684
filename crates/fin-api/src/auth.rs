//! # Authentication Middleware
//!
//! Operators authenticate with the shared admin passcode. The session
//! endpoint exchanges passcode and operator name for a bearer credential:
//!
//! ```text
//! Bearer admin:{operator}:{passcode}  : issued by POST /v1/session
//! Bearer {passcode}                   : bare passcode, acts as "Admin"
//! ```
//!
//! The operator name must be on the allowed list (case-insensitive) and is
//! resolved to its canonical spelling. Every authenticated request gets a
//! [`CallerIdentity`] injected into the request extensions; handlers
//! extract it via the `FromRequestParts` impl and record it as the actor.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fin_core::canonical_user;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AppError, ErrorBody, ErrorDetail};

/// Operator name used for bare-passcode credentials and when auth is disabled.
pub const DEFAULT_OPERATOR: &str = "Admin";

const TOKEN_PREFIX: &str = "admin";

// ── Secret ──────────────────────────────────────────────────────────────────

/// A credential that is wiped from memory on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretToken(String);

impl SecretToken {
    /// Wrap a secret value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Borrow the secret for comparison.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretToken([REDACTED])")
    }
}

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Canonical operator name, recorded as the actor on every action.
    pub user: String,
}

impl CallerIdentity {
    /// Identity for the given operator name.
    pub fn operator(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared admin passcode. `None` disables authentication.
    pub passcode: Option<SecretToken>,
    /// Operators permitted to sign in.
    pub allowed_users: Arc<Vec<String>>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("passcode", &self.passcode.as_ref().map(|_| "[REDACTED]"))
            .field("allowed_users", &self.allowed_users)
            .finish()
    }
}

impl AuthConfig {
    /// Resolve `name` against the allowed operators.
    pub fn resolve_user(&self, name: &str) -> Option<String> {
        canonical_user(&self.allowed_users, name).map(str::to_string)
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of secrets. Mismatched lengths still perform a
/// comparison so timing does not reveal the expected length.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Build the bearer credential handed out at sign-in.
pub fn issue_token(user: &str, passcode: Option<&SecretToken>) -> String {
    format!(
        "{TOKEN_PREFIX}:{user}:{}",
        passcode.map(SecretToken::expose).unwrap_or_default()
    )
}

/// Parse a bearer credential in the form `admin:{operator}:{passcode}` or
/// `{passcode}`.
///
/// The whole credential is tried as a bare passcode first, since the
/// passcode itself may contain `:`.
pub fn parse_bearer_token(provided: &str, config: &AuthConfig) -> Result<CallerIdentity, String> {
    let expected = config
        .passcode
        .as_ref()
        .map(SecretToken::expose)
        .unwrap_or_default();
    if constant_time_token_eq(provided, expected) {
        return Ok(CallerIdentity::operator(DEFAULT_OPERATOR));
    }
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.as_slice() {
        [_] => Err("invalid bearer token".into()),
        [prefix, user, secret] => {
            if !constant_time_token_eq(secret, expected) {
                return Err("invalid bearer token".into());
            }
            if *prefix != TOKEN_PREFIX {
                return Err(format!("unknown token type: {prefix}"));
            }
            config
                .resolve_user(user)
                .map(CallerIdentity::operator)
                .ok_or_else(|| "operator is not on the allowed list".to_string())
        }
        _ => Err("invalid token format, expected admin:{operator}:{passcode} or {passcode}".into()),
    }
}

/// Check a sign-in attempt and return the canonical operator identity.
///
/// With auth disabled the passcode is not checked, but the operator name
/// still has to be on the allowed list.
pub fn authenticate_login(
    config: &AuthConfig,
    username: &str,
    passcode: &str,
) -> Result<CallerIdentity, AppError> {
    if let Some(expected) = &config.passcode {
        if !constant_time_token_eq(passcode, expected.expose()) {
            tracing::warn!("sign-in rejected: incorrect passcode");
            return Err(AppError::Unauthorized("incorrect passcode".into()));
        }
    }
    let user = config.resolve_user(username).ok_or_else(|| {
        tracing::warn!("sign-in rejected: operator not on the allowed list");
        AppError::Forbidden("operator is not on the allowed list".into())
    })?;
    Ok(CallerIdentity::operator(user))
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Validate the bearer credential and inject [`CallerIdentity`].
///
/// When `AuthConfig.passcode` is `None`, all requests are allowed (development
/// mode). An `admin:{operator}:` credential still names the actor then;
/// otherwise the actor is `Admin`.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let config = request.extensions().get::<AuthConfig>().cloned();
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match config {
        Some(config) if config.passcode.is_some() => match auth_header.as_deref() {
            Some(value) if value.starts_with("Bearer ") => {
                match parse_bearer_token(&value[7..], &config) {
                    Ok(identity) => {
                        request.extensions_mut().insert(identity);
                        next.run(request).await
                    }
                    Err(msg) => {
                        tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                        unauthorized_response(&msg)
                    }
                }
            }
            Some(_) => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                unauthorized_response("authorization header must use Bearer scheme")
            }
            None => {
                tracing::warn!("authentication failed: missing authorization header");
                unauthorized_response("missing authorization header")
            }
        },
        other => {
            let user = auth_header
                .as_deref()
                .and_then(|v| v.strip_prefix("Bearer "))
                .and_then(|token| {
                    let mut parts = token.splitn(3, ':');
                    match (parts.next(), parts.next()) {
                        (Some(TOKEN_PREFIX), Some(user)) => Some(user.to_string()),
                        _ => None,
                    }
                })
                .and_then(|user| other.as_ref().and_then(|c| c.resolve_user(&user)))
                .unwrap_or_else(|| DEFAULT_OPERATOR.to_string());
            request
                .extensions_mut()
                .insert(CallerIdentity::operator(user));
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
