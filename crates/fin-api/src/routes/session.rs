//! # Session API
//!
//! Exchanges the admin passcode and an operator name for a bearer
//! credential. There is no server-side session: the credential stays valid
//! until the passcode changes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Json, Router};
use fin_core::{actions, AuditEvent, AuditModule};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::audit::record;
use crate::auth::{authenticate_login, issue_token, AuthConfig};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Sign-in form.
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Operator name, matched case-insensitively.
    pub username: String,
    pub passcode: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("passcode", &"[REDACTED]")
            .finish()
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        Ok(())
    }
}

/// Signed-in operator and the credential to send as `Authorization: Bearer`.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Canonical operator name.
    pub user: String,
    pub token: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Build the session router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/session", post(login))
}

/// POST /v1/session: Passcode sign-in.
#[utoipa::path(
    post,
    path = "/v1/session",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Incorrect passcode", body = crate::error::ErrorBody),
        (status = 403, description = "Operator not allowed", body = crate::error::ErrorBody),
    ),
    tag = "session"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthConfig>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let identity = authenticate_login(&auth, &req.username, &req.passcode)?;

    tracing::info!(actor = %identity.user, "operator signed in");
    record(
        &state,
        AuditEvent::new(AuditModule::Session, actions::LOGIN, &identity.user, &identity.user),
    )
    .await?;

    Ok(Json(LoginResponse {
        token: issue_token(&identity.user, auth.passcode.as_ref()),
        user: identity.user,
    }))
}
