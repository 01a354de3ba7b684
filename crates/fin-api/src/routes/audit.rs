//! # Audit Log API
//!
//! Read access to the hash-chained action log and on-demand verification.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use fin_core::{AuditLogEntry, ChainVerification, MonthKey};

use crate::error::AppError;
use crate::extractors::extract_query;
use crate::routes::ledger::MonthQuery;
use crate::state::AppState;

/// Build the audit router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/audit-logs", get(list_audit_logs))
        .route("/v1/audit-logs/verify", get(verify_audit_logs))
}

/// Entries logged in `month` (or all of them), newest first.
pub(crate) fn entries_newest_first(state: &AppState, month: Option<MonthKey>) -> Vec<AuditLogEntry> {
    let mut entries: Vec<AuditLogEntry> = state
        .audit
        .entries()
        .into_iter()
        .filter(|e| month.map_or(true, |m| m.contains_timestamp(&e.timestamp)))
        .collect();
    entries.reverse();
    entries
}

/// GET /v1/audit-logs: Action log, newest first.
#[utoipa::path(
    get,
    path = "/v1/audit-logs",
    params(("month" = Option<String>, Query, description = "Month filter, YYYY-MM")),
    responses(
        (status = 200, description = "Audit entries", body = Vec<AuditLogEntry>),
        (status = 422, description = "Malformed month", body = crate::error::ErrorBody),
    ),
    tag = "audit"
)]
pub(crate) async fn list_audit_logs(
    State(state): State<AppState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Vec<AuditLogEntry>>, AppError> {
    let query = extract_query(query)?;
    Ok(Json(entries_newest_first(&state, query.month)))
}

/// GET /v1/audit-logs/verify: Recompute every hash link.
#[utoipa::path(
    get,
    path = "/v1/audit-logs/verify",
    responses(
        (status = 200, description = "Chain verification result", body = ChainVerification),
    ),
    tag = "audit"
)]
pub(crate) async fn verify_audit_logs(State(state): State<AppState>) -> Json<ChainVerification> {
    let verification = state.audit.verify();
    if !verification.valid {
        tracing::error!(
            first_broken_sequence = ?verification.first_broken_sequence,
            total_entries = verification.total_entries,
            "audit chain verification failed"
        );
    }
    Json(verification)
}
