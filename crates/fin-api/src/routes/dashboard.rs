//! # Dashboard API
//!
//! Headline figures plus the audit entries for one month.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use fin_core::{AuditLogEntry, DashboardStats, MonthKey};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_query;
use crate::routes::audit::entries_newest_first;
use crate::state::AppState;

/// Month for the audit panel. Defaults to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub audit_month: Option<MonthKey>,
}

/// Dashboard payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    #[schema(value_type = String, example = "2024-08")]
    pub audit_month: MonthKey,
    /// Audit entries in `audit_month`, newest first.
    pub recent_audit: Vec<AuditLogEntry>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/dashboard", get(dashboard))
}

/// GET /v1/dashboard: Totals, pending count, paid-by-channel and audit panel.
#[utoipa::path(
    get,
    path = "/v1/dashboard",
    params(("audit_month" = Option<String>, Query, description = "Month for the audit panel, YYYY-MM (default: current)")),
    responses(
        (status = 200, description = "Dashboard figures", body = DashboardResponse),
        (status = 422, description = "Malformed month", body = crate::error::ErrorBody),
    ),
    tag = "dashboard"
)]
pub(crate) async fn dashboard(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardResponse>, AppError> {
    let query = extract_query(query)?;
    let audit_month = query.audit_month.unwrap_or_else(MonthKey::current);

    let transactions = state.transactions.list();
    let requests = state.requests.list();
    let stats = DashboardStats::compute(&transactions, &requests);

    Ok(Json(DashboardResponse {
        stats,
        audit_month,
        recent_audit: entries_newest_first(&state, Some(audit_month)),
    }))
}
