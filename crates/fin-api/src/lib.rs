//! # fin-api: Axum API Service for the TRH Finance Stack
//!
//! Staff submit fund requests; operators approve or reject them, pay them
//! out, keep the income/expense ledger and read the audit log.
//!
//! ## API Surface
//!
//! | Prefix                  | Module                      | Access |
//! |-------------------------|-----------------------------|--------|
//! | `/v1/catalog`           | [`routes::catalog`]         | public |
//! | `/v1/requests` (POST), `/v1/requests/{id}/status` | [`routes::requests`] | public |
//! | `/v1/session`           | [`routes::session`]         | public |
//! | `/v1/requests/*`        | [`routes::requests`]        | admin  |
//! | `/v1/disbursements/*`   | [`routes::disbursements`]   | admin  |
//! | `/v1/transactions`, `/v1/ledger/*` | [`routes::ledger`] | admin |
//! | `/v1/audit-logs/*`      | [`routes::audit`]           | admin  |
//! | `/v1/dashboard`         | [`routes::dashboard`]       | admin  |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → [AuthMiddleware, admin routes only] → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Generated via utoipa derive macros at `/openapi.json`.

pub mod audit;
pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Router};
use fin_core::RequestStatus;
use prometheus::{Encoder, TextEncoder};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside every middleware layer.
/// Admin routes carry the auth middleware as a route layer, so unknown
/// paths still answer 404 rather than 401.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        passcode: state.config.admin_passcode.clone(),
        allowed_users: Arc::new(state.config.allowed_users.clone()),
    };
    let metrics = ApiMetrics::new();

    let admin = Router::new()
        .merge(routes::requests::router())
        .merge(routes::disbursements::router())
        .merge(routes::ledger::router())
        .merge(routes::audit::router())
        .merge(routes::dashboard::router())
        .route_layer(from_fn(auth::auth_middleware));

    let public = Router::new()
        .merge(routes::catalog::router())
        .merge(routes::requests::public_router())
        .merge(routes::session::router())
        .merge(openapi::router())
        .route("/metrics", get(metrics_endpoint));

    let api = Router::new()
        .merge(public)
        .merge(admin)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .layer(Extension(metrics))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

/// GET /metrics: Prometheus scrape endpoint.
///
/// Refreshes the store gauges from `AppState`, then encodes the registry.
async fn metrics_endpoint(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> Response {
    let requests = state.requests.list();
    let by_status = metrics.requests_by_status();
    by_status.reset();
    for status in [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Paid,
        RequestStatus::Rejected,
    ] {
        let count = requests.iter().filter(|r| r.status == status).count();
        by_status
            .with_label_values(&[status.as_str()])
            .set(count as f64);
    }
    metrics.ledger_entries().set(state.transactions.len() as f64);
    metrics.audit_entries().set(state.audit.len() as f64);

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}
