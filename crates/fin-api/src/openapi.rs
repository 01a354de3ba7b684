//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TRH Finance API",
        version = "0.3.0",
        description = "Fund requests, approvals, disbursements, the income/expense ledger and the hash-chained audit log.",
        license(name = "BUSL-1.1")
    ),
    paths(
        // Catalog
        crate::routes::catalog::catalog,
        // Requests
        crate::routes::requests::submit_request,
        crate::routes::requests::request_status,
        crate::routes::requests::list_requests,
        crate::routes::requests::get_request,
        crate::routes::requests::request_history,
        crate::routes::requests::approve_request,
        crate::routes::requests::reject_request,
        // Session
        crate::routes::session::login,
        // Disbursements
        crate::routes::disbursements::disbursement_queue,
        crate::routes::disbursements::create_disbursement,
        crate::routes::disbursements::list_disbursements,
        // Ledger
        crate::routes::ledger::create_transaction,
        crate::routes::ledger::list_transactions,
        crate::routes::ledger::ledger_summary,
        // Audit
        crate::routes::audit::list_audit_logs,
        crate::routes::audit::verify_audit_logs,
        // Dashboard
        crate::routes::dashboard::dashboard,
    ),
    components(schemas(
        // Domain records
        fin_core::PaymentRequest,
        fin_core::BankDetails,
        fin_core::PaymentMethod,
        fin_core::RequestStatus,
        fin_core::Disbursement,
        fin_core::DisbursementProof,
        fin_core::SignatureImage,
        fin_core::LedgerTransaction,
        fin_core::TransactionType,
        fin_core::LedgerSummary,
        fin_core::DashboardStats,
        fin_core::ChannelBreakdown,
        fin_core::AuditLogEntry,
        fin_core::AuditModule,
        fin_core::ChainVerification,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // DTOs
        crate::routes::catalog::CatalogResponse,
        crate::routes::requests::SubmitRequest,
        crate::routes::requests::RejectRequest,
        crate::routes::requests::RequestStatusView,
        crate::routes::requests::TransitionEntry,
        crate::routes::session::LoginRequest,
        crate::routes::session::LoginResponse,
        crate::routes::disbursements::CreateDisbursementRequest,
        crate::routes::disbursements::DisbursementView,
        crate::routes::ledger::CreateTransactionRequest,
        crate::routes::dashboard::DashboardResponse,
    )),
    tags(
        (name = "catalog", description = "Reference lists"),
        (name = "requests", description = "Fund request submission and review"),
        (name = "session", description = "Operator sign-in"),
        (name = "disbursements", description = "Payouts against approved requests"),
        (name = "ledger", description = "Income and expense entries"),
        (name = "audit", description = "Hash-chained action log"),
        (name = "dashboard", description = "Headline figures"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
