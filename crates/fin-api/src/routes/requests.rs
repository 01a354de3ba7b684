//! # Fund Request API
//!
//! Staff submit requests and look up their status without credentials.
//! Reviewers list, inspect, approve and reject them behind the admin
//! passcode. Every transition runs through [`RequestLifecycle`] under the
//! request's write lock, so a request can never be decided twice.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use fin_core::{
    actions, now_millis, review_order, validate_department, Amount, AuditEvent, AuditModule,
    BankDetails, PaymentMethod, PaymentRequest, RequestId, RequestStatus, SYSTEM_ACTOR,
};
use fin_state::{RequestLifecycle, RequestTransitionRecord};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::audit::record;
use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_query, extract_validated_json, required_text, Validate};
use crate::state::AppState;

const MAX_NAME_LEN: usize = 120;
const MAX_PURPOSE_LEN: usize = 1000;
const MAX_REASON_LEN: usize = 1000;

// -- DTOs ---------------------------------------------------------------------

/// A staff member's request for funds.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitRequest {
    pub requester_name: String,
    /// Must be one of the catalog departments.
    pub department: String,
    /// Decimal string or number, greater than zero.
    #[schema(value_type = String, example = "15000.00")]
    pub amount: Amount,
    pub purpose: String,
    pub method: PaymentMethod,
    #[schema(value_type = String, format = Date)]
    pub date_needed: NaiveDate,
    #[serde(default)]
    pub attachment_url: Option<String>,
    /// Required with an account number for BANK_TRANSFER and POS.
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
}

impl Validate for SubmitRequest {
    fn validate(&self) -> Result<(), String> {
        required_text("requester_name", &self.requester_name, MAX_NAME_LEN)?;
        required_text("purpose", &self.purpose, MAX_PURPOSE_LEN)?;
        validate_department(self.department.trim()).map_err(|e| e.to_string())?;
        if self.amount.is_zero() {
            return Err("amount must be greater than zero".to_string());
        }
        if self.method.is_electronic() {
            let has_account = self
                .bank_details
                .as_ref()
                .and_then(|b| b.account_number.as_deref())
                .is_some_and(|n| !n.trim().is_empty());
            if !has_account {
                return Err(format!(
                    "bank_details.account_number is required for {}",
                    self.method
                ));
            }
        }
        Ok(())
    }
}

/// Reason for turning a request down.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub reason: String,
}

impl Validate for RejectRequest {
    fn validate(&self) -> Result<(), String> {
        required_text("reason", &self.reason, MAX_REASON_LEN)
    }
}

/// Filter for the review list.
#[derive(Debug, Default, Deserialize)]
pub struct ListRequestsQuery {
    /// Only return requests in this status.
    pub status: Option<RequestStatus>,
}

/// Public view of a request. Bank details are withheld.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestStatusView {
    #[schema(value_type = String, format = Uuid)]
    pub id: RequestId,
    pub requester_name: String,
    pub department: String,
    #[schema(value_type = String)]
    pub amount: Amount,
    pub purpose: String,
    pub method: PaymentMethod,
    #[schema(value_type = String, format = Date)]
    pub date_needed: NaiveDate,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentRequest> for RequestStatusView {
    fn from(r: PaymentRequest) -> Self {
        Self {
            id: r.id,
            requester_name: r.requester_name,
            department: r.department,
            amount: r.amount,
            purpose: r.purpose,
            method: r.method,
            date_needed: r.date_needed,
            status: r.status,
            rejection_reason: r.rejection_reason,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// One recorded status change.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransitionEntry {
    pub from: RequestStatus,
    pub to: RequestStatus,
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<RequestTransitionRecord> for TransitionEntry {
    fn from(r: RequestTransitionRecord) -> Self {
        Self {
            from: r.from,
            to: r.to,
            actor: r.actor,
            reason: r.reason,
            timestamp: r.timestamp,
        }
    }
}

// -- Router -------------------------------------------------------------------

/// Unauthenticated routes: submission and status lookup.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/v1/requests", post(submit_request))
        .route("/v1/requests/:id/status", get(request_status))
}

/// Reviewer routes, mounted behind the auth middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/requests", get(list_requests))
        .route("/v1/requests/:id", get(get_request))
        .route("/v1/requests/:id/history", get(request_history))
        .route("/v1/requests/:id/approve", post(approve_request))
        .route("/v1/requests/:id/reject", post(reject_request))
}

// -- Handlers -----------------------------------------------------------------

/// POST /v1/requests: Submit a fund request.
#[utoipa::path(
    post,
    path = "/v1/requests",
    request_body = SubmitRequest,
    responses(
        (status = 201, description = "Request submitted", body = PaymentRequest),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
pub(crate) async fn submit_request(
    State(state): State<AppState>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentRequest>), AppError> {
    let req = extract_validated_json(body)?;
    let now = now_millis();
    let department = validate_department(req.department.trim())?;

    let request = PaymentRequest {
        id: RequestId::new(),
        requester_name: req.requester_name.trim().to_string(),
        department: department.to_string(),
        amount: req.amount,
        purpose: req.purpose.trim().to_string(),
        method: req.method,
        date_needed: req.date_needed,
        attachment_url: req
            .attachment_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty()),
        status: RequestStatus::Pending,
        rejection_reason: None,
        bank_details: req.bank_details.unwrap_or_default().normalized(),
        created_at: now,
        updated_at: now,
    };

    let id = *request.id.as_uuid();
    state.requests.insert(id, request.clone());
    state.request_history.insert(id, Vec::new());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::requests::insert(pool, &request).await {
            tracing::error!(request_id = %id, error = %e, "failed to persist request to database");
            return Err(AppError::Internal(
                "request stored in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(
        request_id = %id,
        department = %request.department,
        method = %request.method,
        amount = %request.amount,
        "fund request submitted"
    );
    record(
        &state,
        AuditEvent::new(AuditModule::Requests, actions::SUBMIT_REQUEST, id, SYSTEM_ACTOR),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /v1/requests/{id}/status: Public status lookup.
#[utoipa::path(
    get,
    path = "/v1/requests/{id}/status",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request status", body = RequestStatusView),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
pub(crate) async fn request_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestStatusView>, AppError> {
    state
        .requests
        .get(&id)
        .map(|r| Json(r.into()))
        .ok_or_else(|| AppError::NotFound(format!("request {id} not found")))
}

/// GET /v1/requests: Review list: pending first, then newest first.
#[utoipa::path(
    get,
    path = "/v1/requests",
    params(
        ("status" = Option<String>, Query, description = "PENDING, APPROVED, REJECTED or PAID"),
    ),
    responses(
        (status = 200, description = "Requests in review order", body = Vec<PaymentRequest>),
        (status = 422, description = "Unknown status filter", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
pub(crate) async fn list_requests(
    State(state): State<AppState>,
    query: Result<Query<ListRequestsQuery>, QueryRejection>,
) -> Result<Json<Vec<PaymentRequest>>, AppError> {
    let query = extract_query(query)?;
    let mut requests: Vec<PaymentRequest> = state
        .requests
        .list()
        .into_iter()
        .filter(|r| query.status.map_or(true, |s| r.status == s))
        .collect();
    review_order(&mut requests);
    Ok(Json(requests))
}

/// GET /v1/requests/{id}: Full request including bank details.
#[utoipa::path(
    get,
    path = "/v1/requests/{id}",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request found", body = PaymentRequest),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
pub(crate) async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentRequest>, AppError> {
    state
        .requests
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("request {id} not found")))
}

/// GET /v1/requests/{id}/history: Status changes, oldest first.
#[utoipa::path(
    get,
    path = "/v1/requests/{id}/history",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Transition history", body = Vec<TransitionEntry>),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
pub(crate) async fn request_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TransitionEntry>>, AppError> {
    if state.requests.get(&id).is_none() {
        return Err(AppError::NotFound(format!("request {id} not found")));
    }
    let log = state.request_history.get(&id).unwrap_or_default();
    Ok(Json(log.into_iter().map(TransitionEntry::from).collect()))
}

/// POST /v1/requests/{id}/approve: PENDING → APPROVED.
#[utoipa::path(
    post,
    path = "/v1/requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request approved", body = PaymentRequest),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Request already decided", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
pub(crate) async fn approve_request(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentRequest>, AppError> {
    let (request, log, ()) =
        apply_transition(&state, id, |r| Ok((r.approve(&caller.user)?, ())))?;
    persist_transition(&state, &request, &log).await?;

    tracing::info!(request_id = %id, actor = %caller.user, status = %request.status.as_str(), "request approved");
    record(
        &state,
        AuditEvent::new(AuditModule::Requests, actions::APPROVE_REQUEST, id, &caller.user),
    )
    .await?;

    Ok(Json(request))
}

/// POST /v1/requests/{id}/reject: PENDING → REJECTED with a reason.
#[utoipa::path(
    post,
    path = "/v1/requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Request rejected", body = PaymentRequest),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Request already decided", body = crate::error::ErrorBody),
        (status = 422, description = "Missing reason", body = crate::error::ErrorBody),
    ),
    tag = "requests"
)]
pub(crate) async fn reject_request(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<RejectRequest>, JsonRejection>,
) -> Result<Json<PaymentRequest>, AppError> {
    let req = extract_validated_json(body)?;
    let (request, log, ()) =
        apply_transition(&state, id, |r| Ok((r.reject(&caller.user, &req.reason)?, ())))?;
    persist_transition(&state, &request, &log).await?;

    tracing::info!(request_id = %id, actor = %caller.user, status = %request.status.as_str(), "request rejected");
    record(
        &state,
        AuditEvent::new(AuditModule::Requests, actions::REJECT_REQUEST, id, &caller.user),
    )
    .await?;

    Ok(Json(request))
}

// -- Helpers ------------------------------------------------------------------

/// Run `transition` on request `id` under its write lock and append the
/// resulting record to the history while the lock is still held.
///
/// Lock order is always `requests` then `request_history`.
pub(crate) fn apply_transition<R>(
    state: &AppState,
    id: Uuid,
    transition: impl FnOnce(&mut PaymentRequest) -> Result<(RequestTransitionRecord, R), AppError>,
) -> Result<(PaymentRequest, Vec<RequestTransitionRecord>, R), AppError> {
    state
        .requests
        .try_update(&id, |request| {
            let (entry, extra) = transition(request)?;
            let log = state
                .request_history
                .update(&id, |log| log.push(entry.clone()))
                .unwrap_or_else(|| {
                    let log = vec![entry];
                    state.request_history.insert(id, log.clone());
                    log
                });
            Ok((request.clone(), log, extra))
        })
        .ok_or_else(|| AppError::NotFound(format!("request {id} not found")))?
}

/// Write a transition through to the database.
pub(crate) async fn persist_transition(
    state: &AppState,
    request: &PaymentRequest,
    log: &[RequestTransitionRecord],
) -> Result<(), AppError> {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::requests::update_status(pool, request, log).await {
            tracing::error!(request_id = %request.id, error = %e, "failed to persist request transition to database");
            return Err(AppError::Internal(
                "request transition applied in-memory but database persist failed".to_string(),
            ));
        }
    }
    Ok(())
}
