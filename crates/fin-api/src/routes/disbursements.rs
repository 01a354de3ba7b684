//! # Disbursement API
//!
//! Pays out approved requests. Creating a disbursement validates the proof
//! and moves the request APPROVED → PAID in one step under the request's
//! write lock; the payout record is stored only if both succeed.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use fin_core::{
    actions, now_millis, Amount, AuditEvent, AuditModule, Disbursement, PaymentMethod,
    PaymentRequest, RequestStatus,
};
use fin_state::{DisbursementDraft, RequestLifecycle};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::audit::record;
use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::requests::apply_transition;
use crate::state::AppState;

/// Requester shown for payouts whose request no longer exists.
pub const UNKNOWN_REQUESTER: &str = "Unknown";

/// Operator input for paying out an approved request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDisbursementRequest {
    pub request_id: Uuid,
    /// Must equal the request amount when given.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub amount: Option<Amount>,
    /// Must equal the request method when given.
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    /// Bank or terminal reference. Required for BANK_TRANSFER and POS.
    #[serde(default)]
    pub transaction_ref: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    /// Defaults to the requester name for CASH.
    #[serde(default)]
    pub receiver_name: Option<String>,
    /// `data:image/png;base64,...` signature. Required for CASH.
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub evidence_url: Option<String>,
}

impl Validate for CreateDisbursementRequest {
    fn validate(&self) -> Result<(), String> {
        if self.request_id.is_nil() {
            return Err("request_id must not be nil".to_string());
        }
        Ok(())
    }
}

impl CreateDisbursementRequest {
    fn into_draft(self) -> DisbursementDraft {
        DisbursementDraft {
            amount: self.amount,
            method: self.method,
            transaction_ref: self.transaction_ref,
            bank_name: self.bank_name,
            account_number: self.account_number,
            receiver_name: self.receiver_name,
            signature: self.signature,
            evidence_url: self.evidence_url,
        }
    }
}

/// A payout with the name of the person it was paid to.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DisbursementView {
    #[serde(flatten)]
    pub disbursement: Disbursement,
    pub requester_name: String,
}

/// Build the disbursement router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/disbursements",
            get(list_disbursements).post(create_disbursement),
        )
        .route("/v1/disbursements/queue", get(disbursement_queue))
}

/// GET /v1/disbursements/queue: Approved requests awaiting payment.
#[utoipa::path(
    get,
    path = "/v1/disbursements/queue",
    responses(
        (status = 200, description = "Approved requests, most urgent first", body = Vec<PaymentRequest>),
    ),
    tag = "disbursements"
)]
pub(crate) async fn disbursement_queue(State(state): State<AppState>) -> Json<Vec<PaymentRequest>> {
    let mut queue: Vec<PaymentRequest> = state
        .requests
        .list()
        .into_iter()
        .filter(|r| r.status == RequestStatus::Approved)
        .collect();
    queue.sort_by(|a, b| {
        a.date_needed
            .cmp(&b.date_needed)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    Json(queue)
}

/// POST /v1/disbursements: Pay out an approved request.
#[utoipa::path(
    post,
    path = "/v1/disbursements",
    request_body = CreateDisbursementRequest,
    responses(
        (status = 201, description = "Disbursement recorded, request marked PAID", body = Disbursement),
        (status = 404, description = "Request not found", body = crate::error::ErrorBody),
        (status = 409, description = "Request is not APPROVED", body = crate::error::ErrorBody),
        (status = 422, description = "Proof missing or inconsistent", body = crate::error::ErrorBody),
    ),
    tag = "disbursements"
)]
pub(crate) async fn create_disbursement(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateDisbursementRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Disbursement>), AppError> {
    let req = extract_validated_json(body)?;
    let request_id = req.request_id;
    let draft = req.into_draft();

    let (request, log, disbursement) = apply_transition(&state, request_id, |r| {
        let disbursement = draft.finalize(r, &caller.user, now_millis())?;
        let entry = r.mark_paid(&caller.user)?;
        Ok((entry, disbursement))
    })?;
    state
        .disbursements
        .insert(*disbursement.id.as_uuid(), disbursement.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) =
            crate::db::disbursements::insert_and_mark_paid(pool, &disbursement, &request, &log).await
        {
            tracing::error!(
                request_id = %request_id,
                disbursement_id = %disbursement.id,
                error = %e,
                "failed to persist disbursement to database"
            );
            return Err(AppError::Internal(
                "disbursement recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(
        request_id = %request_id,
        disbursement_id = %disbursement.id,
        actor = %caller.user,
        method = %disbursement.method,
        amount = %disbursement.amount,
        "request disbursed"
    );
    record(
        &state,
        AuditEvent::new(AuditModule::Disbursements, actions::DISBURSE, request_id, &caller.user),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(disbursement)))
}

/// GET /v1/disbursements: Payout history, newest first.
#[utoipa::path(
    get,
    path = "/v1/disbursements",
    responses(
        (status = 200, description = "Disbursement history", body = Vec<DisbursementView>),
    ),
    tag = "disbursements"
)]
pub(crate) async fn list_disbursements(State(state): State<AppState>) -> Json<Vec<DisbursementView>> {
    let mut history = state.disbursements.list();
    history.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));
    let views = history
        .into_iter()
        .map(|d| {
            let requester_name = state
                .requests
                .get(d.request_id.as_uuid())
                .map(|r| r.requester_name)
                .unwrap_or_else(|| UNKNOWN_REQUESTER.to_string());
            DisbursementView {
                disbursement: d,
                requester_name,
            }
        })
        .collect();
    Json(views)
}
