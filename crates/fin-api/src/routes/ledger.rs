//! # Ledger API
//!
//! Independent income and expense entries plus the monthly summary.
//! Disbursements do not post to the ledger.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use fin_core::{
    actions, ledger_order, now_millis, validate_category, Amount, AuditEvent, AuditModule,
    LedgerSummary, LedgerTransaction, MonthKey, TransactionId, TransactionType,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::audit::record;
use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_query, extract_validated_json, Validate};
use crate::state::AppState;

const MAX_DESCRIPTION_LEN: usize = 500;

/// A new income or expense entry.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Must belong to the category list for `type`.
    pub category: String,
    #[schema(value_type = String, example = "50000.00")]
    pub amount: Amount,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
}

impl Validate for CreateTransactionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.amount.is_zero() {
            return Err("amount must be greater than zero".to_string());
        }
        validate_category(self.kind, self.category.trim()).map_err(|e| e.to_string())?;
        if self.description.trim().chars().count() > MAX_DESCRIPTION_LEN {
            return Err(format!(
                "description must not exceed {MAX_DESCRIPTION_LEN} characters"
            ));
        }
        Ok(())
    }
}

/// Optional `YYYY-MM` month filter.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// Restrict to this month, e.g. `2024-08`.
    pub month: Option<MonthKey>,
}

/// Build the ledger router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/v1/ledger/summary", get(ledger_summary))
}

/// POST /v1/transactions: Record an income or expense entry.
#[utoipa::path(
    post,
    path = "/v1/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Entry recorded", body = LedgerTransaction),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn create_transaction(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LedgerTransaction>), AppError> {
    let req = extract_validated_json(body)?;
    let category = validate_category(req.kind, req.category.trim())?;

    let entry = LedgerTransaction {
        id: TransactionId::new(),
        kind: req.kind,
        category: category.to_string(),
        amount: req.amount,
        description: req.description.trim().to_string(),
        date: req.date,
        recorded_by: caller.user.clone(),
        recorded_at: now_millis(),
    };
    let id = *entry.id.as_uuid();
    state.transactions.insert(id, entry.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::transactions::insert(pool, &entry).await {
            tracing::error!(transaction_id = %id, error = %e, "failed to persist ledger entry to database");
            return Err(AppError::Internal(
                "ledger entry recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(
        transaction_id = %id,
        actor = %caller.user,
        kind = %entry.kind,
        category = %entry.category,
        amount = %entry.amount,
        "ledger entry recorded"
    );
    record(
        &state,
        AuditEvent::new(AuditModule::Ledger, actions::RECORD_TRANSACTION, id, &caller.user),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /v1/transactions: Entries, newest date first.
#[utoipa::path(
    get,
    path = "/v1/transactions",
    params(("month" = Option<String>, Query, description = "Month filter, YYYY-MM")),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<LedgerTransaction>),
        (status = 422, description = "Malformed month", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn list_transactions(
    State(state): State<AppState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Vec<LedgerTransaction>>, AppError> {
    let query = extract_query(query)?;
    let mut entries: Vec<LedgerTransaction> = state
        .transactions
        .list()
        .into_iter()
        .filter(|t| query.month.map_or(true, |m| m.contains_date(&t.date)))
        .collect();
    ledger_order(&mut entries);
    Ok(Json(entries))
}

/// GET /v1/ledger/summary: Income, expense and balance.
#[utoipa::path(
    get,
    path = "/v1/ledger/summary",
    params(("month" = Option<String>, Query, description = "Month filter, YYYY-MM")),
    responses(
        (status = 200, description = "Ledger totals", body = LedgerSummary),
        (status = 422, description = "Malformed month", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn ledger_summary(
    State(state): State<AppState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<LedgerSummary>, AppError> {
    let query = extract_query(query)?;
    let entries = state.transactions.list();
    let summary = match query.month {
        Some(month) => LedgerSummary::for_month(&entries, month),
        None => LedgerSummary::from_transactions(&entries),
    };
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: &str, category: &str, amount: &str) -> CreateTransactionRequest {
        serde_json::from_value(serde_json::json!({
            "type": kind,
            "category": category,
            "amount": amount,
            "date": "2024-08-15"
        }))
        .unwrap()
    }

    #[test]
    fn category_must_match_type() {
        assert!(entry("INCOME", "Tithes", "100").validate().is_ok());
        assert!(entry("EXPENSE", "Tithes", "100").validate().is_err());
    }

    #[test]
    fn zero_amount_rejected() {
        assert!(entry("INCOME", "Tithes", "0").validate().is_err());
    }

    #[test]
    fn month_query_parses() {
        let q: MonthQuery = serde_json::from_value(serde_json::json!({ "month": "2024-08" })).unwrap();
        assert_eq!(q.month, Some(MonthKey::new(2024, 8).unwrap()));
        assert!(serde_json::from_value::<MonthQuery>(serde_json::json!({ "month": "2024-13" })).is_err());
    }
}
