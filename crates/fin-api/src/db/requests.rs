//! Fund request persistence.
//!
//! Lifecycle rules are enforced in `fin-state`, not in SQL. The transition
//! history is stored alongside the request as a JSONB log.

use chrono::{DateTime, NaiveDate, Utc};
use fin_core::{BankDetails, PaymentRequest, RequestId, RequestStatus};
use fin_state::RequestTransitionRecord;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::{amount_from_row, method_from_row};

/// Insert a newly submitted request.
pub async fn insert(pool: &PgPool, request: &PaymentRequest) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO payment_requests (id, requester_name, department, amount_minor, purpose,
         method, date_needed, attachment_url, status, rejection_reason, bank_name, account_name,
         account_number, transition_log, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, '[]'::jsonb, $14, $15)",
    )
    .bind(request.id.as_uuid())
    .bind(&request.requester_name)
    .bind(&request.department)
    .bind(request.amount.minor())
    .bind(&request.purpose)
    .bind(request.method.as_str())
    .bind(request.date_needed)
    .bind(&request.attachment_url)
    .bind(request.status.as_str())
    .bind(&request.rejection_reason)
    .bind(&request.bank_details.bank_name)
    .bind(&request.bank_details.account_name)
    .bind(&request.bank_details.account_number)
    .bind(request.created_at)
    .bind(request.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update status, rejection reason and transition log after a transition.
pub async fn update_status<'e, E: PgExecutor<'e>>(
    executor: E,
    request: &PaymentRequest,
    transition_log: &[RequestTransitionRecord],
) -> Result<bool, sqlx::Error> {
    let log_json = serde_json::to_value(transition_log).map_err(|e| {
        sqlx::Error::Protocol(format!("failed to serialize request transition_log: {e}"))
    })?;

    let result = sqlx::query(
        "UPDATE payment_requests SET status = $1, rejection_reason = $2, transition_log = $3,
         updated_at = $4 WHERE id = $5",
    )
    .bind(request.status.as_str())
    .bind(&request.rejection_reason)
    .bind(&log_json)
    .bind(request.updated_at)
    .bind(request.id.as_uuid())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load every request with its transition log. Rows with a corrupt amount
/// or an unknown payment method are skipped.
pub async fn load_all(
    pool: &PgPool,
) -> Result<Vec<(PaymentRequest, Vec<RequestTransitionRecord>)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RequestRow>(
        "SELECT id, requester_name, department, amount_minor, purpose, method, date_needed,
         attachment_url, status, rejection_reason, bank_name, account_name, account_number,
         transition_log, created_at, updated_at
         FROM payment_requests ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(RequestRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    requester_name: String,
    department: String,
    amount_minor: i64,
    purpose: String,
    method: String,
    date_needed: NaiveDate,
    attachment_url: Option<String>,
    status: Option<String>,
    rejection_reason: Option<String>,
    bank_name: Option<String>,
    account_name: Option<String>,
    account_number: Option<String>,
    transition_log: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RequestRow {
    fn into_record(self) -> Option<(PaymentRequest, Vec<RequestTransitionRecord>)> {
        let status = self
            .status
            .as_deref()
            .map(|raw| {
                RequestStatus::from_name(raw).unwrap_or_else(|| {
                    tracing::warn!(id = %self.id, status = %raw, "unknown request status in database, defaulting to PENDING");
                    RequestStatus::Pending
                })
            })
            .unwrap_or_default();

        let transition_log: Vec<RequestTransitionRecord> =
            serde_json::from_value(self.transition_log.clone()).unwrap_or_else(|e| {
                tracing::warn!(
                    id = %self.id,
                    error = %e,
                    "failed to deserialize request transition_log, defaulting to empty"
                );
                Vec::new()
            });

        let request = PaymentRequest {
            id: RequestId::from_uuid(self.id),
            amount: amount_from_row("payment_requests", self.id, self.amount_minor)?,
            method: method_from_row("payment_requests", self.id, &self.method)?,
            requester_name: self.requester_name,
            department: self.department,
            purpose: self.purpose,
            date_needed: self.date_needed,
            attachment_url: self.attachment_url,
            status,
            rejection_reason: self.rejection_reason,
            bank_details: BankDetails {
                bank_name: self.bank_name,
                account_name: self.account_name,
                account_number: self.account_number,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        Some((request, transition_log))
    }
}
