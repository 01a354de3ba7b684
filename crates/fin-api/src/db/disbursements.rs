//! Disbursement persistence. The proof is stored as JSONB.

use chrono::{DateTime, Utc};
use fin_core::{Disbursement, DisbursementId, DisbursementProof, PaymentRequest, RequestId};
use fin_state::RequestTransitionRecord;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::{amount_from_row, method_from_row};

/// Insert a disbursement. The unique `request_id` column rejects a second
/// payout for the same request.
pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    disbursement: &Disbursement,
) -> Result<(), sqlx::Error> {
    let proof = serde_json::to_value(&disbursement.proof).map_err(|e| {
        sqlx::Error::Protocol(format!("failed to serialize disbursement proof: {e}"))
    })?;

    sqlx::query(
        "INSERT INTO disbursements (id, request_id, method, amount_minor, processed_by,
         processed_at, proof, evidence_url)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(disbursement.id.as_uuid())
    .bind(disbursement.request_id.as_uuid())
    .bind(disbursement.method.as_str())
    .bind(disbursement.amount.minor())
    .bind(&disbursement.processed_by)
    .bind(disbursement.processed_at)
    .bind(&proof)
    .bind(&disbursement.evidence_url)
    .execute(executor)
    .await?;

    Ok(())
}

/// Record a payout and move its request to PAID in one transaction.
///
/// Either both rows change or neither does, so a request is never left
/// APPROVED in storage next to its disbursement.
pub async fn insert_and_mark_paid(
    pool: &PgPool,
    disbursement: &Disbursement,
    request: &PaymentRequest,
    transition_log: &[RequestTransitionRecord],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    if !super::requests::update_status(&mut *tx, request, transition_log).await? {
        return Err(sqlx::Error::RowNotFound);
    }
    insert(&mut *tx, disbursement).await?;

    tx.commit().await?;
    Ok(())
}

/// Load every disbursement. Rows whose proof, amount or method no longer
/// parses are skipped.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Disbursement>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DisbursementRow>(
        "SELECT id, request_id, method, amount_minor, processed_by, processed_at, proof,
         evidence_url FROM disbursements ORDER BY processed_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(DisbursementRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct DisbursementRow {
    id: Uuid,
    request_id: Uuid,
    method: String,
    amount_minor: i64,
    processed_by: String,
    processed_at: DateTime<Utc>,
    proof: serde_json::Value,
    evidence_url: Option<String>,
}

impl DisbursementRow {
    fn into_record(self) -> Option<Disbursement> {
        let proof: DisbursementProof = match serde_json::from_value(self.proof) {
            Ok(proof) => proof,
            Err(e) => {
                tracing::warn!(id = %self.id, error = %e, "failed to deserialize disbursement proof, skipping row");
                return None;
            }
        };
        Some(Disbursement {
            id: DisbursementId::from_uuid(self.id),
            request_id: RequestId::from_uuid(self.request_id),
            method: method_from_row("disbursements", self.id, &self.method)?,
            amount: amount_from_row("disbursements", self.id, self.amount_minor)?,
            processed_by: self.processed_by,
            processed_at: self.processed_at,
            proof,
            evidence_url: self.evidence_url,
        })
    }
}
