//! Audit log persistence: one row per chain entry.
//!
//! Hashes are computed in memory by [`fin_core::AuditLogEntry::chain`];
//! this module only stores and reloads them. Loaded entries are verified by
//! the caller.

use chrono::{DateTime, Utc};
use fin_core::{AuditLogEntry, AuditLogId, AuditModule};
use sqlx::PgPool;
use uuid::Uuid;

/// Append an entry.
pub async fn insert(pool: &PgPool, entry: &AuditLogEntry) -> Result<(), sqlx::Error> {
    let sequence = i64::try_from(entry.sequence)
        .map_err(|_| sqlx::Error::Protocol(format!("audit sequence {} out of range", entry.sequence)))?;

    sqlx::query(
        "INSERT INTO audit_log (id, sequence, action, module, record_id, occurred_at, actor,
         previous_hash, entry_hash)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(entry.id.as_uuid())
    .bind(sequence)
    .bind(&entry.action)
    .bind(entry.module.as_str())
    .bind(&entry.record_id)
    .bind(entry.timestamp)
    .bind(&entry.user)
    .bind(&entry.previous_hash)
    .bind(&entry.entry_hash)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the whole chain in sequence order.
pub async fn load_all(pool: &PgPool) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AuditRow>(
        "SELECT id, sequence, action, module, record_id, occurred_at, actor, previous_hash,
         entry_hash FROM audit_log ORDER BY sequence",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(AuditRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    sequence: i64,
    action: String,
    module: String,
    record_id: String,
    occurred_at: DateTime<Utc>,
    actor: String,
    previous_hash: String,
    entry_hash: String,
}

impl AuditRow {
    /// A malformed audit row fails the whole load.
    fn into_record(self) -> Result<AuditLogEntry, sqlx::Error> {
        let module: AuditModule = self
            .module
            .parse()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let sequence = u64::try_from(self.sequence).map_err(|_| {
            sqlx::Error::Protocol(format!("negative audit sequence {}", self.sequence))
        })?;
        Ok(AuditLogEntry {
            id: AuditLogId::from_uuid(self.id),
            sequence,
            action: self.action,
            module,
            record_id: self.record_id,
            timestamp: self.occurred_at,
            user: self.actor,
            previous_hash: self.previous_hash,
            entry_hash: self.entry_hash,
        })
    }
}
