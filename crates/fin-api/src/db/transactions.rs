//! Ledger transaction persistence.

use chrono::{DateTime, NaiveDate, Utc};
use fin_core::{LedgerTransaction, TransactionId, TransactionType};
use sqlx::PgPool;
use uuid::Uuid;

use super::amount_from_row;

/// Insert a ledger entry.
pub async fn insert(pool: &PgPool, entry: &LedgerTransaction) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO ledger_transactions (id, kind, category, amount_minor, description,
         value_date, recorded_by, recorded_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(entry.id.as_uuid())
    .bind(entry.kind.as_str())
    .bind(&entry.category)
    .bind(entry.amount.minor())
    .bind(&entry.description)
    .bind(entry.date)
    .bind(&entry.recorded_by)
    .bind(entry.recorded_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every ledger entry. Rows with an unknown kind are skipped, since
/// guessing the sign of a transaction would corrupt the balance.
pub async fn load_all(pool: &PgPool) -> Result<Vec<LedgerTransaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, kind, category, amount_minor, description, value_date, recorded_by,
         recorded_at FROM ledger_transactions ORDER BY value_date, recorded_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(TransactionRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    kind: String,
    category: String,
    amount_minor: i64,
    description: String,
    value_date: NaiveDate,
    recorded_by: String,
    recorded_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_record(self) -> Option<LedgerTransaction> {
        let Some(kind) = TransactionType::from_name(&self.kind) else {
            tracing::warn!(id = %self.id, kind = %self.kind, "unknown transaction type in database, skipping row");
            return None;
        };
        Some(LedgerTransaction {
            id: TransactionId::from_uuid(self.id),
            kind,
            amount: amount_from_row("ledger_transactions", self.id, self.amount_minor)?,
            category: self.category,
            description: self.description,
            date: self.value_date,
            recorded_by: self.recorded_by,
            recorded_at: self.recorded_at,
        })
    }
}
