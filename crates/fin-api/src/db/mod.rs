//! # Database Persistence Layer
//!
//! Postgres persistence via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, every
//! mutation is written through to PostgreSQL and the in-memory stores are
//! hydrated from it on startup. When absent, the API runs in-memory only
//! (development and tests).
//!
//! Persisted tables:
//!
//! - `payment_requests` with their transition log
//! - `disbursements`
//! - `ledger_transactions`
//! - `audit_log` (hash chain, one row per entry)

pub mod audit;
pub mod disbursements;
pub mod requests;
pub mod transactions;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set, running in-memory only. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Convert a stored minor-unit amount. `None` (with a warning) for a value
/// no `Amount` can hold; the caller skips the row.
pub(crate) fn amount_from_row(table: &str, id: uuid::Uuid, minor: i64) -> Option<fin_core::Amount> {
    match fin_core::Amount::from_minor(minor) {
        Ok(amount) => Some(amount),
        Err(e) => {
            tracing::warn!(table, id = %id, amount_minor = minor, error = %e, "invalid amount in database, skipping row");
            None
        }
    }
}

/// Parse a stored payment method. `None` (with a warning) for an unknown
/// name; the caller skips the row.
pub(crate) fn method_from_row(table: &str, id: uuid::Uuid, raw: &str) -> Option<fin_core::PaymentMethod> {
    let method = fin_core::PaymentMethod::from_name(raw);
    if method.is_none() {
        tracing::warn!(table, id = %id, method = %raw, "unknown payment method in database, skipping row");
    }
    method
}

#[cfg(test)]
mod tests {
    use super::*;
    use fin_core::{Amount, PaymentMethod};

    #[test]
    fn stored_amount_converts() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            amount_from_row("payment_requests", id, 4_500_000),
            Some(Amount::from_major(45_000))
        );
    }

    #[test]
    fn corrupt_amount_is_not_zeroed() {
        assert_eq!(amount_from_row("disbursements", uuid::Uuid::new_v4(), -1), None);
    }

    #[test]
    fn unknown_method_is_not_read_as_cash() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(method_from_row("payment_requests", id, "POS"), Some(PaymentMethod::Pos));
        assert_eq!(method_from_row("payment_requests", id, "CHEQUE"), None);
    }
}
