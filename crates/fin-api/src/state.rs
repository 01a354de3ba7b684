//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! - **Requests**: staff fund requests and their transition history
//! - **Disbursements**: payouts against approved requests
//! - **Transactions**: independent ledger income/expense entries
//! - **Audit**: the hash-chained action log
//!
//! When a database pool is configured every mutation is written through to
//! PostgreSQL and the stores are hydrated from it on startup.

use std::collections::HashMap;
use std::sync::Arc;

use fin_core::{Disbursement, LedgerTransaction, PaymentRequest, DEFAULT_ALLOWED_USERS};
use fin_state::RequestTransitionRecord;
use parking_lot::RwLock;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::AuditTrail;
use crate::auth::SecretToken;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is `parking_lot` and is never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        let entry = guard.get_mut(id)?;
        f(entry);
        Some(entry.clone())
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure runs under a single write lock, so the check and the
    /// write it authorises cannot interleave with another writer. Returns
    /// `None` if the record doesn't exist.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Replace the whole contents (used when hydrating from the database).
    pub fn replace_all(&self, entries: impl IntoIterator<Item = (Uuid, T)>) {
        let mut guard = self.data.write();
        guard.clear();
        guard.extend(entries);
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the admin passcode to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared admin passcode. If `None`, authentication is disabled.
    pub admin_passcode: Option<SecretToken>,
    /// Operators permitted to sign in, in canonical spelling.
    pub allowed_users: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "admin_passcode",
                &self.admin_passcode.as_ref().map(|_| "[REDACTED]"),
            )
            .field("allowed_users", &self.allowed_users)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            admin_passcode: None,
            allowed_users: DEFAULT_ALLOWED_USERS.iter().map(|u| u.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Build configuration from `PORT`, `FIN_ADMIN_PASSCODE` and
    /// `FIN_ALLOWED_USERS`. Unset or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let admin_passcode = std::env::var("FIN_ADMIN_PASSCODE")
            .ok()
            .filter(|p| !p.is_empty())
            .map(SecretToken::new);
        let allowed_users = std::env::var("FIN_ALLOWED_USERS")
            .ok()
            .map(|raw| parse_user_list(&raw))
            .filter(|users| !users.is_empty())
            .unwrap_or(defaults.allowed_users);
        Self {
            port,
            admin_passcode,
            allowed_users,
        }
    }
}

/// Split a comma-separated operator list, trimming and dropping blanks.
pub fn parse_user_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

// -- Application State --------------------------------------------------------

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each store.
#[derive(Debug, Clone)]
pub struct AppState {
    pub requests: Store<PaymentRequest>,
    /// Transition history per request, keyed by request ID.
    pub request_history: Store<Vec<RequestTransitionRecord>>,
    pub disbursements: Store<Disbursement>,
    pub transactions: Store<LedgerTransaction>,
    pub audit: AuditTrail,

    /// PostgreSQL pool. `None` means in-memory-only mode.
    pub db_pool: Option<PgPool>,

    pub config: AppConfig,
}

impl AppState {
    /// In-memory state with default configuration (auth disabled).
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// In-memory state with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self::with_pool(config, None)
    }

    /// State with the given configuration and optional database pool.
    pub fn with_pool(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            requests: Store::new(),
            request_history: Store::new(),
            disbursements: Store::new(),
            transactions: Store::new(),
            audit: AuditTrail::new(),
            db_pool,
            config,
        }
    }

    /// Load all persisted records into the in-memory stores.
    ///
    /// No-op without a database pool. A broken audit chain is logged but
    /// does not stop startup, so operators can still inspect the data.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };

        let requests = crate::db::requests::load_all(pool).await?;
        let request_count = requests.len();
        let mut history = Vec::with_capacity(request_count);
        let mut records = Vec::with_capacity(request_count);
        for (request, log) in requests {
            let id = *request.id.as_uuid();
            history.push((id, log));
            records.push((id, request));
        }
        self.requests.replace_all(records);
        self.request_history.replace_all(history);

        let disbursements = crate::db::disbursements::load_all(pool).await?;
        let disbursement_count = disbursements.len();
        self.disbursements
            .replace_all(disbursements.into_iter().map(|d| (*d.id.as_uuid(), d)));

        let transactions = crate::db::transactions::load_all(pool).await?;
        let transaction_count = transactions.len();
        self.transactions
            .replace_all(transactions.into_iter().map(|t| (*t.id.as_uuid(), t)));

        let entries = crate::db::audit::load_all(pool).await?;
        let audit_count = entries.len();
        self.audit.replace_all(entries);
        let verification = self.audit.verify();
        if !verification.valid {
            tracing::error!(
                first_broken_sequence = ?verification.first_broken_sequence,
                "audit chain loaded from database failed verification"
            );
        }

        tracing::info!(
            requests = request_count,
            disbursements = disbursement_count,
            transactions = transaction_count,
            audit_entries = audit_count,
            "hydrated in-memory stores from database"
        );
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_try_update_runs_under_lock() {
        let store: Store<u32> = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, 1);
        let result: Option<Result<u32, &str>> = store.try_update(&id, |v| {
            *v += 1;
            Ok(*v)
        });
        assert_eq!(result, Some(Ok(2)));
        let missing: Option<Result<(), &str>> = store.try_update(&Uuid::new_v4(), |_| Ok(()));
        assert!(missing.is_none());
    }

    #[test]
    fn store_try_update_error_leaves_value() {
        let store: Store<u32> = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, 7);
        let result: Option<Result<(), &str>> = store.try_update(&id, |_| Err("nope"));
        assert_eq!(result, Some(Err("nope")));
        assert_eq!(store.get(&id), Some(7));
    }

    #[test]
    fn store_update_and_replace_all() {
        let store: Store<String> = Store::new();
        let id = Uuid::new_v4();
        assert!(store.update(&id, |_| {}).is_none());
        store.insert(id, "a".into());
        assert_eq!(store.update(&id, |s| s.push('b')).as_deref(), Some("ab"));
        store.replace_all(vec![(Uuid::new_v4(), "x".to_string())]);
        assert_eq!(store.len(), 1);
        assert!(store.get(&id).is_none());
        assert!(!store.is_empty());
    }

    #[test]
    fn store_clones_share_data() {
        let a: Store<u8> = Store::new();
        let b = a.clone();
        a.insert(Uuid::new_v4(), 1);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn config_debug_redacts_passcode() {
        let config = AppConfig {
            admin_passcode: Some(SecretToken::new("trhfin".to_string())),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("trhfin"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_config_uses_builtin_users() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.admin_passcode.is_none());
        assert_eq!(config.allowed_users.len(), DEFAULT_ALLOWED_USERS.len());
    }

    #[test]
    fn user_list_parsing() {
        assert_eq!(
            parse_user_list(" Admin, ,Finance ,"),
            vec!["Admin".to_string(), "Finance".to_string()]
        );
        assert!(parse_user_list(" , ").is_empty());
    }
}
