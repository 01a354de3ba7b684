//! # Audit Trail
//!
//! In-memory head of the hash-chained audit log. Appends are serialised by
//! a single mutex so sequence numbers and `previous_hash` links are never
//! assigned twice. Handlers call [`record`] after a successful mutation; it
//! appends the entry and writes it through to the database when one is
//! configured.

use std::sync::Arc;

use fin_core::{now_millis, verify_chain, AuditEvent, AuditLogEntry, ChainVerification};
use parking_lot::Mutex;

use crate::error::AppError;
use crate::state::AppState;

/// Append-only audit chain.
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    entries: Arc<Mutex<Vec<AuditLogEntry>>>,
}

impl AuditTrail {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `event` onto the head of the chain and return the new entry.
    pub fn append(&self, event: AuditEvent) -> AuditLogEntry {
        let mut guard = self.entries.lock();
        let entry = AuditLogEntry::chain(guard.last(), event, now_millis());
        guard.push(entry.clone());
        entry
    }

    /// Snapshot of every entry in sequence order.
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().clone()
    }

    /// Recompute and check every link.
    pub fn verify(&self) -> ChainVerification {
        verify_chain(&self.entries.lock())
    }

    /// Replace the chain (used when hydrating from the database).
    pub fn replace_all(&self, mut entries: Vec<AuditLogEntry>) {
        entries.sort_by_key(|e| e.sequence);
        *self.entries.lock() = entries;
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append `event` to the trail and persist it.
pub async fn record(state: &AppState, event: AuditEvent) -> Result<AuditLogEntry, AppError> {
    let entry = state.audit.append(event);
    tracing::info!(
        sequence = entry.sequence,
        module = %entry.module,
        action = %entry.action,
        record_id = %entry.record_id,
        user = %entry.user,
        "audit entry appended"
    );

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::audit::insert(pool, &entry).await {
            tracing::error!(sequence = entry.sequence, error = %e, "failed to persist audit entry to database");
            return Err(AppError::Internal(
                "audit entry recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok(entry)
}
