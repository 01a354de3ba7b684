//! # Audit Trail
//!
//! Append-only log of administrative actions. Entries form a SHA-256 hash
//! chain: each entry commits to its predecessor's hash, so editing or
//! removing any entry breaks every later link.
//!
//! ```text
//! entry_hash = SHA-256(previous_hash | sequence | module | action | record_id | user | timestamp)
//! ```
//!
//! The first entry chains from [`GENESIS_HASH`]. Fields are joined with `|`
//! and the timestamp uses [`canonical_timestamp`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::identity::AuditLogId;
use crate::temporal::canonical_timestamp;

/// Previous-hash value of the first entry in a chain.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Area of the system an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AuditModule {
    /// Fund request submission and review.
    Requests,
    /// Payouts.
    Disbursements,
    /// Income and expense entries.
    Ledger,
    /// Operator sign-in.
    Session,
}

impl AuditModule {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requests => "Requests",
            Self::Disbursements => "Disbursements",
            Self::Ledger => "Ledger",
            Self::Session => "Session",
        }
    }
}

impl std::fmt::Display for AuditModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditModule {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Requests" => Ok(Self::Requests),
            "Disbursements" => Ok(Self::Disbursements),
            "Ledger" => Ok(Self::Ledger),
            "Session" => Ok(Self::Session),
            other => Err(ValidationError::UnknownModule(other.to_string())),
        }
    }
}

/// Action names recorded in the trail.
pub mod actions {
    /// A staff member submitted a request.
    pub const SUBMIT_REQUEST: &str = "SUBMIT_REQUEST";
    /// A request was approved.
    pub const APPROVE_REQUEST: &str = "APPROVE_REQUEST";
    /// A request was rejected.
    pub const REJECT_REQUEST: &str = "REJECT_REQUEST";
    /// An approved request was paid out.
    pub const DISBURSE: &str = "DISBURSE";
    /// A ledger entry was recorded.
    pub const RECORD_TRANSACTION: &str = "RECORD_TRANSACTION";
    /// An operator signed in.
    pub const LOGIN: &str = "LOGIN";
}

/// One link in the audit chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuditLogEntry {
    /// Entry identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: AuditLogId,
    /// Position in the chain, starting at 1.
    pub sequence: u64,
    /// Action name, see [`actions`].
    pub action: String,
    /// Area of the system.
    pub module: AuditModule,
    /// Identifier of the record acted on.
    pub record_id: String,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
    /// Operator name, or `System` for unattended actions.
    pub user: String,
    /// Hash of the preceding entry.
    pub previous_hash: String,
    /// Hash of this entry.
    pub entry_hash: String,
}

/// Fields of an action before it is linked into the chain.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Area of the system.
    pub module: AuditModule,
    /// Action name.
    pub action: &'static str,
    /// Identifier of the record acted on.
    pub record_id: String,
    /// Operator name.
    pub user: String,
}

impl AuditEvent {
    /// Convenience constructor.
    pub fn new(
        module: AuditModule,
        action: &'static str,
        record_id: impl ToString,
        user: impl Into<String>,
    ) -> Self {
        Self {
            module,
            action,
            record_id: record_id.to_string(),
            user: user.into(),
        }
    }
}

impl AuditLogEntry {
    /// Link `event` after `previous` (or after genesis when `None`).
    pub fn chain(previous: Option<&AuditLogEntry>, event: AuditEvent, timestamp: DateTime<Utc>) -> Self {
        let (sequence, previous_hash) = match previous {
            Some(p) => (p.sequence + 1, p.entry_hash.clone()),
            None => (1, GENESIS_HASH.to_string()),
        };
        let entry_hash = compute_entry_hash(
            &previous_hash,
            sequence,
            event.module,
            event.action,
            &event.record_id,
            &event.user,
            &timestamp,
        );
        Self {
            id: AuditLogId::new(),
            sequence,
            action: event.action.to_string(),
            module: event.module,
            record_id: event.record_id,
            timestamp,
            user: event.user,
            previous_hash,
            entry_hash,
        }
    }

    /// Recompute this entry's hash from its fields.
    pub fn recompute_hash(&self) -> String {
        compute_entry_hash(
            &self.previous_hash,
            self.sequence,
            self.module,
            &self.action,
            &self.record_id,
            &self.user,
            &self.timestamp,
        )
    }
}

/// Hash an entry's fields.
pub fn compute_entry_hash(
    previous_hash: &str,
    sequence: u64,
    module: AuditModule,
    action: &str,
    record_id: &str,
    user: &str,
    timestamp: &DateTime<Utc>,
) -> String {
    let input = format!(
        "{}|{}|{}|{}|{}|{}|{}",
        previous_hash,
        sequence,
        module,
        action,
        record_id,
        user,
        canonical_timestamp(timestamp),
    );
    sha256_hex(&input)
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|b| format!("{b:02x}")).collect()
}

/// Outcome of walking a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChainVerification {
    /// Number of entries checked.
    pub total_entries: usize,
    /// True when every link and hash checks out.
    pub valid: bool,
    /// Sequence number of the first entry that fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_broken_sequence: Option<u64>,
    /// Hash of the last entry, or genesis for an empty chain.
    pub head_hash: String,
}

/// Verify a chain given in sequence order.
///
/// An entry is broken when its sequence is not one past its predecessor's,
/// its `previous_hash` does not match the predecessor's `entry_hash`, or its
/// stored `entry_hash` does not match the recomputed one.
pub fn verify_chain(entries: &[AuditLogEntry]) -> ChainVerification {
    let mut expected_prev = GENESIS_HASH;
    let mut expected_seq = 1u64;
    for entry in entries {
        let linked = entry.sequence == expected_seq && entry.previous_hash == expected_prev;
        if !linked || entry.recompute_hash() != entry.entry_hash {
            return ChainVerification {
                total_entries: entries.len(),
                valid: false,
                first_broken_sequence: Some(entry.sequence),
                head_hash: entries
                    .last()
                    .map(|e| e.entry_hash.clone())
                    .unwrap_or_else(|| GENESIS_HASH.to_string()),
            };
        }
        expected_prev = &entry.entry_hash;
        expected_seq += 1;
    }
    ChainVerification {
        total_entries: entries.len(),
        valid: true,
        first_broken_sequence: None,
        head_hash: expected_prev.to_string(),
    }
}
