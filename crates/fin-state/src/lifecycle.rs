//! # Request Lifecycle State Machine
//!
//! ```text
//! PENDING ──approve──▶ APPROVED ──pay──▶ PAID (terminal)
//!    │
//!    └──reject(reason)──▶ REJECTED (terminal)
//! ```
//!
//! Transitions are methods on [`PaymentRequest`] via the
//! [`RequestLifecycle`] trait. Each one checks the current status, applies
//! the change, bumps `updated_at`, and returns a [`RequestTransitionRecord`]
//! for the caller to keep in the request's history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fin_core::{now_millis, PaymentRequest, RequestStatus};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The transition is not allowed from the current status.
    #[error("invalid request transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: RequestStatus,
        /// Attempted target status.
        to: RequestStatus,
    },

    /// The request is already in a terminal status.
    #[error("request is in terminal state {state}")]
    Terminal {
        /// The terminal status.
        state: RequestStatus,
    },

    /// A rejection was attempted without a reason.
    #[error("a rejection reason is required")]
    MissingReason,
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of one status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTransitionRecord {
    /// Status before the transition.
    pub from: RequestStatus,
    /// Status after the transition.
    pub to: RequestStatus,
    /// Operator who made the change.
    pub actor: String,
    /// Reason, for rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// When the change happened.
    pub timestamp: DateTime<Utc>,
}

/// Statuses reachable in one step from `status`.
pub fn valid_transitions(status: RequestStatus) -> &'static [RequestStatus] {
    match status {
        RequestStatus::Pending => &[RequestStatus::Approved, RequestStatus::Rejected],
        RequestStatus::Approved => &[RequestStatus::Paid],
        RequestStatus::Rejected | RequestStatus::Paid => &[],
    }
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Status transitions for a fund request.
pub trait RequestLifecycle {
    /// PENDING → APPROVED.
    fn approve(&mut self, actor: &str) -> Result<RequestTransitionRecord, LifecycleError>;

    /// PENDING → REJECTED. The trimmed reason must be non-empty and is
    /// stored on the request.
    fn reject(&mut self, actor: &str, reason: &str)
        -> Result<RequestTransitionRecord, LifecycleError>;

    /// APPROVED → PAID.
    fn mark_paid(&mut self, actor: &str) -> Result<RequestTransitionRecord, LifecycleError>;
}

impl RequestLifecycle for PaymentRequest {
    fn approve(&mut self, actor: &str) -> Result<RequestTransitionRecord, LifecycleError> {
        require_state(self.status, RequestStatus::Pending, RequestStatus::Approved)?;
        Ok(do_transition(self, RequestStatus::Approved, actor, None))
    }

    fn reject(
        &mut self,
        actor: &str,
        reason: &str,
    ) -> Result<RequestTransitionRecord, LifecycleError> {
        require_state(self.status, RequestStatus::Pending, RequestStatus::Rejected)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LifecycleError::MissingReason);
        }
        self.rejection_reason = Some(reason.to_string());
        Ok(do_transition(
            self,
            RequestStatus::Rejected,
            actor,
            Some(reason.to_string()),
        ))
    }

    fn mark_paid(&mut self, actor: &str) -> Result<RequestTransitionRecord, LifecycleError> {
        require_state(self.status, RequestStatus::Approved, RequestStatus::Paid)?;
        Ok(do_transition(self, RequestStatus::Paid, actor, None))
    }
}

fn require_state(
    current: RequestStatus,
    expected: RequestStatus,
    target: RequestStatus,
) -> Result<(), LifecycleError> {
    if current.is_terminal() {
        return Err(LifecycleError::Terminal { state: current });
    }
    if current != expected {
        return Err(LifecycleError::InvalidTransition {
            from: current,
            to: target,
        });
    }
    Ok(())
}

fn do_transition(
    request: &mut PaymentRequest,
    to: RequestStatus,
    actor: &str,
    reason: Option<String>,
) -> RequestTransitionRecord {
    let now = now_millis();
    let record = RequestTransitionRecord {
        from: request.status,
        to,
        actor: actor.to_string(),
        reason,
        timestamp: now,
    };
    request.status = to;
    request.updated_at = now;
    record
}

// ─── Tests ───────────────────────────────────────────────────────────
