//! # fin-state: Request Lifecycle for the TRH Finance Stack
//!
//! Status rules for fund requests and the checks that gate a payout.
//!
//! - **Lifecycle** (`lifecycle.rs`): `PENDING → APPROVED → PAID`, with
//!   `PENDING → REJECTED` as the only other path. `REJECTED` and `PAID` are
//!   terminal. Every transition yields a [`RequestTransitionRecord`].
//!
//! - **Disbursement** (`disbursement.rs`): validates a payout form against
//!   an approved request and produces the channel-specific proof.
//!
//! These are pure functions over `fin-core` records. Callers are expected to
//! run them under the same lock that guards the record, so a check and the
//! write it authorises cannot interleave with another writer.

pub mod disbursement;
pub mod lifecycle;

pub use disbursement::{DisbursementDraft, DisbursementError};
pub use lifecycle::{valid_transitions, LifecycleError, RequestLifecycle, RequestTransitionRecord};
