#![deny(missing_docs)]

//! # fin-core: Foundational Types for the TRH Finance Stack
//!
//! Every other crate in the workspace builds on these types. The crate has
//! no internal dependencies, only `serde`, `thiserror`, `chrono`, `uuid`,
//! `sha2` and `utoipa` from the ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Integer money.** [`Amount`] holds kobo in an `i64`; floats are never
//!    stored and amounts travel as two-decimal strings.
//!
//! 2. **Newtype identifiers.** A [`RequestId`] cannot be passed where a
//!    [`DisbursementId`] is expected.
//!
//! 3. **Closed vocabularies.** Statuses, methods and transaction types are
//!    enums with exhaustive `match`; departments and categories come from
//!    the fixed [`catalog`].
//!
//! 4. **Tamper-evident audit.** [`AuditLogEntry`] values form a SHA-256
//!    hash chain checked by [`verify_chain`].

pub mod audit;
pub mod catalog;
pub mod disbursement;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod money;
pub mod report;
pub mod request;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use audit::{
    actions, compute_entry_hash, verify_chain, AuditEvent, AuditLogEntry, AuditModule,
    ChainVerification, GENESIS_HASH,
};
pub use catalog::{
    canonical_user, categories_for, validate_category, validate_department,
    DEFAULT_ALLOWED_USERS, DEPARTMENTS, EXPENSE_CATEGORIES, INCOME_CATEGORIES, SYSTEM_ACTOR,
};
pub use disbursement::{Disbursement, DisbursementProof, SignatureImage, MAX_SIGNATURE_BYTES};
pub use error::ValidationError;
pub use identity::{AuditLogId, DisbursementId, RequestId, TransactionId};
pub use ledger::{ledger_order, LedgerSummary, LedgerTransaction, TransactionType};
pub use money::{Amount, SignedAmount, CURRENCY_CODE, CURRENCY_SYMBOL};
pub use report::{ChannelBreakdown, DashboardStats};
pub use request::{review_cmp, review_order, BankDetails, PaymentMethod, PaymentRequest, RequestStatus};
pub use temporal::{canonical_timestamp, now_millis, parse_date, MonthKey};
