//! Request bodies and response views exchanged with the finance API.
//!
//! Records that the service returns whole (requests, disbursements, ledger
//! entries, audit entries) use the `fin-core` types directly. The types here
//! cover the bodies the client sends and the views that exist only on the
//! wire.

use chrono::{DateTime, NaiveDate, Utc};
use fin_core::{
    Amount, AuditLogEntry, BankDetails, DashboardStats, Disbursement, MonthKey, PaymentMethod,
    RequestId, RequestStatus, TransactionType,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Requests -----------------------------------------------------------------

/// Body of `POST /v1/requests`.
#[derive(Debug, Clone, Serialize)]
pub struct NewRequest {
    pub requester_name: String,
    pub department: String,
    pub amount: Amount,
    pub purpose: String,
    pub method: PaymentMethod,
    pub date_needed: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RejectBody<'a> {
    pub reason: &'a str,
}

/// Public status view of a request. Carries no bank details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestStatusView {
    pub id: RequestId,
    pub requester_name: String,
    pub department: String,
    pub amount: Amount,
    pub purpose: String,
    pub method: PaymentMethod,
    pub date_needed: NaiveDate,
    pub status: RequestStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One recorded status change of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub from: RequestStatus,
    pub to: RequestStatus,
    pub actor: String,
    #[serde(default)]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// -- Disbursements ------------------------------------------------------------

/// Body of `POST /v1/disbursements`.
///
/// CASH needs `signature`; BANK_TRANSFER and POS need `transaction_ref`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewDisbursement {
    pub request_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
}

/// A payout joined with the requester's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisbursementView {
    #[serde(flatten)]
    pub disbursement: Disbursement,
    pub requester_name: String,
}

// -- Ledger -------------------------------------------------------------------

/// Body of `POST /v1/transactions`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub amount: Amount,
    pub description: String,
    pub date: NaiveDate,
}

// -- Session, catalog, dashboard ---------------------------------------------

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    pub username: &'a str,
    pub passcode: &'a str,
}

/// Result of a successful login.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    /// Canonical operator name.
    pub user: String,
    /// Bearer token for operator routes.
    pub token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Fixed vocabularies served by `GET /v1/catalog`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub departments: Vec<String>,
    pub expense_categories: Vec<String>,
    pub income_categories: Vec<String>,
    pub payment_methods: Vec<PaymentMethod>,
    pub currency_code: String,
    pub currency_symbol: String,
}

/// Dashboard figures plus one month of audit activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub audit_month: MonthKey,
    pub recent_audit: Vec<AuditLogEntry>,
}
