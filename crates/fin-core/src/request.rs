//! # Fund Requests
//!
//! A [`PaymentRequest`] is a staff member's ask for funds. It carries the
//! amount, purpose, preferred [`PaymentMethod`], optional [`BankDetails`] for
//! electronic payment, and its lifecycle [`RequestStatus`]. Status changes
//! are made by `fin-state`; this module only defines the record.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::identity::RequestId;
use crate::money::Amount;

/// How a request is to be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Transfer to the requester's bank account.
    BankTransfer,
    /// Point-of-sale card payment.
    Pos,
    /// Physical cash handed to a receiver.
    Cash,
}

impl PaymentMethod {
    /// Electronic methods carry bank details and a transaction reference.
    pub fn is_electronic(self) -> bool {
        matches!(self, Self::BankTransfer | Self::Pos)
    }

    /// Wire name (`BANK_TRANSFER`, `POS`, `CASH`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Pos => "POS",
            Self::Cash => "CASH",
        }
    }

    /// Parse the wire name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "BANK_TRANSFER" => Some(Self::BankTransfer),
            "POS" => Some(Self::Pos),
            "CASH" => Some(Self::Cash),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Awaiting an approval decision.
    #[default]
    Pending,
    /// Approved and waiting to be paid.
    Approved,
    /// Declined with a reason. Terminal.
    Rejected,
    /// Paid out. Terminal.
    Paid,
}

impl RequestStatus {
    /// Wire name (`PENDING`, `APPROVED`, `REJECTED`, `PAID`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Paid => "PAID",
        }
    }

    /// Parse the wire name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            "PAID" => Some(Self::Paid),
            _ => None,
        }
    }

    /// No transitions leave a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Paid)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `null` in legacy data means the request was never reviewed.
fn status_or_pending<'de, D: Deserializer<'de>>(d: D) -> Result<RequestStatus, D::Error> {
    Ok(Option::<RequestStatus>::deserialize(d)?.unwrap_or_default())
}

/// Bank account details for electronic payment. All fields are optional at
/// the record level; submission rules decide which are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BankDetails {
    /// Name of the bank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    /// Name on the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    /// Account number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
}

impl BankDetails {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.bank_name.is_none() && self.account_name.is_none() && self.account_number.is_none()
    }

    /// Trim every field and drop the ones left blank.
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            bank_name: clean(self.bank_name),
            account_name: clean(self.account_name),
            account_number: clean(self.account_number),
        }
    }
}

/// A staff fund request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentRequest {
    /// Request identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: RequestId,
    /// Name of the staff member asking for funds.
    pub requester_name: String,
    /// Department, one of the catalog entries.
    pub department: String,
    /// Requested amount.
    #[schema(value_type = String, example = "15000.00")]
    pub amount: Amount,
    /// What the money is for.
    pub purpose: String,
    /// Preferred payment method.
    pub method: PaymentMethod,
    /// Date the funds are needed by.
    pub date_needed: NaiveDate,
    /// Optional link to a supporting document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    /// Lifecycle status.
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: RequestStatus,
    /// Reason given when the request was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Bank details for electronic payment.
    #[serde(default)]
    pub bank_details: BankDetails,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Ordering used by the review screen: pending requests first, then newest
/// submission first.
pub fn review_cmp(a: &PaymentRequest, b: &PaymentRequest) -> Ordering {
    let a_pending = a.status == RequestStatus::Pending;
    let b_pending = b.status == RequestStatus::Pending;
    b_pending
        .cmp(&a_pending)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Sort requests into review order in place.
pub fn review_order(requests: &mut [PaymentRequest]) {
    requests.sort_by(review_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn request(status: RequestStatus, minutes: i64) -> PaymentRequest {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        PaymentRequest {
            id: RequestId::new(),
            requester_name: "Ada".into(),
            department: "Media".into(),
            amount: Amount::from_major(5_000),
            purpose: "Cables".into(),
            method: PaymentMethod::Cash,
            date_needed: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            attachment_url: None,
            status,
            rejection_reason: None,
            bank_details: BankDetails::default(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn electronic_methods() {
        assert!(PaymentMethod::BankTransfer.is_electronic());
        assert!(PaymentMethod::Pos.is_electronic());
        assert!(!PaymentMethod::Cash.is_electronic());
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Approved).unwrap(),
            "\"APPROVED\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"BANK_TRANSFER\""
        );
        for s in ["PENDING", "APPROVED", "REJECTED", "PAID"] {
            assert_eq!(RequestStatus::from_name(s).unwrap().as_str(), s);
        }
        assert!(RequestStatus::from_name("pending").is_none());
    }

    #[test]
    fn missing_or_null_status_reads_as_pending() {
        let mut value = serde_json::to_value(request(RequestStatus::Paid, 0)).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.insert("status".into(), serde_json::Value::Null);
        let parsed: PaymentRequest = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(parsed.status, RequestStatus::Pending);

        value.as_object_mut().unwrap().remove("status");
        let parsed: PaymentRequest = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.status, RequestStatus::Pending);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut value = serde_json::to_value(request(RequestStatus::Pending, 0)).unwrap();
        value["status"] = serde_json::json!("ON_HOLD");
        assert!(serde_json::from_value::<PaymentRequest>(value).is_err());
    }

    #[test]
    fn review_order_puts_pending_first_then_newest() {
        let old_pending = request(RequestStatus::Pending, 0);
        let new_pending = request(RequestStatus::Pending, 30);
        let newest_paid = request(RequestStatus::Paid, 60);
        let approved = request(RequestStatus::Approved, 10);
        let mut list = vec![
            newest_paid.clone(),
            old_pending.clone(),
            approved.clone(),
            new_pending.clone(),
        ];
        review_order(&mut list);
        let ids: Vec<_> = list.iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![new_pending.id, old_pending.id, newest_paid.id, approved.id]
        );
    }

    #[test]
    fn bank_details_normalization_drops_blanks() {
        let details = BankDetails {
            bank_name: Some("  GTBank ".into()),
            account_name: Some("   ".into()),
            account_number: None,
        }
        .normalized();
        assert_eq!(details.bank_name.as_deref(), Some("GTBank"));
        assert!(details.account_name.is_none());
        assert!(!details.is_empty());
        assert!(BankDetails::default().is_empty());
    }
}
