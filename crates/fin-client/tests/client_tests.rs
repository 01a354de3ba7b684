//! Contract tests for FinClient against a mock finance API.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET | `/v1/catalog` | `catalog_*` |
//! | POST | `/v1/requests` | `submit_*` |
//! | GET | `/v1/requests/{id}/status` | `status_*` |
//! | GET | `/v1/requests` | `list_requests_*` |
//! | POST | `/v1/requests/{id}/reject` | `reject_*` |
//! | POST | `/v1/disbursements` | `disburse_*` |
//! | GET | `/v1/disbursements` | `list_disbursements_*` |
//! | GET | `/v1/ledger/summary` | `ledger_summary_*` |
//! | GET | `/v1/audit-logs/verify` | `verify_*` |
//! | POST | `/v1/session` | `login_*` |

use chrono::NaiveDate;
use fin_client::{FinClient, FinClientConfig, NewDisbursement, NewRequest};
use fin_core::{Amount, MonthKey, PaymentMethod, RequestStatus};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REQUEST_ID: &str = "6f1c1a52-8a4e-4d4b-9a55-0f4b4c1e2d11";

fn client(server: &MockServer) -> FinClient {
    let mut config = FinClientConfig::new(server.uri().parse().unwrap());
    config.timeout_secs = 5;
    FinClient::new(config).unwrap()
}

fn operator(server: &MockServer) -> FinClient {
    client(server).with_token("admin:Admin:1234").unwrap()
}

fn request_json(status: &str) -> serde_json::Value {
    json!({
        "id": REQUEST_ID,
        "requester_name": "Grace Okafor",
        "department": "Media",
        "amount": "15000.00",
        "purpose": "Camera batteries",
        "method": "CASH",
        "date_needed": "2024-08-20",
        "status": status,
        "bank_details": {},
        "created_at": "2024-08-10T09:30:00.000Z",
        "updated_at": "2024-08-10T09:30:00.000Z"
    })
}

fn error_json(code: &str, message: &str) -> serde_json::Value {
    json!({ "error": { "code": code, "message": message } })
}

// ── GET /v1/catalog ──────────────────────────────────────────────────

#[tokio::test]
async fn catalog_lists_vocabularies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "departments": ["Media", "Ushering"],
            "expense_categories": ["Utilities"],
            "income_categories": ["Tithes", "Offerings"],
            "payment_methods": ["CASH", "BANK_TRANSFER", "POS"],
            "currency_code": "NGN",
            "currency_symbol": "₦"
        })))
        .mount(&server)
        .await;

    let catalog = client(&server).catalog().await.unwrap();
    assert_eq!(catalog.departments, vec!["Media", "Ushering"]);
    assert_eq!(catalog.payment_methods.len(), 3);
    assert_eq!(catalog.currency_code, "NGN");
}

// ── POST /v1/requests ────────────────────────────────────────────────

#[tokio::test]
async fn submit_sends_body_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/requests"))
        .and(body_partial_json(json!({
            "requester_name": "Grace Okafor",
            "amount": "15000.00",
            "method": "CASH",
            "date_needed": "2024-08-20"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(request_json("PENDING")))
        .expect(1)
        .mount(&server)
        .await;

    let submitted = client(&server)
        .submit_request(&NewRequest {
            requester_name: "Grace Okafor".into(),
            department: "Media".into(),
            amount: Amount::from_major(15_000),
            purpose: "Camera batteries".into(),
            method: PaymentMethod::Cash,
            date_needed: NaiveDate::from_ymd_opt(2024, 8, 20).unwrap(),
            attachment_url: None,
            bank_details: None,
        })
        .await
        .unwrap();
    assert_eq!(submitted.status, RequestStatus::Pending);
    assert_eq!(submitted.amount, Amount::from_major(15_000));

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn submit_validation_error_exposes_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/requests"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(error_json("VALIDATION_ERROR", "unknown department: Choir")),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .submit_request(&NewRequest {
            requester_name: "Grace Okafor".into(),
            department: "Choir".into(),
            amount: Amount::from_major(10),
            purpose: "Sheet music".into(),
            method: PaymentMethod::Cash,
            date_needed: NaiveDate::from_ymd_opt(2024, 8, 20).unwrap(),
            attachment_url: None,
            bank_details: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.code().as_deref(), Some("VALIDATION_ERROR"));
    assert!(err.message().unwrap().contains("Choir"));
}

// ── GET /v1/requests/{id}/status ─────────────────────────────────────

#[tokio::test]
async fn status_returns_public_view() {
    let server = MockServer::start().await;
    let mut body = request_json("REJECTED");
    body["rejection_reason"] = json!("Over budget");
    body.as_object_mut().unwrap().remove("bank_details");
    Mock::given(method("GET"))
        .and(path(format!("/v1/requests/{REQUEST_ID}/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let view = client(&server)
        .request_status(REQUEST_ID.parse().unwrap())
        .await
        .unwrap();
    assert_eq!(view.status, RequestStatus::Rejected);
    assert_eq!(view.rejection_reason.as_deref(), Some("Over budget"));
}

#[tokio::test]
async fn status_not_found_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/requests/{REQUEST_ID}/status")))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_json("NOT_FOUND", "request not found")))
        .mount(&server)
        .await;

    let err = client(&server)
        .request_status(REQUEST_ID.parse().unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.code().as_deref(), Some("NOT_FOUND"));
}

// ── GET /v1/requests ─────────────────────────────────────────────────

#[tokio::test]
async fn list_requests_sends_token_and_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/requests"))
        .and(query_param("status", "APPROVED"))
        .and(header("authorization", "Bearer admin:Admin:1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([request_json("APPROVED")])))
        .expect(1)
        .mount(&server)
        .await;

    let requests = operator(&server)
        .list_requests(Some(RequestStatus::Approved))
        .await
        .unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].status, RequestStatus::Approved);
}

#[tokio::test]
async fn list_requests_without_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/requests"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_json("UNAUTHORIZED", "missing bearer token")))
        .mount(&server)
        .await;

    let err = client(&server).list_requests(None).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

// ── POST /v1/requests/{id}/reject ────────────────────────────────────

#[tokio::test]
async fn reject_sends_reason() {
    let server = MockServer::start().await;
    let mut rejected = request_json("REJECTED");
    rejected["rejection_reason"] = json!("Duplicate request");
    Mock::given(method("POST"))
        .and(path(format!("/v1/requests/{REQUEST_ID}/reject")))
        .and(body_partial_json(json!({ "reason": "Duplicate request" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rejected))
        .expect(1)
        .mount(&server)
        .await;

    let request = operator(&server)
        .reject_request(REQUEST_ID.parse().unwrap(), "Duplicate request")
        .await
        .unwrap();
    assert_eq!(request.rejection_reason.as_deref(), Some("Duplicate request"));
}

// ── POST /v1/disbursements ───────────────────────────────────────────

#[tokio::test]
async fn disburse_cash_returns_record() {
    let server = MockServer::start().await;
    let signature = "data:image/png;base64,iVBORw0KGgo=";
    Mock::given(method("POST"))
        .and(path("/v1/disbursements"))
        .and(body_partial_json(json!({
            "request_id": REQUEST_ID,
            "signature": signature
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": Uuid::new_v4(),
            "request_id": REQUEST_ID,
            "method": "CASH",
            "amount": "15000.00",
            "processed_by": "Admin",
            "processed_at": "2024-08-12T11:00:00.000Z",
            "proof": {
                "kind": "cash",
                "receiver_name": "Grace Okafor",
                "signature": signature
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let disbursement = operator(&server)
        .create_disbursement(&NewDisbursement {
            request_id: REQUEST_ID.parse().unwrap(),
            signature: Some(signature.into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(disbursement.method, PaymentMethod::Cash);
    assert!(disbursement.proof.is_cash());
}

#[tokio::test]
async fn disburse_conflict_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/disbursements"))
        .respond_with(ResponseTemplate::new(409).set_body_json(error_json("CONFLICT", "request is PAID, not APPROVED")))
        .expect(1)
        .mount(&server)
        .await;

    let err = operator(&server)
        .create_disbursement(&NewDisbursement {
            request_id: REQUEST_ID.parse().unwrap(),
            transaction_ref: Some("TRX-9".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.code().as_deref(), Some("CONFLICT"));
}

// ── GET /v1/disbursements ────────────────────────────────────────────

#[tokio::test]
async fn list_disbursements_flattens_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/disbursements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "request_id": REQUEST_ID,
            "method": "BANK_TRANSFER",
            "amount": "2500.50",
            "processed_by": "Finance",
            "processed_at": "2024-08-12T11:00:00.000Z",
            "proof": { "kind": "electronic", "transaction_ref": "TRX-1" },
            "requester_name": "Grace Okafor"
        }])))
        .mount(&server)
        .await;

    let history = operator(&server).list_disbursements().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].requester_name, "Grace Okafor");
    assert_eq!(history[0].disbursement.processed_by, "Finance");
    assert_eq!(history[0].disbursement.amount.minor(), 250_050);
}

// ── GET /v1/ledger/summary ───────────────────────────────────────────

#[tokio::test]
async fn ledger_summary_passes_month() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/ledger/summary"))
        .and(query_param("month", "2024-08"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "month": "2024-08",
            "total_income": "50000.00",
            "total_expense": "62000.00",
            "balance": "-12000.00"
        })))
        .mount(&server)
        .await;

    let summary = operator(&server)
        .ledger_summary(Some(MonthKey::new(2024, 8).unwrap()))
        .await
        .unwrap();
    assert_eq!(summary.month, Some(MonthKey::new(2024, 8).unwrap()));
    assert!(summary.balance.is_negative());
}

// ── GET /v1/audit-logs/verify ────────────────────────────────────────

#[tokio::test]
async fn verify_reports_broken_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/audit-logs/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_entries": 4,
            "valid": false,
            "first_broken_sequence": 3,
            "head_hash": "ab".repeat(32)
        })))
        .mount(&server)
        .await;

    let verification = operator(&server).verify_audit_chain().await.unwrap();
    assert!(!verification.valid);
    assert_eq!(verification.first_broken_sequence, Some(3));
}

#[tokio::test]
async fn malformed_body_is_deserialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/audit-logs/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = operator(&server).verify_audit_chain().await.unwrap_err();
    assert!(matches!(err, fin_client::FinApiError::Deserialization { .. }));
}

// ── POST /v1/session ─────────────────────────────────────────────────

#[tokio::test]
async fn login_returns_usable_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/session"))
        .and(body_partial_json(json!({ "username": "finance", "passcode": "1234" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": "Finance",
            "token": "admin:Finance:1234"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/disbursements/queue"))
        .and(header("authorization", "Bearer admin:Finance:1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let anonymous = client(&server);
    let session = anonymous.login("finance", "1234").await.unwrap();
    assert_eq!(session.user, "Finance");
    assert!(!format!("{session:?}").contains("1234"));

    let queue = anonymous
        .with_token(&session.token)
        .unwrap()
        .disbursement_queue()
        .await
        .unwrap();
    assert!(queue.is_empty());
}

#[tokio::test]
async fn login_wrong_passcode_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/session"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_json("UNAUTHORIZED", "invalid passcode")))
        .mount(&server)
        .await;

    let err = client(&server).login("Admin", "0000").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}
