//! Subcommand handlers driven against a mock finance API.

use clap::Parser;
use fin_cli::audit::{run_audit, AuditArgs, EXIT_CHAIN_BROKEN};
use fin_cli::disburse::{run_disburse, DisburseArgs};
use fin_cli::ledger::{run_ledger, LedgerArgs};
use fin_cli::request::{run_request, RequestArgs};
use fin_cli::Context;
use fin_client::{FinClient, FinClientConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REQUEST_ID: &str = "6f1c1a52-8a4e-4d4b-9a55-0f4b4c1e2d11";

#[derive(Parser)]
struct Harness<A: clap::Args> {
    #[command(flatten)]
    args: A,
}

fn parse<A: clap::Args>(argv: &[&str]) -> A {
    let argv = std::iter::once("fin").chain(argv.iter().copied());
    Harness::<A>::try_parse_from(argv).unwrap().args
}

fn context(server: &MockServer) -> Context {
    let config = FinClientConfig::new(server.uri().parse().unwrap()).with_token("admin:Admin:1234");
    Context {
        client: FinClient::new(config).unwrap(),
        json: true,
    }
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

#[tokio::test]
async fn submit_builds_bank_details_only_when_given() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/requests"))
        .and(body_partial_json(json!({
            "method": "BANK_TRANSFER",
            "bank_details": { "account_number": "0123456789" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(request_json("PENDING")))
        .expect(1)
        .mount(&server)
        .await;

    let args: RequestArgs = parse(&[
        "submit",
        "--name",
        "Grace Okafor",
        "--department",
        "Media",
        "--amount",
        "15000",
        "--purpose",
        "Camera batteries",
        "--method",
        "bank-transfer",
        "--date-needed",
        "2024-08-20",
        "--account-number",
        "0123456789",
    ]);
    assert_eq!(run_request(&args, &context(&server)).await.unwrap(), 0);
}

#[tokio::test]
async fn list_passes_status_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/requests"))
        .and(query_param("status", "PENDING"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([request_json("PENDING")])))
        .expect(1)
        .mount(&server)
        .await;

    let args: RequestArgs = parse(&["list", "--status", "pending"]);
    assert_eq!(run_request(&args, &context(&server)).await.unwrap(), 0);
}

#[tokio::test]
async fn reject_conflict_surfaces_as_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/requests/{REQUEST_ID}/reject")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": { "code": "CONFLICT", "message": "request is PAID" }
        })))
        .mount(&server)
        .await;

    let args: RequestArgs = parse(&["reject", REQUEST_ID, "--reason", "Too late"]);
    let err = run_request(&args, &context(&server)).await.unwrap_err();
    assert!(format!("{err:#}").contains("failed to reject request"));
    assert!(format!("{err:#}").contains("409"));
}

#[tokio::test]
async fn pay_reads_signature_file() {
    let server = MockServer::start().await;
    let signature = "data:image/png;base64,iVBORw0KGgo=";
    Mock::given(method("POST"))
        .and(path("/v1/disbursements"))
        .and(body_partial_json(json!({
            "request_id": REQUEST_ID,
            "signature": signature,
            "receiver_name": "Deacon Bello"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "0d3b9a0e-3c55-4a47-8f9e-6f2d8c7b1a22",
            "request_id": REQUEST_ID,
            "method": "CASH",
            "amount": "15000.00",
            "processed_by": "Admin",
            "processed_at": "2024-08-12T11:00:00.000Z",
            "proof": { "kind": "cash", "receiver_name": "Deacon Bello", "signature": signature }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let sig_path = dir.path().join("sig.txt");
    std::fs::write(&sig_path, format!("{signature}\n")).unwrap();

    let args: DisburseArgs = parse(&[
        "pay",
        REQUEST_ID,
        "--receiver",
        "Deacon Bello",
        "--signature-file",
        sig_path.to_str().unwrap(),
    ]);
    assert_eq!(run_disburse(&args, &context(&server)).await.unwrap(), 0);
}

#[test]
fn inline_and_file_signature_conflict() {
    let argv = [
        "fin",
        "pay",
        REQUEST_ID,
        "--signature",
        "data:image/png;base64,AAAA",
        "--signature-file",
        "sig.txt",
    ];
    assert!(Harness::<DisburseArgs>::try_parse_from(argv).is_err());
}

#[tokio::test]
async fn ledger_add_sends_type_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/transactions"))
        .and(body_partial_json(json!({
            "type": "INCOME",
            "category": "Tithes",
            "amount": "50000.00",
            "date": "2024-08-04"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "9a7c1b3e-2f44-4d8e-b1a0-5c6d7e8f9012",
            "type": "INCOME",
            "category": "Tithes",
            "amount": "50000.00",
            "description": "",
            "date": "2024-08-04",
            "recorded_by": "Admin",
            "recorded_at": "2024-08-04T12:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let args: LedgerArgs = parse(&[
        "add", "--type", "income", "--category", "Tithes", "--amount", "50000", "--date",
        "2024-08-04",
    ]);
    assert_eq!(run_ledger(&args, &context(&server)).await.unwrap(), 0);
}

#[test]
fn ledger_month_is_validated_locally() {
    let argv = ["fin", "summary", "--month", "2024-13"];
    assert!(Harness::<LedgerArgs>::try_parse_from(argv).is_err());
}

#[tokio::test]
async fn broken_chain_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/audit-logs/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_entries": 5,
            "valid": false,
            "first_broken_sequence": 2,
            "head_hash": "00".repeat(32)
        })))
        .mount(&server)
        .await;

    let args: AuditArgs = parse(&["verify"]);
    assert_eq!(
        run_audit(&args, &context(&server)).await.unwrap(),
        EXIT_CHAIN_BROKEN
    );
}

#[tokio::test]
async fn intact_chain_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/audit-logs/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_entries": 0,
            "valid": true,
            "head_hash": "0".repeat(64)
        })))
        .mount(&server)
        .await;

    let args: AuditArgs = parse(&["verify"]);
    assert_eq!(run_audit(&args, &context(&server)).await.unwrap(), 0);
}
