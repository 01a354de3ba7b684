//! # fin-client: Typed Rust client for the TRH finance API
//!
//! Wraps every `fin-api` route in a typed method:
//! - **Requests**: submit, public status lookup, review list, approve, reject
//! - **Disbursements**: payout queue, pay out, history
//! - **Ledger**: record entries, list, monthly summary
//! - **Audit**: browse the action log, verify the hash chain
//! - **Dashboard**, **catalog** and **session** login
//!
//! Reads are retried on transport errors with exponential backoff. Writes
//! are sent once.
//!
//! ## Example
//!
//! ```no_run
//! # async fn demo() -> Result<(), fin_client::FinApiError> {
//! use fin_client::{FinClient, FinClientConfig};
//!
//! let client = FinClient::new(FinClientConfig::from_env()?)?;
//! let session = client.login("Admin", "1234").await?;
//! let client = client.with_token(&session.token)?;
//! for request in client.list_requests(None).await? {
//!     println!("{} {} {}", request.id, request.status, request.amount);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use config::{ConfigError, FinClientConfig};
pub use error::FinApiError;
pub use types::{
    Catalog, Dashboard, DisbursementView, NewDisbursement, NewRequest, NewTransaction,
    RequestStatusView, Session, TransitionEntry,
};

use std::time::Duration;

use fin_core::{
    AuditLogEntry, ChainVerification, Disbursement, LedgerSummary, LedgerTransaction, MonthKey,
    PaymentRequest, RequestStatus,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::types::{LoginBody, RejectBody};

/// Client for a `fin-api` service.
#[derive(Debug, Clone)]
pub struct FinClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl FinClient {
    /// Create a client from configuration.
    pub fn new(config: FinClientConfig) -> Result<Self, FinApiError> {
        let http = build_http(config.timeout_secs, config.api_token.as_deref().map(String::as_str))?;
        Ok(Self {
            http,
            base_url: config.base_url,
            timeout_secs: config.timeout_secs,
        })
    }

    /// A copy of this client that sends `token` on every call.
    pub fn with_token(&self, token: &str) -> Result<Self, FinApiError> {
        Ok(Self {
            http: build_http(self.timeout_secs, Some(token))?,
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        })
    }

    /// Service root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // -- Health & catalog -----------------------------------------------------

    /// `GET /health/readiness`: true when the service answers 200.
    pub async fn ready(&self) -> Result<bool, FinApiError> {
        let endpoint = "GET /health/readiness";
        let resp = retry_get(self, "health/readiness", &[])
            .await
            .map_err(|e| http_error(endpoint, e))?;
        Ok(resp.status().is_success())
    }

    /// `GET /v1/catalog`
    pub async fn catalog(&self) -> Result<Catalog, FinApiError> {
        self.get_json("GET /v1/catalog", "v1/catalog", &[]).await
    }

    // -- Requests -------------------------------------------------------------

    /// `POST /v1/requests`: submit a fund request. No token needed.
    pub async fn submit_request(&self, request: &NewRequest) -> Result<PaymentRequest, FinApiError> {
        self.send_json("POST /v1/requests", Method::POST, "v1/requests", Some(request))
            .await
    }

    /// `GET /v1/requests/{id}/status`: public status lookup.
    pub async fn request_status(&self, id: Uuid) -> Result<RequestStatusView, FinApiError> {
        self.get_json(
            "GET /v1/requests/{id}/status",
            &format!("v1/requests/{id}/status"),
            &[],
        )
        .await
    }

    /// `GET /v1/requests`: review list, pending first.
    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<PaymentRequest>, FinApiError> {
        let query: Vec<(&str, String)> = status
            .map(|s| ("status", s.to_string()))
            .into_iter()
            .collect();
        self.get_json("GET /v1/requests", "v1/requests", &query).await
    }

    /// `GET /v1/requests/{id}`: full record including bank details.
    pub async fn get_request(&self, id: Uuid) -> Result<PaymentRequest, FinApiError> {
        self.get_json("GET /v1/requests/{id}", &format!("v1/requests/{id}"), &[])
            .await
    }

    /// `GET /v1/requests/{id}/history`
    pub async fn request_history(&self, id: Uuid) -> Result<Vec<TransitionEntry>, FinApiError> {
        self.get_json(
            "GET /v1/requests/{id}/history",
            &format!("v1/requests/{id}/history"),
            &[],
        )
        .await
    }

    /// `POST /v1/requests/{id}/approve`
    pub async fn approve_request(&self, id: Uuid) -> Result<PaymentRequest, FinApiError> {
        self.send_json::<(), _>(
            "POST /v1/requests/{id}/approve",
            Method::POST,
            &format!("v1/requests/{id}/approve"),
            None,
        )
        .await
    }

    /// `POST /v1/requests/{id}/reject`
    pub async fn reject_request(&self, id: Uuid, reason: &str) -> Result<PaymentRequest, FinApiError> {
        self.send_json(
            "POST /v1/requests/{id}/reject",
            Method::POST,
            &format!("v1/requests/{id}/reject"),
            Some(&RejectBody { reason }),
        )
        .await
    }

    // -- Disbursements --------------------------------------------------------

    /// `GET /v1/disbursements/queue`: approved requests awaiting payment.
    pub async fn disbursement_queue(&self) -> Result<Vec<PaymentRequest>, FinApiError> {
        self.get_json("GET /v1/disbursements/queue", "v1/disbursements/queue", &[])
            .await
    }

    /// `POST /v1/disbursements`: pay out an approved request.
    pub async fn create_disbursement(
        &self,
        disbursement: &NewDisbursement,
    ) -> Result<Disbursement, FinApiError> {
        self.send_json(
            "POST /v1/disbursements",
            Method::POST,
            "v1/disbursements",
            Some(disbursement),
        )
        .await
    }

    /// `GET /v1/disbursements`: payout history, newest first.
    pub async fn list_disbursements(&self) -> Result<Vec<DisbursementView>, FinApiError> {
        self.get_json("GET /v1/disbursements", "v1/disbursements", &[])
            .await
    }

    // -- Ledger ---------------------------------------------------------------

    /// `POST /v1/transactions`
    pub async fn create_transaction(
        &self,
        entry: &NewTransaction,
    ) -> Result<LedgerTransaction, FinApiError> {
        self.send_json("POST /v1/transactions", Method::POST, "v1/transactions", Some(entry))
            .await
    }

    /// `GET /v1/transactions`, optionally for one month.
    pub async fn list_transactions(
        &self,
        month: Option<MonthKey>,
    ) -> Result<Vec<LedgerTransaction>, FinApiError> {
        self.get_json("GET /v1/transactions", "v1/transactions", &month_query("month", month))
            .await
    }

    /// `GET /v1/ledger/summary`, optionally for one month.
    pub async fn ledger_summary(&self, month: Option<MonthKey>) -> Result<LedgerSummary, FinApiError> {
        self.get_json(
            "GET /v1/ledger/summary",
            "v1/ledger/summary",
            &month_query("month", month),
        )
        .await
    }

    // -- Audit & dashboard ----------------------------------------------------

    /// `GET /v1/audit-logs`, newest first.
    pub async fn audit_logs(&self, month: Option<MonthKey>) -> Result<Vec<AuditLogEntry>, FinApiError> {
        self.get_json("GET /v1/audit-logs", "v1/audit-logs", &month_query("month", month))
            .await
    }

    /// `GET /v1/audit-logs/verify`
    pub async fn verify_audit_chain(&self) -> Result<ChainVerification, FinApiError> {
        self.get_json("GET /v1/audit-logs/verify", "v1/audit-logs/verify", &[])
            .await
    }

    /// `GET /v1/dashboard`
    pub async fn dashboard(&self, audit_month: Option<MonthKey>) -> Result<Dashboard, FinApiError> {
        self.get_json(
            "GET /v1/dashboard",
            "v1/dashboard",
            &month_query("audit_month", audit_month),
        )
        .await
    }

    // -- Session --------------------------------------------------------------

    /// `POST /v1/session`: exchange a name and passcode for a token.
    pub async fn login(&self, username: &str, passcode: &str) -> Result<Session, FinApiError> {
        let passcode = Zeroizing::new(passcode.to_string());
        self.send_json(
            "POST /v1/session",
            Method::POST,
            "v1/session",
            Some(&LoginBody {
                username,
                passcode: passcode.as_str(),
            }),
        )
        .await
    }

    // -- Plumbing -------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        self.http.request(method, url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FinApiError> {
        let resp = retry_get(self, path, query)
            .await
            .map_err(|e| http_error(endpoint, e))?;
        decode(endpoint, resp).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, FinApiError> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(|e| http_error(endpoint, e))?;
        decode(endpoint, resp).await
    }
}

fn build_http(timeout_secs: u64, token: Option<&str>) -> Result<reqwest::Client, FinApiError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| FinApiError::Config(ConfigError::InvalidToken))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| FinApiError::Http {
            endpoint: "client_init".into(),
            source: e,
        })
}

async fn retry_get(
    client: &FinClient,
    path: &str,
    query: &[(&str, String)],
) -> Result<Response, reqwest::Error> {
    retry::retry_send(|| client.request(Method::GET, path).query(query).send()).await
}

fn month_query(name: &'static str, month: Option<MonthKey>) -> Vec<(&'static str, String)> {
    month.map(|m| (name, m.to_string())).into_iter().collect()
}

fn http_error(endpoint: &str, source: reqwest::Error) -> FinApiError {
    FinApiError::Http {
        endpoint: endpoint.to_string(),
        source,
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T, FinApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(endpoint, status = status.as_u16(), "finance API rejected call");
        return Err(FinApiError::ApiError {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    resp.json().await.map_err(|e| FinApiError::Deserialization {
        endpoint: endpoint.to_string(),
        source: e,
    })
}
