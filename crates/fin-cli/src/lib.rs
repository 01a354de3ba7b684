//! # fin-cli: Operator CLI for the TRH finance stack
//!
//! Provides the `fin` command-line interface over a running `fin-api`
//! service.
//!
//! ## Subcommands
//!
//! - `fin request`: Submit, look up, review, approve and reject requests.
//! - `fin disburse`: Payout queue, paying out, payout history.
//! - `fin ledger`: Record income and expenses, list, monthly summary.
//! - `fin audit`: Browse the action log and verify its hash chain.
//! - `fin dashboard`: Headline figures plus a month of audit activity.
//! - `fin catalog`: Departments, categories and payment methods.
//! - `fin login`: Exchange a name and passcode for a bearer token.
//!
//! Every subcommand prints a human-readable table by default and the raw
//! response with `--json`.
//!
//! ```bash
//! export FIN_API_TOKEN=$(fin login --user Admin --token-only)
//! fin request list --status PENDING
//! fin request approve 6f1c1a52-8a4e-4d4b-9a55-0f4b4c1e2d11
//! fin disburse pay 6f1c1a52-8a4e-4d4b-9a55-0f4b4c1e2d11 --signature-file sig.txt
//! ```

pub mod audit;
pub mod disburse;
pub mod ledger;
pub mod overview;
pub mod request;
pub mod session;

use anyhow::Result;
use fin_client::FinClient;
use fin_core::{PaymentMethod, RequestStatus, TransactionType};
use serde::Serialize;

/// Shared state for every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    /// Client for the configured service.
    pub client: FinClient,
    /// Print raw JSON instead of tables.
    pub json: bool,
}

impl Context {
    /// Print `value` as pretty JSON when `--json` is set, otherwise run
    /// `human`.
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Parse a request status, case-insensitively.
pub fn parse_status(s: &str) -> Result<RequestStatus, String> {
    RequestStatus::from_name(&s.trim().to_ascii_uppercase())
        .ok_or_else(|| format!("unknown status '{s}' (PENDING, APPROVED, REJECTED, PAID)"))
}

/// Parse a payment method, case-insensitively. `-` and spaces read as `_`.
pub fn parse_method(s: &str) -> Result<PaymentMethod, String> {
    let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
    PaymentMethod::from_name(&normalized)
        .ok_or_else(|| format!("unknown payment method '{s}' (CASH, BANK_TRANSFER, POS)"))
}

/// Parse a ledger entry type, case-insensitively.
pub fn parse_transaction_type(s: &str) -> Result<TransactionType, String> {
    TransactionType::from_name(&s.trim().to_ascii_uppercase())
        .ok_or_else(|| format!("unknown entry type '{s}' (INCOME, EXPENSE)"))
}

/// Shorten text to `max` characters for table cells.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
