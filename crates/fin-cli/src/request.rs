//! # Request Subcommand
//!
//! Fund request submission and review.
//!
//! - `submit`: File a new request (no token needed).
//! - `status`: Public status lookup by id.
//! - `list`: Review list, pending first.
//! - `show`: Full record including bank details.
//! - `history`: Status changes with actor and reason.
//! - `approve`: PENDING → APPROVED.
//! - `reject`: PENDING → REJECTED with a reason.

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use fin_client::NewRequest;
use fin_core::{Amount, BankDetails, PaymentMethod, PaymentRequest, RequestStatus};
use uuid::Uuid;

use crate::{parse_method, parse_status, truncate, Context};

/// Arguments for the `fin request` subcommand.
#[derive(Args, Debug)]
pub struct RequestArgs {
    #[command(subcommand)]
    pub command: RequestCommand,
}

/// Request subcommands.
#[derive(Subcommand, Debug)]
pub enum RequestCommand {
    /// Submit a new fund request.
    Submit {
        /// Name of the staff member asking for funds.
        #[arg(long)]
        name: String,
        /// Department (see `fin catalog`).
        #[arg(long)]
        department: String,
        /// Amount, e.g. 15000 or 15000.50.
        #[arg(long)]
        amount: Amount,
        /// What the money is for.
        #[arg(long)]
        purpose: String,
        /// CASH, BANK_TRANSFER or POS.
        #[arg(long, value_parser = parse_method)]
        method: PaymentMethod,
        /// Date needed, YYYY-MM-DD.
        #[arg(long)]
        date_needed: NaiveDate,
        /// Link to a supporting document.
        #[arg(long)]
        attachment_url: Option<String>,
        /// Bank name (electronic methods).
        #[arg(long)]
        bank_name: Option<String>,
        /// Account holder name (electronic methods).
        #[arg(long)]
        account_name: Option<String>,
        /// Account number (required for BANK_TRANSFER and POS).
        #[arg(long)]
        account_number: Option<String>,
    },

    /// Look up the status of a request.
    Status {
        /// Request identifier.
        id: Uuid,
    },

    /// List requests for review.
    List {
        /// Only show requests in this status.
        #[arg(long, value_parser = parse_status)]
        status: Option<RequestStatus>,
    },

    /// Show a full request record.
    Show {
        /// Request identifier.
        id: Uuid,
    },

    /// Show the status changes of a request.
    History {
        /// Request identifier.
        id: Uuid,
    },

    /// Approve a pending request.
    Approve {
        /// Request identifier.
        id: Uuid,
    },

    /// Reject a pending request.
    Reject {
        /// Request identifier.
        id: Uuid,
        /// Reason shown to the requester.
        #[arg(long)]
        reason: String,
    },
}

/// Execute the request subcommand.
pub async fn run_request(args: &RequestArgs, ctx: &Context) -> Result<u8> {
    match &args.command {
        RequestCommand::Submit {
            name,
            department,
            amount,
            purpose,
            method,
            date_needed,
            attachment_url,
            bank_name,
            account_name,
            account_number,
        } => {
            let bank_details = BankDetails {
                bank_name: bank_name.clone(),
                account_name: account_name.clone(),
                account_number: account_number.clone(),
            };
            let new = NewRequest {
                requester_name: name.clone(),
                department: department.clone(),
                amount: *amount,
                purpose: purpose.clone(),
                method: *method,
                date_needed: *date_needed,
                attachment_url: attachment_url.clone(),
                bank_details: (!bank_details.is_empty()).then_some(bank_details),
            };
            let request = ctx
                .client
                .submit_request(&new)
                .await
                .context("failed to submit request")?;
            ctx.emit(&request, |r| {
                println!("OK: submitted request {} ({})", r.id, r.status);
            })?;
        }

        RequestCommand::Status { id } => {
            let view = ctx
                .client
                .request_status(*id)
                .await
                .with_context(|| format!("failed to look up request {id}"))?;
            ctx.emit(&view, |v| {
                println!("{}  {}", v.id, v.status);
                println!("  {} ({}) {} via {}", v.requester_name, v.department, v.amount, v.method);
                println!("  needed by {}: {}", v.date_needed, v.purpose);
                if let Some(reason) = &v.rejection_reason {
                    println!("  rejected: {reason}");
                }
            })?;
        }

        RequestCommand::List { status } => {
            let requests = ctx
                .client
                .list_requests(*status)
                .await
                .context("failed to list requests")?;
            ctx.emit(&requests, |rs| print_request_table(rs))?;
        }

        RequestCommand::Show { id } => {
            let request = ctx
                .client
                .get_request(*id)
                .await
                .with_context(|| format!("failed to load request {id}"))?;
            ctx.emit(&request, print_request_detail)?;
        }

        RequestCommand::History { id } => {
            let history = ctx
                .client
                .request_history(*id)
                .await
                .with_context(|| format!("failed to load history of request {id}"))?;
            ctx.emit(&history, |entries| {
                if entries.is_empty() {
                    println!("no status changes");
                }
                for e in entries {
                    let reason = e.reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default();
                    println!(
                        "{}  {} -> {}  by {}{}",
                        e.timestamp.format("%Y-%m-%d %H:%M"),
                        e.from,
                        e.to,
                        e.actor,
                        reason
                    );
                }
            })?;
        }

        RequestCommand::Approve { id } => {
            let request = ctx
                .client
                .approve_request(*id)
                .await
                .with_context(|| format!("failed to approve request {id}"))?;
            ctx.emit(&request, |r| println!("OK: request {} is {}", r.id, r.status))?;
        }

        RequestCommand::Reject { id, reason } => {
            let request = ctx
                .client
                .reject_request(*id, reason)
                .await
                .with_context(|| format!("failed to reject request {id}"))?;
            ctx.emit(&request, |r| println!("OK: request {} is {}", r.id, r.status))?;
        }
    }
    Ok(0)
}

/// One row per request.
pub(crate) fn print_request_table(requests: &[PaymentRequest]) {
    if requests.is_empty() {
        println!("no requests");
        return;
    }
    println!(
        "{:<36}  {:<8}  {:<20}  {:<14}  {:>14}  {:<13}  {}",
        "ID", "STATUS", "REQUESTER", "DEPARTMENT", "AMOUNT", "METHOD", "NEEDED"
    );
    for r in requests {
        println!(
            "{:<36}  {:<8}  {:<20}  {:<14}  {:>14}  {:<13}  {}",
            r.id,
            r.status,
            truncate(&r.requester_name, 20),
            truncate(&r.department, 14),
            r.amount.to_string(),
            r.method,
            r.date_needed
        );
    }
}

fn print_request_detail(r: &PaymentRequest) {
    println!("{}  {}", r.id, r.status);
    println!("  requester:  {} ({})", r.requester_name, r.department);
    println!("  amount:     {} via {}", r.amount, r.method);
    println!("  purpose:    {}", r.purpose);
    println!("  needed by:  {}", r.date_needed);
    if let Some(url) = &r.attachment_url {
        println!("  attachment: {url}");
    }
    let bank = &r.bank_details;
    if !bank.is_empty() {
        println!(
            "  bank:       {} / {} / {}",
            bank.bank_name.as_deref().unwrap_or("-"),
            bank.account_name.as_deref().unwrap_or("-"),
            bank.account_number.as_deref().unwrap_or("-")
        );
    }
    if let Some(reason) = &r.rejection_reason {
        println!("  rejected:   {reason}");
    }
    println!("  submitted:  {}", r.created_at.format("%Y-%m-%d %H:%M"));
}
