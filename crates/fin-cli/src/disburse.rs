//! # Disburse Subcommand
//!
//! Paying out approved requests.
//!
//! - `queue`: Approved requests awaiting payment, most urgent first.
//! - `pay`: Record a payout; the request becomes PAID.
//! - `list`: Payout history, newest first.
//!
//! Cash payouts need the receiver's signature as an image data URL
//! (`data:image/png;base64,...`), given inline or read from a file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};
use fin_client::{DisbursementView, NewDisbursement};
use fin_core::{Amount, DisbursementProof, PaymentMethod};
use uuid::Uuid;

use crate::request::print_request_table;
use crate::{parse_method, truncate, Context};

/// Arguments for the `fin disburse` subcommand.
#[derive(Args, Debug)]
pub struct DisburseArgs {
    #[command(subcommand)]
    pub command: DisburseCommand,
}

/// Disbursement subcommands.
#[derive(Subcommand, Debug)]
pub enum DisburseCommand {
    /// List approved requests awaiting payment.
    Queue,

    /// Pay out an approved request.
    Pay {
        /// Request identifier.
        request_id: Uuid,
        /// Expected amount; the service rejects a mismatch.
        #[arg(long)]
        amount: Option<Amount>,
        /// Expected method; the service rejects a mismatch.
        #[arg(long, value_parser = parse_method)]
        method: Option<PaymentMethod>,
        /// Bank or terminal reference (BANK_TRANSFER, POS).
        #[arg(long)]
        transaction_ref: Option<String>,
        /// Destination bank (BANK_TRANSFER, POS).
        #[arg(long)]
        bank_name: Option<String>,
        /// Destination account (BANK_TRANSFER, POS).
        #[arg(long)]
        account_number: Option<String>,
        /// Person receiving cash. Defaults to the requester.
        #[arg(long)]
        receiver: Option<String>,
        /// Signature data URL (CASH).
        #[arg(long, conflicts_with = "signature_file")]
        signature: Option<String>,
        /// File holding the signature data URL (CASH).
        #[arg(long)]
        signature_file: Option<PathBuf>,
        /// Link to a receipt or screenshot.
        #[arg(long)]
        evidence_url: Option<String>,
    },

    /// Show payout history.
    List,
}

/// Execute the disburse subcommand.
pub async fn run_disburse(args: &DisburseArgs, ctx: &Context) -> Result<u8> {
    match &args.command {
        DisburseCommand::Queue => {
            let queue = ctx
                .client
                .disbursement_queue()
                .await
                .context("failed to load the payout queue")?;
            ctx.emit(&queue, |q| print_request_table(q))?;
        }

        DisburseCommand::Pay {
            request_id,
            amount,
            method,
            transaction_ref,
            bank_name,
            account_number,
            receiver,
            signature,
            signature_file,
            evidence_url,
        } => {
            let signature = match (signature, signature_file) {
                (Some(inline), _) => Some(inline.trim().to_string()),
                (None, Some(path)) => Some(read_signature(path)?),
                (None, None) => None,
            };
            let new = NewDisbursement {
                request_id: *request_id,
                amount: *amount,
                method: *method,
                transaction_ref: transaction_ref.clone(),
                bank_name: bank_name.clone(),
                account_number: account_number.clone(),
                receiver_name: receiver.clone(),
                signature,
                evidence_url: evidence_url.clone(),
            };
            let disbursement = ctx
                .client
                .create_disbursement(&new)
                .await
                .with_context(|| format!("failed to pay out request {request_id}"))?;
            ctx.emit(&disbursement, |d| {
                println!(
                    "OK: paid {} via {} for request {} (disbursement {})",
                    d.amount, d.method, d.request_id, d.id
                );
            })?;
        }

        DisburseCommand::List => {
            let history = ctx
                .client
                .list_disbursements()
                .await
                .context("failed to list disbursements")?;
            ctx.emit(&history, |h| print_history(h))?;
        }
    }
    Ok(0)
}

/// Read a signature data URL from a file, trimming surrounding whitespace.
pub fn read_signature(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read signature file {}", path.display()))?;
    let trimmed = raw.trim();
    if !trimmed.starts_with("data:image/") {
        bail!(
            "{} does not contain an image data URL (data:image/png;base64,...)",
            path.display()
        );
    }
    Ok(trimmed.to_string())
}

fn print_history(history: &[DisbursementView]) {
    if history.is_empty() {
        println!("no disbursements");
        return;
    }
    println!(
        "{:<16}  {:<20}  {:>14}  {:<13}  {:<12}  {}",
        "PAID AT", "REQUESTER", "AMOUNT", "METHOD", "BY", "PROOF"
    );
    for view in history {
        let d = &view.disbursement;
        let proof = match &d.proof {
            DisbursementProof::Electronic { transaction_ref, .. } => format!("ref {transaction_ref}"),
            DisbursementProof::Cash { receiver_name, .. } => format!("signed by {receiver_name}"),
        };
        println!(
            "{:<16}  {:<20}  {:>14}  {:<13}  {:<12}  {}",
            d.processed_at.format("%Y-%m-%d %H:%M"),
            truncate(&view.requester_name, 20),
            d.amount.to_string(),
            d.method,
            truncate(&d.processed_by, 12),
            proof
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_file_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig.txt");
        std::fs::write(&path, "  data:image/png;base64,iVBORw0KGgo=\n").unwrap();
        assert_eq!(
            read_signature(&path).unwrap(),
            "data:image/png;base64,iVBORw0KGgo="
        );
    }

    #[test]
    fn signature_file_must_hold_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig.png");
        std::fs::write(&path, "\u{89}PNG raw bytes").unwrap();
        let err = read_signature(&path).unwrap_err();
        assert!(err.to_string().contains("data URL"));
    }

    #[test]
    fn missing_signature_file_names_path() {
        let err = read_signature(&PathBuf::from("/nonexistent/sig.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sig.txt"));
    }
}
