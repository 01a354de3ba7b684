//! # Audit Subcommand
//!
//! - `list`: Action log, newest first, optionally for one month.
//! - `verify`: Walk the hash chain. Exits 2 when a link is broken.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use fin_core::{AuditLogEntry, MonthKey};

use crate::{truncate, Context};

/// Exit code when the audit chain fails verification.
pub const EXIT_CHAIN_BROKEN: u8 = 2;

/// Arguments for the `fin audit` subcommand.
#[derive(Args, Debug)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands.
#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// Browse the action log.
    List {
        /// Only this month, YYYY-MM.
        #[arg(long)]
        month: Option<MonthKey>,
    },

    /// Verify the hash chain.
    Verify,
}

/// Execute the audit subcommand.
pub async fn run_audit(args: &AuditArgs, ctx: &Context) -> Result<u8> {
    match &args.command {
        AuditCommand::List { month } => {
            let entries = ctx
                .client
                .audit_logs(*month)
                .await
                .context("failed to load audit log")?;
            ctx.emit(&entries, |e| print_audit_table(e))?;
            Ok(0)
        }

        AuditCommand::Verify => {
            let verification = ctx
                .client
                .verify_audit_chain()
                .await
                .context("failed to verify audit chain")?;
            ctx.emit(&verification, |v| {
                if v.valid {
                    println!("OK: {} entries, head {}", v.total_entries, v.head_hash);
                } else {
                    let at = v
                        .first_broken_sequence
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "?".to_string());
                    println!("BROKEN: chain of {} entries fails at sequence {at}", v.total_entries);
                }
            })?;
            if verification.valid {
                Ok(0)
            } else {
                tracing::error!(
                    first_broken_sequence = ?verification.first_broken_sequence,
                    "audit chain verification failed"
                );
                Ok(EXIT_CHAIN_BROKEN)
            }
        }
    }
}

/// One row per audit entry.
pub(crate) fn print_audit_table(entries: &[AuditLogEntry]) {
    if entries.is_empty() {
        println!("no audit entries");
        return;
    }
    println!(
        "{:>5}  {:<16}  {:<13}  {:<18}  {:<16}  {}",
        "SEQ", "WHEN", "MODULE", "ACTION", "USER", "RECORD"
    );
    for e in entries {
        println!(
            "{:>5}  {:<16}  {:<13}  {:<18}  {:<16}  {}",
            e.sequence,
            e.timestamp.format("%Y-%m-%d %H:%M"),
            e.module.to_string(),
            e.action,
            truncate(&e.user, 16),
            e.record_id
        );
    }
}
