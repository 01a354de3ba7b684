//! # Ledger Subcommand
//!
//! - `add`: Record an income or expense entry.
//! - `list`: Entries, newest date first, optionally for one month.
//! - `summary`: Income, expense and balance.

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use fin_client::NewTransaction;
use fin_core::{Amount, LedgerTransaction, MonthKey, TransactionType};

use crate::{parse_transaction_type, truncate, Context};

/// Arguments for the `fin ledger` subcommand.
#[derive(Args, Debug)]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub command: LedgerCommand,
}

/// Ledger subcommands.
#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Record an income or expense entry.
    Add {
        /// INCOME or EXPENSE.
        #[arg(long = "type", value_parser = parse_transaction_type)]
        kind: TransactionType,
        /// Category for the entry type (see `fin catalog`).
        #[arg(long)]
        category: String,
        /// Amount, e.g. 50000 or 50000.00.
        #[arg(long)]
        amount: Amount,
        /// Free-text note.
        #[arg(long, default_value = "")]
        description: String,
        /// Entry date, YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List ledger entries.
    List {
        /// Only this month, YYYY-MM.
        #[arg(long)]
        month: Option<MonthKey>,
    },

    /// Show income, expense and balance.
    Summary {
        /// Only this month, YYYY-MM.
        #[arg(long)]
        month: Option<MonthKey>,
    },
}

/// Execute the ledger subcommand.
pub async fn run_ledger(args: &LedgerArgs, ctx: &Context) -> Result<u8> {
    match &args.command {
        LedgerCommand::Add {
            kind,
            category,
            amount,
            description,
            date,
        } => {
            let entry = NewTransaction {
                kind: *kind,
                category: category.clone(),
                amount: *amount,
                description: description.clone(),
                date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
            };
            let recorded = ctx
                .client
                .create_transaction(&entry)
                .await
                .context("failed to record ledger entry")?;
            ctx.emit(&recorded, |t| {
                println!("OK: recorded {} {} ({}) on {}", t.kind, t.amount, t.category, t.date);
            })?;
        }

        LedgerCommand::List { month } => {
            let entries = ctx
                .client
                .list_transactions(*month)
                .await
                .context("failed to list ledger entries")?;
            ctx.emit(&entries, |e| print_entries(e))?;
        }

        LedgerCommand::Summary { month } => {
            let summary = ctx
                .client
                .ledger_summary(*month)
                .await
                .context("failed to load ledger summary")?;
            ctx.emit(&summary, |s| {
                match s.month {
                    Some(m) => println!("Ledger for {m}"),
                    None => println!("Ledger, all time"),
                }
                println!("  income:   {}", s.total_income);
                println!("  expense:  {}", s.total_expense);
                println!("  balance:  {}", s.balance);
            })?;
        }
    }
    Ok(0)
}

fn print_entries(entries: &[LedgerTransaction]) {
    if entries.is_empty() {
        println!("no ledger entries");
        return;
    }
    println!(
        "{:<10}  {:<7}  {:<22}  {:>14}  {:<12}  {}",
        "DATE", "TYPE", "CATEGORY", "AMOUNT", "BY", "DESCRIPTION"
    );
    for t in entries {
        println!(
            "{:<10}  {:<7}  {:<22}  {:>14}  {:<12}  {}",
            t.date,
            t.kind,
            truncate(&t.category, 22),
            t.amount.to_string(),
            truncate(&t.recorded_by, 12),
            truncate(&t.description, 40)
        );
    }
}
