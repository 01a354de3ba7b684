//! # Dashboard and Catalog Subcommands

use anyhow::{Context as _, Result};
use clap::Args;
use fin_core::MonthKey;

use crate::audit::print_audit_table;
use crate::Context;

/// Arguments for the `fin dashboard` subcommand.
#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Month of audit activity to show, YYYY-MM. Defaults to the current
    /// month on the server.
    #[arg(long)]
    pub audit_month: Option<MonthKey>,
}

/// Show headline figures and a month of audit activity.
pub async fn run_dashboard(args: &DashboardArgs, ctx: &Context) -> Result<u8> {
    let dashboard = ctx
        .client
        .dashboard(args.audit_month)
        .await
        .context("failed to load dashboard")?;
    ctx.emit(&dashboard, |d| {
        let s = &d.stats;
        println!("Total income:      {}", s.total_income);
        println!("Total expenses:    {}", s.total_expenses);
        println!("Balance:           {}", s.balance);
        println!("Pending requests:  {}", s.pending_requests);
        println!(
            "Paid requests:     {} cash, {} digital",
            s.paid_by_channel.cash, s.paid_by_channel.digital
        );
        println!("Total disbursed:   {}", s.total_disbursed);
        println!();
        println!("Activity for {}", d.audit_month);
        print_audit_table(&d.recent_audit);
    })?;
    Ok(0)
}

/// List the fixed vocabularies.
pub async fn run_catalog(ctx: &Context) -> Result<u8> {
    let catalog = ctx.client.catalog().await.context("failed to load catalog")?;
    ctx.emit(&catalog, |c| {
        println!("Currency: {} ({})", c.currency_code, c.currency_symbol);
        let methods: Vec<&str> = c.payment_methods.iter().map(|m| m.as_str()).collect();
        println!("Payment methods: {}", methods.join(", "));
        println!("Departments:");
        for d in &c.departments {
            println!("  {d}");
        }
        println!("Income categories:");
        for cat in &c.income_categories {
            println!("  {cat}");
        }
        println!("Expense categories:");
        for cat in &c.expense_categories {
            println!("  {cat}");
        }
    })?;
    Ok(0)
}
