//! # fin CLI entry point
//!
//! Parses command-line arguments, builds a client for the configured
//! service and dispatches to subcommand handlers.

use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

use fin_cli::audit::{run_audit, AuditArgs};
use fin_cli::disburse::{run_disburse, DisburseArgs};
use fin_cli::ledger::{run_ledger, LedgerArgs};
use fin_cli::overview::{run_catalog, run_dashboard, DashboardArgs};
use fin_cli::request::{run_request, RequestArgs};
use fin_cli::session::{run_login, LoginArgs};
use fin_cli::Context;
use fin_client::{FinClient, FinClientConfig};

/// TRH finance operator CLI
///
/// Submit and review fund requests, pay out approved requests, keep the
/// income and expense ledger, and check the audit chain.
#[derive(Parser)]
#[command(name = "fin", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Service root URL.
    #[arg(long, env = "FIN_API_URL", default_value = fin_client::config::DEFAULT_API_URL, global = true)]
    api_url: Url,

    /// Bearer token for operator commands (see `fin login`).
    #[arg(long, env = "FIN_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "FIN_TIMEOUT_SECS", default_value_t = fin_client::config::DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    /// Print raw JSON responses.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit, look up and review fund requests.
    Request(RequestArgs),

    /// Pay out approved requests and browse payouts.
    Disburse(DisburseArgs),

    /// Record and summarise income and expenses.
    Ledger(LedgerArgs),

    /// Browse the action log and verify its hash chain.
    Audit(AuditArgs),

    /// Headline figures and recent activity.
    Dashboard(DashboardArgs),

    /// Departments, categories and payment methods.
    Catalog,

    /// Exchange a name and passcode for a bearer token.
    Login(LoginArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(api_url = %cli.api_url, "fin CLI starting");

    let result = async {
        let mut config = FinClientConfig::new(cli.api_url.clone());
        config.timeout_secs = cli.timeout;
        if let Some(token) = cli.token.as_deref().filter(|t| !t.trim().is_empty()) {
            config = config.with_token(token);
        }
        let client = FinClient::new(config).context("failed to build API client")?;
        let ctx = Context {
            client,
            json: cli.json,
        };

        match &cli.command {
            Commands::Request(args) => run_request(args, &ctx).await,
            Commands::Disburse(args) => run_disburse(args, &ctx).await,
            Commands::Ledger(args) => run_ledger(args, &ctx).await,
            Commands::Audit(args) => run_audit(args, &ctx).await,
            Commands::Dashboard(args) => run_dashboard(args, &ctx).await,
            Commands::Catalog => run_catalog(&ctx).await,
            Commands::Login(args) => run_login(args, &ctx).await,
        }
    }
    .await;

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
