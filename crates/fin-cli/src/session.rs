//! # Login Subcommand
//!
//! Exchanges an operator name and passcode for a bearer token. Export the
//! token as `FIN_API_TOKEN` for later commands.

use anyhow::{Context as _, Result};
use clap::Args;
use zeroize::Zeroizing;

use crate::Context;

/// Arguments for the `fin login` subcommand.
#[derive(Args)]
pub struct LoginArgs {
    /// Operator name, e.g. Admin.
    #[arg(long)]
    pub user: String,
    /// Passcode.
    #[arg(long, env = "FIN_PASSCODE", hide_env_values = true)]
    pub passcode: String,
    /// Print only the token.
    #[arg(long)]
    pub token_only: bool,
}

impl std::fmt::Debug for LoginArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginArgs")
            .field("user", &self.user)
            .field("passcode", &"[REDACTED]")
            .field("token_only", &self.token_only)
            .finish()
    }
}

/// Execute the login subcommand.
pub async fn run_login(args: &LoginArgs, ctx: &Context) -> Result<u8> {
    let passcode = Zeroizing::new(args.passcode.clone());
    let session = ctx
        .client
        .login(&args.user, &passcode)
        .await
        .with_context(|| format!("login failed for {}", args.user))?;
    if args.token_only {
        println!("{}", session.token);
        return Ok(0);
    }
    ctx.emit(&session, |s| {
        println!("OK: signed in as {}", s.user);
        println!("export FIN_API_TOKEN='{}'", s.token);
    })?;
    Ok(0)
}
