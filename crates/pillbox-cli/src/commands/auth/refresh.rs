//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, session: &CliSession) -> Result<()> {
    eprintln!("{}", "Refreshing session...".dimmed());

    session
        .auth()
        .refresh_tokens()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    if let Some(status) = session.client().token_status().await? {
        output::field("Access token expires", &status.access_expiry.to_rfc3339());
        output::field("Refresh token expires", &status.refresh_expiry.to_rfc3339());
    }

    Ok(())
}
