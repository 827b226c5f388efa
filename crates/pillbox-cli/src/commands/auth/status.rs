//! Status command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use pillbox_core::TokenStatus;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusReport {
    logged_in: bool,
    data_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens: Option<TokenStatus>,
}

pub async fn run(args: StatusArgs, session: &CliSession) -> Result<()> {
    let tokens = session
        .client()
        .token_status()
        .await
        .context("Failed to load session")?;

    let report = StatusReport {
        logged_in: tokens.is_some_and(|t| !t.refresh_expired),
        data_dir: session.data_dir().display().to_string(),
        tokens,
    };

    if args.json {
        return output::json_pretty(&report);
    }

    output::field("Logged in", if report.logged_in { "yes" } else { "no" });
    output::field("Session directory", &report.data_dir);
    if let Some(tokens) = &report.tokens {
        output::field(
            "Access token expires",
            &describe_expiry(tokens.access_expiry.to_rfc3339(), tokens.access_expired),
        );
        output::field(
            "Refresh token expires",
            &describe_expiry(tokens.refresh_expiry.to_rfc3339(), tokens.refresh_expired),
        );
    }

    Ok(())
}

fn describe_expiry(expiry: String, expired: bool) -> String {
    if expired {
        format!("{} (expired)", expiry)
    } else {
        expiry
    }
}
