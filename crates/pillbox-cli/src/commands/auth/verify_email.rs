//! Verify-email command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct VerifyEmailArgs {
    /// Email address being verified
    #[arg(long)]
    pub email: String,

    /// Code from the verification email
    #[arg(long)]
    pub code: String,
}

pub async fn run(args: VerifyEmailArgs, session: &CliSession) -> Result<()> {
    let message = session
        .auth()
        .verify_email(&args.email, &args.code)
        .await
        .context("Failed to verify email")?;

    output::success(&message);

    Ok(())
}
