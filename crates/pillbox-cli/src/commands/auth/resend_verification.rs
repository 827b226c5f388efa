//! Resend-verification command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct ResendVerificationArgs {
    /// Email address to send the code to
    #[arg(long)]
    pub email: String,
}

pub async fn run(args: ResendVerificationArgs, session: &CliSession) -> Result<()> {
    let message = session
        .auth()
        .send_verification_email(&args.email)
        .await
        .context("Failed to send verification email")?;

    output::success(&message);

    Ok(())
}
