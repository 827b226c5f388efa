//! Verify-reset command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct VerifyResetArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Code from the reset email
    #[arg(long)]
    pub code: String,
}

pub async fn run(args: VerifyResetArgs, session: &CliSession) -> Result<()> {
    let message = session
        .auth()
        .verify_reset_password(&args.email, &args.code)
        .await
        .context("Failed to verify reset code")?;

    output::success(&message);

    Ok(())
}
