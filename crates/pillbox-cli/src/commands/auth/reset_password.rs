//! Reset-password command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Code from the reset email
    #[arg(long)]
    pub code: String,

    /// New password
    #[arg(long, env = "PILLBOX_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: ResetPasswordArgs, session: &CliSession) -> Result<()> {
    let message = session
        .auth()
        .reset_password(&args.email, &args.code, &args.password)
        .await
        .context("Failed to reset password")?;

    output::success(&message);

    Ok(())
}
