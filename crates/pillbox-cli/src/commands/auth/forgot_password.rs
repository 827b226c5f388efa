//! Forgot-password command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct ForgotPasswordArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,
}

pub async fn run(args: ForgotPasswordArgs, session: &CliSession) -> Result<()> {
    let message = session
        .auth()
        .forgot_password(&args.email)
        .await
        .context("Failed to request password reset")?;

    output::success(&message);
    eprintln!(
        "{}",
        "Run 'pillbox auth reset-password' with the emailed code.".dimmed()
    );

    Ok(())
}
