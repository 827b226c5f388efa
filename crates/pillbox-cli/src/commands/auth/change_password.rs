//! Change-password command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct ChangePasswordArgs {
    /// Current password
    #[arg(long, env = "PILLBOX_PASSWORD", hide_env_values = true)]
    pub current: String,

    /// New password
    #[arg(long = "new", env = "PILLBOX_NEW_PASSWORD", hide_env_values = true)]
    pub new_password: String,
}

pub async fn run(args: ChangePasswordArgs, session: &CliSession) -> Result<()> {
    let message = session
        .auth()
        .change_password(&args.current, &args.new_password)
        .await
        .context("Failed to change password")?;

    output::success(&message);

    Ok(())
}
