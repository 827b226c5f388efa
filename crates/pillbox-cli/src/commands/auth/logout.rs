//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, session: &CliSession) -> Result<()> {
    let message = session
        .auth()
        .logout()
        .await
        .context("Logged out locally, but the server reported an error")?;

    output::success(&message);

    Ok(())
}
