//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use pillbox_core::Credentials;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "PILLBOX_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, session: &CliSession) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let user = session
        .auth()
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Name", &user.display_name());
    output::field("Email", &user.email);

    Ok(())
}
