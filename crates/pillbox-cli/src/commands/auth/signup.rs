//! Signup command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use pillbox_http::NewAccount;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "PILLBOX_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Account type
    #[arg(long, default_value = "patient")]
    pub user_type: String,
}

pub async fn run(args: SignupArgs, session: &CliSession) -> Result<()> {
    let account = NewAccount {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        password: args.password,
        user_type: args.user_type,
    };

    eprintln!("{}", "Creating account...".dimmed());

    let user = session
        .auth()
        .register(&account)
        .await
        .context("Failed to create account")?;

    output::success("Account created");
    println!();
    output::field("ID", &user.id);
    output::field("Name", &user.display_name());
    output::field("Email", &user.email);
    println!();
    eprintln!(
        "{}",
        "Check your inbox and run 'pillbox auth verify-email' with the code.".dimmed()
    );

    Ok(())
}
