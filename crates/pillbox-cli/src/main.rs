//! pillbox - command-line client for the pillbox medication-reminder API.
//!
//! A thin wrapper over `pillbox-http`: each subcommand is one page action
//! of the web front end (signup, login, password reset, ...) plus a raw
//! `request` command for calling any authenticated endpoint.

mod cli;
mod commands;
mod output;
mod session;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{auth, request};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    if let Err(err) = run(cli).await {
        output::error(&output::describe(&err));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let session = session::open(&cli.global)?;

    match cli.command {
        Commands::Auth(cmd) => auth::handle(cmd, &session).await,
        Commands::Request(args) => request::run(args, &session).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout stays machine-readable.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
