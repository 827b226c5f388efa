//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use pillbox_http::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};

use crate::commands::auth::AuthCommand;
use crate::commands::request::RequestArgs;

/// Command-line client for the pillbox medication-reminder API.
#[derive(Parser, Debug)]
#[command(name = "pillbox")]
#[command(author, version = env!("PILLBOX_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to talk to and where to keep the session.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// API base URL, including the version prefix
    #[arg(long, env = "PILLBOX_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Directory holding the stored session [default: platform data dir]
    #[arg(long, env = "PILLBOX_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Account and session operations
    Auth(AuthCommand),

    /// Send a request to any API path with the stored session
    Request(RequestArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pillbox",
            "auth",
            "status",
            "--api-url",
            "https://api.example.com/api/v1",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.global.api_url, "https://api.example.com/api/v1");
        assert_eq!(cli.global.timeout_secs, 5);
    }

    #[test]
    fn change_password_takes_both_passwords() {
        let cli = Cli::try_parse_from([
            "pillbox",
            "auth",
            "change-password",
            "--current",
            "old-pass",
            "--new",
            "new-pass",
        ])
        .unwrap();
        let Commands::Auth(auth) = cli.command else {
            panic!("expected an auth command");
        };
        let crate::commands::auth::AuthSubcommand::ChangePassword(args) = auth.command else {
            panic!("expected change-password");
        };
        assert_eq!(args.current, "old-pass");
        assert_eq!(args.new_password, "new-pass");
    }
}
