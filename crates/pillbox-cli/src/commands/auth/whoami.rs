//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Fetch the profile from the server instead of the stored copy
    #[arg(long)]
    pub fetch: bool,

    /// Print the full profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, session: &CliSession) -> Result<()> {
    let user = if args.fetch {
        session.auth().me().await.context("Failed to fetch profile")?
    } else {
        session
            .client()
            .current_user()
            .await
            .context("Failed to load session")?
            .context("No active session. Run 'pillbox auth login' first.")?
    };

    if args.json {
        return output::json_pretty(&user);
    }

    output::field("ID", &user.id);
    output::field("Name", &user.display_name());
    output::field("Email", &user.email);
    if !user.user_type.is_empty() {
        output::field("Type", &user.user_type);
    }

    Ok(())
}
