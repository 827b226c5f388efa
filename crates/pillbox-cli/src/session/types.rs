//! CLI session wrapper.

use std::path::{Path, PathBuf};

use pillbox_core::Error;
use pillbox_http::{AuthApi, TokenClient};

use crate::output;

/// Client and auth endpoints for one CLI invocation.
#[derive(Debug, Clone)]
pub struct CliSession {
    client: TokenClient,
    auth: AuthApi,
    data_dir: PathBuf,
}

impl CliSession {
    pub fn new(client: TokenClient, data_dir: PathBuf) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            client,
            data_dir,
        }
    }

    pub fn client(&self) -> &TokenClient {
        &self.client
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Tells the user to log in again when the session is ended for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliObserver;

impl pillbox_core::SessionObserver for CliObserver {
    fn session_ended(&self, error: &Error) {
        tracing::debug!(error = %error, "Session ended by client");
        output::warning("Stored session cleared. Run 'pillbox auth login' to sign in again.");
    }
}
