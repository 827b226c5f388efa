//! Session setup for CLI commands.

mod storage;
mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use pillbox_core::{ApiUrl, CredentialStore};
use pillbox_file::FileStore;
use pillbox_http::{ClientConfig, TokenClient};

use crate::cli::GlobalArgs;

pub use types::{CliObserver, CliSession};

/// Build the client every command runs against.
///
/// Nothing touches the network or the disk here; the data directory is
/// created on first write.
pub fn open(global: &GlobalArgs) -> Result<CliSession> {
    let api_url = ApiUrl::new(&global.api_url).context("Invalid API URL")?;
    let data_dir = storage::data_dir(global.data_dir.as_deref())?;

    let config = ClientConfig::new(api_url).with_timeout(Duration::from_secs(global.timeout_secs));
    let store = CredentialStore::new(Arc::new(FileStore::new(&data_dir)));

    let client = TokenClient::builder(config)
        .store(store)
        .observer(Arc::new(CliObserver))
        .build()
        .context("Failed to create API client")?;

    Ok(CliSession::new(client, data_dir))
}
