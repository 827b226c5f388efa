//! Client configuration.

use std::time::Duration;

use pillbox_core::ApiUrl;
use pillbox_core::tokens::default_expiry_buffer;

/// Default API base URL, including the version prefix.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for [`TokenClient`](crate::TokenClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: ApiUrl,
    /// Timeout applied to each outbound request, refresh calls included.
    pub timeout: Duration,
    /// Tokens with this much lifetime left (or less) count as expired.
    pub expiry_buffer: chrono::Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration with default timeout and expiry buffer.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            expiry_buffer: default_expiry_buffer(),
            user_agent: concat!("pillbox/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_expiry_buffer(mut self, buffer: chrono::Duration) -> Self {
        self.expiry_buffer = buffer;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
