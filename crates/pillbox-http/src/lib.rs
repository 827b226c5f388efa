//! pillbox-http - HTTP client for the pillbox API with token lifecycle management.
//!
//! [`TokenClient`] attaches a valid access token to each request, refreshes
//! through a single shared in-flight call, and retries a 401 once.
//! [`AuthApi`] wraps the auth endpoints on top of it.

mod auth_api;
mod client;
mod config;
pub mod endpoints;
mod request;
mod token_client;

pub use auth_api::AuthApi;
pub use client::{HttpClient, RawResponse};
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
pub use endpoints::NewAccount;
pub use request::{ApiRequest, Auth};
pub use reqwest::Method;
pub use token_client::{TokenClient, TokenClientBuilder};
