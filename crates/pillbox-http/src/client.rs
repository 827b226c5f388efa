//! HTTP transport.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace, warn};

use pillbox_core::error::{InvalidInputError, TransportError};
use pillbox_core::envelope::api_error;
use pillbox_core::{ApiUrl, Envelope, Error, Result};

use crate::config::ClientConfig;
use crate::request::ApiRequest;

/// A response whose body has been read but not interpreted.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub reason: Option<&'static str>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Interpret the response as an envelope, or as an API error for non-2xx.
    pub fn into_envelope<T: DeserializeOwned>(self) -> Result<Envelope<T>> {
        if self.is_success() {
            Envelope::decode(self.status, &self.body)
        } else {
            Err(api_error(self.status, self.reason, &self.body).into())
        }
    }
}

/// Thin wrapper over `reqwest` that knows the base URL and timeout.
///
/// Clone is cheap; the connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: ApiUrl,
    timeout: Duration,
}

impl HttpClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Http {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        })
    }

    /// Returns the base URL this client is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    /// Send a request, optionally with a bearer token, and read the body.
    ///
    /// Only transport failures are errors here; every HTTP status comes back
    /// as a [`RawResponse`].
    #[instrument(skip(self, request, bearer), fields(method = %request.method(), path = request.path()))]
    pub async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<RawResponse> {
        let url = self.base_url.endpoint(request.path());
        debug!(%url, authed = bearer.is_some(), "Sending request");

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .header(ACCEPT, "application/json");

        if !request.query_params().is_empty() {
            builder = builder.query(request.query_params());
        }
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, bearer_header(token)?);
        }
        if let Some(body) = request.body_json() {
            trace!(?body, "request body");
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        trace!(status = %status, len = body.len(), "Response received");

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason(),
            body: body.to_vec(),
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        let error = if err.is_timeout() {
            TransportError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        };
        warn!(error = %error, "Request failed");
        error.into()
    }
}

/// Create an `Authorization: Bearer` header value that is hidden from debug output.
fn bearer_header(token: &str) -> Result<HeaderValue> {
    let mut value =
        HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| InvalidInputError::Header {
            reason: "token contains characters not allowed in a header".to_string(),
        })?;
    value.set_sensitive(true);
    Ok(value)
}
