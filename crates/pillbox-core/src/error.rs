//! Error types for the pillbox client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, response-shape, input validation and
//! storage failures. Every variant is `Clone` so that a single refresh
//! failure can be handed to every caller waiting on it.

use std::fmt;
use thiserror::Error;

/// Message shown when the session can no longer be used.
pub const SESSION_EXPIRED_MESSAGE: &str =
    "You are not logged in or your session has expired. Please log in again.";

/// Message shown when a refresh attempt ended the session.
pub const REFRESH_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Message shown when nothing better can be extracted from an error body.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// The unified error type for pillbox operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, HTTP layer).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Terminal authentication errors. The session has been cleared.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The server answered with an error status or a failed envelope.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The response body could not be read as the expected envelope.
    #[error("malformed response (HTTP {status}): {message}")]
    MalformedResponse { status: u16, message: String },

    /// Input validation errors (base URL, header values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Failures of the backing key-value store.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport failure or timeout.
    Network,
    /// The access token was rejected and the retry did not help.
    AuthExpired,
    /// No usable refresh token was stored.
    RefreshUnavailable,
    /// The server (or the network) failed the refresh call.
    RefreshFailed,
    /// The body was not the expected envelope.
    MalformedResponse,
    /// Any other non-success response.
    Api,
    /// Caller-supplied input was invalid.
    InvalidInput,
    /// The key-value store failed.
    Storage,
}

impl Error {
    /// Create a malformed response error.
    pub fn malformed(status: u16, message: impl Into<String>) -> Self {
        Error::MalformedResponse {
            status,
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Network,
            Error::Auth(AuthError::SessionExpired) => ErrorKind::AuthExpired,
            Error::Auth(AuthError::RefreshUnavailable { .. }) => ErrorKind::RefreshUnavailable,
            Error::Auth(AuthError::RefreshFailed { .. }) => ErrorKind::RefreshFailed,
            Error::Api(_) => ErrorKind::Api,
            Error::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns true if this error ended the session.
    pub fn is_terminal_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Render this error as a single line suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::Transport(err) => format!("Network request failed: {}", err),
            Error::Auth(AuthError::SessionExpired) => SESSION_EXPIRED_MESSAGE.to_string(),
            Error::Auth(_) => REFRESH_EXPIRED_MESSAGE.to_string(),
            Error::Api(err) => err.user_message(),
            Error::MalformedResponse { .. } => "Failed to parse server response".to_string(),
            Error::InvalidInput(err) => err.to_string(),
            Error::Storage(err) => err.to_string(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication errors that end the session.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The access token was rejected again after a successful refresh.
    #[error("session expired")]
    SessionExpired,

    /// No refresh token is stored, or it has expired.
    #[error("refresh unavailable: {reason}")]
    RefreshUnavailable { reason: String },

    /// The refresh call failed.
    #[error("refresh failed: {reason}")]
    RefreshFailed { status: Option<u16>, reason: String },
}

/// An error response from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code, if the server sent one.
    pub code: Option<String>,
    /// Flattened, human-readable message.
    pub message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Check if this is an authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.code.as_deref() == Some("auth/unauthorized")
    }

    fn user_message(&self) -> String {
        if self.code.as_deref() == Some("auth/unauthorized") {
            SESSION_EXPIRED_MESSAGE.to_string()
        } else {
            self.message.clone()
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Value cannot be sent as an HTTP header.
    #[error("invalid header value: {reason}")]
    Header { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Key-value store failure.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StorageError {
    message: String,
}

impl StorageError {
    /// Create a storage error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            Error::from(TransportError::Timeout { duration_ms: 30_000 }).kind(),
            ErrorKind::Network
        );
        assert_eq!(
            Error::from(AuthError::SessionExpired).kind(),
            ErrorKind::AuthExpired
        );
        assert_eq!(
            Error::from(AuthError::RefreshUnavailable {
                reason: "no refresh token".into()
            })
            .kind(),
            ErrorKind::RefreshUnavailable
        );
        assert_eq!(Error::malformed(200, "eof").kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn auth_errors_render_login_prompt() {
        let err = Error::from(AuthError::SessionExpired);
        assert!(err.is_terminal_auth());
        assert_eq!(err.user_message(), SESSION_EXPIRED_MESSAGE);

        let err = Error::from(AuthError::RefreshFailed {
            status: Some(401),
            reason: "Token refresh failed".into(),
        });
        assert_eq!(err.user_message(), REFRESH_EXPIRED_MESSAGE);
    }

    #[test]
    fn api_error_display_includes_code() {
        let err = ApiError::new(403, Some("forbidden".into()), "nope");
        assert_eq!(err.to_string(), "HTTP 403 [forbidden]: nope");
        assert_eq!(Error::from(err).user_message(), "nope");
    }

    #[test]
    fn unauthorized_code_renders_login_prompt() {
        let err = ApiError::new(400, Some("auth/unauthorized".into()), "whatever");
        assert!(err.is_unauthorized());
        assert_eq!(Error::from(err).user_message(), SESSION_EXPIRED_MESSAGE);
    }
}
