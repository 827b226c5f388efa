//! pillbox-core - Core types and traits for the pillbox API client.
//!
//! This crate holds everything the transport does not need to know about:
//! token types and expiry rules, the response envelope, the error taxonomy,
//! and the credential store that sits on top of an injectable key-value
//! backend.

pub mod credentials;
pub mod envelope;
pub mod error;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use envelope::Envelope;
pub use error::{ApiError, AuthError, Error, ErrorKind};
pub use store::{CredentialStore, MemoryStore};
pub use tokens::{AccessToken, AuthTokens, CredentialPair, RefreshToken, TokenStatus};
pub use traits::{KeyValueStore, NoopObserver, SessionObserver};
pub use types::{ApiUrl, UserProfile};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
