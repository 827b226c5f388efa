//! Credential persistence on top of a [`KeyValueStore`].
//!
//! The credential pair is spread over four keys. A record is either complete
//! or absent: any partial or unparseable record is removed on read.

mod memory;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::tokens::{AccessToken, CredentialPair, RefreshToken, format_expiry, parse_expiry};
use crate::traits::KeyValueStore;
use crate::types::UserProfile;
use crate::Result;

pub use memory::MemoryStore;

/// Storage keys used by the client.
pub mod keys {
    /// Access token value.
    pub const ACCESS_TOKEN: &str = "token";
    /// Refresh token value.
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// Access token expiry (RFC 3339).
    pub const ACCESS_EXPIRY: &str = "token_expiry_time";
    /// Refresh token expiry (RFC 3339).
    pub const REFRESH_EXPIRY: &str = "refresh_token_expiry_time";
    /// Serialized [`UserProfile`](crate::UserProfile).
    pub const CURRENT_USER: &str = "user";

    /// The four keys that make up a credential pair.
    pub const CREDENTIAL_KEYS: [&str; 4] = [ACCESS_TOKEN, REFRESH_TOKEN, ACCESS_EXPIRY, REFRESH_EXPIRY];
}

/// Reads and writes the session through an injectable key-value store.
#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    /// Wrap a key-value store.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// A credential store backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Returns the underlying key-value store.
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    /// Load the credential pair.
    ///
    /// Returns `Ok(None)` when nothing is stored. A partial record, or one
    /// with an unparseable expiry, is cleared and reported as absent.
    pub async fn load(&self) -> Result<Option<CredentialPair>> {
        // One batch read so a concurrent `save` is never seen half applied.
        let mut values = self
            .kv
            .get_many(&keys::CREDENTIAL_KEYS)
            .await?
            .into_iter()
            .map(|v| v.filter(|v| !v.is_empty()));
        let mut next = || values.next().flatten();
        let (access, refresh, access_expiry, refresh_expiry) = (next(), next(), next(), next());

        match (access, refresh, access_expiry, refresh_expiry) {
            (None, None, None, None) => Ok(None),
            (Some(access), Some(refresh), Some(access_expiry), Some(refresh_expiry)) => {
                match (parse_expiry(&access_expiry), parse_expiry(&refresh_expiry)) {
                    (Some(access_expiry), Some(refresh_expiry)) => Ok(Some(CredentialPair {
                        access_token: AccessToken::new(access),
                        access_expiry,
                        refresh_token: RefreshToken::new(refresh),
                        refresh_expiry,
                    })),
                    _ => {
                        warn!("Stored token expiry is unreadable, discarding credentials");
                        self.clear().await?;
                        Ok(None)
                    }
                }
            }
            _ => {
                warn!("Stored credentials are incomplete, discarding them");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Persist a credential pair, replacing whatever was stored.
    pub async fn save(&self, pair: &CredentialPair) -> Result<()> {
        let access_expiry = format_expiry(pair.access_expiry);
        let refresh_expiry = format_expiry(pair.refresh_expiry);
        self.kv
            .set_many(&[
                (keys::ACCESS_TOKEN, pair.access_token.as_str()),
                (keys::REFRESH_TOKEN, pair.refresh_token.as_str()),
                (keys::ACCESS_EXPIRY, &access_expiry),
                (keys::REFRESH_EXPIRY, &refresh_expiry),
            ])
            .await?;
        debug!("Stored credentials");
        Ok(())
    }

    /// Remove the credential pair.
    pub async fn clear(&self) -> Result<()> {
        self.kv.remove_many(&keys::CREDENTIAL_KEYS).await?;
        debug!("Cleared credentials");
        Ok(())
    }

    /// Load the current user. An unreadable record is removed.
    pub async fn load_user(&self) -> Result<Option<UserProfile>> {
        let Some(json) = self.get_non_empty(keys::CURRENT_USER).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&json) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Stored user is unreadable, discarding it");
                self.kv.remove(keys::CURRENT_USER).await?;
                Ok(None)
            }
        }
    }

    /// Persist the current user.
    pub async fn save_user(&self, user: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(user).map_err(crate::error::StorageError::from)?;
        self.kv.set(keys::CURRENT_USER, &json).await
    }

    /// Remove the current user.
    pub async fn clear_user(&self) -> Result<()> {
        self.kv.remove(keys::CURRENT_USER).await
    }

    async fn get_non_empty(&self, key: &str) -> Result<Option<String>> {
        Ok(self.kv.get(key).await?.filter(|v| !v.is_empty()))
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
