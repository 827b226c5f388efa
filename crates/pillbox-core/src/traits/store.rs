//! Key-value storage trait.

use async_trait::async_trait;

use crate::Result;

/// A string key-value store used to persist the session.
///
/// Implementations must make each call atomic on its own. The `*_many`
/// methods should also be atomic as a whole where the backend allows it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Read several values, in the order of `keys`.
    ///
    /// The default reads them one by one; stores that can should serve the
    /// whole batch from one consistent snapshot.
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    /// Write several values.
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }

    /// Delete several values.
    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}
