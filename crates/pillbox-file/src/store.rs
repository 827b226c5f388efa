//! JSON-file key-value store.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::{debug, instrument, warn};

use pillbox_core::error::{Error, StorageError};
use pillbox_core::{KeyValueStore, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Name of the data file inside the store directory.
pub const SESSION_FILE: &str = "session.json";

/// Name of the lock file inside the store directory.
pub const LOCK_FILE: &str = "session.lock";

fn map_io(err: std::io::Error) -> Error {
    StorageError::from(err).into()
}

type Entries = BTreeMap<String, String>;

/// Key-value store persisted as one JSON object in a directory.
///
/// Every operation takes an advisory lock on `session.lock`, shared for
/// reads and exclusive for writes, so several processes can use the same
/// directory. The data file is replaced atomically and is readable only by
/// its owner on Unix.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. Nothing is created until the first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the JSON data file.
    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    fn open_lock(&self) -> Result<File> {
        fs::create_dir_all(&self.dir).map_err(map_io)?;
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io)
    }

    fn read_locked<T>(&self, f: impl FnOnce(&Entries) -> T) -> Result<T> {
        let lock_file = self.open_lock()?;
        lock_file.lock_shared().map_err(map_io)?;
        let result = self.read_entries().map(|entries| f(&entries));
        lock_file.unlock().map_err(map_io)?;
        result
    }

    fn update_locked(&self, f: impl FnOnce(&mut Entries)) -> Result<()> {
        let lock_file = self.open_lock()?;
        lock_file.lock_exclusive().map_err(map_io)?;
        let result = self.read_entries().and_then(|mut entries| {
            f(&mut entries);
            self.write_entries(&entries)
        });
        lock_file.unlock().map_err(map_io)?;
        result
    }

    /// Read the data file. A missing file is empty; an unreadable one is
    /// logged and treated as empty so the next write replaces it.
    fn read_entries(&self) -> Result<Entries> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&path).map_err(map_io)?;
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Session file is unreadable, ignoring it");
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let path = self.session_path();

        if entries.is_empty() {
            if path.exists() {
                fs::remove_file(&path).map_err(map_io)?;
            }
            return Ok(());
        }

        let json = serde_json::to_string_pretty(entries).map_err(StorageError::from)?;
        let tmp = self.dir.join(format!("{}.tmp", SESSION_FILE));
        fs::write(&tmp, json).map_err(map_io)?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&tmp).map_err(map_io)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp, perms).map_err(map_io)?;
        }

        fs::rename(&tmp, &path).map_err(map_io)?;
        debug!(path = %path.display(), keys = entries.len(), "Wrote session file");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.read_locked(|entries| entries.get(key).cloned())
    }

    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        self.read_locked(|entries| keys.iter().map(|key| entries.get(*key).cloned()).collect())
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update_locked(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<()> {
        self.update_locked(|entries| {
            entries.remove(key);
        })
    }

    async fn set_many(&self, pairs: &[(&str, &str)]) -> Result<()> {
        self.update_locked(|entries| {
            for (key, value) in pairs {
                entries.insert(key.to_string(), value.to_string());
            }
        })
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.update_locked(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }
}
