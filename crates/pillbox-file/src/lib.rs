//! pillbox-file - File-backed credential storage for the pillbox client.
//!
//! [`FileStore`] keeps the session in `<dir>/session.json` so a login
//! survives process restarts.

mod store;

pub use store::{FileStore, LOCK_FILE, SESSION_FILE};
