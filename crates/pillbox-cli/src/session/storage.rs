//! Location of the stored session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Resolve the session directory: the explicit one if given, otherwise the
/// platform data directory for `pillbox`.
pub fn data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    let dirs =
        ProjectDirs::from("", "", "pillbox").context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
