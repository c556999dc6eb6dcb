//! Manifest file discovery.

use std::path::{Path, PathBuf};

use crate::constants::MANIFEST_FILENAME;
use crate::core::{ConfigureError, Result};

/// Find `atconf.toml` by searching up from the current directory.
///
/// Returns `Ok(None)` when no manifest exists anywhere up to the filesystem
/// root; atconf then works with overrides and the cache alone.
///
/// ```text
/// /home/user/project/
/// ├── atconf.toml        ← found here
/// └── src/
///     └── acme/           ← search started here, walks up
/// ```
pub fn find_manifest() -> Result<Option<PathBuf>> {
    let current = std::env::current_dir().map_err(|e| {
        ConfigureError::file_system("determining current directory", PathBuf::from("."), e)
    })?;
    Ok(find_manifest_from(&current))
}

/// Use an explicit manifest path, or search from the current directory.
///
/// An explicit path must exist.
pub fn find_manifest_with_optional(explicit_path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    match explicit_path {
        Some(path) if path.is_file() => Ok(Some(path)),
        Some(path) => Err(ConfigureError::file_system(
            "locating manifest",
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "manifest file does not exist"),
        )),
        None => find_manifest(),
    }
}

/// Search for the manifest from `start` upwards.
pub fn find_manifest_from(start: &Path) -> Option<PathBuf> {
    start.ancestors().map(|dir| dir.join(MANIFEST_FILENAME)).find(|candidate| candidate.is_file())
}
