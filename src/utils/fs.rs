//! File system helpers.
//!
//! Every file the tool produces (the cache, configured templates, the
//! constants module) goes through [`atomic_write`], so an interrupted or
//! failed run never leaves a half-written output behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::core::{ConfigureError, Result};

/// Create `path` and its parents if they do not exist.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| ConfigureError::file_system("creating directory", path, e))?;
    } else if !path.is_dir() {
        return Err(ConfigureError::Other {
            message: format!("Path exists but is not a directory: {}", path.display()),
        });
    }
    Ok(())
}

/// Write `content` to `path` atomically.
///
/// The data is written to a temporary file in the destination directory,
/// synced, and renamed over the destination. Readers see either the old file
/// or the complete new one.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| ConfigureError::file_system("creating temporary file in", parent, e))?;
    temp.write_all(content)
        .map_err(|e| ConfigureError::file_system("writing temporary file for", path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| ConfigureError::file_system("syncing temporary file for", path, e))?;
    temp.persist(path).map_err(|e| ConfigureError::file_system("writing", path, e.error))?;
    Ok(())
}

/// String convenience wrapper around [`atomic_write`].
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Read a whole file, mapping failures to [`ConfigureError::FileSystem`].
pub fn read_text_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ConfigureError::file_system(operation, path, e))
}
