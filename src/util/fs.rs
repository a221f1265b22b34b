//! Filesystem utilities.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Content of the `.gitignore` placed in scratch directories.
const IGNORE_ALL: &str = "*\n";

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Create a directory git should never track.
///
/// An existing `.gitignore` is left alone.
pub fn create_ignored_folder(path: &Path) -> Result<()> {
    ensure_dir(path)?;
    let ignore = path.join(".gitignore");
    if !ignore.exists() {
        write_string(&ignore, IGNORE_ALL)?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Move a fully written directory into place, replacing `dst`.
pub fn replace_dir(staged: &Path, dst: &Path) -> Result<()> {
    remove_dir_all_if_exists(dst)?;
    fs::rename(staged, dst).with_context(|| {
        format!(
            "failed to move {} to {}",
            staged.display(),
            dst.display()
        )
    })
}
