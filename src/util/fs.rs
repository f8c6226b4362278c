//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to an existing location in one call.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Find the nearest ancestor directory of `path` called `name`.
pub fn find_ancestor_named(path: &Path, name: &str) -> Option<PathBuf> {
    normalize_path(path)
        .ancestors()
        .skip(1)
        .find(|dir| dir.file_name().is_some_and(|n| n == name))
        .map(Path::to_path_buf)
}
