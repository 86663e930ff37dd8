//! Path utilities for shell-like path expansion.
//!
//! Paths in the configuration file may use `~` and may be relative to the
//! directory holding the configuration file.

use std::path::{Path, PathBuf};

/// Expands a leading tilde to the user's home directory.
///
/// Absolute and relative paths are returned unchanged; blank input yields an
/// empty `PathBuf`.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}

/// Expands a path and resolves it against `base_dir` when it is relative.
///
/// ```ignore
/// use std::path::Path;
/// use albumpaper_lib::platform::path::expand_and_resolve;
///
/// let base = Path::new("/config/dir");
/// assert_eq!(expand_and_resolve(".env", base), Path::new("/config/dir/.env"));
/// assert_eq!(expand_and_resolve("/art/missing.png", base), Path::new("/art/missing.png"));
/// ```
#[must_use]
pub fn expand_and_resolve(path: &str, base_dir: &Path) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    let expanded = expand(path);

    if expanded.is_absolute() {
        return expanded;
    }

    base_dir.join(expanded)
}

/// Like [`expand_and_resolve`], but maps a blank setting to `None`.
#[must_use]
pub fn resolve_optional(path: &str, base_dir: &Path) -> Option<PathBuf> {
    if path.trim().is_empty() {
        None
    } else {
        Some(expand_and_resolve(path, base_dir))
    }
}
