//! Cache directory utilities.
//!
//! The generated wallpaper and the captured default wallpaper live under the
//! user's cache directory unless the configuration overrides `imagesDir`.
//! Falls back to `/tmp/albumpaper/` when no cache directory is available.

use std::path::PathBuf;

use crate::constants::APP_ID;

/// Returns the root cache directory for the application.
#[must_use]
pub fn get_cache_dir() -> PathBuf {
    dirs::cache_dir().map_or_else(
        || PathBuf::from(format!("/tmp/{APP_ID}")),
        |cache| cache.join(APP_ID),
    )
}

/// Returns a cache subdirectory for the given component.
///
/// # Arguments
///
/// * `subdir` - The subdirectory name within the app's cache directory (e.g., `images`)
#[must_use]
pub fn get_cache_subdir(subdir: &str) -> PathBuf { get_cache_dir().join(subdir) }
