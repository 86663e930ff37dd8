//! OS wallpaper collaborator.
//!
//! Uses the cross-platform `wallpaper` crate to change the desktop background
//! and to find the image that is currently set.

use std::path::Path;

use super::PlatformError;
use crate::wallpaper::processing;

/// Narrow interface over the OS wallpaper subsystem.
pub trait WallpaperSetter: Send {
    /// Makes the image at `path` the desktop wallpaper.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or the OS call fails.
    fn set_wallpaper(&self, path: &Path) -> Result<(), PlatformError>;

    /// Copies the wallpaper that is currently on screen to `path` as a JPEG.
    ///
    /// # Errors
    ///
    /// Returns an error if the current wallpaper cannot be located or decoded.
    fn capture_current_wallpaper_as_default(&self, path: &Path) -> Result<(), PlatformError>;
}

/// [`WallpaperSetter`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallpaper;

impl WallpaperSetter for SystemWallpaper {
    fn set_wallpaper(&self, path: &Path) -> Result<(), PlatformError> {
        if !path.exists() {
            return Err(PlatformError::FileNotFound(path.display().to_string()));
        }

        let path_str = path.display().to_string();

        ::wallpaper::set_from_path(&path_str)
            .map_err(|e| PlatformError::SetWallpaperFailed(e.to_string()))
    }

    fn capture_current_wallpaper_as_default(&self, path: &Path) -> Result<(), PlatformError> {
        let current = ::wallpaper::get().map_err(|e| PlatformError::CaptureFailed(e.to_string()))?;

        if current.trim().is_empty() {
            return Err(PlatformError::CaptureFailed("no wallpaper is set".to_string()));
        }

        let image = image::open(&current)
            .map_err(|e| PlatformError::CaptureFailed(format!("{current}: {e}")))?;

        processing::save_jpeg(&image.to_rgb8(), path)
            .map_err(|e| PlatformError::CaptureFailed(e.to_string()))
    }
}
