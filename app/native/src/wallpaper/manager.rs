//! Wallpaper manager: turns tracker actions into files on disk and OS calls.

use std::path::{Path, PathBuf};

use image::RgbImage;

use super::WallpaperCompositor;
use super::processing::{ensure_dir, save_jpeg};
use crate::error::AlbumPaperError;
use crate::platform::WallpaperSetter;
use crate::tracker::Action;

/// Applies wallpaper actions.
///
/// The generated and default wallpaper files are written only from here.
pub struct WallpaperManager {
    compositor: WallpaperCompositor,
    setter: Box<dyn WallpaperSetter>,
    generated_path: PathBuf,
}

impl WallpaperManager {
    /// Creates a manager writing generated wallpapers to `generated_path`.
    /// The default wallpaper path comes from the compositor.
    #[must_use]
    pub fn new(
        compositor: WallpaperCompositor,
        setter: Box<dyn WallpaperSetter>,
        generated_path: PathBuf,
    ) -> Self {
        Self { compositor, setter, generated_path }
    }

    #[must_use]
    pub const fn compositor(&self) -> &WallpaperCompositor { &self.compositor }

    #[must_use]
    pub fn default_path(&self) -> &Path { self.compositor.default_wallpaper() }

    #[must_use]
    pub fn generated_path(&self) -> &Path { &self.generated_path }

    /// Carries out `action`.
    ///
    /// # Errors
    ///
    /// Returns an error if composing, saving or setting the wallpaper fails.
    pub fn apply(&self, action: &Action) -> Result<(), AlbumPaperError> {
        match action {
            Action::NoChange => Ok(()),
            Action::SetDefault => self.set_default(),
            Action::SetLastGenerated => self.set_last_generated(),
            Action::GenerateAndSet(artwork) => self.generate_and_set(artwork),
        }
    }

    /// Shows the default wallpaper.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS rejects the change.
    pub fn set_default(&self) -> Result<(), AlbumPaperError> {
        tracing::info!(path = %self.default_path().display(), "setting default wallpaper");
        self.setter.set_wallpaper(self.default_path())?;
        Ok(())
    }

    /// Shows the wallpaper generated last, falling back to the default one
    /// when it is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS rejects the change.
    pub fn set_last_generated(&self) -> Result<(), AlbumPaperError> {
        if !self.generated_path.exists() {
            tracing::warn!(
                path = %self.generated_path.display(),
                "generated wallpaper missing, using default"
            );
            return self.set_default();
        }

        tracing::info!(path = %self.generated_path.display(), "restoring generated wallpaper");
        self.setter.set_wallpaper(&self.generated_path)?;
        Ok(())
    }

    /// Composes a wallpaper for `artwork`, saves it and shows it.
    ///
    /// # Errors
    ///
    /// Returns an error if composing, saving or setting the wallpaper fails.
    pub fn generate_and_set(&self, artwork: &RgbImage) -> Result<(), AlbumPaperError> {
        let wallpaper = self.compositor.compose(artwork)?;
        save_jpeg(&wallpaper, &self.generated_path)?;

        tracing::info!(
            path = %self.generated_path.display(),
            style = %self.compositor.layers().background,
            "generated wallpaper"
        );
        self.setter.set_wallpaper(&self.generated_path)?;
        Ok(())
    }

    /// Makes sure the default wallpaper file exists.
    ///
    /// The wallpaper currently on screen is captured the first time. When that
    /// is impossible a black image stands in.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the capture nor the fallback can be written.
    pub fn ensure_default_wallpaper(&self) -> Result<(), AlbumPaperError> {
        let path = self.default_path();
        if path.exists() {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }

        match self.setter.capture_current_wallpaper_as_default(path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "captured current wallpaper as default");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to capture current wallpaper, using black");
                save_jpeg(&RgbImage::new(1, 1), path)?;
                Ok(())
            }
        }
    }
}
