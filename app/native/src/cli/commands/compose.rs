//! `albumpaper compose`: one-shot composition of a local image.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::config::{self, LoadedConfig};
use crate::error::AlbumPaperError;
use crate::wallpaper::processing::{load_image, save_jpeg};
use crate::wallpaper::{BackgroundStyle, WallpaperCompositor};

/// Output file used when `--output` is not given.
const DEFAULT_OUTPUT: &str = "albumpaper.jpg";

/// Composes `artwork` with the configured layers, optionally overriding the
/// background style.
///
/// # Errors
///
/// Returns an error if the background needs the default wallpaper and it
/// cannot be read.
pub fn compose(
    loaded: &LoadedConfig,
    artwork: &RgbImage,
    style: Option<BackgroundStyle>,
) -> Result<RgbImage, AlbumPaperError> {
    let layers = loaded.config.layer_config();
    let style = style.unwrap_or(layers.background);
    let compositor = WallpaperCompositor::new(
        layers,
        loaded.config.display.geometry(),
        loaded.default_wallpaper_path(),
    );

    Ok(compositor.compose_with_style(artwork, style)?)
}

/// Execute the compose command.
///
/// # Errors
///
/// Returns an error if the configuration or image cannot be loaded, or the
/// result cannot be written.
pub fn execute(
    config_path: Option<&Path>,
    image: &Path,
    style: Option<BackgroundStyle>,
    output: Option<&Path>,
) -> Result<(), AlbumPaperError> {
    let loaded = config::load(config_path)?;
    let artwork = load_image(image)?;

    let wallpaper = compose(&loaded, &artwork, style)?;

    let output = output.map_or_else(|| PathBuf::from(DEFAULT_OUTPUT), Path::to_path_buf);
    save_jpeg(&wallpaper, &output)?;

    println!(
        "Wrote {}x{} wallpaper to {}",
        wallpaper.width(),
        wallpaper.height(),
        output.display()
    );
    Ok(())
}
