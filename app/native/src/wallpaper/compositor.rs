//! Layered wallpaper composition.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage, imageops};
use rand::Rng;

use super::background::{self, RadialExtent};
use super::noise::colored_noise;
use super::processing::{apply_fast_blur, image_hash, load_image, resize_to_fill};
use super::{BackgroundStyle, Geometry, LayerConfig, ProcessingError, Rect};
use crate::color::{GradientPair, GradientSelector, Palette, PaletteExtractor};

/// Builds wallpapers from album artwork.
///
/// Layer settings and geometry are fixed at construction; a settings change
/// means building a new compositor. The only state is the palette cache.
#[derive(Debug)]
pub struct WallpaperCompositor {
    layers: LayerConfig,
    geometry: Geometry,
    default_wallpaper: PathBuf,
    palettes: PaletteExtractor,
    selector: GradientSelector,
}

impl WallpaperCompositor {
    /// Creates a compositor. `default_wallpaper` backs the
    /// [`BackgroundStyle::Wallpaper`] style.
    #[must_use]
    pub fn new(layers: LayerConfig, geometry: Geometry, default_wallpaper: PathBuf) -> Self {
        Self {
            layers,
            geometry,
            default_wallpaper,
            palettes: PaletteExtractor::default(),
            selector: GradientSelector::default(),
        }
    }

    #[must_use]
    pub const fn layers(&self) -> &LayerConfig { &self.layers }

    #[must_use]
    pub const fn geometry(&self) -> &Geometry { &self.geometry }

    #[must_use]
    pub fn default_wallpaper(&self) -> &Path { &self.default_wallpaper }

    /// Palette of `artwork`, served from the cache when possible.
    #[must_use]
    pub fn palette(&self, artwork: &RgbImage) -> Palette { self.palettes.extract(artwork) }

    /// Gradient pair of `artwork`.
    #[must_use]
    pub fn gradient_pair(&self, artwork: &RgbImage) -> GradientPair {
        self.selector.select(&self.palette(artwork))
    }

    /// Composes the wallpaper for `artwork` with the configured background.
    ///
    /// # Errors
    ///
    /// Returns an error if the background needs the default wallpaper and it
    /// cannot be read.
    pub fn compose(&self, artwork: &RgbImage) -> Result<RgbImage, ProcessingError> {
        self.compose_with_style(artwork, self.layers.background)
    }

    /// Composes the wallpaper for `artwork` with an explicit background style.
    ///
    /// # Errors
    ///
    /// Returns an error if the background needs the default wallpaper and it
    /// cannot be read.
    pub fn compose_with_style(
        &self,
        artwork: &RgbImage,
        style: BackgroundStyle,
    ) -> Result<RgbImage, ProcessingError> {
        let display = self.geometry.display;
        let background = self.background(artwork, style)?;

        let mut canvas = RgbImage::new(display.width, display.height);

        let (x, y) = centered_offset(display, background.dimensions());
        imageops::overlay(&mut canvas, &background, x, y);

        if let Some(foreground) = self.foreground(artwork) {
            let (x, y) = centered_offset(self.geometry.available, foreground.dimensions());
            imageops::overlay(&mut canvas, &foreground, x, y);
        }

        Ok(canvas)
    }

    fn background(
        &self,
        artwork: &RgbImage,
        style: BackgroundStyle,
    ) -> Result<RgbImage, ProcessingError> {
        let Rect { width, height, .. } = self.geometry.display;

        let image = match style {
            BackgroundStyle::Solid => {
                let color = self.palette(artwork).dominant().unwrap_or(Rgb([0, 0, 0]));
                background::solid(width, height, color)
            }
            BackgroundStyle::LinearGradient => {
                let pair = self.gradient_pair(artwork);
                background::linear_gradient(width, height, pair.from, pair.to)
            }
            BackgroundStyle::RadialGradient => {
                let pair = self.gradient_pair(artwork);
                let foreground = self.layers.foreground_enabled.then_some(self.layers.foreground_size);
                let extent = RadialExtent::resolve(
                    width,
                    height,
                    foreground,
                    self.layers.inner_radius,
                    self.layers.outer_radius,
                );
                background::radial_gradient(width, height, pair.from, pair.to, extent)
            }
            BackgroundStyle::ColoredNoise => {
                let pair = self.gradient_pair(artwork);
                #[allow(clippy::cast_possible_truncation)]
                let seed = image_hash(artwork) as u32;
                self.blurred(colored_noise(width, height, pair, seed)?)
            }
            BackgroundStyle::Artwork => self.blurred(resize_to_fill(artwork, width, height)),
            BackgroundStyle::Wallpaper => {
                let wallpaper = load_image(&self.default_wallpaper)?;
                self.blurred(resize_to_fill(&wallpaper, width, height))
            }
            BackgroundStyle::Random => {
                let choices = BackgroundStyle::RANDOM_CHOICES;
                let chosen = choices[rand::rng().random_range(0..choices.len())];
                tracing::debug!(style = %chosen, "random background style");
                return self.background(artwork, chosen);
            }
        };

        Ok(image)
    }

    fn blurred(&self, image: RgbImage) -> RgbImage {
        match self.layers.blur_radius() {
            Some(radius) => apply_fast_blur(&image, radius),
            None => image,
        }
    }

    fn foreground(&self, artwork: &RgbImage) -> Option<RgbImage> {
        if !self.layers.foreground_enabled {
            return None;
        }
        let size = self.layers.foreground_size.max(1);
        Some(resize_to_fill(artwork, size, size))
    }
}

/// Offset that centers an image of `size` inside `area`.
fn centered_offset(area: Rect, size: (u32, u32)) -> (i64, i64) {
    let x = (i64::from(area.width) - i64::from(size.0)) / 2 + i64::from(area.x);
    let y = (i64::from(area.height) - i64::from(size.1)) / 2 + i64::from(area.y);
    (x, y)
}
