//! Wallpaper generation.
//!
//! The [`WallpaperCompositor`] turns album art into a display-sized image made
//! of a background layer and an optional foreground layer; the
//! [`WallpaperManager`] saves it and hands it to the OS.

pub mod background;
pub mod compositor;
pub mod manager;
pub mod noise;
pub mod processing;

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use compositor::WallpaperCompositor;
pub use manager::WallpaperManager;

/// Background layer styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum BackgroundStyle {
    /// The dominant color of the artwork.
    Solid,
    /// Diagonal gradient between the gradient pair.
    LinearGradient,
    /// Gradient from the center outwards.
    #[default]
    RadialGradient,
    /// Two-tone OpenSimplex noise.
    ColoredNoise,
    /// The artwork itself, scaled to cover the display.
    Artwork,
    /// The captured default wallpaper.
    Wallpaper,
    /// One of the artwork-derived styles, chosen on every composition.
    Random,
}

impl BackgroundStyle {
    /// All styles, in configuration order.
    pub const ALL: [Self; 7] = [
        Self::Solid,
        Self::LinearGradient,
        Self::RadialGradient,
        Self::ColoredNoise,
        Self::Artwork,
        Self::Wallpaper,
        Self::Random,
    ];

    /// Styles [`BackgroundStyle::Random`] chooses from.
    pub const RANDOM_CHOICES: [Self; 5] = [
        Self::Solid,
        Self::LinearGradient,
        Self::RadialGradient,
        Self::ColoredNoise,
        Self::Artwork,
    ];

    /// Name used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::LinearGradient => "linearGradient",
            Self::RadialGradient => "radialGradient",
            Self::ColoredNoise => "coloredNoise",
            Self::Artwork => "artwork",
            Self::Wallpaper => "wallpaper",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for BackgroundStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for BackgroundStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|style| style.as_str().eq_ignore_ascii_case(s)).ok_or_else(|| {
            let names: Vec<_> = Self::ALL.iter().map(|style| style.as_str()).collect();
            format!("unknown background style '{s}' (expected one of: {})", names.join(", "))
        })
    }
}

/// A rectangle in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Display geometry, read once per compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// The whole display.
    pub display: Rect,
    /// The part of the display not covered by taskbars or docks.
    pub available: Rect,
}

impl Geometry {
    /// Geometry of a display without reserved areas.
    #[must_use]
    pub const fn full(width: u32, height: u32) -> Self {
        let display = Rect { x: 0, y: 0, width, height };
        Self { display, available: display }
    }
}

/// Layer settings, fixed for the lifetime of a compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerConfig {
    pub background: BackgroundStyle,
    pub foreground_enabled: bool,
    /// Side of the square foreground, in pixels.
    pub foreground_size: u32,
    pub blur_enabled: bool,
    pub blur_strength: u32,
    /// Radial gradient radius where the inner color ends.
    pub inner_radius: Option<f64>,
    /// Radial gradient radius where the outer color is reached.
    pub outer_radius: Option<f64>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            background: BackgroundStyle::default(),
            foreground_enabled: true,
            foreground_size: 600,
            blur_enabled: true,
            blur_strength: 20,
            inner_radius: None,
            outer_radius: None,
        }
    }
}

impl LayerConfig {
    /// Blur radius to apply, if blurring is enabled.
    #[must_use]
    pub const fn blur_radius(&self) -> Option<u32> {
        if self.blur_enabled && self.blur_strength > 0 { Some(self.blur_strength) } else { None }
    }
}

/// Errors that can occur while producing or saving wallpapers.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Failed to read or decode an image.
    #[error("Failed to read image: {0}")]
    ImageRead(String),
    /// Failed to encode or write an image.
    #[error("Failed to save image: {0}")]
    ImageSave(String),
    /// Failed to create the images directory.
    #[error("Failed to create directory: {0}")]
    Directory(String),
    /// Failed to build a color gradient.
    #[error("Failed to build gradient: {0}")]
    Gradient(String),
}
