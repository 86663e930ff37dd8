//! `albumpaper palette`: inspect the colors extracted from an image.

use std::path::Path;

use image::RgbImage;

use crate::cli::output::{PaletteReport, print_palette};
use crate::color::{GradientPair, GradientSelector, Palette, PaletteExtractor};
use crate::error::AlbumPaperError;
use crate::wallpaper::processing::load_image;

/// Palette and gradient pair for `image`.
#[must_use]
pub fn analyse(image: &RgbImage) -> (Palette, GradientPair) {
    let palette = PaletteExtractor::default().extract(image);
    let pair = GradientSelector::default().select(&palette);
    (palette, pair)
}

/// Execute the palette command.
///
/// # Errors
///
/// Returns an error if the image cannot be read.
pub fn execute(image: &Path, json: bool) -> Result<(), AlbumPaperError> {
    let artwork = load_image(image)?;
    let (palette, pair) = analyse(&artwork);

    if json {
        let report = PaletteReport::new(&palette, pair);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_palette(&palette, pair);
    }

    Ok(())
}
