//! Color analysis of album artwork.
//!
//! [`PaletteExtractor`] reduces an image to its dominant colors and
//! [`GradientSelector`] picks the two that anchor gradient and noise
//! backgrounds.

pub mod gradient;
pub mod palette;

use image::Rgb;

pub use gradient::{GradientPair, GradientSelector, color_distance, saturation};
pub use palette::PaletteExtractor;

/// Dominant colors of an image, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    #[must_use]
    pub const fn new(colors: Vec<Rgb<u8>>) -> Self { Self { colors } }

    #[must_use]
    pub fn colors(&self) -> &[Rgb<u8>] { &self.colors }

    /// The most frequent color.
    #[must_use]
    pub fn dominant(&self) -> Option<Rgb<u8>> { self.colors.first().copied() }

    /// The `n` most frequent colors (fewer if the palette is shorter).
    #[must_use]
    pub fn top(&self, n: usize) -> &[Rgb<u8>] { &self.colors[..n.min(self.colors.len())] }

    #[must_use]
    pub fn len(&self) -> usize { self.colors.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.colors.is_empty() }
}

/// Formats a color as `#rrggbb`.
#[must_use]
pub fn to_hex(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_top_clamps() {
        let palette = Palette::new(vec![Rgb([1, 1, 1]), Rgb([2, 2, 2])]);
        assert_eq!(palette.top(7).len(), 2);
        assert_eq!(palette.top(1), &[Rgb([1, 1, 1])]);
        assert_eq!(palette.dominant(), Some(Rgb([1, 1, 1])));
        assert!(Palette::default().dominant().is_none());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(Rgb([255, 0, 16])), "#ff0010");
        assert_eq!(to_hex(Rgb([0, 0, 0])), "#000000");
    }
}
