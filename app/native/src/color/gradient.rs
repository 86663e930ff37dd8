//! Gradient color selection.
//!
//! Picks the most saturated of the dominant colors as the anchor and pairs it
//! with the candidate that looks most different from it.

use image::Rgb;

use super::Palette;

/// Number of dominant colors considered for the gradient.
pub const GRADIENT_CANDIDATES: usize = 7;

/// The two gradient colors. `from` is the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientPair {
    pub from: Rgb<u8>,
    pub to: Rgb<u8>,
}

/// HSL saturation in `[0, 1]`.
///
/// Grays are 0. A zero denominator (pure black or white luminosity) counts
/// as fully saturated.
#[must_use]
pub fn saturation(color: Rgb<u8>) -> f64 {
    let [r, g, b] = color.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    if max == min {
        return 0.0;
    }

    let max = f64::from(max) / 255.0;
    let min = f64::from(min) / 255.0;
    let luminosity = (max + min) / 2.0;

    if (luminosity - 1.0).abs() < f64::EPSILON {
        return 0.0;
    }

    let denominator = 1.0 - 2.0f64.mul_add(luminosity, -1.0).abs();
    if denominator.abs() < f64::EPSILON {
        return 1.0;
    }

    ((max - min) / denominator).clamp(0.0, 1.0)
}

/// Weighted euclidean ("redmean") distance between two colors.
#[must_use]
pub fn color_distance(a: Rgb<u8>, b: Rgb<u8>) -> f64 {
    let [r1, g1, b1] = a.0.map(f64::from);
    let [r2, g2, b2] = b.0.map(f64::from);

    let mean_r = (r1 + r2) / 2.0;
    let dr = r1 - r2;
    let dg = g1 - g2;
    let db = b1 - b2;

    let weight_r = 2.0 + mean_r / 256.0;
    let weight_b = 2.0 + (255.0 - mean_r) / 256.0;

    (weight_r * dr * dr + 4.0 * dg * dg + weight_b * db * db).sqrt()
}

/// Chooses gradient pairs from palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientSelector {
    candidates: usize,
}

impl Default for GradientSelector {
    fn default() -> Self { Self { candidates: GRADIENT_CANDIDATES } }
}

impl GradientSelector {
    /// Selects the gradient pair for `palette`.
    ///
    /// Ties resolve to the earliest color in palette order. A palette with a
    /// single color yields that color twice; an empty palette yields black.
    #[must_use]
    pub fn select(&self, palette: &Palette) -> GradientPair {
        let candidates = palette.top(self.candidates);

        let Some(anchor_index) = most_saturated(candidates) else {
            let black = Rgb([0, 0, 0]);
            return GradientPair { from: black, to: black };
        };
        let anchor = candidates[anchor_index];

        let mut farthest = anchor;
        let mut farthest_distance = f64::NEG_INFINITY;
        for (index, &color) in candidates.iter().enumerate() {
            if index == anchor_index {
                continue;
            }
            let distance = color_distance(anchor, color);
            if distance > farthest_distance {
                farthest = color;
                farthest_distance = distance;
            }
        }

        GradientPair { from: anchor, to: farthest }
    }
}

/// Index of the first color with the highest saturation.
fn most_saturated(colors: &[Rgb<u8>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &color) in colors.iter().enumerate() {
        let value = saturation(color);
        if best.is_none_or(|(_, best_value)| value > best_value) {
            best = Some((index, value));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> Rgb<u8> { Rgb([r, g, b]) }

    // ========================================================================
    // Saturation
    // ========================================================================

    #[test]
    fn test_saturation_grayscale_is_zero() {
        for level in [0, 1, 127, 128, 254, 255] {
            assert!(saturation(rgb(level, level, level)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_saturation_pure_colors() {
        assert!((saturation(rgb(255, 0, 0)) - 1.0).abs() < 1e-9);
        assert!((saturation(rgb(0, 0, 255)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_saturation_partial() {
        // max = 0.8, min = 0.2, luminosity = 0.5
        let value = saturation(rgb(204, 51, 51));
        assert!((value - 0.6).abs() < 1e-9, "{value}");
    }

    #[test]
    fn test_saturation_is_bounded() {
        for color in [rgb(255, 254, 254), rgb(1, 0, 0), rgb(255, 0, 254), rgb(3, 200, 90)] {
            let value = saturation(color);
            assert!((0.0..=1.0).contains(&value), "{color:?} -> {value}");
        }
    }

    // ========================================================================
    // Distance
    // ========================================================================

    #[test]
    fn test_color_distance_identity_and_symmetry() {
        let a = rgb(10, 200, 30);
        let b = rgb(250, 5, 99);
        assert!(color_distance(a, a).abs() < f64::EPSILON);
        assert!((color_distance(a, b) - color_distance(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_color_distance_known_value() {
        // mean_r = 127.5 -> (2 + 127.5/256) * 255^2
        let expected = ((2.0 + 127.5 / 256.0) * 255.0 * 255.0_f64).sqrt();
        assert!((color_distance(rgb(0, 0, 0), rgb(255, 0, 0)) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_color_distance_weights_green_most() {
        let black = rgb(0, 0, 0);
        assert!(color_distance(black, rgb(0, 100, 0)) > color_distance(black, rgb(100, 0, 0)));
        assert!(color_distance(black, rgb(0, 100, 0)) > color_distance(black, rgb(0, 0, 100)));
    }

    // ========================================================================
    // Selection
    // ========================================================================

    #[test]
    fn test_select_anchor_is_most_saturated() {
        let palette = Palette::new(vec![
            rgb(120, 120, 120),
            rgb(200, 60, 60),
            rgb(255, 0, 0),
            rgb(240, 240, 240),
        ]);

        let pair = GradientSelector::default().select(&palette);
        assert_eq!(pair.from, rgb(255, 0, 0));
        assert_eq!(pair.to, rgb(240, 240, 240));
    }

    #[test]
    fn test_select_ignores_colors_beyond_top_seven() {
        let mut colors = vec![rgb(100, 100, 100); 7];
        colors[0] = rgb(200, 50, 50);
        colors.push(rgb(0, 255, 0));

        let pair = GradientSelector::default().select(&Palette::new(colors));
        assert_eq!(pair.from, rgb(200, 50, 50));
        assert_eq!(pair.to, rgb(100, 100, 100));
    }

    #[test]
    fn test_select_invariant_to_order_of_others() {
        let anchor = rgb(0, 0, 255);
        let others = [
            rgb(30, 30, 40),
            rgb(250, 250, 210),
            rgb(90, 80, 70),
            rgb(160, 150, 140),
            rgb(20, 25, 20),
            rgb(200, 190, 185),
        ];

        let forward: Vec<_> = std::iter::once(anchor).chain(others).collect();
        let backward: Vec<_> = std::iter::once(anchor).chain(others.into_iter().rev()).collect();

        let selector = GradientSelector::default();
        assert_eq!(
            selector.select(&Palette::new(forward)),
            selector.select(&Palette::new(backward))
        );
    }

    #[test]
    fn test_select_ties_resolve_in_palette_order() {
        // Both candidates have saturation 1 and the same distance to each other
        let palette = Palette::new(vec![rgb(255, 0, 0), rgb(0, 0, 255)]);
        let pair = GradientSelector::default().select(&palette);
        assert_eq!(pair.from, rgb(255, 0, 0));
        assert_eq!(pair.to, rgb(0, 0, 255));

        let equal_distance = Palette::new(vec![rgb(255, 0, 0), rgb(0, 0, 0), rgb(0, 0, 0)]);
        assert_eq!(GradientSelector::default().select(&equal_distance).to, rgb(0, 0, 0));
    }

    #[test]
    fn test_select_single_and_empty_palettes() {
        let single = Palette::new(vec![rgb(9, 8, 7)]);
        let pair = GradientSelector::default().select(&single);
        assert_eq!(pair, GradientPair { from: rgb(9, 8, 7), to: rgb(9, 8, 7) });

        let empty = GradientSelector::default().select(&Palette::default());
        assert_eq!(empty.from, rgb(0, 0, 0));
    }
}
