//! Two-tone OpenSimplex noise backgrounds.

use ::noise::{NoiseFn, OpenSimplex};
use colorgrad::{Color, CustomGradient, Gradient};
use image::{Rgb, RgbImage};

use super::ProcessingError;
use super::background::fill_parallel;
use crate::color::GradientPair;

/// Noise features per shorter image side.
const FEATURES_PER_SIDE: f64 = 7.5;

/// Number of flat color bands.
const SEGMENTS: usize = 3;

/// Width of the blend between bands, as a fraction of a band.
const SMOOTHNESS: f64 = 0.1;

/// Resolution of the sampled gradient table.
const GRADIENT_STEPS: usize = 1024;

/// Banded `from`→`to` gradient the noise values are colored through.
fn sharp_gradient(pair: GradientPair) -> Result<Gradient, ProcessingError> {
    let color = |c: Rgb<u8>| Color::from_rgba8(c[0], c[1], c[2], 255);

    let gradient = CustomGradient::new()
        .colors(&[color(pair.from), color(pair.to)])
        .build()
        .map_err(|e| ProcessingError::Gradient(e.to_string()))?;

    Ok(gradient.sharp(SEGMENTS, SMOOTHNESS))
}

/// Generates a noise background tinted with the gradient pair.
///
/// The same `seed` always produces the same pattern.
///
/// # Errors
///
/// Returns `ProcessingError::Gradient` if the color gradient cannot be built.
pub fn colored_noise(
    width: u32,
    height: u32,
    pair: GradientPair,
    seed: u32,
) -> Result<RgbImage, ProcessingError> {
    let noise = OpenSimplex::new(seed);
    let table = gradient_table(&sharp_gradient(pair)?);
    let scale = FEATURES_PER_SIDE / f64::from(width.min(height).max(1));

    Ok(fill_parallel(width, height, |x, y| {
        let value = noise.get([f64::from(x) * scale, f64::from(y) * scale]);
        let t = remap(value, -0.5, 0.5, 0.0, 1.0).clamp(0.0, 1.0);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::cast_sign_loss
        )]
        let index = (t * GRADIENT_STEPS as f64).round() as usize;
        table[index.min(GRADIENT_STEPS)]
    }))
}

/// Samples `gradient` at `GRADIENT_STEPS + 1` evenly spaced points.
#[allow(clippy::cast_precision_loss)]
fn gradient_table(gradient: &Gradient) -> Vec<Rgb<u8>> {
    (0..=GRADIENT_STEPS)
        .map(|i| {
            let [r, g, b, _] = gradient.at(i as f64 / GRADIENT_STEPS as f64).to_rgba8();
            Rgb([r, g, b])
        })
        .collect()
}

/// Maps `t` from `[a, b]` to `[c, d]`.
fn remap(t: f64, a: f64, b: f64, c: f64, d: f64) -> f64 { (t - a).mul_add((d - c) / (b - a), c) }
