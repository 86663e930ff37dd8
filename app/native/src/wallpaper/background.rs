//! Procedural background layers.
//!
//! Every generator fills a `width`×`height` buffer row by row on the rayon
//! pool.

use image::{Rgb, RgbImage};
use rayon::prelude::*;

/// Linear interpolation between two colors, truncating to `u8`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[inline]
#[must_use]
pub fn mix(from: Rgb<u8>, to: Rgb<u8>, t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (f64::from(b) - f64::from(a)).mul_add(t, f64::from(a)) as u8;
    Rgb([channel(from[0], to[0]), channel(from[1], to[1]), channel(from[2], to[2])])
}

/// Fills an image by evaluating `color_at(x, y)` for every pixel.
pub(crate) fn fill_parallel<F>(width: u32, height: u32, color_at: F) -> RgbImage
where F: Fn(u32, u32) -> Rgb<u8> + Sync {
    let mut image = RgbImage::new(width, height);
    if width == 0 || height == 0 {
        return image;
    }

    let row_len = 3 * width as usize;
    image.par_chunks_exact_mut(row_len).enumerate().for_each(|(y, row)| {
        #[allow(clippy::cast_possible_truncation)]
        let y = y as u32;
        for (x, pixel) in (0..width).zip(row.chunks_exact_mut(3)) {
            pixel.copy_from_slice(&color_at(x, y).0);
        }
    });

    image
}

/// A single color.
#[must_use]
pub fn solid(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Diagonal gradient from the top-left (`from`) to the bottom-right (`to`).
#[must_use]
pub fn linear_gradient(width: u32, height: u32, from: Rgb<u8>, to: Rgb<u8>) -> RgbImage {
    let total = f64::from(width) + f64::from(height);
    fill_parallel(width, height, |x, y| mix(from, to, (f64::from(x) + f64::from(y)) / total))
}

/// Radii of a radial gradient, in pixels from the image center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialExtent {
    /// Distance where the inner color starts fading.
    pub inner: f64,
    /// Distance where the outer color is fully reached.
    pub outer: f64,
}

impl RadialExtent {
    /// Defaults: the inner radius hugs a centered foreground of
    /// `foreground_size` (if any) and the outer radius reaches the corners.
    #[must_use]
    pub fn resolve(
        width: u32,
        height: u32,
        foreground_size: Option<u32>,
        inner: Option<f64>,
        outer: Option<f64>,
    ) -> Self {
        let inner = inner.unwrap_or_else(|| foreground_size.map_or(0.0, |size| f64::from(size) / 2.0));
        let outer = outer.unwrap_or_else(|| (f64::from(width) / 2.0).hypot(f64::from(height) / 2.0));
        Self { inner: inner.max(0.0), outer: outer.max(0.0) }
    }

    /// Gradient position for a pixel at `distance` from the center.
    #[must_use]
    pub fn position(&self, distance: f64) -> f64 {
        let span = self.outer - self.inner;
        if span <= f64::EPSILON {
            return if distance > self.inner { 1.0 } else { 0.0 };
        }
        ((distance - self.inner) / span).clamp(0.0, 1.0)
    }
}

/// Gradient from `inner` at the center to `outer` at the edges.
#[must_use]
pub fn radial_gradient(
    width: u32,
    height: u32,
    inner: Rgb<u8>,
    outer: Rgb<u8>,
    extent: RadialExtent,
) -> RgbImage {
    let center_x = f64::from(width) / 2.0;
    let center_y = f64::from(height) / 2.0;

    fill_parallel(width, height, |x, y| {
        let distance = (f64::from(x) - center_x).hypot(f64::from(y) - center_y);
        mix(inner, outer, extent.position(distance))
    })
}
