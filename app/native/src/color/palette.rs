//! Dominant color extraction.
//!
//! Pixels are clustered as RGB samples with `kmeans_colors`. Several seeded
//! runs are made in parallel and the tightest one wins, so the same artwork
//! always yields the same palette.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use kmeans_colors::{Kmeans, Sort, get_kmeans};
use lru::LruCache;
use palette::Srgb;
use parking_lot::Mutex;
use rayon::prelude::*;

use super::Palette;
use crate::wallpaper::processing::image_hash;

/// Side of the square the image is shrunk to before clustering.
pub const SAMPLE_SIZE: u32 = 150;

/// Number of palettes kept in memory.
const CACHE_CAPACITY: usize = 10;

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    /// Number of clusters.
    pub k: usize,
    /// Upper bound on refinement passes per run.
    pub max_iter: usize,
    /// A run stops once centroids move less than this.
    pub converge: f32,
    /// Independent runs; the one with the lowest score is kept.
    pub runs: u64,
    /// Seed of the first run. Run `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self { Self { k: 10, max_iter: 20, converge: 0.0001, runs: 10, seed: 1000 } }
}

/// Clusters image pixels into a palette ordered by dominance.
///
/// Results are cached by pixel content, so asking twice for the same artwork
/// (once for the gradient pair, once for the solid color) clusters once.
#[derive(Debug)]
pub struct PaletteExtractor {
    params: KMeansParams,
    cache: Mutex<LruCache<u64, Palette>>,
}

impl Default for PaletteExtractor {
    fn default() -> Self { Self::new(KMeansParams::default()) }
}

impl PaletteExtractor {
    #[must_use]
    pub fn new(params: KMeansParams) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self { params, cache: Mutex::new(LruCache::new(capacity)) }
    }

    /// Returns the palette of `image`, most dominant color first.
    #[must_use]
    pub fn extract(&self, image: &RgbImage) -> Palette {
        let key = image_hash(image);

        if let Some(palette) = self.cache.lock().get(&key).cloned() {
            tracing::debug!(key, "palette cache hit");
            return palette;
        }

        let palette = self.compute(image);
        self.cache.lock().put(key, palette.clone());
        palette
    }

    fn compute(&self, image: &RgbImage) -> Palette {
        if image.width() == 0 || image.height() == 0 || self.params.k == 0 {
            return Palette::default();
        }

        let sample = imageops::resize(image, SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Nearest);

        // Nothing to cluster when every color already has its own cluster
        if let Some(palette) = exact_palette(&sample, self.params.k) {
            return palette;
        }

        let samples: Vec<Srgb<f32>> =
            sample.pixels().map(|p| Srgb::new(p[0], p[1], p[2]).into_format()).collect();

        let Some(best) = self.best_run(&samples) else {
            return Palette::default();
        };

        let mut clusters = Srgb::sort_indexed_colors(&best.centroids, &best.indices);
        clusters.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

        let colors = clusters
            .into_iter()
            .map(|cluster| {
                let srgb: Srgb<u8> = cluster.centroid.into_format();
                Rgb([srgb.red, srgb.green, srgb.blue])
            })
            .collect();

        Palette::new(colors)
    }

    /// Runs the seeded clusterings and keeps the lowest score. Ties go to the
    /// earliest seed.
    fn best_run(&self, samples: &[Srgb<f32>]) -> Option<Kmeans<Srgb<f32>>> {
        let KMeansParams { k, max_iter, converge, runs, seed } = self.params;

        (0..runs.max(1))
            .into_par_iter()
            .map(|i| get_kmeans(k, max_iter, converge, false, samples, seed + i))
            .min_by(|a, b| a.score.total_cmp(&b.score))
    }

    #[cfg(test)]
    fn cached_len(&self) -> usize { self.cache.lock().len() }
}

/// Palette of an image with at most `k` distinct colors, by pixel count.
fn exact_palette(sample: &RgbImage, k: usize) -> Option<Palette> {
    let mut counts: HashMap<[u8; 3], usize> = HashMap::new();
    for pixel in sample.pixels() {
        *counts.entry(pixel.0).or_default() += 1;
        if counts.len() > k {
            return None;
        }
    }

    let mut colors: Vec<_> = counts.into_iter().collect();
    colors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    Some(Palette::new(colors.into_iter().map(|(color, _)| Rgb(color)).collect()))
}
