//! Image processing for wallpapers.
//!
//! Provides cover-resizing, fast blur, content hashing and JPEG persistence
//! shared by the compositor, the tracker and the platform layer.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::io;
use std::path::Path;
use std::time::Duration;
use std::{fs, thread};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageReader, RgbImage};

use super::ProcessingError;
use crate::constants::JPEG_QUALITY;

/// Delay before retrying a save that hit a locked file.
const SAVE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Windows sharing and lock violations.
const ERROR_SHARING_VIOLATION: i32 = 32;
const ERROR_LOCK_VIOLATION: i32 = 33;

/// Loads an image from disk as RGB.
///
/// # Errors
///
/// Returns `ProcessingError::ImageRead` if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<RgbImage, ProcessingError> {
    let image = ImageReader::open(path)
        .map_err(|e| ProcessingError::ImageRead(format!("{}: {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| ProcessingError::ImageRead(format!("{}: {e}", path.display())))?
        .decode()
        .map_err(|e| ProcessingError::ImageRead(format!("{}: {e}", path.display())))?;

    Ok(image.into_rgb8())
}

/// Hash of the pixel content and dimensions of an image.
#[must_use]
pub fn image_hash(image: &RgbImage) -> u64 {
    let mut hasher = DefaultHasher::new();
    image.dimensions().hash(&mut hasher);
    image.as_raw().hash(&mut hasher);
    hasher.finish()
}

/// Resizes an image to cover `width`×`height` while maintaining aspect ratio.
///
/// Uses "cover" scaling: the image is scaled to fill the entire target,
/// cropping the edges that overflow around the center.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn resize_to_fill(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (img_width, img_height) = image.dimensions();
    if img_width == 0 || img_height == 0 || width == 0 || height == 0 {
        return RgbImage::new(width, height);
    }

    let scale_x = f64::from(width) / f64::from(img_width);
    let scale_y = f64::from(height) / f64::from(img_height);
    let scale = scale_x.max(scale_y);

    // Round up so the scaled image never falls a pixel short of the target
    let scaled_width = ((f64::from(img_width) * scale).ceil() as u32).max(width);
    let scaled_height = ((f64::from(img_height) * scale).ceil() as u32).max(height);

    let resized = if (scaled_width, scaled_height) == (img_width, img_height) {
        image.clone()
    } else {
        imageops::resize(image, scaled_width, scaled_height, FilterType::CatmullRom)
    };

    let crop_x = (scaled_width - width) / 2;
    let crop_y = (scaled_height - height) / 2;

    imageops::crop_imm(&resized, crop_x, crop_y, width, height).to_image()
}

/// Applies a gaussian blur, working at quarter resolution for large radii.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn apply_fast_blur(image: &RgbImage, blur_radius: u32) -> RgbImage {
    if blur_radius == 0 {
        return image.clone();
    }

    // Small radii are cheap enough at full size
    if blur_radius <= 5 {
        return imageops::blur(image, blur_radius as f32);
    }

    // Downscale -> blur at smaller size -> upscale
    let (width, height) = image.dimensions();
    let scale_factor = 4u32;

    let small_width = (width / scale_factor).max(1);
    let small_height = (height / scale_factor).max(1);

    let small = imageops::resize(image, small_width, small_height, FilterType::CatmullRom);

    let blur_at_scale = (blur_radius / scale_factor).max(1);
    let blurred_small = imageops::blur(&small, blur_at_scale as f32);

    imageops::resize(&blurred_small, width, height, FilterType::CatmullRom)
}

/// Encodes an image as JPEG with near-maximum quality.
///
/// # Errors
///
/// Returns `ProcessingError::ImageSave` if encoding fails.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, ProcessingError> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    image
        .write_with_encoder(encoder)
        .map_err(|e| ProcessingError::ImageSave(e.to_string()))?;
    Ok(bytes)
}

/// Saves an image as JPEG at `path`, creating parent directories.
///
/// The OS wallpaper service may hold the previous file open. A locked file is
/// retried once after a short delay before giving up.
///
/// # Errors
///
/// Returns `ProcessingError::ImageSave` if encoding or writing fails.
pub fn save_jpeg(image: &RgbImage, path: &Path) -> Result<(), ProcessingError> {
    let bytes = encode_jpeg(image)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    retry_once_if_locked(|| fs::write(path, &bytes), SAVE_RETRY_DELAY)
        .map_err(|e| ProcessingError::ImageSave(format!("{}: {e}", path.display())))
}

/// Creates `dir` and its parents if missing.
///
/// # Errors
///
/// Returns `ProcessingError::Directory` if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<(), ProcessingError> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .map_err(|e| ProcessingError::Directory(format!("{}: {e}", dir.display())))?;
    }
    Ok(())
}

fn is_locked(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
        || matches!(err.raw_os_error(), Some(ERROR_SHARING_VIOLATION | ERROR_LOCK_VIOLATION))
}

fn retry_once_if_locked<F>(mut op: F, delay: Duration) -> io::Result<()>
where F: FnMut() -> io::Result<()> {
    match op() {
        Err(err) if is_locked(&err) => {
            tracing::warn!(error = %err, "wallpaper file is locked, retrying");
            thread::sleep(delay);
            op()
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;
    use tempfile::TempDir;

    use super::*;

    // ========================================================================
    // resize_to_fill tests
    // ========================================================================

    #[test]
    fn test_resize_to_fill_wide_image() {
        // 2:1 image into a 1:1 target
        let img = RgbImage::from_fn(200, 100, |_, _| Rgb([128u8, 128, 128]));
        let resized = resize_to_fill(&img, 100, 100);
        assert_eq!(resized.dimensions(), (100, 100));
    }

    #[test]
    fn test_resize_to_fill_tall_image() {
        let img = RgbImage::from_fn(100, 300, |_, _| Rgb([10u8, 20, 30]));
        let resized = resize_to_fill(&img, 160, 90);
        assert_eq!(resized.dimensions(), (160, 90));
    }

    #[test]
    fn test_resize_to_fill_crops_center() {
        // Left third red, middle third green, right third blue
        let img = RgbImage::from_fn(300, 100, |x, _| match x {
            0..100 => Rgb([255u8, 0, 0]),
            100..200 => Rgb([0u8, 255, 0]),
            _ => Rgb([0u8, 0, 255]),
        });
        let resized = resize_to_fill(&img, 100, 100);

        let center = resized.get_pixel(50, 50);
        assert!(center[1] > 200, "center should be green, got {center:?}");
    }

    #[test]
    fn test_resize_to_fill_odd_ratio_never_short() {
        let img = RgbImage::new(3, 7);
        assert_eq!(resize_to_fill(&img, 1920, 1080).dimensions(), (1920, 1080));
        assert_eq!(resize_to_fill(&img, 601, 599).dimensions(), (601, 599));
    }

    #[test]
    fn test_resize_to_fill_empty_source() {
        let resized = resize_to_fill(&RgbImage::new(0, 0), 10, 5);
        assert_eq!(resized.dimensions(), (10, 5));
    }

    // ========================================================================
    // apply_fast_blur tests
    // ========================================================================

    #[test]
    fn test_apply_fast_blur_small_radius() {
        let img = RgbImage::from_fn(100, 100, |_, _| Rgb([128u8, 128, 128]));
        let blurred = apply_fast_blur(&img, 3);
        assert_eq!(blurred.dimensions(), (100, 100));
    }

    #[test]
    fn test_apply_fast_blur_large_radius_uses_scale() {
        let img = RgbImage::from_fn(200, 200, |_, _| Rgb([100u8, 100, 100]));
        let blurred = apply_fast_blur(&img, 20);

        // Dimensions should be preserved after scale down and up
        assert_eq!(blurred.dimensions(), (200, 200));
        let pixel = blurred.get_pixel(100, 100);
        assert!(pixel[0].abs_diff(100) <= 2);
    }

    #[test]
    fn test_apply_fast_blur_softens_edges() {
        let img = RgbImage::from_fn(80, 80, |x, _| {
            if x < 40 { Rgb([0u8, 0, 0]) } else { Rgb([255u8, 255, 255]) }
        });
        let blurred = apply_fast_blur(&img, 4);
        let edge = blurred.get_pixel(40, 40)[0];
        assert!(edge > 0 && edge < 255);
    }

    #[test]
    fn test_apply_fast_blur_zero_radius() {
        let img = RgbImage::from_fn(50, 50, |x, y| Rgb([x as u8, y as u8, 128]));
        assert_eq!(apply_fast_blur(&img, 0), img);
    }

    // ========================================================================
    // Hashing
    // ========================================================================

    #[test]
    fn test_image_hash_depends_on_content_and_shape() {
        let a = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        let b = RgbImage::from_pixel(4, 4, Rgb([1, 2, 4]));
        let c = RgbImage::from_pixel(2, 8, Rgb([1, 2, 3]));

        assert_eq!(image_hash(&a), image_hash(&a.clone()));
        assert_ne!(image_hash(&a), image_hash(&b));
        assert_ne!(image_hash(&a), image_hash(&c));
    }

    // ========================================================================
    // Saving
    // ========================================================================

    #[test]
    fn test_save_jpeg_and_load_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("generated.jpg");
        let img = RgbImage::from_pixel(32, 16, Rgb([200u8, 100, 50]));

        save_jpeg(&img, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (32, 16));
        let pixel = loaded.get_pixel(16, 8);
        assert!(pixel[0].abs_diff(200) <= 4);
    }

    #[test]
    fn test_save_jpeg_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("generated.jpg");

        save_jpeg(&RgbImage::new(8, 8), &path).unwrap();
        save_jpeg(&RgbImage::new(16, 4), &path).unwrap();

        assert_eq!(load_image(&path).unwrap().dimensions(), (16, 4));
    }

    #[test]
    fn test_save_jpeg_into_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = save_jpeg(&RgbImage::new(4, 4), temp_dir.path());
        assert!(matches!(result, Err(ProcessingError::ImageSave(_))));
    }

    #[test]
    fn test_load_image_missing_file() {
        let result = load_image(Path::new("/nonexistent/image.png"));
        assert!(matches!(result, Err(ProcessingError::ImageRead(_))));
    }

    #[test]
    fn test_retry_once_if_locked_recovers() {
        let mut attempts = 0;
        let result = retry_once_if_locked(
            || {
                attempts += 1;
                if attempts == 1 {
                    Err(io::Error::from(io::ErrorKind::PermissionDenied))
                } else {
                    Ok(())
                }
            },
            Duration::ZERO,
        );

        assert!(result.is_ok());
        assert_eq!(attempts, 2);
    }

    #[test]
    fn test_retry_once_if_locked_gives_up_after_one_retry() {
        let mut attempts = 0;
        let result = retry_once_if_locked(
            || {
                attempts += 1;
                Err(io::Error::from_raw_os_error(ERROR_SHARING_VIOLATION))
            },
            Duration::ZERO,
        );

        assert!(result.is_err());
        assert_eq!(attempts, 2);
    }

    #[test]
    fn test_retry_once_if_locked_does_not_retry_other_errors() {
        let mut attempts = 0;
        let result = retry_once_if_locked(
            || {
                attempts += 1;
                Err(io::Error::from(io::ErrorKind::NotFound))
            },
            Duration::ZERO,
        );

        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }
}
