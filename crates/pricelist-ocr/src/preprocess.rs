//! Raster preprocessing ahead of recognition.
//!
//! Scanned price sheets arrive with uneven lighting and low-contrast print;
//! recognition quality improves measurably when pages are normalized first.
//! The chain is grayscale → histogram equalization → adaptive threshold,
//! all local operations so a shadow across half the page does not wash out
//! the other half.

use image::{DynamicImage, GrayImage};
use imageproc::contrast::{adaptive_threshold, equalize_histogram};

/// Minimum adaptive-threshold neighborhood radius in pixels.
const MIN_BLOCK_RADIUS: u32 = 5;

/// Neighborhood radius for the adaptive threshold at a given raster
/// resolution. Scales with DPI so the window covers roughly the same
/// physical area regardless of rasterization settings.
#[must_use]
pub fn block_radius_for_dpi(dpi: f32) -> u32 {
    if !dpi.is_finite() || dpi <= 0.0 {
        return MIN_BLOCK_RADIUS;
    }
    // Truncation is fine, the radius is a small window size.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = (dpi / 80.0).round() as u32;
    scaled.max(MIN_BLOCK_RADIUS)
}

/// Binarize and contrast-normalize a rasterized page for recognition.
#[must_use]
pub fn prepare_page(image: &DynamicImage, block_radius: u32) -> GrayImage {
    let gray = image.to_luma8();
    let equalized = equalize_histogram(&gray);
    adaptive_threshold(&equalized, block_radius.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn block_radius_scales_with_dpi() {
        assert_eq!(block_radius_for_dpi(400.0), 5);
        assert_eq!(block_radius_for_dpi(800.0), 10);
        assert_eq!(block_radius_for_dpi(72.0), MIN_BLOCK_RADIUS);
        assert_eq!(block_radius_for_dpi(0.0), MIN_BLOCK_RADIUS);
    }

    #[test]
    fn prepared_page_is_binary() {
        // Dark band on a light page; after thresholding only 0/255 remain.
        let mut img = GrayImage::from_pixel(64, 64, Luma([220u8]));
        for x in 8..56 {
            for y in 28..36 {
                img.put_pixel(x, y, Luma([30u8]));
            }
        }
        let prepared = prepare_page(&DynamicImage::ImageLuma8(img), 5);
        assert!(prepared.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
