//! Image quality predicates
//!
//! Side-effect-free checks deciding whether an image is worth keeping. The
//! size check runs twice: on the geometry the renderer declares for the
//! element, then on the decoded image.

use image::{ImageReader, ImageResult};
use std::io::Cursor;

/// Shorter side required by the minimum size rule
pub const MIN_SHORT_SIDE: u32 = 400;

/// Longer side required by the minimum size rule
pub const MIN_LONG_SIDE: u32 = 600;

/// A channel value above this counts as near-white
pub const NEAR_WHITE_THRESHOLD: u8 = 240;

/// Images whose long/short ratio is below this are too square
pub const MIN_ASPECT_RATIO: f64 = 1.3;

/// True iff the image is at least 400x600 in either orientation
pub fn meets_minimum_size(width: u32, height: u32) -> bool {
    (width >= MIN_SHORT_SIDE && height >= MIN_LONG_SIDE)
        || (width >= MIN_LONG_SIDE && height >= MIN_SHORT_SIDE)
}

/// Long side over short side, or None when a side is zero
pub fn aspect_ratio(width: u32, height: u32) -> Option<f64> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(width.max(height) as f64 / width.min(height) as f64)
}

/// True iff the aspect ratio is below 1.3 or the geometry is degenerate
pub fn is_too_square(width: u32, height: u32) -> bool {
    match aspect_ratio(width, height) {
        Some(ratio) => ratio < MIN_ASPECT_RATIO,
        None => true,
    }
}

/// True iff more than half of the pixels are near-white
///
/// A pixel is near-white when all three color channels exceed 240. Images
/// that cannot be decoded are reported as not blank.
pub fn is_near_blank(bytes: &[u8]) -> bool {
    let img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            tracing::debug!("Blank check skipped, image not decodable: {}", e);
            return false;
        }
    };

    let rgb = img.to_rgb8();
    let total = rgb.width() as usize * rgb.height() as usize;
    if total == 0 {
        return false;
    }

    let near_white = rgb
        .pixels()
        .filter(|p| p.0.iter().all(|&c| c > NEAR_WHITE_THRESHOLD))
        .count();

    near_white * 2 > total
}

/// Reads the actual image dimensions from the encoded header
pub fn image_dimensions(bytes: &[u8]) -> ImageResult<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    reader.into_dimensions()
}
