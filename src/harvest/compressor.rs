//! Image recompression into a byte budget
//!
//! Images are re-encoded as JPEG. Quality is lowered first, in steps that
//! shrink as the output approaches the target; if the quality floor is still
//! over budget the image is downscaled in 10% steps down to 30% of its size.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageResult, Rgb, RgbImage};

/// Compression parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    /// Quality of the first encode
    pub start_quality: u8,
    /// Lowest quality tried before resizing
    pub min_quality: u8,
    /// Fixed quality used for resized encodes
    pub resize_quality: u8,
    /// Smallest scale tried, in percent of the original dimensions
    pub min_scale_percent: u32,
    /// Scale decrement per resize attempt, in percent
    pub scale_step_percent: u32,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            start_quality: 95,
            min_quality: 20,
            resize_quality: 85,
            min_scale_percent: 30,
            scale_step_percent: 10,
        }
    }
}

/// Output of a compression pass
#[derive(Debug, Clone)]
pub struct CompressedImage {
    /// Encoded bytes; the input bytes when re-encoding did not help
    pub bytes: Vec<u8>,
    /// Last JPEG quality used, None when the input was returned unchanged
    pub quality: Option<u8>,
    /// Scale of the output relative to the input, in percent
    pub scale_percent: u32,
    /// Whether the output fits the requested budget
    pub within_budget: bool,
}

/// Re-encodes images to fit a byte budget
#[derive(Debug, Clone, Default)]
pub struct ImageCompressor {
    settings: CompressionSettings,
}

impl ImageCompressor {
    pub fn new(settings: CompressionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CompressionSettings {
        &self.settings
    }

    /// Compresses `bytes` to at most `target_kib` KiB, best effort
    ///
    /// Never fails: if the input cannot be decoded or encoded, the input is
    /// returned unchanged. The input is also returned when the best encode is
    /// not smaller than it, so the output never grows.
    pub fn compress(&self, bytes: &[u8], target_kib: f64) -> CompressedImage {
        let target_bytes = budget_bytes(target_kib);

        let unchanged = || CompressedImage {
            bytes: bytes.to_vec(),
            quality: None,
            scale_percent: 100,
            within_budget: bytes.len() <= target_bytes,
        };

        match self.try_compress(bytes, target_bytes) {
            Ok(compressed) if compressed.bytes.len() < bytes.len() => compressed,
            Ok(_) => {
                tracing::debug!("Re-encoding did not shrink image, keeping original bytes");
                unchanged()
            }
            Err(e) => {
                tracing::warn!("Error compressing image: {}", e);
                unchanged()
            }
        }
    }

    fn try_compress(&self, bytes: &[u8], target_bytes: usize) -> ImageResult<CompressedImage> {
        let img = image::load_from_memory(bytes)?;
        let rgb = flatten_onto_white(&img);
        let settings = &self.settings;

        let mut quality = settings.start_quality.max(settings.min_quality);
        let mut output = encode_jpeg(&rgb, quality)?;

        while output.len() > target_bytes && quality > settings.min_quality {
            let step = quality_step(output.len(), target_bytes);
            quality = quality.saturating_sub(step).max(settings.min_quality);
            output = encode_jpeg(&rgb, quality)?;
        }

        let mut scale_percent = 100;
        if output.len() > target_bytes && settings.scale_step_percent > 0 {
            let (width, height) = rgb.dimensions();
            let mut percent = 100u32.saturating_sub(settings.scale_step_percent);

            while percent >= settings.min_scale_percent && percent > 0 {
                let new_width = scaled(width, percent);
                let new_height = scaled(height, percent);
                let resized = image::imageops::resize(&rgb, new_width, new_height, FilterType::Lanczos3);

                output = encode_jpeg(&resized, settings.resize_quality)?;
                quality = settings.resize_quality;
                scale_percent = percent;

                if output.len() <= target_bytes {
                    break;
                }
                percent = percent.saturating_sub(settings.scale_step_percent);
            }
        }

        Ok(CompressedImage {
            within_budget: output.len() <= target_bytes,
            bytes: output,
            quality: Some(quality),
            scale_percent,
        })
    }
}

/// Compresses with default settings, returning only the bytes
pub fn compress_image(bytes: &[u8], target_kib: f64) -> Vec<u8> {
    ImageCompressor::default().compress(bytes, target_kib).bytes
}

/// Converts any color type to RGB, compositing transparency onto white
pub fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Quality decrement for the next attempt: big overshoot, big step
fn quality_step(size: usize, target: usize) -> u8 {
    let size = size as f64;
    let target = target as f64;
    if size > target * 2.0 {
        15
    } else if size > target * 1.5 {
        10
    } else {
        5
    }
}

fn budget_bytes(target_kib: f64) -> usize {
    if target_kib.is_finite() && target_kib > 0.0 {
        (target_kib * 1024.0) as usize
    } else {
        0
    }
}

fn scaled(dimension: u32, percent: u32) -> u32 {
    ((dimension as u64 * percent as u64) / 100).max(1) as u32
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder)?;
    Ok(buf)
}
