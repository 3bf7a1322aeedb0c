//! Hero image selection for a single page
//!
//! This module contains the image selection pipeline:
//! - Quality predicates (size, near-blank, near-square)
//! - Content-hash deduplication scoped to one page
//! - The harvester walking a page's candidates largest-first
//! - Recompression of the accepted images into a shared byte budget

mod compressor;
mod dedup;
mod harvester;
pub mod qualifier;

pub use compressor::{
    compress_image, flatten_onto_white, CompressedImage, CompressionSettings, ImageCompressor,
};
pub use dedup::{content_digest, ContentDeduplicator};
pub use harvester::{allows_soft_override, Harvester};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An image element discovered on a rendered page, before fetching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateImage {
    /// The element's source reference, possibly relative to the page
    pub source_ref: String,
    /// Rendered width in CSS pixels
    pub declared_width: u32,
    /// Rendered height in CSS pixels
    pub declared_height: u32,
}

impl CandidateImage {
    pub fn new(source_ref: impl Into<String>, declared_width: u32, declared_height: u32) -> Self {
        Self {
            source_ref: source_ref.into(),
            declared_width,
            declared_height,
        }
    }

    pub fn declared_area(&self) -> u64 {
        self.declared_width as u64 * self.declared_height as u64
    }
}

/// Soft rejections overridden because no alternative remained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityWarning {
    NearBlank,
    TooSquare,
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearBlank => write!(f, "mostly white"),
            Self::TooSquare => write!(f, "too square"),
        }
    }
}

/// An image kept for a page
#[derive(Debug, Clone)]
pub struct AcceptedImage {
    /// Absolute URL the image was fetched from
    pub source_url: String,
    /// Image bytes; recompressed once the page's walk is complete
    pub bytes: Vec<u8>,
    /// Decoded width
    pub width: u32,
    /// Decoded height
    pub height: u32,
    /// Byte length as downloaded
    pub original_size: usize,
    /// Hex SHA-256 of the downloaded bytes
    pub content_hash: String,
    /// Soft rejections this image was accepted despite
    pub warnings: Vec<QualityWarning>,
}

impl AcceptedImage {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Why a candidate was not accepted
///
/// Every variant is recoverable: the candidate is skipped and the page
/// continues with the next one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("declared size {width}x{height} below minimum")]
    DeclaredTooSmall { width: u32, height: u32 },

    #[error("cannot resolve image reference: {0}")]
    Unresolvable(String),

    #[error("image too small ({0} bytes)")]
    ProbedTooSmall(u64),

    #[error("download failed: {0}")]
    FetchFailed(String),

    #[error("downloaded file too small ({0} bytes)")]
    TooFewBytes(usize),

    #[error("duplicate image")]
    Duplicate,

    #[error("image is mostly white (>50%)")]
    NearBlank,

    #[error("cannot verify image: {0}")]
    Undecodable(String),

    #[error("actual size {width}x{height} too small")]
    TooSmall { width: u32, height: u32 },

    #[error("image too square (aspect ratio {ratio:.2})")]
    TooSquare { ratio: f64 },
}

/// A skipped candidate and the reason it was skipped
#[derive(Debug, Clone)]
pub struct RejectedCandidate {
    pub source: String,
    pub reason: Rejection,
}

/// Outcome of harvesting one page
#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    /// Accepted images in acceptance order, recompressed
    pub accepted: Vec<AcceptedImage>,
    /// Every candidate skipped, in the order it was skipped
    pub rejected: Vec<RejectedCandidate>,
    /// Candidates left after the declared-size and probe filters
    pub qualifying: usize,
    /// Per-image byte budget used for compression, in KiB
    pub budget_per_image_kib: Option<f64>,
}

impl HarvestReport {
    /// Number of images accepted despite a soft rejection
    pub fn soft_overrides(&self) -> usize {
        self.accepted.iter().filter(|img| img.has_warnings()).count()
    }

    pub fn rejections(&self, matcher: impl Fn(&Rejection) -> bool) -> usize {
        self.rejected.iter().filter(|r| matcher(&r.reason)).count()
    }
}
