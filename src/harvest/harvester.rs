//! Page image harvester
//!
//! Turns a page's rendered image elements into at most `max_images`
//! accepted, recompressed images.
//!
//! # Selection Flow
//!
//! 1. Drop candidates whose declared geometry fails the minimum size
//! 2. Resolve each reference against the page URL
//! 3. Probe the remote size; drop definite sizes below the byte minimum
//! 4. Sort by declared area, largest first (stable)
//! 5. Walk the sorted list until enough images are accepted:
//!    fetch, byte minimum, duplicate, near-blank (soft), decode + actual
//!    size, too-square (soft)
//! 6. Compress the accepted images into `page_budget / accepted` KiB each
//!
//! Soft rejections are overridden for the last candidate of the walk when
//! nothing has been accepted yet. If the walk still ends empty, the first
//! candidate that failed only a soft check is accepted instead.

use crate::config::HarvestConfig;
use crate::crawler::ImageFetcher;
use crate::harvest::compressor::ImageCompressor;
use crate::harvest::dedup::{content_digest, ContentDeduplicator};
use crate::harvest::qualifier::{
    aspect_ratio, image_dimensions, is_near_blank, is_too_square, meets_minimum_size,
};
use crate::harvest::{
    AcceptedImage, CandidateImage, HarvestReport, QualityWarning, RejectedCandidate, Rejection,
};
use crate::url::resolve_image_ref;
use url::Url;

/// A candidate that survived the declared-size and probe filters
#[derive(Debug, Clone)]
struct Qualified {
    url: Url,
    area: u64,
}

/// Whether a soft rejection should be overridden
///
/// True only when nothing has been accepted for the page and no candidate
/// remains after the current one.
pub fn allows_soft_override(accepted: usize, remaining: usize) -> bool {
    accepted == 0 && remaining == 0
}

/// Selects and compresses hero images for one page at a time
#[derive(Debug, Clone)]
pub struct Harvester {
    config: HarvestConfig,
    compressor: ImageCompressor,
}

impl Harvester {
    pub fn new(config: HarvestConfig) -> Self {
        Self::with_compressor(config, ImageCompressor::default())
    }

    pub fn with_compressor(config: HarvestConfig, compressor: ImageCompressor) -> Self {
        Self { config, compressor }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Harvests one page
    ///
    /// Errors on individual candidates are recorded in the report and never
    /// abort the page.
    ///
    /// # Arguments
    ///
    /// * `page_url` - URL of the rendered page, used to resolve references
    /// * `candidates` - Image elements in document order
    /// * `fetcher` - Capability used to probe and download image bytes
    pub async fn harvest(
        &self,
        page_url: &str,
        candidates: &[CandidateImage],
        fetcher: &dyn ImageFetcher,
    ) -> HarvestReport {
        let mut report = HarvestReport::default();

        let qualified = self
            .qualify_candidates(page_url, candidates, fetcher, &mut report)
            .await;
        report.qualifying = qualified.len();
        tracing::info!(
            "Found {} valid images (>= 400x600) on {}",
            qualified.len(),
            page_url
        );

        self.collect(&qualified, fetcher, &mut report).await;
        self.compress_accepted(&mut report);

        report
    }

    /// Applies the declared-size filter and size probe, then sorts by area
    async fn qualify_candidates(
        &self,
        page_url: &str,
        candidates: &[CandidateImage],
        fetcher: &dyn ImageFetcher,
        report: &mut HarvestReport,
    ) -> Vec<Qualified> {
        let mut qualified = Vec::new();

        for candidate in candidates {
            if !meets_minimum_size(candidate.declared_width, candidate.declared_height) {
                reject(
                    report,
                    &candidate.source_ref,
                    Rejection::DeclaredTooSmall {
                        width: candidate.declared_width,
                        height: candidate.declared_height,
                    },
                );
                continue;
            }

            let url = match resolve_image_ref(page_url, &candidate.source_ref) {
                Ok(url) => url,
                Err(e) => {
                    reject(report, &candidate.source_ref, Rejection::Unresolvable(e.to_string()));
                    continue;
                }
            };

            if let Some(size) = fetcher.probe_size(&url).await {
                if size < self.config.min_image_bytes {
                    reject(report, url.as_str(), Rejection::ProbedTooSmall(size));
                    continue;
                }
            }

            qualified.push(Qualified {
                url,
                area: candidate.declared_area(),
            });
        }

        qualified.sort_by(|a, b| b.area.cmp(&a.area));
        qualified
    }

    /// Walks the sorted candidates until the page has enough images
    ///
    /// The first candidate rejected only on soft grounds is held back; if the
    /// walk ends with nothing accepted, it is accepted with its warnings.
    async fn collect(
        &self,
        qualified: &[Qualified],
        fetcher: &dyn ImageFetcher,
        report: &mut HarvestReport,
    ) {
        let mut dedup = ContentDeduplicator::new();
        let mut fallback: Option<(AcceptedImage, usize)> = None;

        for (position, candidate) in qualified.iter().enumerate() {
            if report.accepted.len() >= self.config.max_images {
                break;
            }

            let image = match self.evaluate(candidate, &mut dedup, fetcher).await {
                Ok(image) => image,
                Err(reason) => {
                    reject(report, candidate.url.as_str(), reason);
                    continue;
                }
            };

            let remaining = qualified.len() - position - 1;
            if image.has_warnings() && !allows_soft_override(report.accepted.len(), remaining) {
                reject(report, candidate.url.as_str(), soft_rejection(&image));
                if fallback.is_none() && report.accepted.is_empty() {
                    fallback = Some((image, report.rejected.len() - 1));
                }
                continue;
            }

            accept(report, image);
        }

        if report.accepted.is_empty() {
            if let Some((image, rejected_at)) = fallback {
                report.rejected.remove(rejected_at);
                accept(report, image);
            }
        }
    }

    /// Runs one candidate through fetch and every quality check
    ///
    /// Hard failures are errors. Soft failures (near-blank, too square) are
    /// returned as warnings on the image for the caller to decide on.
    async fn evaluate(
        &self,
        candidate: &Qualified,
        dedup: &mut ContentDeduplicator,
        fetcher: &dyn ImageFetcher,
    ) -> Result<AcceptedImage, Rejection> {
        let bytes = fetcher
            .fetch(&candidate.url)
            .await
            .map_err(|e| Rejection::FetchFailed(e.to_string()))?;

        if (bytes.len() as u64) < self.config.min_image_bytes {
            return Err(Rejection::TooFewBytes(bytes.len()));
        }

        let digest = content_digest(&bytes);
        if !dedup.record_digest(digest.clone()) {
            return Err(Rejection::Duplicate);
        }

        let mut warnings = Vec::new();
        if is_near_blank(&bytes) {
            warnings.push(QualityWarning::NearBlank);
        }

        let (width, height) =
            image_dimensions(&bytes).map_err(|e| Rejection::Undecodable(e.to_string()))?;

        if !meets_minimum_size(width, height) {
            return Err(Rejection::TooSmall { width, height });
        }

        if is_too_square(width, height) {
            warnings.push(QualityWarning::TooSquare);
        }

        Ok(AcceptedImage {
            source_url: candidate.url.to_string(),
            original_size: bytes.len(),
            bytes,
            width,
            height,
            content_hash: digest,
            warnings,
        })
    }

    /// Splits the page budget across the accepted images and compresses them
    fn compress_accepted(&self, report: &mut HarvestReport) {
        if report.accepted.is_empty() {
            return;
        }

        let budget = self.config.page_budget_kib / report.accepted.len() as f64;
        report.budget_per_image_kib = Some(budget);
        tracing::info!(
            "Compressing {} images (target: {:.1}KB each)...",
            report.accepted.len(),
            budget
        );

        for image in &mut report.accepted {
            let compressed = self.compressor.compress(&image.bytes, budget);
            if !compressed.within_budget {
                tracing::debug!(
                    "  {} stays over budget at {:.1}KB",
                    image.source_url,
                    compressed.bytes.len() as f64 / 1024.0
                );
            }
            image.bytes = compressed.bytes;
        }
    }
}

fn accept(report: &mut HarvestReport, image: AcceptedImage) {
    for warning in &image.warnings {
        tracing::warn!("  Warning: Keeping {} image (only option available)", warning);
    }
    tracing::info!(
        "  Collected: image {} ({}x{}, {:.1}KB)",
        report.accepted.len() + 1,
        image.width,
        image.height,
        image.original_size as f64 / 1024.0
    );
    report.accepted.push(image);
}

/// The rejection reported for an image whose first warning was not overridden
fn soft_rejection(image: &AcceptedImage) -> Rejection {
    match image.warnings.first() {
        Some(QualityWarning::TooSquare) => Rejection::TooSquare {
            ratio: aspect_ratio(image.width, image.height).unwrap_or(0.0),
        },
        _ => Rejection::NearBlank,
    }
}

fn reject(report: &mut HarvestReport, source: &str, reason: Rejection) {
    tracing::info!("  Skipping {}: {}", source, reason);
    report.rejected.push(RejectedCandidate {
        source: source.to_string(),
        reason,
    });
}
