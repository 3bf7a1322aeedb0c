//! Content-hash deduplication within one page

use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Hex-encoded SHA-256 digest of image bytes
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Set of content digests seen while harvesting a single page
///
/// A fresh deduplicator is created for every page, so an image repeated
/// across pages is kept once per page.
#[derive(Debug, Default)]
pub struct ContentDeduplicator {
    seen: HashSet<String>,
}

impl ContentDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if identical bytes were already recorded
    pub fn is_duplicate(&self, bytes: &[u8]) -> bool {
        self.contains_digest(&content_digest(bytes))
    }

    /// Records the bytes' digest
    pub fn record(&mut self, bytes: &[u8]) {
        self.seen.insert(content_digest(bytes));
    }

    pub fn contains_digest(&self, digest: &str) -> bool {
        self.seen.contains(digest)
    }

    /// Records a precomputed digest, returning false if it was already present
    pub fn record_digest(&mut self, digest: String) -> bool {
        self.seen.insert(digest)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
