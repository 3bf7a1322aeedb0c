//! Run statistics
//!
//! Counters collected by the crawl driver while it walks the URL list, and
//! the end-of-run summary printer.

use crate::state::PageState;
use chrono::{DateTime, Utc};

/// Counters for one crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Index the run started at
    pub start_index: usize,

    /// Pages that reached a terminal state
    pub pages_attempted: usize,
    pub pages_persisted: usize,
    pub pages_failed: usize,

    /// Persisted pages that yielded no image
    pub pages_without_images: usize,

    pub images_saved: usize,
    pub bytes_written: u64,

    /// Images accepted despite a soft rejection
    pub soft_overrides: usize,
}

impl RunSummary {
    pub fn start(start_index: usize) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            start_index,
            pages_attempted: 0,
            pages_persisted: 0,
            pages_failed: 0,
            pages_without_images: 0,
            images_saved: 0,
            bytes_written: 0,
            soft_overrides: 0,
        }
    }

    /// Records a page that reached `state`
    pub fn record_page(&mut self, state: PageState, images: usize, bytes: u64, soft_overrides: usize) {
        self.pages_attempted += 1;
        match state {
            PageState::Persisted => {
                self.pages_persisted += 1;
                if images == 0 {
                    self.pages_without_images += 1;
                }
                self.images_saved += images;
                self.bytes_written += bytes;
                self.soft_overrides += soft_overrides;
            }
            _ => self.pages_failed += 1,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of attempted pages that were persisted, in percent
    pub fn success_rate(&self) -> f64 {
        if self.pages_attempted == 0 {
            return 0.0;
        }
        self.pages_persisted as f64 / self.pages_attempted as f64 * 100.0
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Run:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    if let Some(finished) = summary.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(secs) = summary.duration_seconds() {
        println!("  Duration: {}s", secs);
    }
    println!("  Started at index: {}", summary.start_index);
    println!();

    println!("Pages:");
    println!("  Attempted: {}", summary.pages_attempted);
    println!(
        "  Persisted: {} ({:.1}%)",
        summary.pages_persisted,
        summary.success_rate()
    );
    println!("  Failed: {}", summary.pages_failed);
    println!("  Without images: {}", summary.pages_without_images);
    println!();

    println!("Images:");
    println!("  Saved: {}", summary.images_saved);
    println!(
        "  Total size: {:.1}KB",
        summary.bytes_written as f64 / 1024.0
    );
    if summary.soft_overrides > 0 {
        println!("  Kept as only option: {}", summary.soft_overrides);
    }
}
