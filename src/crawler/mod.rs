//! Crawler module for page rendering and image fetching
//!
//! This module contains the crawl loop and the capabilities it depends on:
//! - HTTP probing and downloading of images
//! - Headless browser rendering of pages
//! - The crawl driver walking the URL list and persisting results

mod driver;
mod fetcher;
mod renderer;

pub use driver::{prepare_url_list, resume_index, run_crawl, CrawlDriver, RunOptions};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, ImageFetcher};
pub use renderer::{launch_args, ChromiumRenderer, PageRenderer, RenderError, RenderedPage};

use crate::config::Config;
use crate::output::RunSummary;
use crate::HarvestError;

/// Runs a complete crawl with the given configuration
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `options` - Run options, such as ignoring the resume marker
///
/// # Returns
///
/// * `Ok(RunSummary)` - Counters of the completed run
/// * `Err(HarvestError)` - The run could not start or had to stop
pub async fn crawl(config: &Config, options: RunOptions) -> Result<RunSummary, HarvestError> {
    run_crawl(config, options).await
}
