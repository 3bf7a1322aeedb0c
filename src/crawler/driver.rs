//! Crawl driver
//!
//! Walks the URL list from the resume index, one page at a time: render,
//! harvest, write the images, record the title and save the list.

use crate::config::Config;
use crate::crawler::{ChromiumRenderer, HttpFetcher, ImageFetcher, PageRenderer};
use crate::harvest::{HarvestReport, Harvester};
use crate::output::{OutputStore, RunSummary};
use crate::state::{PageProgress, PageState};
use crate::title::{resolve_title, LocationYearTitle, TitleStrategy};
use crate::urllist::{merge_url_list, UrlList};
use crate::HarvestError;
use std::path::{Path, PathBuf};

/// How a run picks its starting index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Ignore existing output and start at index 0
    pub fresh: bool,
}

/// Resume index for a run
///
/// The highest persisted page index is processed again, since the run that
/// wrote it may have stopped before finishing that page.
pub fn resume_index(store: &OutputStore, fresh: bool) -> Result<usize, HarvestError> {
    if fresh {
        return Ok(0);
    }
    Ok(store.resume_marker()?.unwrap_or(0))
}

/// Drives one crawl over a URL list
pub struct CrawlDriver {
    list: UrlList,
    list_path: PathBuf,
    store: OutputStore,
    harvester: Harvester,
    title_strategy: Box<dyn TitleStrategy>,
}

impl CrawlDriver {
    pub fn new(list: UrlList, list_path: impl Into<PathBuf>, store: OutputStore, harvester: Harvester) -> Self {
        Self {
            list,
            list_path: list_path.into(),
            store,
            harvester,
            title_strategy: Box::new(LocationYearTitle),
        }
    }

    /// Replaces the title rule
    pub fn with_title_strategy(mut self, strategy: Box<dyn TitleStrategy>) -> Self {
        self.title_strategy = strategy;
        self
    }

    pub fn list(&self) -> &UrlList {
        &self.list
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    /// Processes every page from `start_index` to the end of the list
    ///
    /// A page that fails to render or persist is logged and counted; the run
    /// continues with the next page. Only a failure to save the URL list
    /// aborts the run.
    pub async fn run(
        &mut self,
        renderer: &mut dyn PageRenderer,
        fetcher: &dyn ImageFetcher,
        start_index: usize,
    ) -> Result<RunSummary, HarvestError> {
        let mut summary = RunSummary::start(start_index);
        self.store.ensure_dir()?;

        let last = self.list.len().saturating_sub(1);
        for index in start_index..self.list.len() {
            let url = match self.list.get(index) {
                Some(entry) => entry.url.clone(),
                None => break,
            };
            tracing::info!("Processing {}/{}: {}", index, last, url);

            let mut progress = PageProgress::new(index);
            match self.process_page(&mut progress, &url, renderer, fetcher).await {
                Ok(Some((report, bytes))) => {
                    tracing::info!(
                        "Successfully saved {} unique images for URL {}",
                        report.accepted.len(),
                        index
                    );
                    summary.record_page(
                        progress.state(),
                        report.accepted.len(),
                        bytes,
                        report.soft_overrides(),
                    );
                }
                Ok(None) => summary.record_page(progress.state(), 0, 0, 0),
                Err(e) => {
                    tracing::error!("Aborting run at page {}: {}", index, e);
                    return Err(e);
                }
            }
        }

        summary.finish();
        tracing::info!(
            "Completed! Processed {} URLs ({} persisted, {} failed)",
            summary.pages_attempted,
            summary.pages_persisted,
            summary.pages_failed
        );
        Ok(summary)
    }

    /// Runs one page through its lifecycle
    ///
    /// Returns `Ok(None)` when the page failed and the run should continue,
    /// `Err` only for errors that must stop the run.
    async fn process_page(
        &mut self,
        progress: &mut PageProgress,
        url: &str,
        renderer: &mut dyn PageRenderer,
        fetcher: &dyn ImageFetcher,
    ) -> Result<Option<(HarvestReport, u64)>, HarvestError> {
        let index = progress.index();

        progress.advance(PageState::Rendering)?;
        let page = match renderer.render(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Error processing {}: {}", url, e);
                match self.store.clear_page(index) {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Removed {} stale images for page {}", n, index),
                    Err(e) => tracing::warn!("Failed to clear images for page {}: {}", index, e),
                }
                progress.fail();
                return Ok(None);
            }
        };

        progress.advance(PageState::Harvesting)?;
        let report = self.harvester.harvest(url, &page.images, fetcher).await;

        let written = match self.store.write_page(index, &report.accepted) {
            Ok(written) => written,
            Err(e) => {
                tracing::warn!("Failed to write images for page {}: {}", index, e);
                progress.fail();
                return Ok(None);
            }
        };

        let title = resolve_title(self.title_strategy.as_ref(), &page.title);
        tracing::debug!("Title for page {}: {:?}", index, title);
        self.list.set_title(index, title);
        self.list.save(&self.list_path)?;

        progress.advance(PageState::Persisted)?;
        Ok(Some((report, written.bytes_written)))
    }
}

/// Merges the input file into the persisted list and loads it
///
/// A missing merge file is fine as long as the list exists.
pub fn prepare_url_list(config: &Config) -> Result<UrlList, HarvestError> {
    let list_path = Path::new(&config.paths.url_list);
    let merge_path = Path::new(&config.paths.merge_file);
    let outcome = merge_url_list(list_path, merge_path)?;
    Ok(outcome.list)
}

/// Runs a complete crawl
///
/// This is the main entry point. It will:
/// 1. Merge and normalize the URL list
/// 2. Compute the resume index
/// 3. Launch the browser and build the HTTP client
/// 4. Process every page from the resume index
/// 5. Close the browser, whether or not the run succeeded
pub async fn run_crawl(config: &Config, options: RunOptions) -> Result<RunSummary, HarvestError> {
    let list = prepare_url_list(config)?;
    let store = OutputStore::new(&config.paths.output_dir);
    let start_index = resume_index(&store, options.fresh)?;
    if start_index > 0 {
        tracing::info!("Found existing images up to index {}", start_index);
        tracing::info!("Resuming from index {}...", start_index);
    }

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let mut renderer = ChromiumRenderer::launch(&config.browser).await?;

    let mut driver = CrawlDriver::new(
        list,
        &config.paths.url_list,
        store,
        Harvester::new(config.harvest.clone()),
    );
    let result = driver.run(&mut renderer, &fetcher, start_index).await;

    if let Err(e) = renderer.close().await {
        tracing::warn!("Failed to close browser: {}", e);
    }

    result
}
