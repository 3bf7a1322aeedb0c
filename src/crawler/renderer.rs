//! Headless browser page rendering
//!
//! Pages are rendered in Chromium so script-inserted images are visible.
//! The renderer reports the document title and every image element with its
//! rendered size; fetching and judging the images is left to the harvester.

use crate::config::BrowserConfig;
use crate::harvest::CandidateImage;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Hides the automation flag some sites check before serving images
const MASK_WEBDRIVER_JS: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// Lists every `<img>` element with its source and rendered size
const COLLECT_IMAGES_JS: &str = r#"
Array.from(document.images)
    .map(img => {
        const rect = img.getBoundingClientRect();
        return {
            source_ref: img.currentSrc || img.src || img.getAttribute('src') || '',
            declared_width: Math.max(0, Math.round(rect.width)),
            declared_height: Math.max(0, Math.round(rect.height)),
        };
    })
    .filter(img => img.source_ref.length > 0)
"#;

/// Errors rendering a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Page script failed: {0}")]
    Script(String),

    #[error("Navigation to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },
}

/// A page after rendering and settling
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedPage {
    /// Document title, empty when the page has none
    pub title: String,
    /// Image elements in document order
    pub images: Vec<CandidateImage>,
}

/// Capability to render a page and list its images
///
/// One renderer is used for the whole crawl and released with
/// [`PageRenderer::close`] when the crawl ends, whatever its outcome.
#[async_trait]
pub trait PageRenderer: Send {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, RenderError>;

    async fn close(&mut self) -> Result<(), RenderError>;
}

/// Command-line switches passed to Chromium
pub fn launch_args(config: &BrowserConfig) -> Vec<String> {
    let mut args = vec![
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-software-rasterizer".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--log-level=3".to_string(),
        format!("--window-size={},{}", config.window_width, config.window_height),
        format!("--user-agent={}", config.user_agent),
    ];
    if config.headless {
        args.insert(0, "--headless=new".to_string());
    }
    args
}

/// [`PageRenderer`] driving a single Chromium tab
pub struct ChromiumRenderer {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    settle_delay: Duration,
    navigation_timeout: Duration,
}

impl ChromiumRenderer {
    /// Launches Chromium and opens the tab reused for every page
    pub async fn launch(config: &BrowserConfig) -> Result<Self, RenderError> {
        let mut builder = LaunchConfig::builder().viewport(None::<Viewport>);
        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }
        for arg in launch_args(config) {
            builder = builder.arg(arg);
        }
        let launch_config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        if let Err(e) = page.evaluate(MASK_WEBDRIVER_JS).await {
            tracing::debug!("Could not mask navigator.webdriver: {}", e);
        }

        tracing::info!(
            "Browser launched ({}x{}, headless: {})",
            config.window_width,
            config.window_height,
            config.headless
        );

        Ok(Self {
            browser,
            page,
            handler,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        })
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, RenderError> {
        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(RenderError::Timeout {
                    url: url.to_string(),
                    secs: self.navigation_timeout.as_secs(),
                })
            }
        }

        // Fixed settle pause; late-inserted images must be in the DOM
        tokio::time::sleep(self.settle_delay).await;

        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?
            .unwrap_or_default();

        let images: Vec<CandidateImage> = self
            .page
            .evaluate(COLLECT_IMAGES_JS)
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::Script(e.to_string()))?;

        tracing::debug!("Rendered {}: {} image elements", url, images.len());
        Ok(RenderedPage { title, images })
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        let closed = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler.abort();
        closed
            .map(|_| ())
            .map_err(|e| RenderError::Launch(e.to_string()))
    }
}
