use serde::Deserialize;

/// Desktop Chrome user agent presented by the browser session
pub const DEFAULT_BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// User agent sent with image HEAD/GET requests
pub const DEFAULT_FETCH_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Main configuration structure for Hero-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
}

/// Locations of the URL list, merge file and image output
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Persisted JSON URL list
    #[serde(rename = "url-list", default = "default_url_list")]
    pub url_list: String,

    /// Optional plain-text file with one raw URL per line
    #[serde(rename = "merge-file", default = "default_merge_file")]
    pub merge_file: String,

    /// Directory receiving `{index}_{slot}.png` files
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            url_list: default_url_list(),
            merge_file: default_merge_file(),
            output_dir: default_output_dir(),
        }
    }
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(rename = "window-width", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "window-height", default = "default_window_height")]
    pub window_height: u32,

    #[serde(rename = "user-agent", default = "default_browser_user_agent")]
    pub user_agent: String,

    /// Fixed pause after navigation so late images can load (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(
        rename = "navigation-timeout-secs",
        default = "default_navigation_timeout_secs"
    )]
    pub navigation_timeout_secs: u64,

    /// Explicit Chrome/Chromium executable; auto-detected when absent
    #[serde(rename = "chrome-path", default)]
    pub chrome_path: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_browser_user_agent(),
            settle_delay_ms: default_settle_delay_ms(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            chrome_path: None,
        }
    }
}

/// Image fetch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(rename = "user-agent", default = "default_fetch_user_agent")]
    pub user_agent: String,

    /// Timeout for the HEAD size probe (seconds)
    #[serde(rename = "probe-timeout-secs", default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Timeout for the full image download (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_fetch_user_agent(),
            probe_timeout_secs: default_probe_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

/// Image selection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Maximum accepted images per page
    #[serde(rename = "max-images", default = "default_max_images")]
    pub max_images: usize,

    /// Minimum image size in bytes, both probed and downloaded
    #[serde(rename = "min-image-bytes", default = "default_min_image_bytes")]
    pub min_image_bytes: u64,

    /// Byte budget shared by all images of one page (KiB)
    #[serde(rename = "page-budget-kib", default = "default_page_budget_kib")]
    pub page_budget_kib: f64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
            min_image_bytes: default_min_image_bytes(),
            page_budget_kib: default_page_budget_kib(),
        }
    }
}

fn default_url_list() -> String {
    "final_urls.json".to_string()
}

fn default_merge_file() -> String {
    "urls.txt".to_string()
}

fn default_output_dir() -> String {
    "screenshots".to_string()
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_browser_user_agent() -> String {
    DEFAULT_BROWSER_USER_AGENT.to_string()
}

fn default_settle_delay_ms() -> u64 {
    5000
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_fetch_user_agent() -> String {
    DEFAULT_FETCH_USER_AGENT.to_string()
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_max_images() -> usize {
    4
}

fn default_min_image_bytes() -> u64 {
    120 * 1024
}

fn default_page_budget_kib() -> f64 {
    100.0
}
