//! Hero-Harvest: a hero image harvester
//!
//! This crate renders each page of a URL list in a browser, picks up to four
//! large, distinct, visually useful images per page, recompresses them into a
//! shared byte budget and stores them under `{page_index}_{slot}` names so an
//! interrupted crawl can resume where it stopped.

pub mod config;
pub mod crawler;
pub mod harvest;
pub mod output;
pub mod state;
pub mod title;
pub mod url;
pub mod urllist;

use thiserror::Error;

/// Main error type for Hero-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL list error: {0}")]
    UrlList(#[from] urllist::UrlListError),

    #[error("Renderer error: {0}")]
    Render(#[from] crawler::RenderError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Hero-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{AcceptedImage, CandidateImage, HarvestReport, Harvester};
pub use state::PageState;
pub use url::{canonicalize_url, resolve_image_ref};
pub use urllist::{UrlEntry, UrlList};
