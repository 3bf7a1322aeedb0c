//! HTTP image fetcher
//!
//! This module handles the image downloads of a harvest, including:
//! - Building the HTTP client with the configured user agent
//! - HEAD requests probing the remote size before downloading
//! - GET requests downloading image bytes
//! - Error classification

use crate::config::FetchConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors downloading an image
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request for {url} timed out")]
    Timeout { url: String },

    #[error("Request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Capability to probe and download images
///
/// The harvester only depends on this trait, so it can be driven by an
/// in-memory fetcher in tests.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Remote size in bytes, or None when it cannot be determined
    ///
    /// Probe failures are never errors: an unknown size lets the candidate
    /// proceed to the download.
    async fn probe_size(&self, url: &Url) -> Option<u64>;

    /// Downloads the full image body
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// Builds an HTTP client for image downloads
///
/// Redirects are followed with reqwest's default policy.
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(config.probe_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`ImageFetcher`] backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    probe_timeout: Duration,
    fetch_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, config))
    }

    pub fn with_client(client: Client, config: &FetchConfig) -> Self {
        Self {
            client,
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn probe_size(&self, url: &Url) -> Option<u64> {
        let response = match self
            .client
            .head(url.clone())
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Size probe failed for {}: {}", url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Size probe for {} returned {}", url, response.status());
            return None;
        }

        // Read the header directly; the body length of a HEAD response is 0
        parse_content_length(
            response
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok()),
        )
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| classify(url, e))?;
        Ok(body.to_vec())
    }
}

/// Parses a Content-Length value; zero and garbage count as unknown
fn parse_content_length(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&size| size > 0)
}

fn classify(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
