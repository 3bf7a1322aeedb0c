//! URL handling module for Hero-Harvest
//!
//! This module provides URL canonicalization for the URL list and resolution
//! of (possibly relative) image references against the page they appear on.

mod normalize;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use normalize::canonicalize_url;

/// Resolves an image reference found on a page into an absolute fetchable URL
///
/// Relative references (`/img/a.jpg`, `../a.jpg`, `//cdn.example.com/a.jpg`)
/// are joined onto the page URL. Only `http` and `https` results are
/// accepted; `data:` and `blob:` sources cannot be fetched and are rejected.
///
/// # Arguments
///
/// * `page_url` - The URL of the page the image was found on
/// * `source_ref` - The image element's source reference
///
/// # Returns
///
/// * `Ok(Url)` - Absolute URL of the image
/// * `Err(UrlError)` - The reference cannot be resolved into an HTTP(S) URL
///
/// # Examples
///
/// ```
/// use hero_harvest::url::resolve_image_ref;
///
/// let url = resolve_image_ref("https://example.com/homes/12", "/img/front.jpg").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/img/front.jpg");
/// ```
pub fn resolve_image_ref(page_url: &str, source_ref: &str) -> Result<Url, UrlError> {
    let source_ref = source_ref.trim();
    if source_ref.is_empty() {
        return Err(UrlError::Parse("empty image reference".to_string()));
    }

    let base = Url::parse(page_url).map_err(|e| UrlError::Parse(format!("{}: {}", page_url, e)))?;
    let resolved = base
        .join(source_ref)
        .map_err(|e| UrlError::Parse(format!("{}: {}", source_ref, e)))?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS image sources are supported, got: {}",
            resolved.scheme()
        )));
    }

    if resolved.host_str().is_none() {
        return Err(UrlError::MissingHost(resolved.to_string()));
    }

    Ok(resolved)
}
