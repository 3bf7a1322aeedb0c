use url::Url;

/// Canonicalizes a URL for identity comparison in the URL list
///
/// # Canonicalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Parse the URL (scheme and host are lowercased by the parser)
/// 3. Remove the query string
/// 4. Remove the fragment
/// 5. Remove trailing slashes, including the root slash, along with any
///    whitespace left exposed behind them
///
/// Strings that do not parse as URLs get steps 3-5 applied textually, so
/// every input has a canonical form. The function is idempotent:
/// `canonicalize_url(&canonicalize_url(u)) == canonicalize_url(u)`.
///
/// # Examples
///
/// ```
/// use hero_harvest::url::canonicalize_url;
///
/// let url = canonicalize_url("https://Example.com/homes/listing/?ref=feed#photos");
/// assert_eq!(url, "https://example.com/homes/listing");
/// ```
pub fn canonicalize_url(raw: &str) -> String {
    let trimmed = raw.trim();

    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            trim_trailing_slashes(url.as_str())
        }
        Err(_) => {
            let end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
            trim_trailing_slashes(&trimmed[..end])
        }
    }
}

fn trim_trailing_slashes(s: &str) -> String {
    s.trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .to_string()
}
