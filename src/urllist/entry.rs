use serde::{Deserialize, Serialize};

/// Prefix marking a title that did not match the title rule
pub const BAD_TITLE_PREFIX: &str = "<bad>";

/// One page of the crawl list
///
/// `title` is empty until the page has been crawled. After a crawl it holds
/// either the extracted title or [`BAD_TITLE_PREFIX`] followed by the raw
/// document title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEntry")]
pub struct UrlEntry {
    pub url: String,
    pub title: String,
}

impl UrlEntry {
    /// Creates an untitled entry
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
        }
    }

    /// Returns true once a crawl has recorded a title for this entry
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    /// Returns true if the recorded title failed the title rule
    pub fn is_bad_title(&self) -> bool {
        self.title.starts_with(BAD_TITLE_PREFIX)
    }
}

/// On-disk shape of an entry: older lists stored bare URL strings
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Bare(String),
    Full {
        url: String,
        #[serde(default)]
        title: String,
    },
}

impl From<RawEntry> for UrlEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Bare(url) => UrlEntry::new(url),
            RawEntry::Full { url, title } => UrlEntry { url, title },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_bare_string() {
        let entry: UrlEntry = serde_json::from_str(r#""https://example.com/a""#).unwrap();
        assert_eq!(entry, UrlEntry::new("https://example.com/a"));
        assert!(!entry.has_title());
    }

    #[test]
    fn test_deserialize_object() {
        let entry: UrlEntry =
            serde_json::from_str(r#"{"url": "https://example.com/a", "title": "Home"}"#).unwrap();
        assert_eq!(entry.url, "https://example.com/a");
        assert_eq!(entry.title, "Home");
    }

    #[test]
    fn test_deserialize_object_without_title() {
        let entry: UrlEntry = serde_json::from_str(r#"{"url": "https://example.com/a"}"#).unwrap();
        assert_eq!(entry.title, "");
    }

    #[test]
    fn test_serialize_always_object() {
        let json = serde_json::to_string(&UrlEntry::new("https://example.com/a")).unwrap();
        assert_eq!(json, r#"{"url":"https://example.com/a","title":""}"#);
    }

    #[test]
    fn test_bad_title_marker() {
        let entry = UrlEntry {
            url: "https://example.com".to_string(),
            title: format!("{}Welcome", BAD_TITLE_PREFIX),
        };
        assert!(entry.is_bad_title());
        assert!(entry.has_title());
    }
}
