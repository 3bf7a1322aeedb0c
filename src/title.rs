//! Page title extraction
//!
//! The title recorded for a URL entry comes from the rendered document title
//! through a [`TitleStrategy`]. The default strategy, [`LocationYearTitle`],
//! keeps the segment of the title that looks like `"City, State 2024"`.

use crate::urllist::BAD_TITLE_PREFIX;

/// Alphabetic characters required on each side of the comma
const MIN_ALPHA_PER_SIDE: usize = 5;

/// A rule turning a raw document title into the title stored in the URL list
pub trait TitleStrategy: Send + Sync {
    /// Returns the extracted title, or None if the raw title does not match
    fn extract(&self, raw: &str) -> Option<String>;
}

/// Picks the first `-`/`|` separated segment that contains a digit and a
/// comma with more than five alphabetic characters on each side of it
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationYearTitle;

impl TitleStrategy for LocationYearTitle {
    fn extract(&self, raw: &str) -> Option<String> {
        raw.split(['-', '|'])
            .map(str::trim)
            .find(|segment| is_location_year(segment))
            .map(str::to_string)
    }
}

fn is_location_year(segment: &str) -> bool {
    if !segment.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    match segment.split_once(',') {
        Some((before, after)) => {
            count_alphabetic(before) > MIN_ALPHA_PER_SIDE && count_alphabetic(after) > MIN_ALPHA_PER_SIDE
        }
        None => false,
    }
}

fn count_alphabetic(s: &str) -> usize {
    s.chars().filter(|c| c.is_alphabetic()).count()
}

/// Computes the value stored in a URL entry's title field
///
/// * empty raw title → `""`
/// * strategy match → the extracted title
/// * no match → `"<bad>"` followed by the raw title
pub fn resolve_title(strategy: &dyn TitleStrategy, raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    match strategy.extract(raw) {
        Some(title) => title,
        None => format!("{}{}", BAD_TITLE_PREFIX, raw),
    }
}
