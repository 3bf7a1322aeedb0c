use crate::url::canonicalize_url;
use crate::urllist::{UrlEntry, UrlListError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// The ordered crawl list
///
/// An entry's position is its page index: output files for the entry at
/// position `i` are named `{i}_{slot}`. Merging only appends, but
/// normalization drops duplicate and empty entries wherever they occur, so
/// every entry after the first dropped one moves to a lower index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlList {
    #[serde(rename = "urls", default)]
    entries: Vec<UrlEntry>,
}

/// Result of merging the input file into the persisted list
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged, normalized list (already saved)
    pub list: UrlList,

    /// Non-empty lines read from the merge file
    pub processed: usize,

    /// Entries appended to the list
    pub added: usize,

    /// Duplicate entries dropped from the existing list
    pub removed: usize,

    /// First index whose entry changed because earlier entries were dropped
    pub first_shifted: Option<usize>,
}

impl UrlList {
    /// Creates a list from entries as given, without normalizing
    pub fn from_entries(entries: Vec<UrlEntry>) -> Self {
        Self { entries }
    }

    /// Loads a list from its JSON file
    ///
    /// Accepts both `{"url": ..., "title": ...}` objects and bare URL strings.
    pub fn load(path: &Path) -> Result<Self, UrlListError> {
        let content = std::fs::read_to_string(path)?;
        let list = serde_json::from_str(&content)?;
        Ok(list)
    }

    /// Writes the list as pretty-printed JSON
    ///
    /// The file is written next to its destination and renamed into place, so
    /// an interrupted save leaves the previous list intact.
    pub fn save(&self, path: &Path) -> Result<(), UrlListError> {
        let json = serde_json::to_string_pretty(self)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);

        std::fs::write(&tmp, json.as_bytes())?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&UrlEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[UrlEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &UrlEntry> {
        self.entries.iter()
    }

    /// Records the title for the entry at `index`
    ///
    /// Returns false if there is no such entry.
    pub fn set_title(&mut self, index: usize, title: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Canonicalizes every entry and drops later duplicates
    ///
    /// The first occurrence keeps its position. If it has no title yet, the
    /// first non-empty title among its duplicates is carried over.
    ///
    /// # Returns
    ///
    /// The number of entries removed
    pub fn normalize(&mut self) -> usize {
        let before = self.entries.len();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut kept: Vec<UrlEntry> = Vec::with_capacity(before);

        for entry in self.entries.drain(..) {
            let url = canonicalize_url(&entry.url);
            if url.is_empty() {
                continue;
            }

            match positions.get(&url) {
                Some(&pos) => {
                    if !kept[pos].has_title() && entry.has_title() {
                        kept[pos].title = entry.title;
                    }
                }
                None => {
                    positions.insert(url.clone(), kept.len());
                    kept.push(UrlEntry {
                        url,
                        title: entry.title,
                    });
                }
            }
        }

        self.entries = kept;
        before - self.entries.len()
    }

    /// Appends raw URLs not yet present, after canonicalization
    ///
    /// # Returns
    ///
    /// The number of entries appended
    pub fn merge<I, S>(&mut self, raw_urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = self
            .entries
            .iter()
            .map(|entry| canonicalize_url(&entry.url))
            .collect();

        let mut added = 0;
        for raw in raw_urls {
            let url = canonicalize_url(raw.as_ref());
            if url.is_empty() || seen.contains(&url) {
                continue;
            }
            seen.insert(url.clone());
            self.entries.push(UrlEntry::new(url));
            added += 1;
        }

        added
    }
}

/// Reads the merge file: one raw URL per line, blank lines ignored
pub fn read_merge_file(path: &Path) -> Result<Vec<String>, UrlListError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Merges the optional merge file into the persisted list and saves it
///
/// # Behavior
///
/// | URL list | Merge file | Result |
/// |----------|------------|--------|
/// | exists   | exists     | list normalized, new URLs appended |
/// | exists   | missing    | list normalized |
/// | missing  | exists     | new list built from the merge file |
/// | missing  | missing    | `UrlListError::Missing` |
///
/// The list is saved whenever it was created or changed.
pub fn merge_url_list(list_path: &Path, merge_path: &Path) -> Result<MergeOutcome, UrlListError> {
    let list_exists = list_path.exists();
    let merge_exists = merge_path.exists();

    if !list_exists && !merge_exists {
        return Err(UrlListError::Missing {
            list: list_path.display().to_string(),
            merge: merge_path.display().to_string(),
        });
    }

    let mut list = if list_exists {
        UrlList::load(list_path)?
    } else {
        tracing::info!(
            "No URL list at {}, creating one from {}",
            list_path.display(),
            merge_path.display()
        );
        UrlList::default()
    };

    let original = list.clone();
    let removed = list.normalize();
    let first_shifted = (removed > 0).then(|| {
        original
            .entries
            .iter()
            .zip(&list.entries)
            .position(|(before, after)| canonicalize_url(&before.url) != after.url)
            .unwrap_or(list.entries.len())
    });
    if let Some(index) = first_shifted {
        tracing::warn!(
            "Removed {} entries from the URL list; pages from index {} moved and their saved images may belong to other URLs",
            removed,
            index
        );
    }

    let (processed, added) = if merge_exists {
        let raw = read_merge_file(merge_path)?;
        let added = list.merge(&raw);
        (raw.len(), added)
    } else {
        tracing::debug!("No merge file at {}", merge_path.display());
        (0, 0)
    };

    if !list_exists || list != original {
        list.save(list_path)?;
    }

    tracing::info!(
        "URL list: {} processed from merge file, {} added, {} duplicates removed, {} total",
        processed,
        added,
        removed,
        list.len()
    );

    Ok(MergeOutcome {
        list,
        processed,
        added,
        removed,
        first_shifted,
    })
}
