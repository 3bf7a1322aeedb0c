//! URL list module
//!
//! The persisted crawl list (`{"urls": [...]}`), its normalization, and the
//! merge of a plain-text input file into it before each run.

mod entry;
mod store;

pub use entry::{UrlEntry, BAD_TITLE_PREFIX};
pub use store::{merge_url_list, read_merge_file, MergeOutcome, UrlList};

use thiserror::Error;

/// Errors reading or writing the URL list
#[derive(Debug, Error)]
pub enum UrlListError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL list JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Neither URL list {list} nor merge file {merge} exists")]
    Missing { list: String, merge: String },
}
