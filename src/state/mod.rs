//! State module for tracking crawl progress
//!
//! Each page of the URL list moves through a small lifecycle while the
//! driver renders it, harvests its images and writes them out.

mod page_state;

pub use page_state::{PageProgress, PageState};
