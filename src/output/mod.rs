//! Output module for persisted images and run reporting
//!
//! This module handles:
//! - Writing accepted images under `{page_index}_{slot}` names
//! - Computing the resume marker from existing output
//! - Recording and printing the run summary

mod store;
pub mod stats;

pub use stats::{print_summary, RunSummary};
pub use store::{parse_page_index, OutputStore, PageWrite};
