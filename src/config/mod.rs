//! Configuration module for Hero-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every table and key has a default, so running without a file is equivalent
//! to loading an empty one.
//!
//! # Example
//!
//! ```no_run
//! use hero_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Images per page: {}", config.harvest.max_images);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, FetchConfig, HarvestConfig, PathsConfig, DEFAULT_BROWSER_USER_AGENT,
    DEFAULT_FETCH_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
