//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use custody_statement::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Reports land in: {}", config.crawl.downloaded_folder.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlOptions, RetryConfig, SessionConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
