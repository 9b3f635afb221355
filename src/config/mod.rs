//! Configuration module for Burrow
//!
//! This module handles loading, parsing, and validating TOML settings, parsing
//! crawl commands, and building the immutable per-run [`CrawlConfiguration`].
//!
//! # Example
//!
//! ```no_run
//! use burrow::config::{load_config, parse_command, CrawlConfiguration, DEFAULT_PREFIX};
//! use std::path::Path;
//!
//! let settings = load_config(Path::new("burrow.toml")).unwrap();
//! let command = parse_command("burrow example.com", DEFAULT_PREFIX).unwrap();
//! let config = CrawlConfiguration::from_command(&settings, &command);
//! println!("Crawler will use max depth: {:?}", config.max_depth);
//! ```

mod command;
mod crawl;
mod parser;
mod types;
mod validation;

// Re-export types
pub use command::{parse_command, CrawlCommand, DEFAULT_PREFIX};
pub use crawl::CrawlConfiguration;
pub use types::{IngestSettings, Settings, DEFAULT_SKIP_EXTENSIONS, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
