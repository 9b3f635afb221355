//! Output module for generating crawl summaries and reports
//!
//! This module handles:
//! - Computing statistics of a finished run
//! - The one-line user-facing summary
//! - Generating markdown reports of crawl results

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, summary_message, CrawlStatistics};
