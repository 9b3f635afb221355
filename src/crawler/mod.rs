//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with an optional rendering strategy
//! - HTML parsing and link extraction
//! - The frontier and the worker pool
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod worker;

pub use coordinator::{run_crawl, CrawlResult, Crawler, Termination};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, RichFetcher};
pub use parser::{extract_links, parse_html, ParsedPage};
pub use scheduler::{CancelToken, Canceller, WorkItem};
pub use worker::VisitOutcome;
