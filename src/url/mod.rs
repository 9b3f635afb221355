//! URL handling module for Burrow
//!
//! This module provides URL cleaning and validation, domain key extraction,
//! and the domain/path policy that decides what a discovered link is allowed
//! to become.

mod domain;
mod matcher;
mod normalize;

use crate::config::CrawlConfiguration;
use url::Url;

// Re-export main functions
pub use domain::{domain_of, domain_of_url};
pub use matcher::{has_query, has_skipped_extension, is_pdf, matches_path_prefix};
pub use normalize::{clean, is_valid, parse_seed, with_protocol};

/// What the crawler may do with a discovered URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// Root domain, inside the path filter - fetch and follow its links
    Recurse,
    /// Allowed domain - record the page but never follow its links
    FetchOnly,
    /// Out of scope
    Reject,
}

/// Classifies a URL by domain and path
///
/// 1. Root domain → `Recurse`, unless allowed path prefixes are configured
///    and none of them matches the URL path, in which case `Reject`
/// 2. Allowed domain → `FetchOnly`
/// 3. Anything else → `Reject`
///
/// # Examples
///
/// ```
/// use burrow::config::{CrawlCommand, CrawlConfiguration, Settings};
/// use burrow::url::{classify, LinkClass};
/// use url::Url;
///
/// let command = CrawlCommand::new(vec!["https://a.test".into()], vec!["b.test".into()]);
/// let config = CrawlConfiguration::from_command(&Settings::default(), &command);
///
/// let url = Url::parse("https://b.test/p").unwrap();
/// assert_eq!(classify(&url, &config), LinkClass::FetchOnly);
/// ```
pub fn classify(url: &Url, config: &CrawlConfiguration) -> LinkClass {
    let domain = domain_of_url(url);

    if config.root_domains.contains(&domain) {
        if matches_path_prefix(url.path(), &config.allowed_paths) {
            return LinkClass::Recurse;
        }
        return LinkClass::Reject;
    }

    if config.allowed_domains.contains(&domain) {
        return LinkClass::FetchOnly;
    }

    LinkClass::Reject
}

/// Applies the uniform skip rules that hold regardless of classification
///
/// Returns true if the link must be dropped:
/// - the link contains a fragment marker (`#`)
/// - GET parameters are present and `skip_get_params` is set
/// - the lowercased path ends with one of the configured skip extensions
pub fn is_skipped(raw: &str, url: &Url, config: &CrawlConfiguration) -> bool {
    if raw.contains('#') {
        return true;
    }

    if config.skip_get_params && has_query(url) {
        return true;
    }

    has_skipped_extension(url, &config.skip_extensions)
}
