//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! A domain whose robots.txt cannot be fetched is treated permissively.

mod cache;
mod parser;

pub use cache::{RobotsCache, RobotsPolicy};
pub use parser::ParsedRobots;

use crate::url::domain_of;
use reqwest::{Client, StatusCode};

/// Protocols tried, in order, when fetching robots.txt
const ROBOTS_PROTOCOLS: [&str; 2] = ["https", "http"];

/// Fetches robots.txt for a domain
///
/// Tries `https://{domain}/robots.txt`, then `http://{domain}/robots.txt`.
/// Anything other than a 200 response with a readable body on both attempts
/// yields [`RobotsPolicy::Unavailable`]; failures here are never fatal.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `domain` - The domain key (host, plus port if non-default)
pub async fn fetch_robots(client: &Client, domain: &str) -> RobotsPolicy {
    for protocol in ROBOTS_PROTOCOLS {
        let robots_url = format!("{}://{}/robots.txt", protocol, domain);

        match client.get(&robots_url).send().await {
            Ok(response) if response.status() == StatusCode::OK => match response.text().await {
                Ok(body) => {
                    tracing::info!("Loaded robots.txt for {} from {}", domain, robots_url);
                    return RobotsPolicy::Parsed(ParsedRobots::from_content(&body));
                }
                Err(e) => {
                    tracing::warn!("Failed to read robots.txt from {}: {}", robots_url, e);
                }
            },
            Ok(response) => {
                tracing::debug!(
                    "robots.txt at {} returned HTTP {}",
                    robots_url,
                    response.status()
                );
            }
            Err(e) => {
                tracing::warn!("Failed to load robots.txt from {}: {}", robots_url, e);
            }
        }
    }

    tracing::info!("No accessible robots.txt found for {}, allowing all URLs", domain);
    RobotsPolicy::Unavailable
}

/// Resolves the robots policy for a domain, fetching it on first use
pub async fn policy_for(cache: &RobotsCache, client: &Client, domain: &str) -> RobotsPolicy {
    if let Some(policy) = cache.get(domain) {
        return policy;
    }

    tracing::debug!("Fetching robots.txt for domain: {}", domain);
    let policy = fetch_robots(client, domain).await;
    cache.insert(domain, policy.clone());
    policy
}

/// Checks if a URL may be fetched according to its domain's robots.txt
///
/// # Arguments
///
/// * `cache` - The per-run robots cache
/// * `client` - The HTTP client used on a cache miss
/// * `url` - The absolute URL to check
/// * `user_agent` - The user agent string
///
/// # Returns
///
/// * `true` - If the URL is allowed or no robots.txt is available
/// * `false` - If the URL is disallowed
pub async fn is_allowed(cache: &RobotsCache, client: &Client, url: &str, user_agent: &str) -> bool {
    let domain = domain_of(url);
    policy_for(cache, client, &domain)
        .await
        .is_allowed(url, user_agent)
}
