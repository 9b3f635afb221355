//! Per-run robots.txt cache
//!
//! Maps a domain key to its parsed policy, or to `Unavailable` when no
//! robots.txt could be fetched. Concurrent first lookups of the same domain
//! may each fetch; the last one to finish owns the slot.

use crate::robots::ParsedRobots;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Robots policy of one domain
#[derive(Debug, Clone)]
pub enum RobotsPolicy {
    /// robots.txt was fetched and parsed
    Parsed(ParsedRobots),

    /// robots.txt could not be fetched; everything is allowed
    Unavailable,
}

impl RobotsPolicy {
    /// Checks if a URL is allowed under this policy
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self {
            Self::Parsed(robots) => robots.is_allowed(url, user_agent),
            Self::Unavailable => true,
        }
    }

    /// Returns true if no robots.txt was available
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// Memoized robots policies keyed by domain
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, RobotsPolicy>>,
}

impl RobotsCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached policy for a domain, if any
    pub fn get(&self, domain: &str) -> Option<RobotsPolicy> {
        self.lock().get(domain).cloned()
    }

    /// Stores the policy for a domain, replacing any earlier entry
    pub fn insert(&self, domain: &str, policy: RobotsPolicy) {
        self.lock().insert(domain.to_string(), policy);
    }

    /// Number of domains with a cached policy
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RobotsPolicy>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
