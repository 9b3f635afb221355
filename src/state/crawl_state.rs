//! Shared state of one crawl run
//!
//! Every worker holds an `Arc<CrawlState>`. The visited set, the scraped and
//! failed page logs, the robots cache and the notification timestamp each sit
//! behind their own lock; there is no global lock. All collections only grow.

use crate::notify::Notifier;
use crate::robots::RobotsCache;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Outcome of trying to mark a URL as visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The URL was not visited before and now is; the caller owns the fetch
    Claimed,
    /// Another worker already claimed the URL
    AlreadyVisited,
    /// The visited set is at the page cap; nothing was recorded
    LimitReached,
}

impl Claim {
    pub fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed)
    }
}

/// Mutable state shared by all workers of a single run
pub struct CrawlState {
    visited: Mutex<HashSet<String>>,
    robots: RobotsCache,
    scraped: Mutex<Vec<String>>,
    failed: Mutex<Vec<String>>,
    last_notice: Mutex<Option<Instant>>,
    notifier: Arc<dyn Notifier>,
    notify_interval: Duration,
    max_pages: Option<usize>,
}

impl CrawlState {
    /// Creates fresh state for one run
    ///
    /// # Arguments
    ///
    /// * `max_pages` - Cap on the visited set (`None` = unlimited)
    /// * `notifier` - Sink for throttled progress messages
    /// * `notify_interval` - Minimum spacing between two progress messages
    pub fn new(
        max_pages: Option<usize>,
        notifier: Arc<dyn Notifier>,
        notify_interval: Duration,
    ) -> Self {
        Self {
            visited: Mutex::new(HashSet::new()),
            robots: RobotsCache::new(),
            scraped: Mutex::new(Vec::new()),
            failed: Mutex::new(Vec::new()),
            last_notice: Mutex::new(None),
            notifier,
            notify_interval,
            max_pages,
        }
    }

    /// Atomically tests and sets membership of `url` in the visited set
    ///
    /// This is the single point that guarantees a URL is fetched at most once.
    pub fn claim(&self, url: &str) -> Claim {
        let mut visited = lock(&self.visited);

        if visited.contains(url) {
            return Claim::AlreadyVisited;
        }

        if self.max_pages.map_or(false, |max| visited.len() >= max) {
            return Claim::LimitReached;
        }

        visited.insert(url.to_string());
        Claim::Claimed
    }

    /// Claims `url` and records it as scraped in one step
    ///
    /// Used for pages that are recorded without being fetched here
    /// (fetch-only domains and PDF documents).
    pub fn claim_and_record(&self, url: &str) -> Claim {
        let claim = self.claim(url);
        if claim.is_claimed() {
            self.record_scraped(url);
        }
        claim
    }

    /// Returns true if `url` has been claimed
    pub fn is_visited(&self, url: &str) -> bool {
        lock(&self.visited).contains(url)
    }

    /// Current size of the visited set
    pub fn visited_count(&self) -> usize {
        lock(&self.visited).len()
    }

    /// Returns true if the visited set has reached the page cap
    pub fn page_limit_reached(&self) -> bool {
        self.max_pages
            .map_or(false, |max| self.visited_count() >= max)
    }

    /// Appends a claimed URL to the scraped log and emits throttled progress
    ///
    /// Callers must have claimed `url` first.
    pub fn record_scraped(&self, url: &str) {
        let count = {
            let mut scraped = lock(&self.scraped);
            scraped.push(url.to_string());
            scraped.len()
        };

        if self.should_notify() {
            self.notifier.notify(&format!(
                "Scraped {} pages - Currently scraping: {}",
                count, url
            ));
        }
    }

    /// Appends a URL to the failed log
    pub fn record_failed(&self, url: &str) {
        lock(&self.failed).push(url.to_string());
    }

    /// Appends a URL to the failed log unless it is already there
    ///
    /// Returns true if the URL was added. Refused and cancelled items can
    /// repeat a URL that was discovered more than once.
    pub fn record_failed_once(&self, url: &str) -> bool {
        let mut failed = lock(&self.failed);
        if failed.iter().any(|f| f == url) {
            return false;
        }
        failed.push(url.to_string());
        true
    }

    /// The per-run robots cache
    pub fn robots(&self) -> &RobotsCache {
        &self.robots
    }

    /// Snapshot of the scraped log, in append order
    pub fn scraped_pages(&self) -> Vec<String> {
        lock(&self.scraped).clone()
    }

    /// Snapshot of the failed log, in append order
    pub fn failed_pages(&self) -> Vec<String> {
        lock(&self.failed).clone()
    }

    pub fn scraped_count(&self) -> usize {
        lock(&self.scraped).len()
    }

    /// Best-effort rate limiter for progress messages
    fn should_notify(&self) -> bool {
        let mut last = lock(&self.last_notice);
        let now = Instant::now();

        match *last {
            Some(at) if now.duration_since(at) < self.notify_interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

impl std::fmt::Debug for CrawlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlState")
            .field("visited", &self.visited_count())
            .field("scraped", &self.scraped_count())
            .field("failed", &lock(&self.failed).len())
            .field("robots", &self.robots.len())
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

/// Locks a mutex, recovering from poisoning
///
/// Every protected collection is append-only, so a panic in another holder
/// cannot leave it half-updated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
