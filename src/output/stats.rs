//! Statistics of a finished crawl
//!
//! This module provides functionality for summarizing a crawl result (and the
//! ingestion that followed it) and displaying the numbers.

use crate::crawler::{CrawlResult, Termination};
use crate::ingest::IngestReport;
use crate::url::domain_of;
use std::collections::BTreeMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Number of pages recorded by the crawl
    pub scraped: usize,

    /// Number of pages that failed or were cancelled during the crawl
    pub failed: usize,

    /// Ingestion counts, if ingestion ran
    pub ingested: Option<usize>,
    pub ingest_failed: usize,

    pub elapsed: Duration,

    pub termination: Termination,

    /// Scraped pages per domain key
    pub pages_by_domain: BTreeMap<String, usize>,
}

impl CrawlStatistics {
    /// Computes statistics for a run
    ///
    /// # Arguments
    ///
    /// * `result` - The crawl result
    /// * `report` - The ingestion report, if pages were ingested
    pub fn from_run(result: &CrawlResult, report: Option<&IngestReport>) -> Self {
        let mut pages_by_domain = BTreeMap::new();
        for url in &result.scraped_pages {
            *pages_by_domain.entry(domain_of(url)).or_insert(0) += 1;
        }

        Self {
            scraped: result.scraped_pages.len(),
            failed: result.failed_pages.len(),
            ingested: report.map(|r| r.ingested.len()),
            ingest_failed: report.map_or(0, |r| r.failed.len()),
            elapsed: result.elapsed,
            termination: result.termination,
            pages_by_domain,
        }
    }

    /// Failures across crawl and ingestion
    pub fn total_failed(&self) -> usize {
        self.failed + self.ingest_failed
    }

    /// Number of distinct domains among scraped pages
    pub fn unique_domains(&self) -> usize {
        self.pages_by_domain.len()
    }
}

/// Builds the one-line user-facing summary of a run
///
/// # Examples
///
/// ```
/// use burrow::crawler::{CrawlResult, Termination};
/// use burrow::output::{summary_message, CrawlStatistics};
/// use std::time::Duration;
///
/// let result = CrawlResult {
///     scraped_pages: vec!["https://a.test/".into()],
///     failed_pages: vec![],
///     elapsed: Duration::from_millis(1500),
///     termination: Termination::Exhausted,
/// };
/// let stats = CrawlStatistics::from_run(&result, None);
/// assert_eq!(summary_message(&stats), "1 pages scraped, 0 failed, elapsed 1.50s");
/// ```
pub fn summary_message(stats: &CrawlStatistics) -> String {
    let elapsed = stats.elapsed.as_secs_f64();

    match stats.ingested {
        Some(ingested) => format!(
            "{} of {} pages ingested, {} failed, elapsed {:.2}s",
            ingested,
            stats.scraped,
            stats.total_failed(),
            elapsed
        ),
        None => format!(
            "{} pages scraped, {} failed, elapsed {:.2}s",
            stats.scraped, stats.failed, elapsed
        ),
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages scraped: {}", stats.scraped);
    println!("  Pages failed: {}", stats.failed);
    println!("  Unique domains: {}", stats.unique_domains());
    println!("  Elapsed: {:.2?}", stats.elapsed);
    println!("  Stopped: {}", stats.termination);
    println!();

    if let Some(ingested) = stats.ingested {
        println!("Ingestion:");
        println!("  Ingested: {}", ingested);
        println!("  Rejected: {}", stats.ingest_failed);
        println!();
    }

    if !stats.pages_by_domain.is_empty() {
        println!("Pages by Domain:");
        // Sort domains by count (descending)
        let mut domain_counts: Vec<_> = stats.pages_by_domain.iter().collect();
        domain_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (domain, count) in domain_counts {
            let percentage = (*count as f64 / stats.scraped as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", domain, count, percentage);
        }
        println!();
    }

    println!("{}", summary_message(stats));
}
