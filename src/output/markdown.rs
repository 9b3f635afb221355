//! Markdown summary generation
//!
//! This module generates human-readable markdown reports of crawl results,
//! including statistics, per-domain counts, and the page lists.

use crate::crawler::CrawlResult;
use crate::output::stats::CrawlStatistics;
use crate::Result;
use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Pages listed per section before the list is truncated
const MAX_LISTED_PAGES: usize = 200;

/// Writes a markdown report of a crawl
///
/// # Arguments
///
/// * `stats` - The crawl statistics
/// * `result` - The crawl result whose page lists are included
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(BurrowError::Io)` - Failed to write the file
pub fn generate_markdown_summary(
    stats: &CrawlStatistics,
    result: &CrawlResult,
    output_path: &Path,
) -> Result<()> {
    let markdown = format_markdown_summary(stats, result);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote crawl report to {}", output_path.display());
    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(stats: &CrawlStatistics, result: &CrawlResult) -> String {
    let mut md = String::new();

    md.push_str("# Burrow Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.elapsed.as_secs_f64()
    ));
    md.push_str(&format!("- **Stopped**: {}\n\n", stats.termination));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Scraped**: {}\n", stats.scraped));
    md.push_str(&format!("- **Pages Failed**: {}\n", stats.failed));
    md.push_str(&format!(
        "- **Unique Domains**: {}\n",
        stats.unique_domains()
    ));
    if let Some(ingested) = stats.ingested {
        md.push_str(&format!("- **Pages Ingested**: {}\n", ingested));
        md.push_str(&format!(
            "- **Ingestion Failures**: {}\n",
            stats.ingest_failed
        ));
    }
    md.push('\n');

    // Domain breakdown
    if !stats.pages_by_domain.is_empty() {
        md.push_str("## Pages by Domain\n\n");
        md.push_str("| Domain | Pages |\n");
        md.push_str("|--------|-------|\n");
        for (domain, count) in &stats.pages_by_domain {
            md.push_str(&format!("| {} | {} |\n", domain, count));
        }
        md.push('\n');
    }

    push_page_list(&mut md, "Scraped Pages", &result.scraped_pages);
    push_page_list(&mut md, "Failed Pages", &result.failed_pages);

    md
}

fn push_page_list(md: &mut String, title: &str, pages: &[String]) {
    if pages.is_empty() {
        return;
    }

    md.push_str(&format!("## {}\n\n", title));
    for (index, url) in pages.iter().take(MAX_LISTED_PAGES).enumerate() {
        md.push_str(&format!("{}. {}\n", index + 1, url));
    }
    if pages.len() > MAX_LISTED_PAGES {
        md.push_str(&format!(
            "\n... and {} more\n",
            pages.len() - MAX_LISTED_PAGES
        ));
    }
    md.push('\n');
}
