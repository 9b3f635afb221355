//! HTML parser for extracting links
//!
//! This module handles parsing fetched HTML to extract:
//! - Anchor links, resolved against the page URL
//! - The page title, for logging

use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All anchor links found on the page (absolute URLs, document order)
    pub links: Vec<String>,
}

/// Parses HTML content and extracts the title and anchor links
///
/// # Link Extraction Rules
///
/// - Only `<a href="...">` elements are read
/// - Missing or empty `href` attributes are skipped silently
/// - Relative hrefs are resolved against `base_url`; absolute ones pass through
/// - Links that do not resolve to HTTP(S) (`javascript:`, `mailto:`, ...) are dropped
/// - Fragments are kept; the domain policy decides what to do with them
///
/// # Example
///
/// ```
/// use burrow::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page"]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: collect_links(&document, base_url),
    }
}

/// Extracts anchor links from HTML, resolved against `base_url`
///
/// # Arguments
///
/// * `html` - The HTML content
/// * `base_url` - The URL of the page the HTML came from
///
/// # Returns
///
/// The absolute URLs of all anchors, in document order
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    collect_links(&Html::parse_document(html), base_url)
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn collect_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Absolute hrefs go through the same join, so they come out in the
/// canonical form used as the visited key (`http://host` becomes `http://host/`).
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
