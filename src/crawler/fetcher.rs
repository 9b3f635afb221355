//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the per-worker HTTP client with the browser-like user agent
//! - GET requests and Content-Type / Content-Disposition inspection
//! - The optional rich (rendering) fetch strategy and its fallback chain
//! - Error classification

use crate::config::CrawlConfiguration;
use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Suffixes that never go through the rich fetch strategy
const NON_HTML_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".ppt", ".pptx", ".xlsx", ".csv", ".txt", ".json", ".mp4",
];

/// Errors raised while fetching a single page
///
/// None of these abort the crawl; the page is recorded as failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Rendering failed: {0}")]
    Render(String),
}

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Content-Type header value (empty if absent)
    pub content_type: String,

    /// True if Content-Disposition marks the response as an attachment
    pub is_attachment: bool,

    pub body: String,
}

impl FetchedPage {
    /// Returns true if the Content-Type says HTML
    pub fn is_html(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("text/html")
    }

    /// Returns true if links should be extracted from this page
    pub fn is_link_source(&self) -> bool {
        self.is_html() && !self.is_attachment
    }

    fn rendered(body: String) -> Self {
        Self {
            content_type: "text/html".to_string(),
            is_attachment: false,
            body,
        }
    }
}

/// A rendering backend for pages that build their content client-side
///
/// An `Ok` with an empty body means the backend ran into a forced download;
/// callers fall back to a plain fetch in that case.
#[async_trait]
pub trait RichFetcher: Send + Sync {
    /// Renders `url` and returns the resulting HTML
    ///
    /// `wait` asks the backend to let scripts run for that long before
    /// capturing the document.
    async fn render(&self, url: &str, wait: Option<Duration>) -> Result<String, FetchError>;
}

/// Builds the HTTP client owned by one worker
///
/// # Arguments
///
/// * `config` - The crawl configuration (user agent and per-page timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlConfiguration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.page_timeout)
        .connect_timeout(config.page_timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Per-worker fetch strategy
///
/// Owns one connection-reusable client for the worker's lifetime and an
/// optional handle to the shared rendering backend.
pub struct Fetcher {
    client: Client,
    rich: Option<Arc<dyn RichFetcher>>,
    use_rich_fetch: bool,
    skip_extensions: Vec<String>,
}

impl Fetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new(
        config: &CrawlConfiguration,
        rich: Option<Arc<dyn RichFetcher>>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            rich,
            use_rich_fetch: config.use_rich_fetch,
            skip_extensions: config.skip_extensions.clone(),
        })
    }

    /// The worker's HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns true if a rendering backend is registered
    pub fn has_rich_backend(&self) -> bool {
        self.rich.is_some()
    }

    /// Fetches a page with the configured strategy
    ///
    /// # Strategy
    ///
    /// 1. If rich fetch is enabled, a backend is registered and the URL does
    ///    not look like a non-HTML document, render it
    /// 2. If rendering fails or returns an empty body, fall back to GET
    /// 3. Otherwise GET directly
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        if self.use_rich_fetch && !self.looks_non_html(url) {
            if let Some(rich) = &self.rich {
                match rich.render(url, None).await {
                    Ok(body) if !body.is_empty() => return Ok(FetchedPage::rendered(body)),
                    Ok(_) => {
                        tracing::debug!("Rich fetch of {} returned no body, falling back", url);
                    }
                    Err(e) => {
                        tracing::warn!("Rich fetch of {} failed, falling back: {}", url, e);
                    }
                }
            }
        }

        self.fetch_plain(url).await
    }

    /// Renders a page once more, letting scripts run for `wait`
    ///
    /// Used when a fetched HTML page yielded no links. Returns `None` if no
    /// backend is registered or rendering produced nothing.
    pub async fn render_with_wait(&self, url: &str, wait: Duration) -> Option<String> {
        let rich = self.rich.as_ref()?;

        match rich.render(url, Some(wait)).await {
            Ok(body) if !body.is_empty() => Some(body),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Rendering retry of {} failed: {}", url, e);
                None
            }
        }
    }

    /// Plain GET with header inspection
    ///
    /// Non-2xx responses are reported as [`FetchError::Status`].
    pub async fn fetch_plain(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if response.url().as_str() != url {
            tracing::debug!("{} redirected to {}", url, response.url());
        }
        let content_type = header_value(&response, CONTENT_TYPE);
        let is_attachment = header_value(&response, CONTENT_DISPOSITION)
            .to_ascii_lowercase()
            .contains("attachment");

        let bytes = response.bytes().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage {
            content_type,
            is_attachment,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    fn looks_non_html(&self, url: &str) -> bool {
        let path = Url::parse(url)
            .map(|u| u.path().to_ascii_lowercase())
            .unwrap_or_else(|_| url.to_ascii_lowercase());

        NON_HTML_EXTENSIONS
            .iter()
            .copied()
            .chain(self.skip_extensions.iter().map(String::as_str))
            .any(|ext| path.ends_with(ext))
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedRenderer {
        body: String,
        calls: AtomicUsize,
    }

    impl FixedRenderer {
        fn new(body: &str) -> Self {
            Self {
                body: body.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RichFetcher for FixedRenderer {
        async fn render(&self, _url: &str, _wait: Option<Duration>) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    struct BrokenRenderer;

    #[async_trait]
    impl RichFetcher for BrokenRenderer {
        async fn render(&self, url: &str, _wait: Option<Duration>) -> Result<String, FetchError> {
            Err(FetchError::Render(format!("no browser for {}", url)))
        }
    }

    fn rich_config() -> CrawlConfiguration {
        CrawlConfiguration {
            use_rich_fetch: true,
            ..CrawlConfiguration::default()
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = CrawlConfiguration::default();
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_is_html() {
        let page = FetchedPage {
            content_type: "Text/HTML; charset=utf-8".to_string(),
            is_attachment: false,
            body: String::new(),
        };
        assert!(page.is_html());
        assert!(page.is_link_source());

        let attachment = FetchedPage {
            is_attachment: true,
            ..page
        };
        assert!(attachment.is_html());
        assert!(!attachment.is_link_source());
    }

    #[tokio::test]
    async fn test_plain_fetch_reads_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("payload", "application/octet-stream")
                    .insert_header("content-disposition", "attachment; filename=doc.bin"),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&CrawlConfiguration::default(), None).unwrap();
        let page = fetcher.fetch(&format!("{}/doc", server.uri())).await.unwrap();

        assert_eq!(page.content_type, "application/octet-stream");
        assert!(!page.is_html());
        assert!(page.is_attachment);
        assert_eq!(page.body, "payload");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&CrawlConfiguration::default(), None).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.uri())).await;

        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_rich_fetch_used_when_enabled() {
        let renderer = Arc::new(FixedRenderer::new("<a href=\"/x\">x</a>"));
        let fetcher = Fetcher::new(&rich_config(), Some(renderer.clone())).unwrap();

        let page = fetcher.fetch("http://127.0.0.1:9/page").await.unwrap();

        assert!(page.is_html());
        assert_eq!(page.body, "<a href=\"/x\">x</a>");
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rich_fetch_skipped_for_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file.pdf"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("%PDF", "application/pdf"),
            )
            .mount(&server)
            .await;

        let renderer = Arc::new(FixedRenderer::new("<html></html>"));
        let fetcher = Fetcher::new(&rich_config(), Some(renderer.clone())).unwrap();
        let page = fetcher
            .fetch(&format!("{}/file.pdf", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.content_type, "application/pdf");
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rich_fetch_falls_back_on_error_and_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<p>plain</p>", "text/html"),
            )
            .mount(&server)
            .await;
        let url = format!("{}/page", server.uri());

        let broken = Fetcher::new(&rich_config(), Some(Arc::new(BrokenRenderer))).unwrap();
        let page = broken.fetch(&url).await.unwrap();
        assert!(page.is_html());
        assert_eq!(page.body, "<p>plain</p>");

        let empty = Fetcher::new(&rich_config(), Some(Arc::new(FixedRenderer::new("")))).unwrap();
        assert_eq!(empty.fetch(&url).await.unwrap().body, "<p>plain</p>");
    }

    #[tokio::test]
    async fn test_render_with_wait_without_backend() {
        let fetcher = Fetcher::new(&CrawlConfiguration::default(), None).unwrap();
        assert!(!fetcher.has_rich_backend());
        assert!(fetcher
            .render_with_wait("https://a.test/", Duration::from_secs(1))
            .await
            .is_none());
    }
}
