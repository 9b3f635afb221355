//! Hand-off of scraped pages to the ingestion service
//!
//! After a crawl, every scraped URL is submitted to the ingestion service one
//! at a time, in scraped order. A failed submission is reported and the walk
//! continues.

use crate::config::Settings;
use crate::crawler::CrawlResult;
use crate::notify::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while submitting a page for ingestion
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Ingestion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ingestion service answered HTTP {0}")]
    Status(u16),

    #[error("Ingestion rejected: {0}")]
    Rejected(String),
}

/// Identifies one crawl invocation
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,

    /// The command text that started the run
    pub command: String,

    /// True if the run was started by the scheduler
    pub scheduled: bool,
}

impl Session {
    pub fn new(command: impl Into<String>, scheduled: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            command: command.into(),
            scheduled,
        }
    }
}

/// Metadata attached to every ingested page
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngestMetadata {
    pub url: String,
    pub source: String,
    pub session_id: String,
    pub command: String,
    pub scheduled: bool,
}

/// A single page submission
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngestRequest {
    /// The URL the service should load and chunk
    pub source: String,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub metadata: IngestMetadata,
}

impl IngestRequest {
    pub fn new(url: &str, session: &Session, settings: &Settings) -> Self {
        Self {
            source: url.to_string(),
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
            metadata: IngestMetadata {
                url: url.to_string(),
                source: "burrow".to_string(),
                session_id: session.id.to_string(),
                command: session.command.clone(),
                scheduled: session.scheduled,
            },
        }
    }
}

/// Receives pages for ingestion
#[async_trait]
pub trait Ingestor: Send + Sync {
    async fn ingest(&self, request: &IngestRequest) -> Result<(), IngestError>;
}

/// Posts ingestion requests as JSON to an HTTP endpoint
pub struct HttpIngestor {
    client: Client,
    endpoint: String,
}

impl HttpIngestor {
    /// Creates an ingestor for `endpoint`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, IngestError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Ingestor for HttpIngestor {
    async fn ingest(&self, request: &IngestRequest) -> Result<(), IngestError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status(status.as_u16()));
        }

        Ok(())
    }
}

/// Outcome of ingesting the pages of one crawl
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// URLs accepted by the service, in submission order
    pub ingested: Vec<String>,

    /// URLs the service did not accept
    pub failed: Vec<String>,
}

impl IngestReport {
    /// Number of pages submitted
    pub fn attempted(&self) -> usize {
        self.ingested.len() + self.failed.len()
    }
}

/// Submits every scraped page of `result`, sequentially and in order
///
/// Emits "Ingested i/n: url" after each accepted page. Never stops on a
/// single failure.
pub async fn ingest_pages(
    result: &CrawlResult,
    ingestor: &dyn Ingestor,
    notifier: &dyn Notifier,
    session: &Session,
    settings: &Settings,
) -> IngestReport {
    let mut report = IngestReport::default();
    let total = result.scraped_pages.len();

    tracing::info!(
        "Ingesting {} pages for session {}{}",
        total,
        session.id,
        if session.scheduled { " (scheduled)" } else { "" }
    );

    for (index, url) in result.scraped_pages.iter().enumerate() {
        let request = IngestRequest::new(url, session, settings);

        match ingestor.ingest(&request).await {
            Ok(()) => {
                report.ingested.push(url.clone());
                notifier.notify(&format!("Ingested {}/{}: {}", index + 1, total, url));
            }
            Err(e) => {
                tracing::error!("Error ingesting {}: {}", url, e);
                report.failed.push(url.clone());
            }
        }
    }

    report
}
