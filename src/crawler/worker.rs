//! Worker tasks and the visit procedure
//!
//! A worker pulls one work item at a time, visits it to completion and
//! reports the outcome to the coordinator. Each worker owns its own
//! [`Fetcher`] (and thereby its own HTTP client); all workers share the
//! [`CrawlState`].

use crate::config::CrawlConfiguration;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::parser::{extract_links, parse_html};
use crate::crawler::scheduler::{CancelToken, Dispatch, WorkItem};
use crate::robots;
use crate::state::{Claim, CrawlState};
use crate::url::{classify, is_pdf, is_skipped, LinkClass};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use url::Url;

/// How a single visit ended
#[derive(Debug)]
pub enum VisitOutcome {
    /// The page was handled; these items were discovered for recursion
    Completed(Vec<WorkItem>),
    /// Nothing to do: already visited, or disallowed by robots.txt
    Skipped,
    /// The fetch failed
    Failed(FetchError),
    /// The visit was refused by the page cap or interrupted
    Cancelled,
}

/// A visit outcome reported back to the coordinator
#[derive(Debug)]
pub struct Completion {
    pub id: u64,
    pub item: WorkItem,
    pub outcome: VisitOutcome,
}

/// State shared by all workers of a run
pub struct WorkerContext {
    pub config: Arc<CrawlConfiguration>,
    pub state: Arc<CrawlState>,
}

/// Runs one worker until the queue closes or the run is cancelled
pub async fn run_worker(
    worker_id: usize,
    context: Arc<WorkerContext>,
    fetcher: Fetcher,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<Dispatch>>>,
    results: mpsc::UnboundedSender<Completion>,
    mut cancel: CancelToken,
) {
    tracing::debug!("Worker {} started", worker_id);

    loop {
        let next = {
            let mut queue = queue.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                dispatch = queue.recv() => dispatch,
            }
        };

        let Some(Dispatch { id, item }) = next else {
            break;
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => VisitOutcome::Cancelled,
            outcome = visit(&context, &fetcher, &item) => outcome,
        };

        if results.send(Completion { id, item, outcome }).is_err() {
            break;
        }
    }

    tracing::debug!("Worker {} stopped", worker_id);
}

/// Visits one work item
///
/// 1. Claims the URL in the visited set (at most one visit per URL)
/// 2. Checks robots.txt when enabled
/// 3. Fetches the page and records it as scraped
/// 4. For HTML pages that are not attachments, extracts and filters links;
///    fetch-only and PDF links are recorded directly, recursive links are
///    returned as new items
/// 5. If no links came out, optionally re-renders once and extracts again
pub async fn visit(context: &WorkerContext, fetcher: &Fetcher, item: &WorkItem) -> VisitOutcome {
    let config = context.config.as_ref();
    let state = context.state.as_ref();

    match state.claim(&item.url) {
        Claim::Claimed => {}
        Claim::AlreadyVisited => return VisitOutcome::Skipped,
        Claim::LimitReached => return VisitOutcome::Cancelled,
    }

    if config.follow_robots_txt
        && !robots::is_allowed(state.robots(), fetcher.client(), &item.url, &config.user_agent)
            .await
    {
        tracing::info!("Page blocked by robots.txt, skipping: {}", item.url);
        return VisitOutcome::Skipped;
    }

    let page = match fetcher.fetch(&item.url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("Page crawl failed: {} - {}", item.url, e);
            return VisitOutcome::Failed(e);
        }
    };

    state.record_scraped(&item.url);

    if !page.is_link_source() {
        tracing::debug!(
            "Not following links of {} ({}{})",
            item.url,
            page.content_type,
            if page.is_attachment { ", attachment" } else { "" }
        );
        return VisitOutcome::Completed(Vec::new());
    }

    let Ok(base) = Url::parse(&item.url) else {
        return VisitOutcome::Completed(Vec::new());
    };

    let parsed = parse_html(&page.body, &base);
    tracing::debug!(
        "Fetched {} ({})",
        item.url,
        parsed.title.as_deref().unwrap_or("untitled")
    );
    let mut links = parsed.links;

    if links.is_empty() && should_retry_render(config, fetcher, item) {
        tracing::debug!("No links on {}, rendering again", item.url);
        if let Some(body) = fetcher.render_with_wait(&item.url, config.render_wait).await {
            links = extract_links(&body, &base);
        }
    }

    let discovered = process_links(context, fetcher, item, links).await;
    tracing::debug!(
        "Visited {} (depth {}): {} new items",
        item.url,
        item.depth,
        discovered.len()
    );

    VisitOutcome::Completed(discovered)
}

fn should_retry_render(config: &CrawlConfiguration, fetcher: &Fetcher, item: &WorkItem) -> bool {
    config.rich_fetch_fallback
        && fetcher.has_rich_backend()
        && config.max_depth.map_or(true, |max| item.depth < max)
}

/// Filters discovered links and routes them by classification
async fn process_links(
    context: &WorkerContext,
    fetcher: &Fetcher,
    item: &WorkItem,
    links: Vec<String>,
) -> Vec<WorkItem> {
    let config = context.config.as_ref();
    let state = context.state.as_ref();
    let mut discovered = Vec::new();

    for link in links {
        let Ok(url) = Url::parse(&link) else {
            continue;
        };

        let class = classify(&url, config);
        if class == LinkClass::Reject {
            tracing::trace!("Rejected {}", link);
            continue;
        }

        if config.follow_robots_txt
            && !robots::is_allowed(state.robots(), fetcher.client(), &link, &config.user_agent)
                .await
        {
            tracing::debug!("URL blocked by robots.txt: {}", link);
            continue;
        }

        if is_skipped(&link, &url, config) {
            continue;
        }

        if is_pdf(&url) {
            if config.ingest_pdf && state.claim_and_record(&link).is_claimed() {
                tracing::debug!("Recorded PDF {}", link);
            }
            continue;
        }

        match class {
            LinkClass::Recurse => {
                let child = item.child(link);
                if config.depth_permits(child.depth)
                    && !state.is_visited(&child.url)
                    && !discovered.contains(&child)
                {
                    discovered.push(child);
                }
            }
            LinkClass::FetchOnly => {
                if state.claim_and_record(&link).is_claimed() {
                    tracing::debug!("Recorded fetch-only page {}", link);
                }
            }
            LinkClass::Reject => {}
        }
    }

    discovered
}
