//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the engine loop that coordinates one crawl run:
//! - Validating seeds and building the per-run state
//! - Spawning the worker pool
//! - Collecting completions and submitting discovered work
//! - Stopping on exhaustion, page cap or stall, and draining in-flight work

use crate::config::CrawlConfiguration;
use crate::crawler::fetcher::{Fetcher, RichFetcher};
use crate::crawler::scheduler::{Canceller, Scheduler, WorkItem};
use crate::crawler::worker::{run_worker, Completion, VisitOutcome, WorkerContext};
use crate::notify::{Notifier, TracingNotifier};
use crate::state::{CrawlState, EngineState};
use crate::url::parse_seed;
use crate::{BurrowError, Result};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};

/// Why a crawl run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every reachable in-scope page was handled
    Exhausted,
    /// The page cap was reached
    PageLimit,
    /// No work completed within the stall timeout
    Stalled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exhausted => "exhausted",
            Self::PageLimit => "page limit reached",
            Self::Stalled => "stalled",
        };
        write!(f, "{}", s)
    }
}

/// Output of one crawl run
///
/// Early termination still yields a valid result: pages recorded before the
/// stop are kept, and everything that was in flight is listed as failed.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Recorded pages, in completion order
    pub scraped_pages: Vec<String>,

    /// Pages that failed or were cancelled
    pub failed_pages: Vec<String>,

    pub elapsed: Duration,

    pub termination: Termination,
}

impl CrawlResult {
    pub fn scraped_count(&self) -> usize {
        self.scraped_pages.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed_pages.len()
    }
}

/// Main crawler structure
///
/// Holds the immutable configuration and the collaborators of a run. Every
/// call to [`Crawler::run`] builds fresh state, so one `Crawler` can be run
/// repeatedly.
pub struct Crawler {
    config: Arc<CrawlConfiguration>,
    notifier: Arc<dyn Notifier>,
    rich: Option<Arc<dyn RichFetcher>>,
}

impl Crawler {
    /// Creates a crawler that reports progress through `tracing`
    pub fn new(config: CrawlConfiguration) -> Self {
        Self {
            config: Arc::new(config),
            notifier: Arc::new(TracingNotifier),
            rich: None,
        }
    }

    /// Replaces the progress sink
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Registers a rendering backend for rich fetches
    pub fn with_rich_fetcher(mut self, rich: Arc<dyn RichFetcher>) -> Self {
        self.rich = Some(rich);
        self
    }

    pub fn config(&self) -> &CrawlConfiguration {
        &self.config
    }

    /// Runs the crawl to termination
    ///
    /// # Arguments
    ///
    /// * `seeds` - Starting URLs, all visited at depth 0
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The run finished (possibly early)
    /// * `Err(BurrowError::NoValidSeeds)` - No seed was a usable URL
    /// * `Err(BurrowError)` - The worker pool could not be started
    pub async fn run(&self, seeds: &[String]) -> Result<CrawlResult> {
        let seeds = valid_seeds(seeds);
        if seeds.is_empty() {
            return Err(BurrowError::NoValidSeeds);
        }

        let config = Arc::clone(&self.config);
        if config.use_rich_fetch && self.rich.is_none() {
            tracing::warn!("Rich fetch enabled but no rendering backend registered, using plain fetch");
        }

        tracing::info!(
            "Starting crawl: {} seeds, {} workers, max depth {}, max pages {}",
            seeds.len(),
            config.max_workers,
            limit_label(config.max_depth.map(|d| d as usize)),
            limit_label(config.max_pages)
        );

        let start_time = Instant::now();
        let state = Arc::new(CrawlState::new(
            config.max_pages,
            Arc::clone(&self.notifier),
            config.notify_interval,
        ));

        let (mut scheduler, queue) = Scheduler::new();
        let queue = Arc::new(Mutex::new(queue));
        let (results_tx, mut results_rx) = mpsc::unbounded_channel::<Completion>();
        let (canceller, cancel_token) = Canceller::new();

        let context = Arc::new(WorkerContext {
            config: Arc::clone(&config),
            state: Arc::clone(&state),
        });

        let mut workers = Vec::with_capacity(config.max_workers);
        for worker_id in 0..config.max_workers.max(1) {
            let fetcher = match Fetcher::new(&config, self.rich.clone()) {
                Ok(f) => f,
                Err(e) => {
                    canceller.cancel();
                    return Err(e.into());
                }
            };
            workers.push(tokio::spawn(run_worker(
                worker_id,
                Arc::clone(&context),
                fetcher,
                Arc::clone(&queue),
                results_tx.clone(),
                cancel_token.clone(),
            )));
        }
        drop(results_tx);

        for seed in seeds {
            scheduler.submit(WorkItem::new(seed, 0));
        }

        let mut engine_state = EngineState::Running;
        let termination = loop {
            if scheduler.is_empty() {
                if engine_state == EngineState::Draining {
                    break Termination::PageLimit;
                }
                transition(&mut engine_state, EngineState::Exhausted);
                break Termination::Exhausted;
            }

            let completion = match tokio::time::timeout(config.stall_timeout, results_rx.recv()).await
            {
                Ok(Some(completion)) => completion,
                Ok(None) => {
                    tracing::error!("All workers exited with work outstanding");
                    break stall(&mut engine_state);
                }
                Err(_) => {
                    tracing::warn!(
                        "No page completed within {:?}, cancelling {} in-flight items",
                        config.stall_timeout,
                        scheduler.in_flight()
                    );
                    break stall(&mut engine_state);
                }
            };

            if scheduler.complete(completion.id).is_none() {
                continue;
            }

            let url = completion.item.url;
            match completion.outcome {
                VisitOutcome::Completed(discovered) if engine_state.is_stopping() => {
                    if !discovered.is_empty() {
                        tracing::debug!(
                            "Dropping {} links found on {} while draining",
                            discovered.len(),
                            url
                        );
                    }
                }
                VisitOutcome::Completed(discovered) => {
                    for item in discovered {
                        if state.page_limit_reached() {
                            break;
                        }
                        if config.depth_permits(item.depth) {
                            scheduler.submit(item);
                        }
                    }
                }
                VisitOutcome::Skipped => {}
                VisitOutcome::Failed(e) => {
                    tracing::debug!("Recording failure for {}: {}", url, e);
                    state.record_failed(&url);
                }
                VisitOutcome::Cancelled => {
                    tracing::debug!("Visit of {} was refused or cancelled", url);
                    state.record_failed_once(&url);
                }
            }

            // Items that never claimed a slot are refused by the workers;
            // visits that did claim one are allowed to finish.
            if !engine_state.is_stopping() && state.page_limit_reached() {
                tracing::info!(
                    "Reached max pages limit of {}, waiting on {} in-flight items",
                    limit_label(config.max_pages),
                    scheduler.in_flight()
                );
                transition(&mut engine_state, EngineState::Draining);
            }
        };

        canceller.cancel();
        drain_in_flight(&mut scheduler, &state);
        drop(results_rx);
        drop(scheduler);

        for worker in workers {
            worker.await?;
        }

        transition(&mut engine_state, EngineState::Terminated);

        let result = CrawlResult {
            scraped_pages: state.scraped_pages(),
            failed_pages: state.failed_pages(),
            elapsed: start_time.elapsed(),
            termination,
        };

        tracing::info!(
            "Crawl {}: {} pages scraped, {} failed in {:.2?}",
            result.termination,
            result.scraped_count(),
            result.failed_count(),
            result.elapsed
        );

        Ok(result)
    }
}

/// Runs a complete crawl with the default progress sink
///
/// # Example
///
/// ```no_run
/// use burrow::config::{CrawlCommand, CrawlConfiguration, Settings};
/// use burrow::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let command = CrawlCommand::new(vec!["https://example.com".into()], vec![]);
/// let config = CrawlConfiguration::from_command(&Settings::default(), &command);
/// let result = run_crawl(config, &command.seeds).await?;
/// println!("{} pages", result.scraped_pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: CrawlConfiguration, seeds: &[String]) -> Result<CrawlResult> {
    Crawler::new(config).run(seeds).await
}

/// Parses seeds into absolute URLs, dropping invalid ones and duplicates
fn valid_seeds(seeds: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut valid = Vec::new();

    for seed in seeds {
        match parse_seed(seed) {
            Ok(url) => {
                let url = url.to_string();
                if seen.insert(url.clone()) {
                    valid.push(url);
                }
            }
            Err(e) => tracing::warn!("Ignoring seed {}: {}", seed, e),
        }
    }

    valid
}

/// Records every outstanding item as failed
///
/// Items whose page was already recorded, as scraped or as failed, before the
/// cancellation reached them are not added again.
fn drain_in_flight(scheduler: &mut Scheduler, state: &CrawlState) {
    let outstanding = scheduler.drain();
    if outstanding.is_empty() {
        return;
    }

    let scraped: HashSet<String> = state.scraped_pages().into_iter().collect();
    for item in outstanding {
        if !scraped.contains(&item.url) {
            state.record_failed_once(&item.url);
        }
    }
}

/// Moves the engine to `TimedOut` and picks the reported termination
///
/// A stall while draining still ends a run that hit its page cap.
fn stall(engine_state: &mut EngineState) -> Termination {
    let termination = if *engine_state == EngineState::Draining {
        Termination::PageLimit
    } else {
        Termination::Stalled
    };
    transition(engine_state, EngineState::TimedOut);
    termination
}

fn transition(current: &mut EngineState, next: EngineState) {
    if current.can_transition_to(next) {
        tracing::debug!("Engine state: {} -> {}", current, next);
    } else {
        tracing::warn!("Unexpected engine transition: {} -> {}", current, next);
    }
    *current = next;
}

fn limit_label(limit: Option<usize>) -> String {
    limit.map_or_else(|| "unlimited".to_string(), |l| l.to_string())
}
