//! Scheduler for managing the crawl frontier
//!
//! This module handles:
//! - Work items and their dispatch to the worker pool
//! - In-flight bookkeeping (everything submitted and not yet completed)
//! - The cooperative cancellation signal shared by all workers

use std::collections::HashMap;
use tokio::sync::{mpsc, watch};

/// A URL waiting to be visited, with its distance from a seed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    /// The absolute URL to visit
    pub url: String,

    /// Hops from a seed (seeds are depth 0)
    pub depth: u32,
}

impl WorkItem {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }

    /// Creates the item for a link found on this page
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self::new(url, self.depth + 1)
    }
}

/// A work item tagged with its submission id
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub id: u64,
    pub item: WorkItem,
}

/// Frontier of one crawl run
///
/// Tracks every submitted item until its completion is reported. Items are
/// handed to workers over an unbounded channel; the worker pool size bounds
/// how many are actually being visited at once.
pub struct Scheduler {
    next_id: u64,
    in_flight: HashMap<u64, WorkItem>,
    sender: mpsc::UnboundedSender<Dispatch>,
}

impl Scheduler {
    /// Creates a scheduler and the receiving end the workers pull from
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Dispatch>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_id: 0,
            in_flight: HashMap::new(),
            sender,
        };
        (scheduler, receiver)
    }

    /// Submits an item to the worker pool
    ///
    /// Returns false if every worker has exited.
    pub fn submit(&mut self, item: WorkItem) -> bool {
        let id = self.next_id;
        self.next_id += 1;

        tracing::trace!("Submitting {} (depth {}) as #{}", item.url, item.depth, id);
        if self.sender.send(Dispatch { id, item: item.clone() }).is_err() {
            tracing::warn!("No worker left to receive {}", item.url);
            return false;
        }

        self.in_flight.insert(id, item);
        true
    }

    /// Marks a submission as completed and returns its item
    pub fn complete(&mut self, id: u64) -> Option<WorkItem> {
        self.in_flight.remove(&id)
    }

    /// Number of submitted items not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns true if nothing is queued or being visited
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Removes and returns all outstanding items, in submission order
    pub fn drain(&mut self) -> Vec<WorkItem> {
        let mut outstanding: Vec<(u64, WorkItem)> = self.in_flight.drain().collect();
        outstanding.sort_by_key(|(id, _)| *id);
        outstanding.into_iter().map(|(_, item)| item).collect()
    }
}

/// Trigger side of the cancellation signal
#[derive(Debug)]
pub struct Canceller {
    sender: watch::Sender<bool>,
}

/// Observer side of the cancellation signal, one clone per worker
#[derive(Debug, Clone)]
pub struct CancelToken {
    receiver: watch::Receiver<bool>,
}

impl Canceller {
    pub fn new() -> (Self, CancelToken) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, CancelToken { receiver })
    }

    /// Signals every token; idempotent
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once cancellation has been signalled
    ///
    /// A dropped [`Canceller`] counts as cancellation.
    pub async fn cancelled(&mut self) {
        while !*self.receiver.borrow_and_update() {
            if self.receiver.changed().await.is_err() {
                return;
            }
        }
    }
}
