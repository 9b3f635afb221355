//! Progress notification sinks
//!
//! Notifications are user-facing progress strings. They are fire-and-forget:
//! a notifier never reports failure back to the crawler, and dropped messages
//! are acceptable.

use std::sync::{Mutex, PoisonError};

/// Receives progress messages
pub trait Notifier: Send + Sync {
    /// Delivers a message, best-effort
    fn notify(&self, message: &str);
}

/// Forwards notifications to the `tracing` subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(target: "burrow::progress", "{}", message);
    }
}

/// Discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &str) {}
}

/// Keeps every notification in memory
///
/// Useful when the caller wants to replay progress after the fact.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all messages received so far
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
