/// Engine-level state definitions for tracking a crawl run
///
/// This module defines the lifecycle of the crawl engine's main loop.
use std::fmt;

/// Represents the current state of the crawl engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    // ===== Active State =====
    /// Work is being submitted and completions are being collected
    Running,

    // ===== Stopping States =====
    /// The page cap was hit; claimed visits finish, everything else is refused
    Draining,

    /// No work completed within the wait window; in-flight work is being cancelled
    TimedOut,

    /// The frontier emptied and all work finished
    Exhausted,

    // ===== Final State =====
    /// The run is over and its result has been produced
    Terminated,
}

impl EngineState {
    /// Returns true if the engine no longer accepts new work
    pub fn is_stopping(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// `Running` may move to any stopping state. `Draining` may still time
    /// out; otherwise a stopping state may only move to `Terminated`.
    pub fn can_transition_to(&self, next: EngineState) -> bool {
        match (self, next) {
            (Self::Running, Self::Draining | Self::TimedOut | Self::Exhausted) => true,
            (Self::Draining, Self::TimedOut) => true,
            (Self::Draining | Self::TimedOut | Self::Exhausted, Self::Terminated) => true,
            _ => false,
        }
    }

    /// Returns the lowercase name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::TimedOut => "timed_out",
            Self::Exhausted => "exhausted",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
