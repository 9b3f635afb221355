//! State module for tracking crawl progress
//!
//! This module provides the state shared by the workers of one crawl run and
//! the lifecycle of the engine that drives them.
//!
//! # Components
//!
//! - `CrawlState`: visited set, scraped/failed logs, robots cache, progress throttle
//! - `EngineState`: lifecycle of the engine's main loop (running, draining, timed out, ...)

mod crawl_state;
mod engine_state;

// Re-export main types
pub use crawl_state::{Claim, CrawlState};
pub use engine_state::EngineState;
