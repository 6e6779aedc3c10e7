//! Crawler module for fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - The HTTP transport seam and its reqwest implementation
//! - The frontier scheduler (dedup, scope, robots, fuzzing)
//! - Politeness delay sampling
//! - The crawl cycle state machine

mod coordinator;
mod delay;
mod fetcher;
mod scheduler;

pub use coordinator::{crawl, CrawlState, Crawler};
pub use delay::{delay_from_secs, effective_delay, DelaySampler, MAX_DELAY_SECS};
pub use fetcher::{
    build_http_client, warn_on_status, FetchResponse, ReqwestTransport, Transport, TransportError,
};
pub use scheduler::{Scheduler, SchedulerOptions};
