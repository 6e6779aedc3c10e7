//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching
//! robots.txt files. Fetching goes through the [`RobotsSource`] seam so the
//! scheduler never talks to the network directly.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{product_token, ParsedRobots};

use crate::crawler::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while obtaining a robots.txt file
#[derive(Debug, Error)]
pub enum RobotsError {
    #[error("Failed to fetch robots.txt for {origin}: {source}")]
    Fetch {
        origin: String,
        source: TransportError,
    },
}

/// Supplies the robots.txt policy of an origin
///
/// A missing robots.txt must be reported as [`ParsedRobots::allow_all`];
/// errors are reserved for fetch failures, which callers also treat as
/// permissive.
#[async_trait]
pub trait RobotsSource: Send + Sync {
    /// Fetches the policy for an origin such as `https://example.com`
    async fn fetch_robots(&self, origin: &str) -> Result<ParsedRobots, RobotsError>;
}

/// Fetches `<origin>/robots.txt` through a [`Transport`]
pub struct TransportRobotsSource<T> {
    transport: Arc<T>,
    user_agent: String,
    timeout: Duration,
}

impl<T: Transport> TransportRobotsSource<T> {
    pub fn new(transport: Arc<T>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            user_agent: user_agent.into(),
            timeout,
        }
    }
}

#[async_trait]
impl<T: Transport> RobotsSource for TransportRobotsSource<T> {
    async fn fetch_robots(&self, origin: &str) -> Result<ParsedRobots, RobotsError> {
        let url = format!("{}/robots.txt", origin.trim_end_matches('/'));
        let headers = HashMap::from([("User-Agent".to_string(), self.user_agent.clone())]);

        let response = self
            .transport
            .fetch(&url, &headers, self.timeout)
            .await
            .map_err(|source| RobotsError::Fetch {
                origin: origin.to_string(),
                source,
            })?;

        if !(200..300).contains(&response.status) {
            tracing::debug!("No robots.txt at {} (HTTP {})", url, response.status);
            return Ok(ParsedRobots::allow_all());
        }

        Ok(ParsedRobots::from_content(&response.text()))
    }
}
