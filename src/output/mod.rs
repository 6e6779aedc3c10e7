//! Output module for crawl results
//!
//! This module handles:
//! - Accumulating pages, documents and signals per domain ([`DomainData`])
//! - Rendering the accumulator as JSON
//! - Generating markdown summaries of crawl results

mod domain_data;
mod markdown;

pub use domain_data::{CrawlStatus, DomainData, DomainStats, PageRecord};
pub use markdown::{format_markdown_summary, generate_markdown_summary};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Crawl output has not been started")]
    NotStarted,

    #[error("Crawl output was already started")]
    AlreadyStarted,

    #[error("Crawl output is already finished")]
    AlreadyFinished,

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
