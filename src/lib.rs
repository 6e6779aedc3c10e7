//! Arachnid: a single-domain reconnaissance crawler
//!
//! This crate crawls one target domain (optionally its subdomains), follows
//! links and word-list fuzz candidates while respecting scope, robots.txt and
//! politeness delays, and aggregates emails, phone numbers, social handles,
//! documents and custom matches into a per-domain report.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fuzz;
pub mod output;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for Arachnid operations
#[derive(Debug, Error)]
pub enum ArachnidError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Transport error: {0}")]
    Transport(#[from] crawler::TransportError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Robots.txt error: {0}")]
    Robots(#[from] robots::RobotsError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] extract::ExtractionError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Word list error: {0}")]
    Fuzz(#[from] fuzz::FuzzError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Arachnid operations
pub type Result<T> = std::result::Result<T, ArachnidError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlerConfig;
pub use crawler::{Crawler, Scheduler};
pub use output::DomainData;
pub use url::{in_scope, registrable_domain, CrawlUrl};
