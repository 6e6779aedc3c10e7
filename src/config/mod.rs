//! Configuration module for Arachnid
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus the canned crawl profiles (stealth, aggressive, layout-only).
//!
//! # Example
//!
//! ```no_run
//! use arachnid::config::load_config;
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("arachnid.toml")).unwrap();
//! config.set_stealth();
//! println!("Crawling as: {}", config.user_agent);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Agent, CrawlerConfig, DelayProfile, DEFAULT_DOCUMENTS};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, config_fingerprint, load_config, load_config_with_hash};
pub use validation::{validate, validate_seed};
