//! URL model for Arachnid
//!
//! This module provides URL resolution and canonicalization, the dedup-aware
//! [`CrawlUrl`] type, crawl-scope checks and blacklist matching.

mod crawl_url;
mod domain;
mod matcher;
mod normalize;

pub use crawl_url::CrawlUrl;
pub use domain::{extract_domain, in_scope, registrable_domain};
pub use matcher::{in_directory, matches_wildcard, Blacklist};
pub use normalize::{extension_of, last_segment, resolve_url};
