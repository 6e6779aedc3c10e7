//! Per-domain crawl accumulator
//!
//! [`DomainData`] collects everything a crawl finds. It is append-only and
//! has an explicit lifecycle: appends are accepted only between `start()`
//! and `end()`, and each of those may be called exactly once.

use crate::config::{config_fingerprint, CrawlerConfig};
use crate::extract::DocumentRecord;
use crate::output::{OutputError, OutputResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Metadata recorded for every fetched HTML page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub path: String,
    pub extension: Option<String>,
    pub title: String,

    /// Occurrences of the configured custom string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_string_occurrences: Option<usize>,

    /// Generated from a fuzz word list rather than discovered
    pub on_fuzz_list: bool,

    /// Disallowed by the site's robots.txt
    pub on_robots: bool,

    /// HTTP status code
    pub code: u16,
}

/// Where a [`DomainData`] is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Pending,
    Running,
    Finished,
}

/// Counts of everything collected so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainStats {
    pub hosts: usize,
    pub pages: usize,
    pub documents: usize,
    pub emails: usize,
    pub phones: usize,
    pub socials: usize,
    pub custom_matches: usize,
}

/// Everything discovered while crawling one domain
#[derive(Debug, Clone, Serialize)]
pub struct DomainData {
    domain: String,
    status: CrawlStatus,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<CrawlerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    config_fingerprint: Option<String>,

    /// Page records grouped by netloc
    pages: BTreeMap<String, Vec<PageRecord>>,

    /// Document records grouped by netloc
    documents: BTreeMap<String, Vec<DocumentRecord>>,

    emails: BTreeSet<String>,
    phones: BTreeSet<String>,
    socials: BTreeSet<String>,
    custom_matches: BTreeSet<String>,
}

impl DomainData {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            status: CrawlStatus::Pending,
            started_at: None,
            finished_at: None,
            config: None,
            config_fingerprint: None,
            pages: BTreeMap::new(),
            documents: BTreeMap::new(),
            emails: BTreeSet::new(),
            phones: BTreeSet::new(),
            socials: BTreeSet::new(),
            custom_matches: BTreeSet::new(),
        }
    }

    /// Opens the accumulator for appends and records the start time
    pub fn start(&mut self) -> OutputResult<()> {
        match self.status {
            CrawlStatus::Pending => {
                self.status = CrawlStatus::Running;
                self.started_at = Some(Utc::now());
                Ok(())
            }
            CrawlStatus::Running => Err(OutputError::AlreadyStarted),
            CrawlStatus::Finished => Err(OutputError::AlreadyFinished),
        }
    }

    /// Closes the accumulator and records the end time
    pub fn end(&mut self) -> OutputResult<()> {
        match self.status {
            CrawlStatus::Running => {
                self.status = CrawlStatus::Finished;
                self.finished_at = Some(Utc::now());
                Ok(())
            }
            CrawlStatus::Pending => Err(OutputError::NotStarted),
            CrawlStatus::Finished => Err(OutputError::AlreadyFinished),
        }
    }

    /// Records the effective configuration and its fingerprint
    ///
    /// Allowed any time before `end()`.
    pub fn add_config(&mut self, config: &CrawlerConfig) -> OutputResult<()> {
        if self.status == CrawlStatus::Finished {
            return Err(OutputError::AlreadyFinished);
        }
        self.config_fingerprint = Some(config_fingerprint(config));
        self.config = Some(config.clone());
        Ok(())
    }

    pub fn add_page(&mut self, netloc: &str, page: PageRecord) -> OutputResult<()> {
        self.ensure_running()?;
        self.pages.entry(netloc.to_string()).or_default().push(page);
        Ok(())
    }

    pub fn add_document(&mut self, netloc: &str, document: DocumentRecord) -> OutputResult<()> {
        self.ensure_running()?;
        self.documents
            .entry(netloc.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    pub fn add_email(&mut self, email: &str) -> OutputResult<()> {
        self.ensure_running()?;
        self.emails.insert(email.to_string());
        Ok(())
    }

    pub fn add_phone(&mut self, phone: &str) -> OutputResult<()> {
        self.ensure_running()?;
        self.phones.insert(phone.to_string());
        Ok(())
    }

    pub fn add_social(&mut self, social: &str) -> OutputResult<()> {
        self.ensure_running()?;
        self.socials.insert(social.to_string());
        Ok(())
    }

    pub fn add_custom_match(&mut self, custom: &str) -> OutputResult<()> {
        self.ensure_running()?;
        self.custom_matches.insert(custom.to_string());
        Ok(())
    }

    /// Renders the accumulator as JSON
    pub fn dumps(&self, pretty: bool) -> OutputResult<String> {
        let rendered = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(rendered)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn status(&self) -> CrawlStatus {
        self.status
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn config_fingerprint(&self) -> Option<&str> {
        self.config_fingerprint.as_deref()
    }

    pub fn pages(&self) -> &BTreeMap<String, Vec<PageRecord>> {
        &self.pages
    }

    pub fn documents(&self) -> &BTreeMap<String, Vec<DocumentRecord>> {
        &self.documents
    }

    pub fn emails(&self) -> &BTreeSet<String> {
        &self.emails
    }

    pub fn phones(&self) -> &BTreeSet<String> {
        &self.phones
    }

    pub fn socials(&self) -> &BTreeSet<String> {
        &self.socials
    }

    pub fn custom_matches(&self) -> &BTreeSet<String> {
        &self.custom_matches
    }

    pub fn stats(&self) -> DomainStats {
        let hosts: BTreeSet<&String> = self.pages.keys().chain(self.documents.keys()).collect();
        DomainStats {
            hosts: hosts.len(),
            pages: self.pages.values().map(Vec::len).sum(),
            documents: self.documents.values().map(Vec::len).sum(),
            emails: self.emails.len(),
            phones: self.phones.len(),
            socials: self.socials.len(),
            custom_matches: self.custom_matches.len(),
        }
    }

    /// Crawl duration, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }

    fn ensure_running(&self) -> OutputResult<()> {
        match self.status {
            CrawlStatus::Running => Ok(()),
            CrawlStatus::Pending => Err(OutputError::NotStarted),
            CrawlStatus::Finished => Err(OutputError::AlreadyFinished),
        }
    }
}
