//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl cycle that ties everything together:
//! - Asking the scheduler for the next URL
//! - Fetching it through the transport
//! - Dispatching the body to the extraction engine
//! - Feeding discovered links back into the frontier
//! - Appending signals to the domain accumulator
//! - Sleeping for the politeness delay
//!
//! No failure inside a cycle is fatal; only an exhausted frontier (or an
//! explicit shutdown through [`Crawler::run_until`]) ends the crawl.

use crate::config::{validate, validate_seed, CrawlerConfig};
use crate::crawler::delay::{effective_delay, DelaySampler};
use crate::crawler::fetcher::{warn_on_status, ReqwestTransport, Transport};
use crate::crawler::scheduler::{Scheduler, SchedulerOptions};
use crate::extract::{extract, Extraction, ExtractionResult, ExtractionSettings};
use crate::fuzz::FuzzingOptions;
use crate::output::{DomainData, OutputResult, PageRecord};
use crate::robots::{RobotsSource, TransportRobotsSource};
use crate::url::CrawlUrl;
use crate::ArachnidError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

/// How a crawl cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Finished,
    Interrupted,
}

/// Where the crawler is within a crawl cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Ready,
    Fetching,
    Extracting,
    UpdatingFrontier,
    Delaying,
    Finished,
}

/// Single-domain crawler
///
/// One fetch is in flight at a time. Frontier and accumulator updates happen
/// only after a fetch completes, so dropping a pending `crawl_next` future
/// leaves no partial page behind.
pub struct Crawler<T> {
    config: CrawlerConfig,
    settings: ExtractionSettings,
    scheduler: Scheduler,
    transport: Arc<T>,
    output: DomainData,
    sampler: DelaySampler,
    state: CrawlState,
    pages_crawled: usize,
    started: Instant,
}

impl<T: Transport + 'static> Crawler<T> {
    /// Creates a crawler for `seed`, fetching robots.txt through the same
    /// transport as pages
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute http(s) URL the crawl starts from
    /// * `config` - The crawler configuration
    /// * `transport` - The HTTP transport
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl, with the accumulator started
    /// * `Err(ArachnidError)` - Invalid seed or configuration, or an unreadable word list
    pub async fn new(seed: &str, config: CrawlerConfig, transport: Arc<T>) -> Result<Self, ArachnidError> {
        let robots: Arc<dyn RobotsSource> = Arc::new(TransportRobotsSource::new(
            Arc::clone(&transport),
            config.user_agent.clone(),
            config.timeout(),
        ));
        Self::with_robots_source(seed, config, transport, robots).await
    }

    /// Creates a crawler with an explicit robots.txt source
    pub async fn with_robots_source(
        seed: &str,
        config: CrawlerConfig,
        transport: Arc<T>,
        robots: Arc<dyn RobotsSource>,
    ) -> Result<Self, ArachnidError> {
        validate(&config)?;
        let seed_url = validate_seed(seed)?;
        let seed = CrawlUrl::parse(seed_url.as_str(), config.allow_query)?;

        let fuzzing = FuzzingOptions::from_config(&config)?;
        let scheduler =
            Scheduler::new(seed.clone(), SchedulerOptions::from_config(&config), fuzzing, robots).await;

        let mut output = DomainData::new(seed.netloc());
        output.start()?;
        output.add_config(&config)?;

        tracing::info!(
            "Crawler ready for {} ({} URLs queued, robots {})",
            seed,
            scheduler.frontier_size(),
            if config.obey_robots { "respected" } else { "ignored" }
        );

        Ok(Self {
            settings: ExtractionSettings::from_config(&config),
            config,
            scheduler,
            transport,
            output,
            sampler: DelaySampler::new(),
            state: CrawlState::Ready,
            pages_crawled: 0,
            started: Instant::now(),
        })
    }

    /// Replaces the delay sampler, e.g. with a seeded one
    pub fn with_sampler(mut self, sampler: DelaySampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Runs one crawl cycle
    ///
    /// Returns false once the frontier is exhausted and the crawl is finished.
    pub async fn crawl_next(&mut self) -> bool {
        let never = std::future::pending::<()>();
        tokio::pin!(never);
        self.step(never).await == Step::Continue
    }

    /// Crawls until the frontier is exhausted
    pub async fn run(&mut self) {
        while self.crawl_next().await {}
    }

    /// Crawls until the frontier is exhausted or `shutdown` resolves
    ///
    /// `shutdown` is only raced against the fetch and the politeness delay,
    /// so a page that was fetched is always extracted and recorded before
    /// the crawl stops. A fetch abandoned mid-flight records nothing. The
    /// accumulator is closed either way. Returns true when interrupted.
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) -> bool {
        tokio::pin!(shutdown);
        loop {
            match self.step(shutdown.as_mut()).await {
                Step::Continue => {}
                Step::Finished => return false,
                Step::Interrupted => {
                    self.stop();
                    return true;
                }
            }
        }
    }

    /// Ends the crawl early, closing the accumulator
    ///
    /// Does nothing if the crawl already finished.
    pub fn stop(&mut self) {
        if self.state == CrawlState::Finished {
            return;
        }
        tracing::info!(
            "Stopping crawl with {} URLs left in the frontier",
            self.scheduler.frontier_size()
        );
        self.finish();
    }

    async fn step<F: Future<Output = ()>>(&mut self, mut interrupt: Pin<&mut F>) -> Step {
        if self.state == CrawlState::Finished {
            return Step::Finished;
        }

        self.state = CrawlState::Ready;
        let Some(url) = self.scheduler.next_url() else {
            self.finish();
            return Step::Finished;
        };

        self.state = CrawlState::Fetching;
        tracing::info!("Crawling {}", url);
        let headers = HashMap::from([("User-Agent".to_string(), self.config.user_agent.clone())]);
        let transport = Arc::clone(&self.transport);
        let fetched = tokio::select! {
            fetched = transport.fetch(url.as_str(), &headers, self.config.timeout()) => Some(fetched),
            _ = interrupt.as_mut() => None,
        };
        let Some(fetched) = fetched else {
            tracing::warn!("Interrupted while fetching {}; not recorded", url);
            return Step::Interrupted;
        };

        match fetched {
            Ok(response) => {
                warn_on_status(response.status, url.as_str());

                self.state = CrawlState::Extracting;
                let extraction = extract(&response, &url, &self.settings);

                self.state = CrawlState::UpdatingFrontier;
                self.record(&url, extraction).await;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.state = CrawlState::UpdatingFrontier;
                self.scheduler.report_found_urls::<&str>(&[]).await;
            }
        }

        self.pages_crawled += 1;
        if self.pages_crawled % 10 == 0 {
            let elapsed = self.started.elapsed();
            tracing::info!(
                "Progress: {} URLs crawled, {} in frontier, {:.2} URLs/sec",
                self.pages_crawled,
                self.scheduler.frontier_size(),
                self.pages_crawled as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
            );
        }

        self.state = CrawlState::Delaying;
        if !self.scheduler.is_empty() {
            let sampled = self.sampler.sample(&self.config.default_delay);
            let delay = effective_delay(sampled, self.scheduler.get_crawl_delay());
            if !delay.is_zero() {
                tracing::debug!("Sleeping {:?} before the next request", delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = interrupt.as_mut() => return Step::Interrupted,
                }
            }
        }

        self.state = CrawlState::Ready;
        Step::Continue
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == CrawlState::Finished
    }

    /// Number of URLs fetched (or attempted) so far
    pub fn pages_crawled(&self) -> usize {
        self.pages_crawled
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn output(&self) -> &DomainData {
        &self.output
    }

    pub fn into_output(self) -> DomainData {
        self.output
    }

    /// Renders the accumulated results as JSON
    pub fn dumps(&self, pretty: bool) -> OutputResult<String> {
        self.output.dumps(pretty)
    }

    async fn record(&mut self, url: &CrawlUrl, extraction: Extraction) {
        match extraction {
            Extraction::Page(result) => {
                for error in &result.errors {
                    tracing::warn!("Extraction failed on {}: {}", url, error);
                }
                let added = self.scheduler.report_found_urls(result.links.as_slice()).await;
                tracing::debug!("{} of {} links on {} were new", added, result.links.len(), url);
                self.record_page(url, result);
            }
            Extraction::Document(document) => {
                self.scheduler.report_found_urls::<&str>(&[]).await;
                tracing::info!("Found {} document {}", document.extension, url);
                let appended = self.output.add_document(&url.netloc(), document);
                warn_on_output(appended);
            }
            Extraction::Ignored => {
                self.scheduler.report_found_urls::<&str>(&[]).await;
                tracing::debug!("Nothing to record for {}", url);
            }
        }
    }

    fn record_page(&mut self, url: &CrawlUrl, result: ExtractionResult) {
        let output = &mut self.output;
        for email in &result.emails {
            warn_on_output(output.add_email(email));
        }
        for phone in &result.phones {
            warn_on_output(output.add_phone(phone));
        }
        for social in &result.socials {
            warn_on_output(output.add_social(social));
        }
        for custom in &result.custom_matches {
            warn_on_output(output.add_custom_match(custom));
        }

        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let page = PageRecord {
            path,
            extension: url.extension().map(str::to_string),
            title: result.title,
            custom_string_occurrences: result.custom_string_occurrences,
            on_fuzz_list: url.is_fuzzed(),
            on_robots: url.is_robots_restricted(),
            code: result.status,
        };
        warn_on_output(output.add_page(&url.netloc(), page));
    }

    fn finish(&mut self) {
        if let Err(e) = self.output.end() {
            tracing::warn!("Failed to close crawl output: {}", e);
        }
        self.state = CrawlState::Finished;

        let stats = self.output.stats();
        tracing::info!(
            "Crawl completed: {} URLs crawled in {:?} ({} pages, {} documents, {} emails, {} phones, {} socials)",
            self.pages_crawled,
            self.started.elapsed(),
            stats.pages,
            stats.documents,
            stats.emails,
            stats.phones,
            stats.socials
        );
    }
}

fn warn_on_output(result: OutputResult<()>) {
    if let Err(e) = result {
        tracing::warn!("Failed to record crawl output: {}", e);
    }
}

/// Runs a complete crawl of `seed` over HTTP and returns the results
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP transport
/// 2. Seed the frontier (plus any fuzz candidates)
/// 3. Fetch, extract and schedule until the frontier is exhausted
pub async fn crawl(seed: &str, config: CrawlerConfig) -> Result<DomainData, ArachnidError> {
    let transport = Arc::new(ReqwestTransport::new()?);
    let mut crawler = Crawler::new(seed, config, transport).await?;
    crawler.run().await;
    Ok(crawler.into_output())
}
