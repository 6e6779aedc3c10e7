//! Scheduler for managing the crawl frontier
//!
//! This module handles:
//! - FIFO queue management for URLs to crawl
//! - Global deduplication of every URL ever admitted
//! - Scope containment to the seed host (and optionally its subdomains)
//! - Lazy per-origin robots.txt fetching, filtering and crawl delays
//! - Injection of word-list fuzz candidates at startup

use super::delay::delay_from_secs;
use crate::config::CrawlerConfig;
use crate::fuzz::FuzzingOptions;
use crate::robots::{ParsedRobots, RobotsCache, RobotsSource};
use crate::url::{in_scope, registrable_domain, Blacklist, CrawlUrl};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Frontier policy knobs
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Drop robots-disallowed candidates and honor crawl delays
    pub respect_robots: bool,

    /// Admit subdomains of the seed's registrable domain
    pub allow_subdomains: bool,

    /// Keep query strings as part of a URL's identity
    pub allow_query: bool,

    /// User agent matched against robots.txt groups
    pub user_agent: String,

    pub blacklist: Blacklist,
}

impl SchedulerOptions {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            respect_robots: config.obey_robots,
            allow_subdomains: config.scrape_subdomains,
            allow_query: config.allow_query,
            user_agent: config.user_agent.clone(),
            blacklist: Blacklist::new(&config.blacklisted_directories),
        }
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Scheduler owns the frontier queue, the visited set and the robots cache
///
/// Every URL enters the queue at most once per crawl. URLs are handed out in
/// discovery order, and all candidates (discovered links, fuzz candidates and
/// robots-mined paths) pass the same admission filter.
pub struct Scheduler {
    options: SchedulerOptions,

    /// Host of the seed URL; scope is measured against it
    root_host: String,

    /// URLs waiting to be fetched
    queue: VecDeque<CrawlUrl>,

    /// Every URL ever admitted
    visited: HashSet<CrawlUrl>,

    robots: RobotsCache,
    robots_source: Arc<dyn RobotsSource>,

    /// Most recently dequeued URL; base for relative links and crawl delays
    current: Option<CrawlUrl>,
}

impl Scheduler {
    /// Creates a scheduler seeded with `seed` and the enabled fuzz candidates
    ///
    /// The seed is always enqueued. Path-fuzz candidates are generated for
    /// the seed origin; subdomain-fuzz candidates are generated for the
    /// seed's registrable domain, each with its own path-fuzz set. Fuzz
    /// candidates are admitted exactly like discovered links.
    pub async fn new(
        seed: CrawlUrl,
        options: SchedulerOptions,
        fuzzing: FuzzingOptions,
        robots_source: Arc<dyn RobotsSource>,
    ) -> Self {
        let root_host = seed.host().to_string();
        let mut scheduler = Self {
            options,
            root_host,
            queue: VecDeque::new(),
            visited: HashSet::new(),
            robots: RobotsCache::new(),
            robots_source,
            current: None,
        };

        let (seed_robots, fresh) = scheduler.robots_for(&seed).await;
        let seed = if seed_robots.is_allowed(seed.as_str(), &scheduler.options.user_agent) {
            seed
        } else {
            seed.robots_restricted()
        };
        tracing::info!("Seeding frontier with {}", seed);
        scheduler.visited.insert(seed.clone());
        scheduler.queue.push_back(seed.clone());

        let mut pending: VecDeque<CrawlUrl> = VecDeque::new();
        if fresh {
            pending.extend(scheduler.mined_robots_paths(&seed_robots, &seed.origin()));
        }
        pending.extend(scheduler.fuzz_candidates(&seed, &fuzzing));

        let before = scheduler.queue.len();
        scheduler.admit_all(pending).await;
        tracing::debug!(
            "Admitted {} startup candidates for {}",
            scheduler.queue.len() - before,
            scheduler.root_host
        );

        scheduler
    }

    /// Pops the next URL to fetch, skipping blacklisted entries
    ///
    /// # Returns
    ///
    /// * `Some(CrawlUrl)` - The next URL in discovery order
    /// * `None` - The frontier is exhausted and the crawl is over
    pub fn next_url(&mut self) -> Option<CrawlUrl> {
        while let Some(url) = self.queue.pop_front() {
            if self.options.blacklist.is_blacklisted(&url) {
                tracing::debug!("Skipping blacklisted URL {}", url);
                continue;
            }
            self.current = Some(url.clone());
            return Some(url);
        }
        None
    }

    /// Feeds raw URLs found on the most recently dequeued page back into the
    /// frontier
    ///
    /// Relative URLs resolve against that page. Unparsable, out-of-scope and
    /// already-seen candidates are dropped, as are robots-disallowed ones when
    /// robots are respected. Returns how many URLs were enqueued.
    pub async fn report_found_urls<S: AsRef<str>>(&mut self, candidates: &[S]) -> usize {
        let allow_query = self.options.allow_query;
        let mut pending: VecDeque<CrawlUrl> = VecDeque::new();

        for raw in candidates {
            let raw = raw.as_ref();
            let parsed = match &self.current {
                Some(base) => CrawlUrl::resolve(raw, base, allow_query),
                None => CrawlUrl::parse(raw, allow_query),
            };
            match parsed {
                Ok(url) => pending.push_back(url),
                Err(e) => tracing::debug!("Dropping unparsable URL '{}': {}", raw, e),
            }
        }

        let before = self.queue.len();
        self.admit_all(pending).await;
        self.queue.len() - before
    }

    /// Crawl delay required by robots.txt for the origin of the most recently
    /// dequeued URL
    ///
    /// Zero when robots are not respected or the policy sets no delay.
    pub fn get_crawl_delay(&self) -> Duration {
        if !self.options.respect_robots {
            return Duration::ZERO;
        }

        self.current
            .as_ref()
            .and_then(|url| self.robots.get(&url.origin()))
            .and_then(|robots| robots.crawl_delay(&self.options.user_agent))
            .map(delay_from_secs)
            .unwrap_or(Duration::ZERO)
    }

    /// Returns the number of URLs waiting in the frontier
    pub fn frontier_size(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs admitted so far, including the seed
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn root_host(&self) -> &str {
        &self.root_host
    }

    /// Admits candidates in order
    ///
    /// Paths mined from a freshly fetched robots.txt are appended to the
    /// same work list, so no admission recurses.
    async fn admit_all(&mut self, mut pending: VecDeque<CrawlUrl>) {
        while let Some(candidate) = pending.pop_front() {
            if !in_scope(candidate.as_url(), &self.root_host, self.options.allow_subdomains) {
                tracing::debug!("Dropping out-of-scope URL {}", candidate);
                continue;
            }
            if self.visited.contains(&candidate) {
                continue;
            }

            let (robots, fresh) = self.robots_for(&candidate).await;
            let candidate = if robots.is_allowed(candidate.as_str(), &self.options.user_agent) {
                candidate
            } else if self.options.respect_robots {
                tracing::debug!("Dropping robots-disallowed URL {}", candidate);
                continue;
            } else {
                candidate.robots_restricted()
            };

            if fresh {
                pending.extend(self.mined_robots_paths(&robots, &candidate.origin()));
            }

            tracing::debug!("Enqueued {}", candidate);
            self.visited.insert(candidate.clone());
            self.queue.push_back(candidate);
        }
    }

    /// Returns the robots policy for the URL's origin, fetching it on first
    /// encounter
    ///
    /// The flag is true when this call performed the fetch. Fetch failures
    /// are cached as allow-all.
    async fn robots_for(&mut self, url: &CrawlUrl) -> (ParsedRobots, bool) {
        let origin = url.origin();
        if let Some(robots) = self.robots.get(&origin) {
            return (robots.clone(), false);
        }

        let robots = match self.robots_source.fetch_robots(&origin).await {
            Ok(robots) => robots,
            Err(e) => {
                tracing::warn!("{}; treating {} as unrestricted", e, origin);
                ParsedRobots::allow_all()
            }
        };

        if let Some(delay) = robots.crawl_delay(&self.options.user_agent) {
            tracing::debug!("robots.txt for {} sets crawl delay {}s", origin, delay);
        }

        (self.robots.insert(&origin, robots).clone(), true)
    }

    /// Literal disallowed paths of a policy, as flagged candidates
    ///
    /// Only produced when robots are not respected.
    fn mined_robots_paths(&self, robots: &ParsedRobots, origin: &str) -> Vec<CrawlUrl> {
        if self.options.respect_robots {
            return Vec::new();
        }

        robots
            .disallowed_paths(&self.options.user_agent)
            .iter()
            .filter_map(|path| {
                CrawlUrl::parse(&format!("{}{}", origin, path), self.options.allow_query).ok()
            })
            .map(CrawlUrl::robots_restricted)
            .collect()
    }

    fn fuzz_candidates(&self, seed: &CrawlUrl, fuzzing: &FuzzingOptions) -> Vec<CrawlUrl> {
        let allow_query = self.options.allow_query;
        let parse_fuzzed = |raw: &str| -> Option<CrawlUrl> {
            match CrawlUrl::parse(raw, allow_query) {
                Ok(url) => Some(url.fuzzed()),
                Err(e) => {
                    tracing::debug!("Skipping fuzz candidate '{}': {}", raw, e);
                    None
                }
            }
        };

        let mut candidates: Vec<CrawlUrl> = fuzzing
            .path_candidates(&seed.origin())
            .iter()
            .filter_map(|raw| parse_fuzzed(raw))
            .collect();

        let domain = registrable_domain(&self.root_host);
        for root in fuzzing.subdomain_candidates(seed.as_url().scheme(), &domain) {
            let Some(root) = parse_fuzzed(&root) else {
                continue;
            };
            let origin = root.origin();
            candidates.push(root);
            candidates.extend(
                fuzzing
                    .path_candidates(&origin)
                    .iter()
                    .filter_map(|raw| parse_fuzzed(raw)),
            );
        }

        candidates
    }
}
