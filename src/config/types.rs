use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// Document extensions recorded by default
pub const DEFAULT_DOCUMENTS: &[&str] = &[
    "doc", "docx", "ppt", "pptx", "pps", "xls", "xlsx", "csv", "odt", "odp", "pdf", "txt", "zip",
    "rar", "dmg", "exe", "apk", "bin", "rpm", "dpkg",
];

/// Well-known user agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agent {
    Firefox,
    Chrome,
    Googlebot,
    Bingbot,
}

impl Agent {
    pub fn user_agent(&self) -> &'static str {
        match self {
            Self::Firefox => {
                "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
            }
            Self::Chrome => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36"
            }
            Self::Googlebot => "Googlebot/2.1 (+http://www.google.com/bot.html)",
            Self::Bingbot => "bingbot/2.0 (+http://www.bing.com/bingbot.htm)",
        }
    }
}

/// Politeness delay profile, sampled once per crawl cycle
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayProfile {
    /// No default delay
    #[default]
    None,
    /// Short jitter, up to 2 seconds
    Low,
    /// 2 to 5 seconds
    Medium,
    /// 8 to 20 seconds
    High,
    /// Explicit list of delays in seconds
    Custom(Vec<f64>),
}

impl DelayProfile {
    /// The delays, in seconds, a sample is drawn from
    pub fn choices(&self) -> Vec<f64> {
        match self {
            Self::None => vec![0.0],
            Self::Low => vec![0.5, 1.0, 1.5, 2.0],
            Self::Medium => vec![2.0, 3.0, 4.0, 5.0],
            Self::High => vec![8.0, 10.0, 12.0, 15.0, 20.0],
            Self::Custom(values) => values.clone(),
        }
    }
}

/// Crawler behavior configuration
///
/// Every field has a default, so a configuration file only needs to list
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Follow links found on pages
    pub scrape_links: bool,

    /// Allow subdomains of the seed's registrable domain
    pub scrape_subdomains: bool,

    pub scrape_phone_number: bool,
    pub scrape_email: bool,
    pub scrape_social_media: bool,

    /// Document extensions worth recording (empty disables document records)
    pub documents: BTreeSet<String>,

    /// Extra document extensions added on top of `documents`
    pub custom_documents: BTreeSet<String>,

    /// Respect robots.txt disallow rules and crawl delays
    pub obey_robots: bool,

    /// Keep query strings as part of a URL's identity
    pub allow_query: bool,

    pub user_agent: String,

    /// Substring whose occurrences are counted on every page
    pub custom_str: Option<String>,
    pub custom_str_case_sensitive: bool,

    /// Regular expression whose matches are collected on every page
    pub custom_regex: Option<String>,

    pub default_delay: DelayProfile,

    /// Path word list; the bundled list is used when unset
    pub paths_list_file: Option<PathBuf>,

    /// Subdomain word list; the bundled list is used when unset
    pub subs_list_file: Option<PathBuf>,

    pub fuzz_paths: bool,
    pub fuzz_subs: bool,

    /// Hosts or directory prefixes that are never fetched
    pub blacklisted_directories: Vec<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            scrape_links: true,
            scrape_subdomains: true,
            scrape_phone_number: true,
            scrape_email: true,
            scrape_social_media: true,
            documents: DEFAULT_DOCUMENTS.iter().map(|d| d.to_string()).collect(),
            custom_documents: BTreeSet::new(),
            obey_robots: true,
            allow_query: true,
            user_agent: Agent::Firefox.user_agent().to_string(),
            custom_str: None,
            custom_str_case_sensitive: false,
            custom_regex: None,
            default_delay: DelayProfile::None,
            paths_list_file: None,
            subs_list_file: None,
            fuzz_paths: false,
            fuzz_subs: false,
            blacklisted_directories: Vec::new(),
            timeout_secs: 30,
        }
    }
}

impl CrawlerConfig {
    /// Quiet crawling: obey robots, identify as Googlebot, long delays, no fuzzing
    pub fn set_stealth(&mut self) {
        self.obey_robots = true;
        self.user_agent = Agent::Googlebot.user_agent().to_string();
        self.default_delay = DelayProfile::High;
        self.fuzz_paths = false;
        self.fuzz_subs = false;
    }

    /// Loud crawling: ignore robots, no delay, fuzz paths and subdomains
    pub fn set_aggressive(&mut self) {
        self.obey_robots = false;
        self.default_delay = DelayProfile::None;
        self.fuzz_paths = true;
        self.fuzz_subs = true;
    }

    /// Map the site's layout only, without collecting any signals
    pub fn set_layout_only(&mut self) {
        self.scrape_subdomains = false;
        self.scrape_phone_number = false;
        self.scrape_email = false;
        self.scrape_social_media = false;
        self.documents.clear();
        self.custom_documents.clear();
        self.custom_str = None;
        self.custom_regex = None;
    }

    /// Enables exactly the signal families named in `options`
    ///
    /// Recognized options are `phone`, `email`, `social`, `docs`, `all` and
    /// `none` (case-insensitive). `all` and `none` are mutually exclusive.
    pub fn apply_find_options<S: AsRef<str>>(&mut self, options: &[S]) -> Result<(), ConfigError> {
        let supplied: Vec<String> = options.iter().map(|o| o.as_ref().to_lowercase()).collect();
        let has = |name: &str| supplied.iter().any(|o| o == name);

        if has("all") && has("none") {
            return Err(ConfigError::Validation(
                "\"all\" and \"none\" are mutually exclusive find options".to_string(),
            ));
        }

        if let Some(unknown) = supplied
            .iter()
            .find(|o| !matches!(o.as_str(), "phone" | "email" | "social" | "docs" | "all" | "none"))
        {
            return Err(ConfigError::Validation(format!(
                "Unknown find option '{}'",
                unknown
            )));
        }

        let all = has("all");
        let none = has("none");
        let enabled = |name: &str| !none && (all || has(name));

        self.scrape_phone_number = enabled("phone");
        self.scrape_email = enabled("email");
        self.scrape_social_media = enabled("social");
        if !enabled("docs") {
            self.documents.clear();
            self.custom_documents.clear();
        }

        Ok(())
    }

    /// All document extensions, lowercased and without leading dots
    pub fn recognized_documents(&self) -> BTreeSet<String> {
        self.documents
            .iter()
            .chain(self.custom_documents.iter())
            .map(|d| d.trim_start_matches('.').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
