//! Word-list fuzzing
//!
//! Path and subdomain word lists are loaded once at crawl start and turned
//! into candidate URLs for the scheduler. Generation is stateless: the same
//! options always yield the same candidates in word-list order.

use crate::config::CrawlerConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUNDLED_PATHS: &str = include_str!("../../data/fuzz_list.txt");
const BUNDLED_SUBDOMAINS: &str = include_str!("../../data/subdomain_fuzz_list.txt");

#[derive(Debug, Error)]
pub enum FuzzError {
    #[error("Failed to read word list {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A newline-delimited word list; blank lines and `#` comments are skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn parse(content: &str) -> Self {
        let mut words: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for line in content.lines() {
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            if seen.insert(word) {
                words.push(word.to_string());
            }
        }
        Self { words }
    }

    pub fn from_file(path: &Path) -> Result<Self, FuzzError> {
        let content = std::fs::read_to_string(path).map_err(|source| FuzzError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// The path list shipped with the crate
    pub fn bundled_paths() -> Self {
        Self::parse(BUNDLED_PATHS)
    }

    /// The subdomain list shipped with the crate
    pub fn bundled_subdomains() -> Self {
        Self::parse(BUNDLED_SUBDOMAINS)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for WordList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let joined: Vec<String> = iter.into_iter().map(Into::into).collect();
        Self::parse(&joined.join("\n"))
    }
}

/// Which word lists, if any, feed the scheduler
#[derive(Debug, Clone, Default)]
pub struct FuzzingOptions {
    paths: Option<WordList>,
    subdomains: Option<WordList>,
}

impl FuzzingOptions {
    pub fn new(paths: Option<WordList>, subdomains: Option<WordList>) -> Self {
        Self { paths, subdomains }
    }

    /// No fuzzing at all
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Loads the word lists enabled by the configuration
    ///
    /// An enabled list without a configured file falls back to the bundled list.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, FuzzError> {
        let paths = if config.fuzz_paths {
            Some(match &config.paths_list_file {
                Some(path) => WordList::from_file(path)?,
                None => WordList::bundled_paths(),
            })
        } else {
            None
        };

        let subdomains = if config.fuzz_subs {
            Some(match &config.subs_list_file {
                Some(path) => WordList::from_file(path)?,
                None => WordList::bundled_subdomains(),
            })
        } else {
            None
        };

        Ok(Self::new(paths, subdomains))
    }

    pub fn fuzz_paths(&self) -> bool {
        self.paths.is_some()
    }

    pub fn fuzz_subdomains(&self) -> bool {
        self.subdomains.is_some()
    }

    /// Candidate URLs for every path word under `origin` (`https://x.com`)
    pub fn path_candidates(&self, origin: &str) -> Vec<String> {
        let origin = origin.trim_end_matches('/');
        self.paths
            .iter()
            .flat_map(|list| list.words())
            .map(|word| format!("{}/{}", origin, word.trim_start_matches('/')))
            .collect()
    }

    /// Root URLs for every subdomain label under `domain`
    pub fn subdomain_candidates(&self, scheme: &str, domain: &str) -> Vec<String> {
        self.subdomains
            .iter()
            .flat_map(|list| list.words())
            .map(|label| label.trim_matches('.').to_lowercase())
            .filter(|label| !label.is_empty())
            .map(|label| format!("{}://{}.{}/", scheme, label, domain))
            .collect()
    }
}
