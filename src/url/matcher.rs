use crate::url::CrawlUrl;

/// Checks if a host matches a wildcard pattern
///
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches "example.com" and any subdomain
///
/// # Examples
///
/// ```
/// use arachnid::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
/// assert!(!matches_wildcard("*.example.com", "example.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => candidate == base || candidate.ends_with(&format!(".{}", base)),
        None => candidate == pattern,
    }
}

/// Checks if `path` lies in the directory `prefix`
///
/// `/private` and `/private/` both cover `/private`, `/private/` and
/// `/private/x`, but not `/privateer`.
pub fn in_directory(prefix: &str, path: &str) -> bool {
    let dir = prefix.trim_end_matches('/');
    if dir.is_empty() {
        return true;
    }
    match path.strip_prefix(dir) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BlacklistRule {
    /// Directory prefix on any host
    Directory(String),
    /// Host pattern, optionally restricted to a directory
    Host {
        pattern: String,
        directory: Option<String>,
    },
}

/// Hosts and directories the frontier must never hand out
///
/// Entries starting with `/` are directory prefixes that apply to every host.
/// Anything else is a host pattern (see [`matches_wildcard`]) optionally
/// followed by a directory: `dev.example.com/private`.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    rules: Vec<BlacklistRule>,
}

impl Blacklist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = entries
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref().trim();
                if entry.is_empty() {
                    return None;
                }
                if entry.starts_with('/') {
                    return Some(BlacklistRule::Directory(entry.to_string()));
                }
                let (host, directory) = match entry.split_once('/') {
                    Some((host, dir)) => (host, Some(format!("/{}", dir))),
                    None => (entry, None),
                };
                Some(BlacklistRule::Host {
                    pattern: host.to_lowercase(),
                    directory,
                })
            })
            .collect();

        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_blacklisted(&self, url: &CrawlUrl) -> bool {
        let host = url.host();
        let path = url.path();
        self.rules.iter().any(|rule| match rule {
            BlacklistRule::Directory(dir) => in_directory(dir, path),
            BlacklistRule::Host { pattern, directory } => {
                matches_wildcard(pattern, host)
                    && directory.as_deref().map_or(true, |dir| in_directory(dir, path))
            }
        })
    }
}
