use crate::url::normalize::{extension_of, resolve_url};
use crate::UrlError;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// A canonical URL under consideration by the crawler
///
/// Equality and hashing use the dedup key: origin (scheme, host, port), path,
/// and the query string when queries are allowed. With `allow_query` off the
/// query is dropped at construction, so `/a?x=1` and `/a?x=2` collapse into
/// one frontier entry that is fetched as `/a`.
#[derive(Debug, Clone)]
pub struct CrawlUrl {
    url: Url,
    extension: Option<String>,
    is_fuzzed: bool,
    is_robots_restricted: bool,
}

impl CrawlUrl {
    /// Parses an absolute URL string
    pub fn parse(raw: &str, allow_query: bool) -> Result<Self, UrlError> {
        Self::from_resolved(resolve_url(raw, None)?, allow_query)
    }

    /// Resolves a possibly relative URL string against the page it was found on
    pub fn resolve(raw: &str, base: &CrawlUrl, allow_query: bool) -> Result<Self, UrlError> {
        Self::from_resolved(resolve_url(raw, Some(&base.url))?, allow_query)
    }

    fn from_resolved(mut url: Url, allow_query: bool) -> Result<Self, UrlError> {
        if !allow_query || url.query() == Some("") {
            url.set_query(None);
        }
        let extension = extension_of(url.path());
        Ok(Self {
            url,
            extension,
            is_fuzzed: false,
            is_robots_restricted: false,
        })
    }

    /// Marks the URL as generated from a fuzz word list
    pub fn fuzzed(mut self) -> Self {
        self.is_fuzzed = true;
        self
    }

    /// Marks the URL as one the site's robots.txt disallows
    pub fn robots_restricted(mut self) -> Self {
        self.is_robots_restricted = true;
        self
    }

    /// The full URL to fetch
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Lowercase host without port
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    /// Host with the port when it is not the scheme default (`example.com:8080`)
    pub fn netloc(&self) -> String {
        match self.url.port() {
            Some(port) => format!("{}:{}", self.host(), port),
            None => self.host().to_string(),
        }
    }

    /// Scheme, host and port (`https://example.com:8443`)
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn is_fuzzed(&self) -> bool {
        self.is_fuzzed
    }

    pub fn is_robots_restricted(&self) -> bool {
        self.is_robots_restricted
    }

    fn dedup_key(&self) -> (String, &str, Option<&str>) {
        (self.origin(), self.path(), self.query())
    }
}

impl PartialEq for CrawlUrl {
    fn eq(&self, other: &Self) -> bool {
        self.dedup_key() == other.dedup_key()
    }
}

impl Eq for CrawlUrl {}

impl Hash for CrawlUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dedup_key().hash(state);
    }
}

impl fmt::Display for CrawlUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_flags_and_fragment() {
        let a = CrawlUrl::parse("https://x.com/page#top", true).unwrap();
        let b = CrawlUrl::parse("https://X.com/page", true).unwrap().fuzzed();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_query_gated_by_policy() {
        let a = CrawlUrl::parse("https://x.com/search?q=1", true).unwrap();
        let b = CrawlUrl::parse("https://x.com/search?q=2", true).unwrap();
        assert_ne!(a, b);

        let a = CrawlUrl::parse("https://x.com/search?q=1", false).unwrap();
        let b = CrawlUrl::parse("https://x.com/search?q=2", false).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://x.com/search");
    }

    #[test]
    fn test_scheme_and_port_distinguish() {
        let a = CrawlUrl::parse("https://x.com/", true).unwrap();
        let b = CrawlUrl::parse("http://x.com/", true).unwrap();
        let c = CrawlUrl::parse("https://x.com:8443/", true).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, CrawlUrl::parse("https://x.com:443/", true).unwrap());
    }

    #[test]
    fn test_resolve_against_base() {
        let base = CrawlUrl::parse("https://x.com/docs/", true).unwrap();
        let url = CrawlUrl::resolve("manual.pdf", &base, true).unwrap();
        assert_eq!(url.as_str(), "https://x.com/docs/manual.pdf");
        assert_eq!(url.extension(), Some("pdf"));
        assert!(!url.is_fuzzed());
        assert!(!url.is_robots_restricted());
    }

    #[test]
    fn test_netloc_and_origin() {
        let url = CrawlUrl::parse("http://127.0.0.1:8080/a", true).unwrap();
        assert_eq!(url.netloc(), "127.0.0.1:8080");
        assert_eq!(url.origin(), "http://127.0.0.1:8080");
        assert_eq!(url.host(), "127.0.0.1");

        let url = CrawlUrl::parse("https://x.com/a", true).unwrap();
        assert_eq!(url.netloc(), "x.com");
    }

    #[test]
    fn test_flags() {
        let url = CrawlUrl::parse("https://x.com/admin", true)
            .unwrap()
            .fuzzed()
            .robots_restricted();
        assert!(url.is_fuzzed());
        assert!(url.is_robots_restricted());
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(CrawlUrl::parse("javascript:void(0)", true).is_err());
        assert!(CrawlUrl::parse("", true).is_err());
    }
}
