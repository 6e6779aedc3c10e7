use std::net::IpAddr;
use url::Url;

/// Multi-label public suffixes under which registrations happen at the third level
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "ltd.uk", "plc.uk", "me.uk", "com.au", "net.au",
    "org.au", "edu.au", "gov.au", "co.nz", "org.nz", "co.jp", "ne.jp", "or.jp", "co.za",
    "com.br", "com.cn", "com.mx", "com.ar", "com.tr", "co.in", "co.kr", "com.sg", "com.hk",
];

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use arachnid::url::extract_domain;
///
/// let url = Url::parse("https://Sub.Example.COM:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("sub.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the registrable domain ("eTLD+1") of a host
///
/// This uses a short built-in list of multi-label suffixes rather than the
/// full public suffix list. IP addresses are their own registrable domain.
///
/// # Examples
///
/// ```
/// use arachnid::url::registrable_domain;
///
/// assert_eq!(registrable_domain("www.example.com"), "example.com");
/// assert_eq!(registrable_domain("shop.example.co.uk"), "example.co.uk");
/// assert_eq!(registrable_domain("127.0.0.1"), "127.0.0.1");
/// ```
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    if host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>().is_ok() {
        return host;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host;
    }

    let last_two = labels[labels.len() - 2..].join(".");
    let keep = if MULTI_LABEL_SUFFIXES.contains(&last_two.as_str()) {
        3
    } else {
        2
    };

    labels[labels.len().saturating_sub(keep)..].join(".")
}

/// Decides whether a URL lies inside the crawl scope
///
/// A URL is in scope when its host equals `root_host`, or when
/// `allow_subdomains` is set and its host is the root's registrable domain
/// or any subdomain of it.
///
/// # Arguments
///
/// * `url` - The candidate URL
/// * `root_host` - Host of the seed URL
/// * `allow_subdomains` - Whether subdomains of the registrable domain are crawlable
pub fn in_scope(url: &Url, root_host: &str, allow_subdomains: bool) -> bool {
    let Some(host) = extract_domain(url) else {
        return false;
    };
    let root_host = root_host.to_lowercase();

    if host == root_host {
        return true;
    }

    if !allow_subdomains {
        return false;
    }

    let registrable = registrable_domain(&root_host);
    if registrable.parse::<IpAddr>().is_ok() {
        return false;
    }

    host == registrable || host.ends_with(&format!(".{}", registrable))
}
