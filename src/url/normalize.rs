use crate::UrlError;
use url::Url;

/// Resolves a raw, possibly relative URL string into an absolute crawlable URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Percent-encode inner spaces
/// 3. Resolve against `base` when given, otherwise parse as absolute
/// 4. Reject anything that is not HTTP(S) or has no host
/// 5. Remove fragment (everything after #)
/// 6. Empty path becomes /
///
/// Host lowercasing and dot-segment removal are done by the `url` parser.
///
/// # Arguments
///
/// * `raw` - The URL string as found in a document or word list
/// * `base` - The URL of the page the string was found on
///
/// # Returns
///
/// * `Ok(Url)` - Absolute, fragment-free URL
/// * `Err(UrlError)` - The string cannot name a crawlable resource
///
/// # Examples
///
/// ```
/// use arachnid::url::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/index.html").unwrap();
/// let url = resolve_url("../about us.html#team", Some(&base)).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about%20us.html");
/// ```
pub fn resolve_url(raw: &str, base: Option<&Url>) -> Result<Url, UrlError> {
    let cleaned = raw.trim().replace(' ', "%20");
    if cleaned.is_empty() {
        return Err(UrlError::Malformed("empty URL".to_string()));
    }

    let parsed = match base {
        Some(base) => base.join(&cleaned),
        None => Url::parse(&cleaned),
    };
    let mut url = parsed.map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if url.path().is_empty() {
        url.set_path("/");
    }

    Ok(url)
}

/// Returns the lowercase file extension of the last path segment, if any
///
/// `/files/Report.PDF` yields `pdf`; `/files/` and `/files/README` yield `None`.
pub fn extension_of(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or("");
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Returns the last non-empty path segment, used as a fallback page title
pub fn last_segment(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/blog/post.html").unwrap()
    }

    #[test]
    fn test_absolute_url() {
        let url = resolve_url("https://example.com/page", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_relative_resolution() {
        let url = resolve_url("other.html", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://example.com/blog/other.html");
    }

    #[test]
    fn test_root_relative_resolution() {
        let url = resolve_url("/contact", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://example.com/contact");
    }

    #[test]
    fn test_protocol_relative_resolution() {
        let url = resolve_url("//cdn.example.com/app.js", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/app.js");
    }

    #[test]
    fn test_fragment_removed() {
        let url = resolve_url("https://example.com/page#section", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_spaces_encoded_and_trimmed() {
        let url = resolve_url("  /my page.html  ", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://example.com/my%20page.html");
    }

    #[test]
    fn test_host_lowercased() {
        let url = resolve_url("https://EXAMPLE.COM/Page", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_dot_segments() {
        let url = resolve_url("https://example.com/a/../b/./c", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let url = resolve_url("https://example.com", None).unwrap();
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = resolve_url("ftp://example.com/file", None);
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));

        let result = resolve_url("mailto:someone@example.com", Some(&base()));
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed_input() {
        assert!(resolve_url("not a url", None).is_err());
        assert!(resolve_url("   ", Some(&base())).is_err());
        assert!(resolve_url("http://[::1", None).is_err());
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/files/report.pdf"), Some("pdf".to_string()));
        assert_eq!(extension_of("/files/Report.PDF"), Some("pdf".to_string()));
        assert_eq!(extension_of("/archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension_of("/files/"), None);
        assert_eq!(extension_of("/README"), None);
        assert_eq!(extension_of("/.htaccess"), None);
        assert_eq!(extension_of("/v1.2/api"), None);
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("/docs/intro"), "intro");
        assert_eq!(last_segment("/docs/intro/"), "intro");
        assert_eq!(last_segment("/"), "");
    }
}
