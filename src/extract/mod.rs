//! Extraction engine
//!
//! Turns a fetched response into crawl signals. HTML pages go through the
//! [`Scraper`]; everything else is treated as an opaque document and only
//! recorded when its extension is recognized. Responses without a content
//! type are ignored.

mod document;
mod html;

pub use document::{extension_for_content_type, media_type, DocumentRecord, DocumentResponse};
pub use html::{Scraper, SOCIAL_DOMAINS};

use crate::config::CrawlerConfig;
use crate::crawler::FetchResponse;
use crate::url::CrawlUrl;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors isolated to a single signal family on a single page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// How a response body is handled, decided by its content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Document,
    Missing,
}

impl ContentKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            None => Self::Missing,
            Some(ct) if ct.trim().is_empty() => Self::Missing,
            Some(ct) if ct.to_ascii_lowercase().contains("text/html") => Self::Html,
            Some(_) => Self::Document,
        }
    }
}

/// Which signals to collect from a page
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub scrape_links: bool,
    pub scrape_email: bool,
    pub scrape_phone_number: bool,
    pub scrape_social_media: bool,
    pub custom_str: Option<String>,
    pub custom_str_case_sensitive: bool,
    pub custom_regex: Option<String>,

    /// Document extensions worth recording
    pub documents: BTreeSet<String>,
}

impl ExtractionSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            scrape_links: config.scrape_links,
            scrape_email: config.scrape_email,
            scrape_phone_number: config.scrape_phone_number,
            scrape_social_media: config.scrape_social_media,
            custom_str: config.custom_str.clone(),
            custom_str_case_sensitive: config.custom_str_case_sensitive,
            custom_regex: config.custom_regex.clone(),
            documents: config.recognized_documents(),
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Signals extracted from one HTML page
#[derive(Debug, Default)]
pub struct ExtractionResult {
    /// Raw `href`/`src` values in first-appearance order
    pub links: Vec<String>,
    pub emails: BTreeSet<String>,
    pub phones: BTreeSet<String>,
    pub socials: BTreeSet<String>,
    pub custom_matches: Vec<String>,
    pub title: String,

    /// Occurrences of the custom string, when one is configured
    pub custom_string_occurrences: Option<usize>,
    pub status: u16,

    /// Signal families that failed on this page
    pub errors: Vec<ExtractionError>,
}

/// Outcome of handling one response
#[derive(Debug)]
pub enum Extraction {
    Page(ExtractionResult),
    Document(DocumentRecord),
    Ignored,
}

/// Dispatches a response to the HTML or document variant by content type
pub fn extract(response: &FetchResponse, url: &CrawlUrl, settings: &ExtractionSettings) -> Extraction {
    match ContentKind::from_content_type(response.content_type()) {
        ContentKind::Html => Extraction::Page(extract_page(&response.text(), response.status, url, settings)),
        ContentKind::Document => {
            match DocumentResponse::new(url, response.content_type(), response.body.len())
                .extract(&settings.documents)
            {
                Some(record) => Extraction::Document(record),
                None => Extraction::Ignored,
            }
        }
        ContentKind::Missing => Extraction::Ignored,
    }
}

/// Runs the enabled signal families over an HTML page
pub fn extract_page(
    html: &str,
    status: u16,
    url: &CrawlUrl,
    settings: &ExtractionSettings,
) -> ExtractionResult {
    let scraper = Scraper::new(html);
    let mut result = ExtractionResult {
        title: scraper.title(url.as_url()),
        status,
        ..ExtractionResult::default()
    };

    if settings.scrape_links {
        result.links = scraper.find_all_http_refs();
    }
    if settings.scrape_email {
        result.emails = scraper.find_all_emails();
    }
    if settings.scrape_phone_number {
        result.phones = scraper.find_all_phones();
    }
    if settings.scrape_social_media {
        result.socials = scraper.find_all_social();
    }
    if let Some(pattern) = &settings.custom_regex {
        match scraper.find_all_regex(pattern) {
            Ok(matches) => result.custom_matches = matches,
            Err(e) => result.errors.push(e),
        }
    }
    if let Some(needle) = &settings.custom_str {
        result.custom_string_occurrences =
            Some(scraper.string_occurrences(needle, settings.custom_str_case_sensitive));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn response(content_type: Option<&str>, body: &str) -> FetchResponse {
        let mut headers = HashMap::new();
        if let Some(ct) = content_type {
            headers.insert("content-type".to_string(), ct.to_string());
        }
        FetchResponse::new(200, headers, body.as_bytes().to_vec())
    }

    fn url(raw: &str) -> CrawlUrl {
        CrawlUrl::parse(raw, true).unwrap()
    }

    const PAGE: &str = r#"<html><head><title>Home</title></head><body>
        <a href="/next">next</a> <p>mail info@x.com, call 555-867-5309</p>
        <a href="https://github.com/x-org">code</a> token=abc123 token=def456
    </body></html>"#;

    #[test]
    fn test_content_kind() {
        assert_eq!(ContentKind::from_content_type(Some("text/html; charset=utf-8")), ContentKind::Html);
        assert_eq!(ContentKind::from_content_type(Some("Text/HTML")), ContentKind::Html);
        assert_eq!(ContentKind::from_content_type(Some("application/pdf")), ContentKind::Document);
        assert_eq!(ContentKind::from_content_type(Some("")), ContentKind::Missing);
        assert_eq!(ContentKind::from_content_type(None), ContentKind::Missing);
    }

    #[test]
    fn test_html_dispatch_collects_everything() {
        let settings = ExtractionSettings {
            custom_regex: Some(r"token=\w+".to_string()),
            custom_str: Some("TOKEN".to_string()),
            ..ExtractionSettings::default()
        };

        let Extraction::Page(result) = extract(&response(Some("text/html"), PAGE), &url("https://x.com/"), &settings)
        else {
            panic!("expected a page");
        };

        assert_eq!(result.title, "Home");
        assert_eq!(result.status, 200);
        assert_eq!(result.links, vec!["/next", "https://github.com/x-org"]);
        assert!(result.emails.contains("info@x.com"));
        assert!(result.phones.contains("555-867-5309"));
        assert!(result.socials.contains("https://github.com/x-org"));
        assert_eq!(result.custom_matches, vec!["token=abc123", "token=def456"]);
        assert_eq!(result.custom_string_occurrences, Some(2));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_toggles_gate_signal_families() {
        let settings = ExtractionSettings {
            scrape_links: false,
            scrape_email: false,
            scrape_phone_number: false,
            scrape_social_media: false,
            ..ExtractionSettings::default()
        };

        let result = extract_page(PAGE, 200, &url("https://x.com/"), &settings);
        assert!(result.links.is_empty());
        assert!(result.emails.is_empty());
        assert!(result.phones.is_empty());
        assert!(result.socials.is_empty());
        assert_eq!(result.custom_string_occurrences, None);
    }

    #[test]
    fn test_bad_custom_regex_is_isolated() {
        let settings = ExtractionSettings {
            custom_regex: Some("(".to_string()),
            ..ExtractionSettings::default()
        };

        let result = extract_page(PAGE, 200, &url("https://x.com/"), &settings);
        assert_eq!(result.errors.len(), 1);
        assert!(result.custom_matches.is_empty());
        assert!(result.emails.contains("info@x.com"));
    }

    #[test]
    fn test_document_dispatch() {
        let settings = ExtractionSettings::default();

        let zip = extract(&response(Some("application/zip"), "PK"), &url("https://x.com/a.zip"), &settings);
        assert!(matches!(zip, Extraction::Document(ref r) if r.extension == "zip" && r.size == 2));

        let png = extract(&response(Some("image/png"), "x"), &url("https://x.com/logo.png"), &settings);
        assert!(matches!(png, Extraction::Ignored));
    }

    #[test]
    fn test_missing_content_type_is_ignored() {
        let result = extract(&response(None, PAGE), &url("https://x.com/"), &ExtractionSettings::default());
        assert!(matches!(result, Extraction::Ignored));
    }
}
