//! HTML scraper for extracting links and contact signals
//!
//! This module handles parsing HTML content to extract:
//! - Every `href`/`src` reference in document order
//! - Email addresses, phone numbers and social-media profiles
//! - Custom regular-expression matches and substring counts
//! - The page title

use crate::extract::ExtractionError;
use crate::url::last_segment;
use regex::{Regex, RegexBuilder};
use scraper::{Html, Node, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use url::Url;

/// Sites whose profile links are reported as social handles
pub const SOCIAL_DOMAINS: &[&str] = &[
    "facebook",
    "twitter",
    "x",
    "instagram",
    "linkedin",
    "youtube",
    "github",
    "pinterest",
    "tiktok",
    "reddit",
    "tumblr",
    "medium",
    "snapchat",
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9][a-z0-9._%+-]*@[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,}\b")
        .expect("email pattern is valid")
});

// Separators exclude newlines so numbers in adjacent elements never merge
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\(?\d[\d \t().-]{6,}\d").expect("phone pattern is valid")
});

static SOCIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let sites = SOCIAL_DOMAINS.join("|");
    Regex::new(&format!(
        r"(?i)^https?://(?:www\.|m\.|[a-z]{{2}}\.)?(?:{})\.com/[a-z0-9_@.%-]+(?:/[a-z0-9_@.%-]+)*/?$",
        sites
    ))
    .expect("social pattern is valid")
});

/// File extensions that look like email TLDs in `image@2x.png` style names
const NON_EMAIL_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".css", ".js"];

/// Reference prefixes that never lead to a crawlable resource
const SKIPPED_REF_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:", "#"];

/// Elements whose text is never rendered
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A parsed HTML page
///
/// All methods are pure functions of the page source.
pub struct Scraper {
    source: String,
    document: Html,
}

impl Scraper {
    pub fn new(html: &str) -> Self {
        Self {
            source: html.to_string(),
            document: Html::parse_document(html),
        }
    }

    /// Email addresses in the page source, including `mailto:` links
    pub fn find_all_emails(&self) -> BTreeSet<String> {
        EMAIL_RE
            .find_iter(&self.source)
            .map(|m| m.as_str().to_lowercase())
            .filter(|email| !NON_EMAIL_SUFFIXES.iter().any(|s| email.ends_with(s)))
            .collect()
    }

    /// Phone numbers in the visible text and `tel:` links
    ///
    /// A match needs 10 to 15 digits, which keeps dates and years out.
    pub fn find_all_phones(&self) -> BTreeSet<String> {
        let text = self.visible_text();
        let mut phones: BTreeSet<String> = PHONE_RE
            .find_iter(&text)
            .map(|m| m.as_str().trim().to_string())
            .filter(|candidate| plausible_phone(candidate))
            .collect();

        for href in self.attribute_values("a[href]", "href") {
            if let Some(number) = strip_prefix_ignore_case(href.trim(), "tel:") {
                let number = number.trim();
                if plausible_phone(number) {
                    phones.insert(number.to_string());
                }
            }
        }

        phones
    }

    /// Links to profiles on well-known social sites
    pub fn find_all_social(&self) -> BTreeSet<String> {
        self.attribute_values("a[href]", "href")
            .into_iter()
            .map(|href| href.trim().to_string())
            .filter(|href| SOCIAL_RE.is_match(href))
            .map(|href| href.trim_end_matches('/').to_string())
            .collect()
    }

    /// Every match of `pattern` in the page source, in order of appearance
    pub fn find_all_regex(&self, pattern: &str) -> Result<Vec<String>, ExtractionError> {
        let re = Regex::new(pattern).map_err(|e| ExtractionError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(re
            .find_iter(&self.source)
            .map(|m| m.as_str().to_string())
            .collect())
    }

    /// Every `href` and `src` value in document order
    ///
    /// References that cannot lead to a page (`javascript:`, `mailto:`,
    /// `tel:`, `data:` and fragment-only) are skipped. Values are returned
    /// raw; resolving them is the frontier's job.
    pub fn find_all_http_refs(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse("[href], [src]") else {
            return Vec::new();
        };

        let mut refs = Vec::new();
        for element in self.document.select(&selector) {
            for attr in ["href", "src"] {
                let Some(value) = element.value().attr(attr) else {
                    continue;
                };
                let value = value.trim();
                if value.is_empty() || is_skipped_ref(value) {
                    continue;
                }
                refs.push(value.to_string());
            }
        }
        refs
    }

    /// Counts occurrences of `needle` in the visible text
    ///
    /// Text inside `script`, `style`, `noscript` and `template` is ignored.
    pub fn string_occurrences(&self, needle: &str, case_sensitive: bool) -> usize {
        if needle.is_empty() {
            return 0;
        }

        let text = self.visible_text();
        if case_sensitive {
            return text.matches(needle).count();
        }

        RegexBuilder::new(&regex::escape(needle))
            .case_insensitive(true)
            .build()
            .map(|re| re.find_iter(&text).count())
            .unwrap_or(0)
    }

    /// The document title, or the last path segment of `url` when the page
    /// has none
    pub fn title(&self, url: &Url) -> String {
        Selector::parse("title")
            .ok()
            .and_then(|selector| {
                self.document
                    .select(&selector)
                    .next()
                    .map(|element| element.text().collect::<String>().trim().to_string())
            })
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| last_segment(url.path()))
    }

    /// Text nodes outside invisible elements, one per line
    fn visible_text(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for node in self.document.tree.nodes() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|e| INVISIBLE_ELEMENTS.contains(&e.name()))
            });
            let text = text.trim();
            if !hidden && !text.is_empty() {
                lines.push(text);
            }
        }
        lines.join("\n")
    }

    fn attribute_values(&self, selector: &str, attr: &str) -> Vec<&str> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.document
            .select(&selector)
            .filter_map(|element| element.value().attr(attr))
            .collect()
    }
}

fn plausible_phone(candidate: &str) -> bool {
    let digits = candidate.chars().filter(char::is_ascii_digit).count();
    (10..=15).contains(&digits)
}

fn is_skipped_ref(value: &str) -> bool {
    SKIPPED_REF_PREFIXES
        .iter()
        .any(|prefix| strip_prefix_ignore_case(value, prefix).is_some())
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
    <title> Contact Us </title>
    <link rel="stylesheet" href="/static/site.css">
    <script src="/static/app.js">var leaked = "admin@internal.example"; var secret = "Arachnid";</script>
    <style>.arachnid { color: red; }</style>
</head>
<body>
    <a href="/about">About</a>
    <a href="javascript:void(0)">Menu</a>
    <a href="mailto:Sales@Example.com">Mail</a>
    <a href="tel:+1-555-010-9999">Call</a>
    <a href="#top">Top</a>
    <a href="https://twitter.com/example_co">Twitter</a>
    <a href="https://www.linkedin.com/company/example/">LinkedIn</a>
    <a href="https://twitter.com/">Twitter home</a>
    <img src="/img/logo@2x.png" alt="logo">
    <img src="data:image/png;base64,AAAA">
    <p>Reach support@example.com or call (555) 123-4567.</p>
    <p>Founded 2019-04-01. Arachnid crawls. ARACHNID!</p>
    <table><tr><td>2021</td><td>12345678</td></tr></table>
</body>
</html>"##;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_find_all_http_refs_in_document_order() {
        let scraper = Scraper::new(PAGE);
        assert_eq!(
            scraper.find_all_http_refs(),
            vec![
                "/static/site.css",
                "/static/app.js",
                "/about",
                "https://twitter.com/example_co",
                "https://www.linkedin.com/company/example/",
                "https://twitter.com/",
                "/img/logo@2x.png",
            ]
        );
    }

    #[test]
    fn test_find_all_emails() {
        let emails = Scraper::new(PAGE).find_all_emails();
        assert!(emails.contains("support@example.com"));
        assert!(emails.contains("sales@example.com"));
        assert!(emails.contains("admin@internal.example"));
        assert!(!emails.iter().any(|e| e.ends_with(".png")));
    }

    #[test]
    fn test_find_all_phones() {
        let phones = Scraper::new(PAGE).find_all_phones();
        assert!(phones.contains("(555) 123-4567"));
        assert!(phones.contains("+1-555-010-9999"));
        assert_eq!(phones.len(), 2);
    }

    #[test]
    fn test_find_all_social() {
        let socials = Scraper::new(PAGE).find_all_social();
        assert!(socials.contains("https://twitter.com/example_co"));
        assert!(socials.contains("https://www.linkedin.com/company/example"));
        assert_eq!(socials.len(), 2);
    }

    #[test]
    fn test_find_all_regex() {
        let scraper = Scraper::new(PAGE);
        let matches = scraper.find_all_regex(r"\(\d{3}\) \d{3}-\d{4}").unwrap();
        assert_eq!(matches, vec!["(555) 123-4567"]);

        let result = scraper.find_all_regex("([unclosed");
        assert!(matches!(result, Err(ExtractionError::InvalidPattern { .. })));
    }

    #[test]
    fn test_string_occurrences_skips_scripts_and_styles() {
        let scraper = Scraper::new(PAGE);
        assert_eq!(scraper.string_occurrences("arachnid", false), 2);
        assert_eq!(scraper.string_occurrences("Arachnid", true), 1);
        assert_eq!(scraper.string_occurrences("", false), 0);
    }

    #[test]
    fn test_title() {
        let scraper = Scraper::new(PAGE);
        assert_eq!(scraper.title(&url("https://x.com/contact")), "Contact Us");

        let untitled = Scraper::new("<html><body><p>hi</p></body></html>");
        assert_eq!(untitled.title(&url("https://x.com/docs/guide.html")), "guide.html");
        assert_eq!(untitled.title(&url("https://x.com/")), "");
    }
}
