//! Non-HTML responses
//!
//! Documents are never parsed; the crawler only records that they exist.

use crate::url::CrawlUrl;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A document found during the crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub path: String,
    pub extension: String,

    /// Body size in bytes
    pub size: usize,

    /// Declared `Content-Type`, without parameters
    pub content_type: Option<String>,
}

/// A fetched response whose content type is not HTML
#[derive(Debug, Clone)]
pub struct DocumentResponse<'a> {
    url: &'a CrawlUrl,
    content_type: Option<&'a str>,
    size: usize,
}

impl<'a> DocumentResponse<'a> {
    pub fn new(url: &'a CrawlUrl, content_type: Option<&'a str>, size: usize) -> Self {
        Self {
            url,
            content_type,
            size,
        }
    }

    /// The document's extension: the URL's, or the one its content type
    /// implies when the URL has none
    pub fn extension(&self) -> Option<String> {
        self.url
            .extension()
            .map(str::to_string)
            .or_else(|| {
                self.content_type
                    .and_then(extension_for_content_type)
                    .map(str::to_string)
            })
    }

    /// Returns a record when the extension is in the recognized set
    pub fn extract(&self, recognized: &BTreeSet<String>) -> Option<DocumentRecord> {
        let extension = self.extension()?;
        if !recognized.contains(&extension) {
            return None;
        }

        Some(DocumentRecord {
            path: self.url.path().to_string(),
            extension,
            size: self.size,
            content_type: self.content_type.map(media_type),
        })
    }
}

/// Strips parameters and lowercases a content type (`Text/Plain; charset=x` -> `text/plain`)
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Maps a content type to the file extension it usually travels with
///
/// Only types that name one document format are mapped. `text/plain` and
/// `application/octet-stream` are served for all kinds of extensionless
/// endpoints, so they imply no extension.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let extension = match media_type(content_type).as_str() {
        "application/pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "application/vnd.ms-powerpoint" => "ppt",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.slideshow" => "pps",
        "application/vnd.ms-excel" => "xls",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => "xlsx",
        "text/csv" => "csv",
        "application/vnd.oasis.opendocument.text" => "odt",
        "application/vnd.oasis.opendocument.presentation" => "odp",
        "application/zip" | "application/x-zip-compressed" => "zip",
        "application/vnd.rar" | "application/x-rar-compressed" => "rar",
        "application/x-apple-diskimage" => "dmg",
        "application/x-msdownload" | "application/vnd.microsoft.portable-executable" => "exe",
        "application/vnd.android.package-archive" => "apk",
        "application/x-rpm" => "rpm",
        "application/vnd.debian.binary-package" => "dpkg",
        _ => return None,
    };
    Some(extension)
}
