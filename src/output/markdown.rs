//! Markdown summary generation
//!
//! Renders a human-readable report of a [`DomainData`]: run information,
//! counts, the pages per host and every collected signal.

use crate::output::{DomainData, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a crawl to `output_path`
pub fn generate_markdown_summary(data: &DomainData, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(data);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl as markdown
pub fn format_markdown_summary(data: &DomainData) -> String {
    let stats = data.stats();
    let mut md = String::new();

    md.push_str(&format!("# Arachnid Crawl Summary: {}\n\n", data.domain()));

    // Run metadata
    md.push_str("## Run Information\n\n");
    if let Some(started) = data.started_at() {
        md.push_str(&format!("- **Started**: {}\n", started.to_rfc3339()));
    }
    if let Some(finished) = data.finished_at() {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = data.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {:?}\n", data.status()));
    if let Some(fingerprint) = data.config_fingerprint() {
        md.push_str(&format!("- **Config Fingerprint**: {}\n", fingerprint));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Signal | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Hosts | {} |\n", stats.hosts));
    md.push_str(&format!("| Pages | {} |\n", stats.pages));
    md.push_str(&format!("| Documents | {} |\n", stats.documents));
    md.push_str(&format!("| Emails | {} |\n", stats.emails));
    md.push_str(&format!("| Phone Numbers | {} |\n", stats.phones));
    md.push_str(&format!("| Social Profiles | {} |\n", stats.socials));
    md.push_str(&format!("| Custom Matches | {} |\n\n", stats.custom_matches));

    for (netloc, pages) in data.pages() {
        md.push_str(&format!("## Pages on {}\n\n", netloc));
        md.push_str("| Path | Title | Code | Flags |\n");
        md.push_str("|------|-------|------|-------|\n");
        for page in pages {
            let mut flags = Vec::new();
            if page.on_fuzz_list {
                flags.push("fuzzed");
            }
            if page.on_robots {
                flags.push("robots");
            }
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                page.path,
                escape_cell(&page.title),
                page.code,
                flags.join(", ")
            ));
        }
        md.push('\n');
    }

    if !data.documents().is_empty() {
        md.push_str("## Documents\n\n");
        md.push_str("| Host | Path | Type | Size |\n");
        md.push_str("|------|------|------|------|\n");
        for (netloc, documents) in data.documents() {
            for doc in documents {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    netloc, doc.path, doc.extension, doc.size
                ));
            }
        }
        md.push('\n');
    }

    push_list(&mut md, "Emails", data.emails().iter());
    push_list(&mut md, "Phone Numbers", data.phones().iter());
    push_list(&mut md, "Social Profiles", data.socials().iter());
    push_list(&mut md, "Custom Matches", data.custom_matches().iter());

    md
}

fn push_list<'a>(md: &mut String, heading: &str, items: impl ExactSizeIterator<Item = &'a String>) {
    if items.len() == 0 {
        return;
    }
    md.push_str(&format!("## {}\n\n", heading));
    for item in items {
        md.push_str(&format!("- {}\n", item));
    }
    md.push('\n');
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
