//! The URL list: reading and writing `urls.csv`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize)]
struct UrlRecord {
    #[serde(rename = "URL")]
    url: String,
}

/// Read company detail-page URLs from a CSV file with a `URL` column.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening URL list {}", path.display()))?;

    let mut urls = Vec::new();
    for record in reader.deserialize::<UrlRecord>() {
        let record = record.context("malformed row in URL list")?;
        let url = record.url.trim().to_string();
        if !url.is_empty() {
            urls.push(url);
        }
    }
    Ok(urls)
}

/// Write discovered URLs as a CSV file with a `URL` column.
pub fn write_url_list(path: &Path, urls: &[String]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating URL list {}", path.display()))?;
    for url in urls {
        writer.serialize(UrlRecord { url: url.clone() })?;
    }
    writer.flush().context("flushing URL list")?;
    Ok(())
}

/// Derive the output file name from a company detail-page URL.
///
/// The AIC detail pages end in a trailing slash, so the company slug is
/// the second-to-last `/`-separated segment.
pub fn company_slug(url: &str) -> Option<String> {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 2 {
        return None;
    }
    let slug = parts[parts.len() - 2];
    if slug.is_empty() {
        return None;
    }
    Some(slug.to_string())
}
