//! `navscope fetch` — replay the API calls for a known security.
//!
//! Skips the browser entirely: useful once a company's Morningstar id
//! and date window are known (e.g. from a prior `run` with `--verbose`).

use crate::capture::ChartQuery;
use crate::cli;
use crate::morningstar::MorningstarClient;
use crate::report;
use anyhow::{bail, Result};
use std::path::Path;

/// Fetch one security's series and write its workbook.
pub async fn run(
    id: &str,
    start_date: &str,
    end_date: &str,
    name: Option<&str>,
    out_dir: &Path,
) -> Result<()> {
    let query = ChartQuery {
        id: id.to_string(),
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
    };

    let client = MorningstarClient::new();
    let bundle = client.fetch_bundle(&query).await?;
    let rows = report::build_rows(&bundle);
    if rows.is_empty() {
        bail!("the four series share no observation dates");
    }

    let name = name.unwrap_or(id);
    let path = report::write_workbook(out_dir, name, &rows)?;
    if !cli::is_quiet() {
        eprintln!("  {} written ({} rows)", path.display(), rows.len());
    }
    Ok(())
}
