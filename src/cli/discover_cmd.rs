//! `navscope discover` — build urls.csv from the AIC listing.

use crate::cli;
use crate::discover;
use crate::input;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;
use anyhow::{Context, Result};
use std::path::Path;

/// Paginate the listing and write the discovered URLs.
pub async fn run(pages: usize, settle_ms: u64, out: &Path) -> Result<()> {
    let renderer = ChromiumRenderer::new()
        .await
        .context("starting headless Chromium")?;

    let urls = discover::discover_company_urls(&renderer, pages, settle_ms).await?;
    input::write_url_list(out, &urls)?;

    let _ = renderer.shutdown().await;

    if !cli::is_quiet() {
        eprintln!("  {} company URLs written to {}", urls.len(), out.display());
    }
    Ok(())
}
