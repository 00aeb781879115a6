//! `navscope run` — the batch: one workbook per company URL.

use crate::cli;
use crate::morningstar::MorningstarClient;
use crate::pipeline::{Pipeline, WaitPlan};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;
use crate::input;
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Run the batch over the URL list.
pub async fn run(urls_path: &Path, out_dir: &Path, waits: WaitPlan) -> Result<()> {
    let urls = input::read_url_list(urls_path)?;
    if urls.is_empty() {
        bail!("{} contains no URLs", urls_path.display());
    }
    if !cli::is_quiet() {
        eprintln!("  {} companies to process", urls.len());
    }

    let renderer: Arc<dyn Renderer> = Arc::new(
        ChromiumRenderer::new()
            .await
            .context("starting headless Chromium")?,
    );

    let pipeline = Pipeline::new(
        Arc::clone(&renderer),
        MorningstarClient::new(),
        out_dir.to_path_buf(),
        waits,
    );
    let summary = pipeline.run(&urls, !cli::is_quiet()).await;

    let _ = renderer.shutdown().await;
    let summary = summary?;

    if !cli::is_quiet() {
        eprintln!(
            "  Done: {} written, {} skipped (output in {})",
            summary.written,
            summary.skipped,
            out_dir.display()
        );
    }
    Ok(())
}
