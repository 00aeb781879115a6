//! Batch orchestration: one fixed UI sequence per company URL.
//!
//! For each detail page: navigate, let the page settle, scroll to the
//! bottom so the chart mounts, wait for it, click the ten-year range
//! button, wait for the refetch, then recover the chart's API call from
//! the recorded traffic, replay it, and write the workbook. A failing
//! item is logged and skipped; the batch always moves on to the next URL.

use crate::capture::{self, ChartQuery};
use crate::input;
use crate::morningstar::MorningstarClient;
use crate::renderer::{NavigationTimeout, RenderContext, Renderer};
use crate::report;
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Scroll the chart into view. The page lazy-loads it below the fold.
const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Click the ten-year range button via the DOM, as the page's own
/// handlers expect. Reports whether the control was found.
const CLICK_TEN_YEAR_JS: &str = r#"(() => {
    const btn = document.querySelector('button[data-menuid="ten-year"]');
    if (btn) { btn.click(); return { success: true }; }
    return { success: false };
})()"#;

/// Fixed waits in the per-item sequence, in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct WaitPlan {
    /// Navigation deadline.
    pub nav_timeout_ms: u64,
    /// After navigation, before scrolling.
    pub settle_ms: u64,
    /// After scrolling, for the chart to mount and load.
    pub chart_ms: u64,
    /// After clicking ten-year, for the refetch to land.
    pub click_ms: u64,
}

impl Default for WaitPlan {
    fn default() -> Self {
        Self {
            nav_timeout_ms: 30_000,
            settle_ms: 2_000,
            chart_ms: 10_000,
            click_ms: 5_000,
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Workbooks written.
    pub written: usize,
    /// Items skipped after a per-item failure.
    pub skipped: usize,
}

/// The per-company retrieval pipeline.
pub struct Pipeline {
    renderer: Arc<dyn Renderer>,
    client: MorningstarClient,
    out_dir: PathBuf,
    waits: WaitPlan,
}

impl Pipeline {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        client: MorningstarClient,
        out_dir: PathBuf,
        waits: WaitPlan,
    ) -> Self {
        Self {
            renderer,
            client,
            out_dir,
            waits,
        }
    }

    /// Process every URL in order, skipping failures.
    pub async fn run(&self, urls: &[String], show_progress: bool) -> Result<BatchSummary> {
        let bar = if show_progress {
            let bar = ProgressBar::new(urls.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut summary = BatchSummary::default();
        for url in urls {
            let slug = input::company_slug(url).unwrap_or_else(|| url.clone());
            bar.set_message(slug.clone());

            match self.process_url(url).await {
                Ok(path) => {
                    info!("{} written", path.display());
                    summary.written += 1;
                }
                Err(e) => {
                    // The AIC detail pages time out for companies that are
                    // no longer members; everything else is a plain failure.
                    if is_navigation_timeout(&e) {
                        info!(
                            "'{slug}' is not currently a member of the AIC; \
                             full company information is unavailable"
                        );
                    } else {
                        warn!("skipping '{slug}': {e:#}");
                    }
                    summary.skipped += 1;
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();
        Ok(summary)
    }

    /// Run the full sequence for one company URL.
    pub async fn process_url(&self, url: &str) -> Result<PathBuf> {
        let slug = input::company_slug(url)
            .with_context(|| format!("no company slug in URL {url}"))?;

        let mut ctx = self.renderer.new_context().await?;
        let driven = self.drive(ctx.as_mut(), url).await;
        let closed = ctx.close().await;

        let query = driven?;
        if let Err(e) = closed {
            debug!("context close failed: {e:#}");
        }

        debug!(
            "chart query for {slug}: id={} window={}..{}",
            query.id, query.start_date, query.end_date
        );

        let bundle = self.client.fetch_bundle(&query).await?;
        let rows = report::build_rows(&bundle);
        if rows.is_empty() {
            bail!("series for '{slug}' share no observation dates");
        }
        report::write_workbook(&self.out_dir, &slug, &rows)
    }

    /// Drive the UI sequence and recover the chart query.
    async fn drive(&self, ctx: &mut dyn RenderContext, url: &str) -> Result<ChartQuery> {
        info!("navigating to {url}");
        ctx.navigate(url, self.waits.nav_timeout_ms).await?;
        sleep_ms(self.waits.settle_ms).await;

        let _ = ctx.execute_js(SCROLL_TO_BOTTOM_JS).await;
        sleep_ms(self.waits.chart_ms).await;

        let clicked = ctx.execute_js(CLICK_TEN_YEAR_JS).await?;
        let found = clicked
            .as_object()
            .and_then(|o| o.get("success"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !found {
            bail!("ten-year range control not found on page");
        }
        debug!("ten-year range clicked");
        sleep_ms(self.waits.click_ms).await;

        let responses = ctx.captured_responses();
        debug!("{} network responses recorded", responses.len());
        let today = chrono::Local::now().date_naive();
        Ok(capture::chart_query_from_responses(&responses, today)?)
    }
}

/// Whether the item died at the navigation deadline.
///
/// Checks the error chain for the renderer's typed timeout; API fetch
/// timeouts also say "timed out" in their messages and must not be
/// mistaken for a dead page.
fn is_navigation_timeout(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<NavigationTimeout>().is_some())
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
