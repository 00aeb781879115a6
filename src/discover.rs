//! Company URL discovery from the AIC find-and-compare listing.
//!
//! Paginates the listing sorted by name and collects the detail-page
//! link of every company row.

use crate::renderer::Renderer;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

const LISTING_BASE: &str = "https://www.theaic.co.uk/aic/find-compare-investment-companies";

/// Anchor inside each company row that carries the detail-page href.
const COLLECT_LINKS_JS: &str = r#"(() =>
    Array.from(document.querySelectorAll(
        '.is-company-row a.flex-1.text-brand-700.tour--click-fund'
    )).map(a => a.href)
)()"#;

/// URL of one listing page (zero-based).
pub fn listing_page_url(page: usize) -> String {
    format!("{LISTING_BASE}?sortid=Name&desc=false&page={page}")
}

/// Collect company detail-page URLs from the first `pages` listing pages.
///
/// Each page gets `settle_ms` to finish rendering its rows before the
/// links are read. A page that fails to load aborts discovery; a partial
/// URL list would silently drop companies from every later batch run.
pub async fn discover_company_urls(
    renderer: &dyn Renderer,
    pages: usize,
    settle_ms: u64,
) -> Result<Vec<String>> {
    let mut urls = Vec::new();

    for page in 0..pages {
        let page_url = listing_page_url(page);
        info!("listing page {} of {pages}", page + 1);

        let mut ctx = renderer.new_context().await?;
        let result = async {
            ctx.navigate(&page_url, 30_000)
                .await
                .with_context(|| format!("loading {page_url}"))?;
            tokio::time::sleep(Duration::from_millis(settle_ms)).await;

            let links = ctx
                .execute_js(COLLECT_LINKS_JS)
                .await
                .with_context(|| format!("reading company rows on {page_url}"))?;
            serde_json::from_value::<Vec<String>>(links)
                .context("company row links were not a string array")
        }
        .await;
        let _ = ctx.close().await;

        urls.extend(result?);
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{CapturedResponse, NavigationResult, RenderContext};
    use anyhow::bail;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Scripted renderer serving one fake listing page per context.
    struct FakeListing {
        fail_on_page: Option<usize>,
        opened: Arc<Mutex<Vec<String>>>,
        next_page: AtomicUsize,
    }

    struct FakeListingPage {
        page: usize,
        fails: bool,
        opened: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Renderer for FakeListing {
        async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
            let page = self.next_page.fetch_add(1, Ordering::Relaxed);
            Ok(Box::new(FakeListingPage {
                page,
                fails: self.fail_on_page == Some(page),
                opened: Arc::clone(&self.opened),
            }))
        }
        async fn shutdown(&self) -> Result<()> {
            Ok(())
        }
        fn active_contexts(&self) -> usize {
            0
        }
    }

    #[async_trait]
    impl RenderContext for FakeListingPage {
        async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
            if self.fails {
                bail!("net::ERR_CONNECTION_RESET");
            }
            self.opened.lock().unwrap().push(url.to_string());
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 1,
            })
        }
        async fn execute_js(&self, _script: &str) -> Result<serde_json::Value> {
            Ok(serde_json::json!([
                format!("https://www.theaic.co.uk/companies/fund-{}a/", self.page),
                format!("https://www.theaic.co.uk/companies/fund-{}b/", self.page),
            ]))
        }
        async fn get_url(&self) -> Result<String> {
            Ok(String::new())
        }
        fn captured_responses(&self) -> Vec<CapturedResponse> {
            Vec::new()
        }
        async fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn collects_links_from_every_listing_page() {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let renderer = FakeListing {
            fail_on_page: None,
            opened: Arc::clone(&opened),
            next_page: AtomicUsize::new(0),
        };

        let urls = discover_company_urls(&renderer, 3, 0).await.unwrap();
        assert_eq!(urls.len(), 6);
        assert_eq!(urls[0], "https://www.theaic.co.uk/companies/fund-0a/");
        assert_eq!(urls[5], "https://www.theaic.co.uk/companies/fund-2b/");

        let opened = opened.lock().unwrap();
        assert_eq!(
            *opened,
            vec![
                listing_page_url(0),
                listing_page_url(1),
                listing_page_url(2),
            ]
        );
    }

    #[tokio::test]
    async fn failing_page_aborts_discovery() {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let renderer = FakeListing {
            fail_on_page: Some(1),
            opened: Arc::clone(&opened),
            next_page: AtomicUsize::new(0),
        };

        let err = discover_company_urls(&renderer, 3, 0).await.unwrap_err();
        assert!(format!("{err:#}").contains("page=1"));
        // The first page was read; the failure stopped the walk there.
        assert_eq!(opened.lock().unwrap().len(), 1);
    }

    #[test]
    fn listing_urls_are_zero_based_and_name_sorted() {
        assert_eq!(
            listing_page_url(0),
            "https://www.theaic.co.uk/aic/find-compare-investment-companies\
             ?sortid=Name&desc=false&page=0"
        );
        assert!(listing_page_url(19).ends_with("page=19"));
    }
}
