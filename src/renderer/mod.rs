//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). Contexts
//! record the network responses the page triggers so the chart request
//! can be recovered after the UI sequence has run.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Navigation exceeded its deadline.
///
/// Carried as a typed error so the batch loop can tell a dead detail
/// page from a failure later in the sequence (fetch, parse, write).
#[derive(Debug, Error)]
#[error("navigation timed out after {0}ms")]
pub struct NavigationTimeout(pub u64);

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// One network response observed by the browser while a context was open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedResponse {
    /// Full URL of the response, including the query string.
    pub url: String,
    /// MIME type reported by the browser (e.g. "application/json").
    pub mime_type: String,
    /// HTTP status code.
    pub status: u16,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab) with network recording enabled.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab).
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Get the current URL.
    async fn get_url(&self) -> Result<String>;
    /// Drain the network responses recorded since the context was opened.
    fn captured_responses(&self) -> Vec<CapturedResponse>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}
