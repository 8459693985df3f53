// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-driven page sessions.
//!
//! Defines the `Renderer` and `PageSession` traits that abstract over the
//! browser engine (currently Chromium via chromiumoxide). A renderer launches
//! one browser process per session; sessions are never pooled or reused.

pub mod chromium;

use async_trait::async_trait;
use sa_series::Result;

/// A browser engine that can open page sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Launch a fresh browser process and open a single blank page in it.
    ///
    /// Fails with `ScrapeError::BrowserUnavailable` when no executable can be
    /// located or the process does not start.
    async fn open(&self) -> Result<Box<dyn PageSession>>;
    /// Number of sessions opened and not yet closed.
    fn live_sessions(&self) -> usize;
}

/// One browser process with one page, driven by the scrape pipeline.
///
/// None of these methods apply their own deadline; the pipeline stages wrap
/// them in bounded waits.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate to a URL and wait for the load to settle.
    async fn navigate(&mut self, url: &str) -> Result<()>;
    /// Evaluate a JavaScript expression in the page and return its value.
    /// `undefined` comes back as `Value::Null`.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;
    /// Whether `selector` currently matches an element.
    async fn element_exists(&self, selector: &str) -> Result<bool>;
    /// Choose the `<option>` whose value is `value` in the `<select>` matched
    /// by `selector`, firing the control's own input/change handling.
    /// Returns `false` when no such option exists.
    async fn choose_option(&self, selector: &str, value: &str) -> Result<bool>;
    /// Click the element matched by `selector` with real mouse input.
    /// Returns `false` when nothing matches.
    async fn click(&self, selector: &str) -> Result<bool>;
    /// Tear down the page and terminate the browser process.
    async fn close(self: Box<Self>) -> Result<()>;
}
