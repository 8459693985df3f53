// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.
//!
//! Every [`Renderer::open`] call resolves the executable, launches its own
//! headless Chromium process and hands back a [`ChromiumSession`] that owns
//! it. Closing the session terminates the process.

use super::{PageSession, Renderer};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use sa_series::{Result, ScrapeError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit browser executable.
pub const CHROMIUM_PATH_ENV: &str = "SA_SCRAPER_CHROMIUM_PATH";

/// Environment variable naming the browser download cache to search.
pub const BROWSER_CACHE_ENV: &str = "SA_SCRAPER_BROWSER_CACHE";

/// Launch flags for unattended hosts. The host may forbid both the OS-level
/// sandbox and a usable `/dev/shm`.
const LAUNCH_ARGS: &[&str] = &[
    "--headless=new",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-background-networking",
];

/// Directory where downloaded browsers are cached (puppeteer layout).
pub fn browser_cache_dir() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(BROWSER_CACHE_ENV) {
        return Some(PathBuf::from(p));
    }
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .map(|c| c.join("puppeteer"))
}

/// Search a puppeteer-style cache (`<root>/chrome/<platform>-<version>/...`)
/// for a browser binary. The highest version directory wins.
pub fn search_cache_dir(root: &Path) -> Option<PathBuf> {
    let chrome_root = root.join("chrome");
    let mut versions: Vec<PathBuf> = std::fs::read_dir(&chrome_root)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    versions.sort();

    for version_dir in versions.into_iter().rev() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                version_dir.join("chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                version_dir.join("chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
            ]
        } else {
            vec![
                version_dir.join("chrome-linux64/chrome"),
                version_dir.join("chrome-linux/chrome"),
            ]
        };
        if let Some(found) = candidates.into_iter().find(|c| c.is_file()) {
            return Some(found);
        }
    }
    None
}

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SA_SCRAPER_CHROMIUM_PATH env
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Browser download cache
    if let Some(found) = browser_cache_dir().and_then(|dir| search_cache_dir(&dir)) {
        return Some(found);
    }

    // 3. System PATH
    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Resolve the executable to launch, honoring an explicit override first.
///
/// An override that does not exist is an error rather than a silent fallback.
pub fn resolve_executable(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => Err(ScrapeError::BrowserUnavailable(format!(
            "configured browser executable does not exist: {}",
            path.display()
        ))),
        None => find_chromium().ok_or_else(|| {
            ScrapeError::BrowserUnavailable(format!(
                "no Chromium executable found (set {CHROMIUM_PATH_ENV} or install one into the browser cache)"
            ))
        }),
    }
}

/// Chromium-based renderer. Holds no browser between sessions.
pub struct ChromiumRenderer {
    executable: Option<PathBuf>,
    live: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a renderer. `executable` overrides binary discovery.
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self {
            executable,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        let chrome_path = resolve_executable(self.executable.as_deref())?;
        debug!(path = %chrome_path.display(), "launching Chromium");

        let mut builder = BrowserConfig::builder().chrome_executable(&chrome_path);
        for arg in LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }
        let config = builder.build().map_err(|e| {
            ScrapeError::BrowserUnavailable(format!("failed to build browser config: {e}"))
        })?;

        let (mut browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            ScrapeError::BrowserUnavailable(format!(
                "failed to launch {}: {e}",
                chrome_path.display()
            ))
        })?;

        // Drive the CDP connection until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.kill().await;
                handler_task.abort();
                return Err(ScrapeError::BrowserUnavailable(format!(
                    "failed to open page: {e}"
                )));
            }
        };

        let live = LiveGuard::register(&self.live);
        info!(live = self.live.load(Ordering::SeqCst), "browser session opened");

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
            _live: live,
        }))
    }

    fn live_sessions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// One counted entry in a renderer's live-session total, released on drop.
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn register(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(live))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A browser process plus the single page the pipeline drives.
///
/// Dropping a session without `close` still stops the CDP handler and
/// releases its live count; chromiumoxide kills the process on drop.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    _live: LiveGuard,
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

fn cdp_error(what: &str, e: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Browser(format!("{what}: {e}"))
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let start = Instant::now();
        self.page
            .goto(url)
            .await
            .map_err(|e| cdp_error("navigation failed", e))?;
        // Wait for page to be loaded
        let _ = self.page.wait_for_navigation().await;
        debug!(url, load_time_ms = start.elapsed().as_millis() as u64, "page loaded");
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| cdp_error("JS execution failed", e))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn element_exists(&self, selector: &str) -> Result<bool> {
        let script = format!(
            "document.querySelector({}) !== null",
            js_string(selector)
        );
        Ok(self.evaluate(&script).await?.as_bool().unwrap_or(false))
    }

    async fn choose_option(&self, selector: &str, value: &str) -> Result<bool> {
        // Pick the option element itself, the way the native dropdown does,
        // then let the control's listeners see input and change.
        let script = format!(
            r#"(() => {{
                const select = document.querySelector({sel});
                if (!select) return false;
                const option = Array.from(select.options || []).find((o) => o.value === {val});
                if (!option) return false;
                select.focus();
                for (const o of select.options) o.selected = (o === option);
                select.dispatchEvent(new Event('input', {{ bubbles: true }}));
                select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = js_string(selector),
            val = js_string(value),
        );
        Ok(self.evaluate(&script).await?.as_bool().unwrap_or(false))
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        if !self.element_exists(selector).await? {
            return Ok(false);
        }
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| cdp_error("failed to resolve element", e))?;
        // Element::click scrolls into view and dispatches CDP mouse input,
        // so the page sees a trusted click.
        element
            .click()
            .await
            .map_err(|e| cdp_error("click failed", e))?;
        Ok(true)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut session = self;
        let _ = session.page.clone().close().await;
        let closed = session.browser.close().await;
        if closed.is_err() {
            // The CDP connection is gone; make sure the process is too.
            let _ = session.browser.kill().await;
        }
        if let Err(e) = session.browser.wait().await {
            warn!("failed to reap browser process: {e}");
        }
        // Dropping the session aborts the handler and releases the count.
        drop(session);

        closed
            .map(|_| ())
            .map_err(|e| cdp_error("browser close failed", e))
    }
}

/// Encode a Rust string as a JavaScript string literal.
pub(crate) fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
