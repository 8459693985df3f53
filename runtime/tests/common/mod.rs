//! Fake browser for pipeline tests.
//!
//! `FakeSite` describes how the upstream page behaves; `FakeRenderer` hands
//! out sessions that follow it and records every open/close in a `Tracker`.

#![allow(dead_code)]

use async_trait::async_trait;
use sa_scraper::renderer::{PageSession, Renderer};
use sa_scraper::scrape::extractor::ChartHandle;
use sa_scraper::scrape::{ScrapeSettings, Scraper};
use sa_series::{ReadinessTimeouts, Result, ScrapeError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TARGET_URL: &str = "https://survey.test/indicators";
pub const SELECT: &str = "#indicator";
pub const SHOW: &str = "#btnShow";

/// How the fake page behaves.
#[derive(Debug, Clone)]
pub struct FakeSite {
    pub browser_missing: bool,
    pub navigation_hangs: bool,
    pub control_present: bool,
    /// Selectors that match a clickable "show results" control.
    pub show_selectors: Vec<String>,
    /// Widget attached to the chart container, if any.
    pub handle: Option<ChartHandle>,
    /// Records per selectable indicator code.
    pub series: HashMap<String, Vec<Value>>,
    /// Records the chart shows before a "show results" load lands.
    pub stale_records: Vec<Value>,
    /// Chart reads after the click that still return `stale_records`.
    pub stale_reads: u32,
    /// Codes whose data never arrives.
    pub never_ready: Vec<String>,
    /// Chart reads after the click before the widget disappears.
    pub vanish_after: Option<u32>,
    /// Every script evaluation stalls.
    pub evaluate_hangs: bool,
    /// Script evaluations after the click that fail before one succeeds.
    pub failing_evaluations: u32,
    /// Existence checks for the selection control stall.
    pub control_check_hangs: bool,
    /// Existence checks for the selection control that fail first.
    pub control_check_errors: u32,
    /// Clicks stall.
    pub click_hangs: bool,
}

impl Default for FakeSite {
    fn default() -> Self {
        Self {
            browser_missing: false,
            navigation_hangs: false,
            control_present: true,
            show_selectors: vec![SHOW.to_string()],
            handle: Some(ChartHandle::Financial),
            series: HashMap::new(),
            stale_records: vec![json!({"monthyear": "9/1/2025", "value": 99.9})],
            stale_reads: 0,
            never_ready: Vec::new(),
            vanish_after: None,
            evaluate_hangs: false,
            failing_evaluations: 0,
            control_check_hangs: false,
            control_check_errors: 0,
            click_hangs: false,
        }
    }
}

impl FakeSite {
    pub fn with_series(mut self, code: &str, records: Vec<Value>) -> Self {
        self.series.insert(code.to_string(), records);
        self
    }
}

/// Monthly records `M/1/YYYY` with index values, oldest first, ending 10/1/2025.
pub fn records(values: &[f64]) -> Vec<Value> {
    let n = values.len() as i32;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            // Month index counted back from October 2025.
            let months_back = n - 1 - i as i32;
            let total = 2025 * 12 + 9 - months_back;
            let (year, month) = (total / 12, total % 12 + 1);
            json!({"monthyear": format!("{month}/1/{year}"), "indexvalue": v})
        })
        .collect()
}

/// Open/close bookkeeping shared by a renderer and all of its sessions.
#[derive(Debug, Default)]
pub struct Tracker {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub live: AtomicUsize,
    pub max_live: AtomicUsize,
    pub chosen: Mutex<Vec<String>>,
}

impl Tracker {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn chosen(&self) -> Vec<String> {
        self.chosen.lock().unwrap().clone()
    }
}

pub struct FakeRenderer {
    pub site: FakeSite,
    pub tracker: Arc<Tracker>,
}

impl FakeRenderer {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            tracker: Arc::new(Tracker::default()),
        }
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        if self.site.browser_missing {
            return Err(ScrapeError::BrowserUnavailable("no executable".into()));
        }
        self.tracker.opened.fetch_add(1, Ordering::SeqCst);
        let live = self.tracker.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.tracker.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            site: self.site.clone(),
            tracker: Arc::clone(&self.tracker),
            state: Mutex::new(SessionState::default()),
        }))
    }

    fn live_sessions(&self) -> usize {
        self.tracker.live.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    chosen: Option<String>,
    clicked: bool,
    reads_after_click: u32,
    failed_evaluations: u32,
    failed_control_checks: u32,
}

pub struct FakeSession {
    site: FakeSite,
    tracker: Arc<Tracker>,
    state: Mutex<SessionState>,
}

impl FakeSession {
    fn chart_read(&self) -> Value {
        let mut state = self.state.lock().unwrap();
        if !state.clicked {
            return Value::Array(self.site.stale_records.clone());
        }
        state.reads_after_click += 1;
        let reads = state.reads_after_click;

        if self.site.vanish_after.is_some_and(|limit| reads > limit) {
            return Value::Null;
        }
        let code = state.chosen.clone().unwrap_or_default();
        if self.site.never_ready.contains(&code) || reads <= self.site.stale_reads {
            return Value::Array(self.site.stale_records.clone());
        }
        Value::Array(self.site.series.get(&code).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        assert_eq!(url, TARGET_URL);
        if self.site.navigation_hangs {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        if self.site.evaluate_hangs {
            tokio::time::sleep(Duration::from_secs(300)).await;
        }
        {
            let mut state = self.state.lock().unwrap();
            if state.clicked && state.failed_evaluations < self.site.failing_evaluations {
                state.failed_evaluations += 1;
                return Err(ScrapeError::Browser(
                    "Execution context was destroyed".into(),
                ));
            }
        }
        match self.site.handle {
            Some(handle) if script.contains(&format!("\"{}\"", handle.widget_key())) => {
                Ok(self.chart_read())
            }
            _ => Ok(Value::Null),
        }
    }

    async fn element_exists(&self, selector: &str) -> Result<bool> {
        if self.site.control_check_hangs {
            tokio::time::sleep(Duration::from_secs(300)).await;
        }
        {
            let mut state = self.state.lock().unwrap();
            if state.failed_control_checks < self.site.control_check_errors {
                state.failed_control_checks += 1;
                return Err(ScrapeError::Browser("Cannot find context".into()));
            }
        }
        Ok(selector == SELECT && self.site.control_present)
    }

    async fn choose_option(&self, selector: &str, value: &str) -> Result<bool> {
        assert_eq!(selector, SELECT);
        if !self.site.series.contains_key(value) && !self.site.never_ready.iter().any(|c| c == value) {
            return Ok(false);
        }
        self.tracker.chosen.lock().unwrap().push(value.to_string());
        self.state.lock().unwrap().chosen = Some(value.to_string());
        Ok(true)
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        if self.site.click_hangs {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if !self.site.show_selectors.iter().any(|s| s == selector) {
            return Ok(false);
        }
        let mut state = self.state.lock().unwrap();
        state.clicked = true;
        state.reads_after_click = 0;
        Ok(true)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.tracker.closed.fetch_add(1, Ordering::SeqCst);
        self.tracker.live.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Readiness table with the two flagship indices in the slow class.
pub fn readiness() -> ReadinessTimeouts {
    ReadinessTimeouts::new(["CMP", "GBA"])
}

/// A scraper over `site`, plus the tracker of its renderer.
pub fn scraper(site: FakeSite) -> (Scraper, Arc<Tracker>) {
    let renderer = FakeRenderer::new(site);
    let tracker = Arc::clone(&renderer.tracker);
    let settings = ScrapeSettings::new(TARGET_URL, readiness());
    (Scraper::new(Arc::new(renderer), settings), tracker)
}
