// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! The scrape pipeline.
//!
//! One indicator runs open → select → wait → extract → trim → close against
//! its own browser process. The session is closed on every path, including
//! stage failures. A scraper-wide lock keeps scrapes strictly sequential: the
//! upstream site cannot serve concurrent automated sessions.
//!
//! Scrapes run in their own task. A caller that goes away (an HTTP client
//! disconnecting mid-wait) stops waiting for the result, but the pipeline
//! still runs to its own deadlines and closes its session.

pub mod batch;
pub mod extractor;
pub mod readiness;
pub mod selector;

use crate::renderer::{PageSession, Renderer};
use extractor::{ChartExtractor, ChartLayout};
use readiness::{ReadinessWaiter, READINESS_POLL_INTERVAL};
use sa_series::{trim, IndicatorSeries, ReadinessTimeouts, Result, ScrapeError, ScrapeResult};
use selector::{ControlLayout, IndicatorSelector, CONTROL_TIMEOUT, NAVIGATION_TIMEOUT};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tracing::{info, warn};

/// Deadline for a single page interaction (choosing an option, a click,
/// reading the chart once it is ready).
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the pipeline needs to know about the target page.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub target_url: String,
    pub controls: ControlLayout,
    pub chart: ChartLayout,
    pub readiness: ReadinessTimeouts,
    pub navigation_timeout: Duration,
    pub control_timeout: Duration,
    pub action_timeout: Duration,
    pub poll_interval: Duration,
}

impl ScrapeSettings {
    /// Settings with the default page layout and stage deadlines.
    pub fn new(target_url: impl Into<String>, readiness: ReadinessTimeouts) -> Self {
        Self {
            target_url: target_url.into(),
            controls: ControlLayout::default(),
            chart: ChartLayout::default(),
            readiness,
            navigation_timeout: NAVIGATION_TIMEOUT,
            control_timeout: CONTROL_TIMEOUT,
            action_timeout: ACTION_TIMEOUT,
            poll_interval: READINESS_POLL_INTERVAL,
        }
    }
}

/// Run `fut` for at most `limit`. A stalled page call becomes a
/// `ScrapeError::Browser` naming `what`.
pub(crate) async fn bounded<T>(
    limit: Duration,
    what: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ScrapeError::Browser(format!(
            "{what} did not complete within {} ms",
            limit.as_millis()
        ))),
    }
}

/// Stages and the lock, shared with the tasks that run scrapes.
pub(crate) struct Pipeline {
    renderer: Arc<dyn Renderer>,
    selector: IndicatorSelector,
    waiter: ReadinessWaiter,
    extractor: ChartExtractor,
    action_timeout: Duration,
    /// Held for a whole scrape or a whole batch.
    lock: Mutex<()>,
}

/// Runs indicator scrapes one at a time.
pub struct Scraper {
    pipeline: Arc<Pipeline>,
}

impl Scraper {
    pub fn new(renderer: Arc<dyn Renderer>, settings: ScrapeSettings) -> Self {
        let extractor = ChartExtractor::new(settings.chart);
        let selector = IndicatorSelector::new(settings.target_url, settings.controls)
            .with_deadlines(settings.navigation_timeout, settings.control_timeout)
            .with_action_timeout(settings.action_timeout);
        let waiter = ReadinessWaiter::new(settings.readiness, extractor.clone())
            .with_poll_interval(settings.poll_interval);
        Self {
            pipeline: Arc::new(Pipeline {
                renderer,
                selector,
                waiter,
                extractor,
                action_timeout: settings.action_timeout,
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.pipeline.renderer
    }

    pub fn readiness(&self) -> &ReadinessTimeouts {
        self.pipeline.waiter.timeouts()
    }

    /// Scrape one indicator and keep its trailing `window` observations.
    pub async fn scrape(&self, code: &str, window: usize) -> Result<ScrapeResult> {
        let pipeline = Arc::clone(&self.pipeline);
        let code = code.to_string();
        let task = tokio::spawn(async move {
            let _turn = pipeline.lock.lock().await;
            pipeline.run(&code, window).await
        });
        task.await.unwrap_or_else(|e| Err(task_failed(e)))
    }
}

/// A scrape task that panicked or was cancelled by runtime shutdown.
pub(crate) fn task_failed(e: JoinError) -> ScrapeError {
    if e.is_panic() {
        std::panic::resume_unwind(e.into_panic());
    }
    ScrapeError::Browser(format!("scrape task ended early: {e}"))
}

impl Pipeline {
    /// Full pipeline for one indicator. Callers must hold `lock`.
    async fn run(&self, code: &str, window: usize) -> Result<ScrapeResult> {
        info!(indicator = code, "scrape started");
        let mut session = self.renderer.open().await?;

        let outcome = self.drive(session.as_mut(), code).await;

        if let Err(e) = session.close().await {
            warn!(indicator = code, "browser teardown failed: {e}");
        }

        match outcome {
            Ok(series) => {
                let data = trim(&series, window);
                info!(
                    indicator = code,
                    upstream = series.len(),
                    returned = data.len(),
                    "scrape finished"
                );
                Ok(ScrapeResult::new(code, data))
            }
            Err(e) => {
                warn!(indicator = code, kind = e.kind(), "scrape failed: {e}");
                Err(e)
            }
        }
    }

    async fn drive(&self, session: &mut dyn PageSession, code: &str) -> Result<IndicatorSeries> {
        self.selector.select(session, code).await?;
        self.waiter.wait_until_ready(session, code).await?;
        bounded(
            self.action_timeout,
            "chart extraction",
            self.extractor.extract(session),
        )
        .await
    }
}
