// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Readiness waiting: poll the chart until it holds data for the indicator
//! that was just selected.
//!
//! The page exposes no "loaded" signal. Ready means the widget exists, its
//! data source is non-empty, and the first record carries the field a
//! "show results" load produces. The last condition rejects the data left
//! over from whatever the page showed before the click.

use super::extractor::{ChartExtractor, ChartHandle, ChartState};
use crate::renderer::PageSession;
use sa_series::{ReadinessTimeouts, Result, ScrapeError};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Interval between chart probes.
pub const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Blocks until the chart is ready or the indicator's budget runs out.
#[derive(Debug, Clone)]
pub struct ReadinessWaiter {
    timeouts: ReadinessTimeouts,
    poll_interval: Duration,
    extractor: ChartExtractor,
}

impl ReadinessWaiter {
    pub fn new(timeouts: ReadinessTimeouts, extractor: ChartExtractor) -> Self {
        Self {
            timeouts,
            poll_interval: READINESS_POLL_INTERVAL,
            extractor,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn timeouts(&self) -> &ReadinessTimeouts {
        &self.timeouts
    }

    /// Poll until ready. Fails with `ReadinessTimeout` once the budget for
    /// `code`'s latency class has elapsed, including while a probe is still
    /// waiting on the page.
    ///
    /// A probe that errors (the page may be replacing its document after the
    /// click) counts as not ready yet.
    pub async fn wait_until_ready(
        &self,
        session: &dyn PageSession,
        code: &str,
    ) -> Result<ChartHandle> {
        let budget = self.timeouts.timeout_for(code);
        let started = Instant::now();

        let poll = async {
            let mut polls = 0u32;
            loop {
                polls += 1;
                match self.extractor.probe(session).await {
                    Ok(ChartState::Ready(handle)) => return (handle, polls),
                    Ok(state) => debug!(indicator = code, ?state, "chart not ready"),
                    Err(e) => debug!(indicator = code, error = %e, "chart probe failed"),
                }
                sleep(self.poll_interval).await;
            }
        };

        match tokio::time::timeout(budget, poll).await {
            Ok((handle, polls)) => {
                info!(
                    indicator = code,
                    handle = %handle,
                    polls,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "chart ready"
                );
                Ok(handle)
            }
            Err(_) => Err(ScrapeError::ReadinessTimeout {
                code: code.to_string(),
                timeout_ms: budget.as_millis() as u64,
            }),
        }
    }
}
