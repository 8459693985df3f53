// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sequential batch runner. Indicators are scraped strictly one after another
//! and a failure is recorded against its own indicator only.

use super::{task_failed, Pipeline, Scraper};
use sa_series::{BatchEntry, BatchResult, IndicatorCode};
use std::sync::Arc;
use tracing::info;

impl Scraper {
    /// Scrape every code in order, each through the full pipeline, and
    /// collect one entry per distinct code.
    ///
    /// Never runs two sessions at once and never stops early. A code that
    /// appears more than once is scraped once, at its first position.
    pub async fn run_all(&self, codes: &[IndicatorCode], window: usize) -> BatchResult {
        let pipeline = Arc::clone(&self.pipeline);
        let owned = codes.to_vec();
        let task = tokio::spawn(async move { pipeline.run_all(&owned, window).await });

        match task.await {
            Ok(batch) => batch,
            Err(e) => {
                // Only reachable on runtime shutdown; report it per code.
                let error = task_failed(e);
                let mut batch = BatchResult::new();
                for code in codes {
                    let entry = BatchEntry::from_outcome(code.clone(), Err(error.clone()));
                    batch.insert(code.clone(), entry);
                }
                batch
            }
        }
    }
}

impl Pipeline {
    async fn run_all(&self, codes: &[IndicatorCode], window: usize) -> BatchResult {
        let _turn = self.lock.lock().await;
        let mut batch = BatchResult::new();

        for code in codes {
            if batch.contains(code) {
                continue;
            }
            let outcome = self.run(code, window).await;
            batch.insert(code.clone(), BatchEntry::from_outcome(code.clone(), outcome));
        }

        info!(
            requested = codes.len(),
            succeeded = batch.succeeded(),
            failed = batch.failed(),
            "batch finished"
        );
        batch
    }
}
