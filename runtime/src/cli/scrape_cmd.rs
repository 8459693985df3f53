// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! One-shot scrapes from the command line. Output mirrors the HTTP API.

use super::output;
use super::{build_scraper, GlobalOptions};
use anyhow::{bail, Result};
use sa_series::{window_from_months, ALL_OBSERVATIONS};
use serde_json::json;

/// Scrape a single indicator, optionally looking up one date.
pub async fn run(
    opts: &GlobalOptions,
    indicator: &str,
    months: Option<i64>,
    date: Option<&str>,
) -> Result<()> {
    let (scraper, _) = build_scraper(opts)?;
    let window = if date.is_some() {
        ALL_OBSERVATIONS
    } else {
        window_from_months(months)
    };

    let result = scraper.scrape(indicator, window).await?;

    match date {
        Some(date) => match result.data().find(date) {
            Some(record) => output::print_json(&json!({
                "success": true,
                "indicator": indicator,
                "date": date,
                "value": record.value,
                "scraped_at": result.scraped_at(),
            })),
            None => bail!("no observation for date {date} in {indicator}"),
        },
        None => output::print_json(&json!({
            "success": true,
            "indicator": indicator,
            "data": result.data(),
            "count": result.data().len(),
            "scraped_at": result.scraped_at(),
        })),
    }
}

/// Scrape several indicators sequentially and print the batch result.
pub async fn run_batch(opts: &GlobalOptions, indicators: &[String], months: Option<i64>) -> Result<()> {
    if indicators.is_empty() {
        bail!("no indicators given");
    }
    let (scraper, _) = build_scraper(opts)?;
    let batch = scraper.run_all(indicators, window_from_months(months)).await;
    output::print_json(&batch)?;
    if batch.succeeded() == 0 {
        bail!("all {} indicators failed", batch.len());
    }
    Ok(())
}
