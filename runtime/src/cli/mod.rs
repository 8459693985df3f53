// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the sa-scraper binary.

pub mod doctor;
pub mod indicators_cmd;
pub mod output;
pub mod scrape_cmd;
pub mod serve;

use crate::config;
use crate::renderer::chromium::ChromiumRenderer;
use crate::scrape::{ScrapeSettings, Scraper};
use anyhow::Result;
use sa_series::Catalog;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub target_url: Option<String>,
    pub chromium_path: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub verbose: bool,
    pub log_json: bool,
}

/// Initialize tracing. `RUST_LOG` overrides the default filter.
pub fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose {
        "sa_scraper=debug,sa_series=debug"
    } else {
        "sa_scraper=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // A subscriber may already be installed (tests); keep it.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Build the catalog and a Chromium-backed scraper from global options.
pub fn build_scraper(opts: &GlobalOptions) -> Result<(Scraper, Catalog)> {
    let catalog = config::load_catalog(opts.catalog.as_deref())?;
    let target = config::parse_target_url(opts.target_url.as_deref())?;
    let settings = ScrapeSettings::new(target.as_str(), catalog.readiness_timeouts());
    let renderer = Arc::new(ChromiumRenderer::new(opts.chromium_path.clone()));
    Ok((Scraper::new(renderer, settings), catalog))
}
