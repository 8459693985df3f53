// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run the HTTP API.

use super::{build_scraper, GlobalOptions};
use crate::config;
use crate::rest::{self, AppState};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn run(opts: &GlobalOptions, host: &str, port: u16) -> Result<()> {
    let addr = config::bind_addr(host, port)?;
    let (scraper, catalog) = build_scraper(opts)?;

    info!(
        "starting sa-scraper v{} ({} indicators)",
        env!("CARGO_PKG_VERSION"),
        catalog.len()
    );
    if crate::renderer::chromium::find_chromium().is_none() && opts.chromium_path.is_none() {
        warn!("no Chromium executable found yet; scrapes will fail until one is installed");
    }

    let state = Arc::new(AppState::new(scraper, catalog));
    rest::start(addr, state).await?;
    info!("server stopped");
    Ok(())
}
