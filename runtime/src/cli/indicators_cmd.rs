// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Print the indicator catalog.

use super::output::{self, Styled};
use super::GlobalOptions;
use crate::config;
use anyhow::Result;
use sa_series::LatencyClass;

pub async fn run(opts: &GlobalOptions, json: bool) -> Result<()> {
    let catalog = config::load_catalog(opts.catalog.as_deref())?;
    if json {
        return output::print_json(&catalog.iter().collect::<Vec<_>>());
    }

    let s = Styled::new();
    let timeouts = catalog.readiness_timeouts();
    for ind in catalog.iter() {
        let class = match timeouts.class_of(&ind.code) {
            LatencyClass::Slow => s.dim(" (slow)"),
            LatencyClass::Normal => String::new(),
        };
        println!("{:<6} {}{class}", ind.code, ind.name);
    }
    Ok(())
}
