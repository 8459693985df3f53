// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment readiness check.

use super::output::{self, Styled};
use super::GlobalOptions;
use crate::config;
use crate::renderer::chromium::{browser_cache_dir, resolve_executable, search_cache_dir};
use anyhow::Result;
use std::process::Command;

/// Minimum memory for one headless Chromium plus the page's chart scripts.
const MIN_MEMORY_MB: u64 = 512;

/// Check browser resolution, configuration, and available memory.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let s = Styled::new();
    let mut ready = true;

    output::print_section(&s, "System");
    output::print_check(&s.ok_sym(), "OS", std::env::consts::OS);
    output::print_check(&s.ok_sym(), "Arch", std::env::consts::ARCH);
    match get_available_memory_mb() {
        Some(mb) if mb >= MIN_MEMORY_MB => {
            output::print_check(&s.ok_sym(), "Memory", &format!("{mb}MB available"))
        }
        Some(mb) => output::print_check(
            &s.warn_sym(),
            "Memory",
            &format!("{mb}MB available (< {MIN_MEMORY_MB}MB, Chromium may be killed)"),
        ),
        None => output::print_check(&s.warn_sym(), "Memory", "could not determine"),
    }
    eprintln!();

    output::print_section(&s, "Browser");
    let cache = browser_cache_dir();
    let cached = cache.as_deref().and_then(search_cache_dir);
    match (&cache, &cached) {
        (Some(dir), Some(bin)) => output::print_check(
            &s.ok_sym(),
            "Cache",
            &format!("{} ({})", dir.display(), bin.display()),
        ),
        (Some(dir), None) => {
            output::print_check(&s.warn_sym(), "Cache", &format!("{} (empty)", dir.display()))
        }
        (None, _) => output::print_check(&s.warn_sym(), "Cache", "no cache directory"),
    }
    match resolve_executable(opts.chromium_path.as_deref()) {
        Ok(path) => output::print_check(&s.ok_sym(), "Executable", &path.display().to_string()),
        Err(e) => {
            ready = false;
            output::print_check(&s.fail_sym(), "Executable", &e.to_string());
        }
    }
    eprintln!();

    output::print_section(&s, "Configuration");
    match config::parse_target_url(opts.target_url.as_deref()) {
        Ok(url) => output::print_check(&s.ok_sym(), "Target page", url.as_str()),
        Err(e) => {
            ready = false;
            output::print_check(&s.fail_sym(), "Target page", &format!("{e:#}"));
        }
    }
    match config::load_catalog(opts.catalog.as_deref()) {
        Ok(catalog) => {
            let slow = catalog.readiness_timeouts().slow_codes().count();
            output::print_check(
                &s.ok_sym(),
                "Catalog",
                &format!("{} indicators, {slow} slow", catalog.len()),
            );
        }
        Err(e) => {
            ready = false;
            output::print_check(&s.fail_sym(), "Catalog", &format!("{e:#}"));
        }
    }

    eprintln!();
    eprintln!(
        "  {}: {}",
        s.bold("Status"),
        if ready { "READY" } else { "NOT READY" }
    );
    Ok(())
}

/// Get available memory in MB (platform-specific).
fn get_available_memory_mb() -> Option<u64> {
    #[cfg(target_os = "macos")]
    {
        let output = Command::new("sysctl")
            .args(["-n", "hw.memsize"])
            .output()
            .ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        let bytes: u64 = s.trim().parse().ok()?;
        Some(bytes / 1_048_576)
    }
    #[cfg(target_os = "linux")]
    {
        let output = Command::new("free").args(["-m"]).output().ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        for line in s.lines() {
            if line.starts_with("Mem:") {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 7 {
                    return parts[6].parse().ok();
                }
            }
        }
        None
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        None
    }
}
