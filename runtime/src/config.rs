// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration loading and resolution.
//!
//! Command-line flags win over `SA_SCRAPER_*` environment variables (clap
//! reads both), which win over the defaults here.

use anyhow::{bail, Context, Result};
use sa_series::Catalog;
use std::net::SocketAddr;
use std::path::Path;
use url::Url;

/// Indicator catalog compiled into the binary.
pub const BUILTIN_CATALOG: &str = include_str!("catalog.json");

pub const TARGET_URL_ENV: &str = "SA_SCRAPER_TARGET_URL";
pub const CATALOG_ENV: &str = "SA_SCRAPER_CATALOG";
pub const HOST_ENV: &str = "SA_SCRAPER_HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "SA_SCRAPER_LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Load the catalog from `path`, or the built-in one when no path is given.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog: {}", path.display()))?;
            Catalog::from_json(&text)
                .with_context(|| format!("invalid catalog: {}", path.display()))
        }
        None => Catalog::from_json(BUILTIN_CATALOG).context("built-in catalog is invalid"),
    }
}

/// Parse and check the target page URL. Only http and https are accepted.
pub fn parse_target_url(raw: Option<&str>) -> Result<Url> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        bail!("no target page configured; pass --target-url or set {TARGET_URL_ENV}");
    };
    let url = Url::parse(raw).with_context(|| format!("invalid target URL: {raw}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("unsupported target URL scheme `{other}` (expected http or https)"),
    }
}

/// Resolve the HTTP listen address.
pub fn bind_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))
}

/// Whether JSON log output was requested through the environment.
pub fn json_logs_from_env() -> bool {
    std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_series::LatencyClass;

    #[test]
    fn test_builtin_catalog_has_two_slow_indices() {
        let catalog = load_catalog(None).unwrap();
        let timeouts = catalog.readiness_timeouts();
        let slow: Vec<&str> = catalog
            .iter()
            .filter(|i| timeouts.class_of(&i.code) == LatencyClass::Slow)
            .map(|i| i.code.as_str())
            .collect();
        assert_eq!(slow, ["CMP", "GBA"]);
    }

    #[test]
    fn test_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"[{"code":"X1","name":"Test Series"}]"#).unwrap();
        let catalog = load_catalog(Some(&path)).unwrap();
        assert_eq!(catalog.len(), 1);

        std::fs::write(&path, "not json").unwrap();
        let err = load_catalog(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("invalid catalog"));
    }

    #[test]
    fn test_target_url_validation() {
        assert!(parse_target_url(Some("https://example.org/survey")).is_ok());
        assert!(parse_target_url(None).is_err());
        assert!(parse_target_url(Some("   ")).is_err());
        assert!(parse_target_url(Some("ftp://example.org")).is_err());
        assert!(parse_target_url(Some("not a url")).is_err());
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(bind_addr("127.0.0.1", 8080).unwrap().port(), 8080);
        assert!(bind_addr("nope", 1).is_err());
    }
}
