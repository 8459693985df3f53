// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! sa-scraper runtime library. Drives a headless browser through a
//! client-side charting page and republishes its seasonally-adjusted
//! indicator series over HTTP.
//!
//! This library crate exposes the core modules for integration testing.

pub mod cli;
pub mod config;
pub mod renderer;
pub mod rest;
pub mod scrape;
