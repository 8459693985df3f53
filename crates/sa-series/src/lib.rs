//! sa-series: data model for seasonally-adjusted indicator series scraped from
//! a client-side charting page.
//!
//! The crate is pure: no browser, no I/O beyond parsing. The `sa-scraper`
//! runtime drives the browser and produces the types defined here.

pub mod catalog;
pub mod error;
pub mod latency;
pub mod trim;
pub mod types;

pub use catalog::{Catalog, CatalogError, Indicator};
pub use error::{Result, ScrapeError};
pub use latency::{LatencyClass, ReadinessTimeouts};
pub use trim::{trim, window_from_months, ALL_OBSERVATIONS};
pub use types::*;
