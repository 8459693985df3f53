// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chart extraction: find the page's charting widget and read its data
//! source into an [`IndicatorSeries`].
//!
//! Everything this crate knows about the page's chart object model lives in
//! this file: the container element, the two widget handles, and the record
//! field names. The page is unversioned; when it changes, this is the file to
//! update.

use crate::renderer::chromium::js_string;
use crate::renderer::PageSession;
use sa_series::{IndicatorSeries, ObservationRecord, ObservationValue, Result, ScrapeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The two widget flavors the page may attach to the chart container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartHandle {
    /// Financial (stock) chart.
    Financial,
    /// General-purpose chart.
    General,
}

impl ChartHandle {
    /// Lookup order: the financial chart first, then the general one.
    pub const LOOKUP_ORDER: [ChartHandle; 2] = [ChartHandle::Financial, ChartHandle::General];

    /// jQuery data key under which the widget instance is stored.
    pub fn widget_key(self) -> &'static str {
        match self {
            Self::Financial => "kendoStockChart",
            Self::General => "kendoChart",
        }
    }
}

impl fmt::Display for ChartHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.widget_key())
    }
}

/// Where the chart lives and which record fields carry the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartLayout {
    /// Element the widget is attached to.
    pub container: String,
    /// Month/year field of a data source record.
    pub date_field: String,
    /// Index value field. Only present once "show results" has reloaded the
    /// data source; the initial page state uses a different shape.
    pub value_field: String,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            container: "#chart".to_string(),
            date_field: "monthyear".to_string(),
            value_field: "indexvalue".to_string(),
        }
    }
}

/// What a single look at the chart found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartState {
    /// Neither widget handle resolves.
    Missing,
    /// Widget present, data source empty.
    Empty(ChartHandle),
    /// Data present but shaped for an earlier selection.
    Stale(ChartHandle),
    /// Data present and shaped for a "show results" load.
    Ready(ChartHandle),
}

impl ChartState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Reads chart data out of a page session.
#[derive(Debug, Clone, Default)]
pub struct ChartExtractor {
    layout: ChartLayout,
}

impl ChartExtractor {
    pub fn new(layout: ChartLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    /// Script returning the materialized data source of `handle`, or `null`
    /// when that widget is not attached. Date values are rendered in the
    /// site's `M/D/YYYY` notation.
    pub fn read_script(&self, handle: ChartHandle) -> String {
        format!(
            r#"(() => {{
                const $ = window.jQuery;
                const el = document.querySelector({container});
                if (!$ || !el) return null;
                const widget = $(el).data({key});
                if (!widget || !widget.dataSource) return null;
                const fmt = (v) => v instanceof Date
                    ? (v.getMonth() + 1) + '/' + v.getDate() + '/' + v.getFullYear()
                    : v;
                return widget.dataSource.data().map((r) => {{
                    const plain = typeof r.toJSON === 'function' ? r.toJSON() : r;
                    const out = {{}};
                    for (const k of Object.keys(plain)) out[k] = fmt(r[k]);
                    return out;
                }});
            }})()"#,
            container = js_string(&self.layout.container),
            key = js_string(handle.widget_key()),
        )
    }

    /// Resolve the widget: try each handle in [`ChartHandle::LOOKUP_ORDER`]
    /// and return the first one that yields a data source.
    pub async fn locate(&self, session: &dyn PageSession) -> Result<Option<(ChartHandle, Vec<Value>)>> {
        for handle in ChartHandle::LOOKUP_ORDER {
            match session.evaluate(&self.read_script(handle)).await? {
                Value::Array(records) => return Ok(Some((handle, records))),
                Value::Null => continue,
                other => {
                    return Err(ScrapeError::ChartNotFound(format!(
                        "{handle} data source is not an array: {other}"
                    )))
                }
            }
        }
        Ok(None)
    }

    /// Take one look at the chart without extracting anything.
    pub async fn probe(&self, session: &dyn PageSession) -> Result<ChartState> {
        Ok(match self.locate(session).await? {
            None => ChartState::Missing,
            Some((handle, records)) => self.classify(handle, &records),
        })
    }

    /// Classify a data source by size and first-record shape.
    pub fn classify(&self, handle: ChartHandle, records: &[Value]) -> ChartState {
        match records.first() {
            None => ChartState::Empty(handle),
            Some(first) if self.has_value_field(first) => ChartState::Ready(handle),
            Some(_) => ChartState::Stale(handle),
        }
    }

    fn has_value_field(&self, record: &Value) -> bool {
        record
            .get(&self.layout.value_field)
            .is_some_and(|v| !v.is_null())
    }

    /// Read the chart's data source as an oldest-first series.
    pub async fn extract(&self, session: &dyn PageSession) -> Result<IndicatorSeries> {
        let (handle, records) = self.locate(session).await?.ok_or_else(|| {
            ScrapeError::ChartNotFound(format!(
                "neither {} nor {} is attached to {}",
                ChartHandle::Financial,
                ChartHandle::General,
                self.layout.container
            ))
        })?;
        let series = self.map_records(&records)?;
        tracing::debug!(handle = %handle, records = series.len(), "chart data extracted");
        Ok(series)
    }

    /// Map raw data source records to observations, keeping their order.
    ///
    /// Every record must carry both fields; a record without the value field
    /// belongs to a stale data source and is never passed off as current data.
    pub fn map_records(&self, records: &[Value]) -> Result<IndicatorSeries> {
        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let date = match record.get(&self.layout.date_field) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => {
                        return Err(ScrapeError::ChartNotFound(format!(
                            "record {i} has no `{}` field",
                            self.layout.date_field
                        )))
                    }
                };
                let value = record
                    .get(&self.layout.value_field)
                    .and_then(ObservationValue::from_json)
                    .ok_or_else(|| {
                        ScrapeError::ChartNotFound(format!(
                            "record {i} ({date}) has no `{}` field",
                            self.layout.value_field
                        ))
                    })?;
                Ok(ObservationRecord { date, value })
            })
            .collect::<Result<Vec<_>>>()
            .map(IndicatorSeries::new)
    }
}
