//! Core data types for scraped indicator series.

use crate::error::ScrapeError;
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

/// Opaque identifier of one upstream economic series (e.g. `"CMP"`).
///
/// Codes are not checked against the catalog before use; an unknown code
/// fails later, at selection or extraction time.
pub type IndicatorCode = String;

/// An observation value exactly as the chart holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    Number(serde_json::Number),
    Text(String),
}

impl ObservationValue {
    /// Numeric view of the value, parsing text values when possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Build a value from a raw JSON value read off the chart.
    ///
    /// Returns `None` for null, booleans, arrays and objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(Self::Number(n.clone())),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<f64> for ObservationValue {
    fn from(v: f64) -> Self {
        serde_json::Number::from_f64(v)
            .map(Self::Number)
            .unwrap_or_else(|| Self::Text(v.to_string()))
    }
}

impl From<&str> for ObservationValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// One (date, value) point of an indicator series.
///
/// `date` stays in the site's month/year notation (e.g. `"10/1/2025"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub date: String,
    pub value: ObservationValue,
}

impl ObservationRecord {
    pub fn new(date: impl Into<String>, value: impl Into<ObservationValue>) -> Self {
        Self {
            date: date.into(),
            value: value.into(),
        }
    }
}

/// Ordered observations, oldest first, in the order the chart emitted them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSeries(Vec<ObservationRecord>);

impl IndicatorSeries {
    pub fn new(records: Vec<ObservationRecord>) -> Self {
        Self(records)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObservationRecord> {
        self.0.iter()
    }

    /// Look up the observation for an exact site-native date string.
    pub fn find(&self, date: &str) -> Option<&ObservationRecord> {
        self.0.iter().find(|r| r.date == date)
    }

    /// Most recent observation.
    pub fn latest(&self) -> Option<&ObservationRecord> {
        self.0.last()
    }

    pub fn into_records(self) -> Vec<ObservationRecord> {
        self.0
    }
}

impl From<Vec<ObservationRecord>> for IndicatorSeries {
    fn from(records: Vec<ObservationRecord>) -> Self {
        Self(records)
    }
}

impl FromIterator<ObservationRecord> for IndicatorSeries {
    fn from_iter<I: IntoIterator<Item = ObservationRecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IndicatorSeries {
    type Item = &'a ObservationRecord;
    type IntoIter = std::slice::Iter<'a, ObservationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Outcome of one successful indicator scrape. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeResult {
    indicator: IndicatorCode,
    data: IndicatorSeries,
    scraped_at: DateTime<Utc>,
}

impl ScrapeResult {
    pub fn new(indicator: impl Into<IndicatorCode>, data: IndicatorSeries) -> Self {
        Self::at(indicator, data, Utc::now())
    }

    pub fn at(
        indicator: impl Into<IndicatorCode>,
        data: IndicatorSeries,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        Self {
            indicator: indicator.into(),
            data,
            scraped_at,
        }
    }

    pub fn indicator(&self) -> &str {
        &self.indicator
    }

    pub fn data(&self) -> &IndicatorSeries {
        &self.data
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }
}

/// Per-indicator entry of a batch: either a full result or the error that
/// stopped that one indicator.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    Success(ScrapeResult),
    Failure {
        indicator: IndicatorCode,
        error: ScrapeError,
    },
}

impl BatchEntry {
    pub fn from_outcome(
        indicator: impl Into<IndicatorCode>,
        outcome: crate::error::Result<ScrapeResult>,
    ) -> Self {
        match outcome {
            Ok(result) => Self::Success(result),
            Err(error) => Self::Failure {
                indicator: indicator.into(),
                error,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn result(&self) -> Option<&ScrapeResult> {
        match self {
            Self::Success(r) => Some(r),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ScrapeError> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

impl Serialize for BatchEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success(result) => {
                let mut st = serializer.serialize_struct("BatchEntry", 5)?;
                st.serialize_field("success", &true)?;
                st.serialize_field("indicator", result.indicator())?;
                st.serialize_field("data", result.data())?;
                st.serialize_field("count", &result.data().len())?;
                st.serialize_field("scraped_at", &result.scraped_at())?;
                st.end()
            }
            Self::Failure { indicator, error } => {
                let mut st = serializer.serialize_struct("BatchEntry", 4)?;
                st.serialize_field("success", &false)?;
                st.serialize_field("indicator", indicator)?;
                st.serialize_field("error", &error.to_string())?;
                st.serialize_field("error_kind", error.kind())?;
                st.end()
            }
        }
    }
}

/// Results of a batch, keyed by indicator code in request order.
///
/// Serializes as a JSON object whose keys appear in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    entries: Vec<(IndicatorCode, BatchEntry)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the entry for `code`. A code already present keeps its
    /// original position and entry.
    pub fn insert(&mut self, code: impl Into<IndicatorCode>, entry: BatchEntry) -> bool {
        let code = code.into();
        if self.contains(&code) {
            return false;
        }
        self.entries.push((code, entry));
        true
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|(c, _)| c == code)
    }

    pub fn get(&self, code: &str) -> Option<&BatchEntry> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BatchEntry)> {
        self.entries.iter().map(|(c, e)| (c.as_str(), e))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, e)| e.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, entry) in &self.entries {
            map.serialize_entry(code, entry)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series() -> IndicatorSeries {
        vec![
            ObservationRecord::new("8/1/2025", 1.5),
            ObservationRecord::new("9/1/2025", -2.25),
            ObservationRecord::new("10/1/2025", 4.0),
        ]
        .into()
    }

    #[test]
    fn test_find_by_date() {
        let s = series();
        assert_eq!(s.find("10/1/2025").unwrap().value.as_f64(), Some(4.0));
        assert!(s.find("1/1/2030").is_none());
        assert_eq!(s.latest().unwrap().date, "10/1/2025");
    }

    #[test]
    fn test_value_from_json() {
        assert_eq!(
            ObservationValue::from_json(&serde_json::json!("3.1")),
            Some(ObservationValue::Text("3.1".into()))
        );
        assert!(ObservationValue::from_json(&serde_json::Value::Null).is_none());
        assert_eq!(ObservationValue::Text(" 3.1 ".into()).as_f64(), Some(3.1));
    }

    #[test]
    fn test_record_serializes_flat() {
        let json = serde_json::to_value(ObservationRecord::new("9/1/2025", "n/a")).unwrap();
        assert_eq!(json, serde_json::json!({"date": "9/1/2025", "value": "n/a"}));
    }

    #[test]
    fn test_batch_result_keeps_request_order() {
        let at = Utc.with_ymd_and_hms(2025, 11, 3, 12, 0, 0).unwrap();
        let mut batch = BatchResult::new();
        batch.insert("ZED", BatchEntry::Success(ScrapeResult::at("ZED", series(), at)));
        batch.insert(
            "ABC",
            BatchEntry::Failure {
                indicator: "ABC".into(),
                error: ScrapeError::ChartNotFound("no widget".into()),
            },
        );
        assert!(!batch.insert("ZED", BatchEntry::Success(ScrapeResult::at("ZED", IndicatorSeries::default(), at))));

        let text = serde_json::to_string(&batch).unwrap();
        assert!(text.find("\"ZED\"").unwrap() < text.find("\"ABC\"").unwrap());
        assert_eq!(batch.get("ZED").unwrap().result().unwrap().data().len(), 3);
        assert_eq!(batch.succeeded(), 1);
        assert_eq!(batch.failed(), 1);
    }
}
