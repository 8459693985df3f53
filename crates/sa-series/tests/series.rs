//! Integration tests for the series model: windowing, date lookup, and the
//! JSON shapes the HTTP layer relies on.

use assert_json_diff::assert_json_eq;
use chrono::{TimeZone, Utc};
use sa_series::*;
use serde_json::json;

// ─────────────────────── fixtures ───────────────────────

/// Eighteen months of a component index ending October 2025.
fn fixture() -> IndicatorSeries {
    let values = [
        "-5.2", "-3.1", "0.4", "2.8", "6.1", "4.3", "1.0", "-0.7", "-2.9", "3.3", "7.5", "9.0",
        "5.6", "2.2", "-1.4", "0.0", "3.8", "4.6",
    ];
    let mut records = Vec::new();
    let (mut month, mut year) = (5, 2024);
    for v in values {
        records.push(ObservationRecord::new(format!("{month}/1/{year}"), v));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    IndicatorSeries::new(records)
}

// ─────────────────────── windowing ───────────────────────

#[test]
fn window_is_always_a_suffix() {
    let full = fixture();
    for n in [0, 1, 6, 12, 17, 18] {
        let windowed = trim(&full, n);
        assert_eq!(windowed.len(), n);
        assert_eq!(windowed.records(), &full.records()[full.len() - n..]);
    }
    assert_eq!(trim(&full, 19), full);
    assert_eq!(trim(&full, window_from_months(None)), full);
}

#[test]
fn windowed_series_ends_on_latest_month() {
    let windowed = trim(&fixture(), window_from_months(Some(3)));
    let dates: Vec<&str> = windowed.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, ["8/1/2025", "9/1/2025", "10/1/2025"]);
}

// ─────────────────────── lookup ───────────────────────

#[test]
fn known_date_resolves_and_future_date_does_not() {
    let full = fixture();
    let hit = full.find("10/1/2025").expect("fixture holds October 2025");
    assert_eq!(hit.value, ObservationValue::Text("4.6".into()));
    assert!(full.find("1/1/2030").is_none());
}

// ─────────────────────── JSON shapes ───────────────────────

#[test]
fn batch_result_json_shape() {
    let at = Utc.with_ymd_and_hms(2025, 11, 3, 14, 30, 0).unwrap();
    let mut batch = BatchResult::new();
    batch.insert(
        "SHP",
        BatchEntry::from_outcome("SHP", Ok(ScrapeResult::at("SHP", trim(&fixture(), 1), at))),
    );
    batch.insert(
        "BAD",
        BatchEntry::from_outcome(
            "BAD",
            Err(ScrapeError::OptionNotFound { code: "BAD".into() }),
        ),
    );

    assert_json_eq!(
        serde_json::to_value(&batch).unwrap(),
        json!({
            "SHP": {
                "success": true,
                "indicator": "SHP",
                "data": [{"date": "10/1/2025", "value": "4.6"}],
                "count": 1,
                "scraped_at": "2025-11-03T14:30:00Z"
            },
            "BAD": {
                "success": false,
                "indicator": "BAD",
                "error": "selection control has no option for indicator `BAD`",
                "error_kind": "option_not_found"
            }
        })
    );
}
