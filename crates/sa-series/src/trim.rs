//! Trailing-window selection over a series.

use crate::types::IndicatorSeries;

/// Window size meaning "every observation". Larger than any real series.
pub const ALL_OBSERVATIONS: usize = usize::MAX;

/// Return the last `n` observations of `series`, or all of them when
/// `n >= series.len()`. The input is left untouched.
pub fn trim(series: &IndicatorSeries, n: usize) -> IndicatorSeries {
    let records = series.records();
    let start = records.len().saturating_sub(n);
    IndicatorSeries::new(records[start..].to_vec())
}

/// Convert a requested month count into a window size.
///
/// Missing, zero, or negative counts select the whole series.
pub fn window_from_months(months: Option<i64>) -> usize {
    match months {
        Some(m) if m > 0 => usize::try_from(m).unwrap_or(ALL_OBSERVATIONS),
        _ => ALL_OBSERVATIONS,
    }
}
