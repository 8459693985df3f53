//! Latency classes and the readiness deadline each one gets.
//!
//! The flagship aggregate indices take far longer to render than the
//! component series, so the readiness wait is sized per class.

use std::collections::HashSet;
use std::time::Duration;

/// Readiness budget for slow-class indicators.
pub const SLOW_READINESS_TIMEOUT: Duration = Duration::from_secs(90);

/// Readiness budget for every other indicator.
pub const NORMAL_READINESS_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyClass {
    Slow,
    Normal,
}

/// Mapping from indicator code set to readiness deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessTimeouts {
    slow_codes: HashSet<String>,
    slow: Duration,
    normal: Duration,
}

impl ReadinessTimeouts {
    /// Build a table where `slow_codes` get the slow budget and everything
    /// else the normal one.
    pub fn new<I, S>(slow_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slow_codes: slow_codes.into_iter().map(Into::into).collect(),
            slow: SLOW_READINESS_TIMEOUT,
            normal: NORMAL_READINESS_TIMEOUT,
        }
    }

    /// Override both budgets.
    pub fn with_durations(mut self, slow: Duration, normal: Duration) -> Self {
        self.slow = slow;
        self.normal = normal;
        self
    }

    pub fn class_of(&self, code: &str) -> LatencyClass {
        if self.slow_codes.contains(code) {
            LatencyClass::Slow
        } else {
            LatencyClass::Normal
        }
    }

    pub fn timeout_for(&self, code: &str) -> Duration {
        match self.class_of(code) {
            LatencyClass::Slow => self.slow,
            LatencyClass::Normal => self.normal,
        }
    }

    pub fn slow_codes(&self) -> impl Iterator<Item = &str> {
        self.slow_codes.iter().map(String::as_str)
    }
}

impl Default for ReadinessTimeouts {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}
