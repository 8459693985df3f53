//! Scrape error taxonomy.
//!
//! Every pipeline stage fails with exactly one of these variants and the error
//! travels upward unmodified. Nothing in the pipeline retries.

/// Result alias used throughout the scrape pipeline.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// All the ways a single indicator scrape can fail.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    /// No browser executable could be located or launched.
    #[error("browser unavailable: {0}")]
    BrowserUnavailable(String),

    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("selection control `{selector}` not found within {timeout_ms}ms")]
    ControlNotFound { selector: String, timeout_ms: u64 },

    /// The selection control exists but offers no option for the code.
    #[error("selection control has no option for indicator `{code}`")]
    OptionNotFound { code: String },

    #[error("show-results control not found (tried {selectors})")]
    ActionControlNotFound { selectors: String },

    /// The chart never showed data for the selected indicator in time.
    #[error("chart data for `{code}` not ready within {timeout_ms}ms")]
    ReadinessTimeout { code: String, timeout_ms: u64 },

    /// The page's chart object model did not match what the extractor expects.
    /// This means the upstream page changed, not that the request should be retried.
    #[error("chart not found: {0}")]
    ChartNotFound(String),

    /// Unexpected failure talking to the browser inside a stage.
    #[error("browser error: {0}")]
    Browser(String),
}

impl ScrapeError {
    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BrowserUnavailable(_) => "browser_unavailable",
            Self::NavigationTimeout { .. } => "navigation_timeout",
            Self::ControlNotFound { .. } => "control_not_found",
            Self::OptionNotFound { .. } => "option_not_found",
            Self::ActionControlNotFound { .. } => "action_control_not_found",
            Self::ReadinessTimeout { .. } => "readiness_timeout",
            Self::ChartNotFound(_) => "chart_not_found",
            Self::Browser(_) => "browser_error",
        }
    }

    /// Whether a later attempt could plausibly succeed without a code change.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NavigationTimeout { .. } | Self::ReadinessTimeout { .. } | Self::Browser(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = ScrapeError::ReadinessTimeout {
            code: "CMP".into(),
            timeout_ms: 90_000,
        };
        assert_eq!(err.to_string(), "chart data for `CMP` not ready within 90000ms");
        assert_eq!(err.kind(), "readiness_timeout");
        assert!(err.is_transient());
    }

    #[test]
    fn test_structural_errors_are_not_transient() {
        assert!(!ScrapeError::ChartNotFound("no widget".into()).is_transient());
        assert!(!ScrapeError::BrowserUnavailable("missing".into()).is_transient());
        assert!(!ScrapeError::OptionNotFound { code: "XYZ".into() }.is_transient());
    }
}
