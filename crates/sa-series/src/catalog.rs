//! Indicator catalog: the enumerated set of series the upstream page offers.

use crate::latency::ReadinessTimeouts;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub code: String,
    pub name: String,
    /// Flagship aggregate index that needs the long readiness budget.
    #[serde(default, skip_serializing)]
    pub slow: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog is empty")]
    Empty,

    #[error("duplicate indicator code in catalog: {0}")]
    DuplicateCode(String),
}

/// Ordered list of known indicators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    indicators: Vec<Indicator>,
}

impl Catalog {
    /// Parse a catalog from a JSON array of `{code, name, slow?}` objects.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let indicators: Vec<Indicator> = serde_json::from_str(text)?;
        Self::new(indicators)
    }

    pub fn new(indicators: Vec<Indicator>) -> Result<Self, CatalogError> {
        if indicators.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for ind in &indicators {
            if !seen.insert(ind.code.as_str()) {
                return Err(CatalogError::DuplicateCode(ind.code.clone()));
            }
        }
        tracing::debug!(count = indicators.len(), "indicator catalog loaded");
        Ok(Self { indicators })
    }

    pub fn get(&self, code: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Indicator> {
        self.indicators.iter()
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Readiness table derived from the `slow` flags.
    pub fn readiness_timeouts(&self) -> ReadinessTimeouts {
        ReadinessTimeouts::new(
            self.indicators
                .iter()
                .filter(|i| i.slow)
                .map(|i| i.code.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latency::LatencyClass;

    const SAMPLE: &str = r#"[
        {"code": "CMP", "name": "Composite Index", "slow": true},
        {"code": "SHP", "name": "Shipments"}
    ]"#;

    #[test]
    fn test_parse_and_lookup() {
        let c = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("SHP").unwrap().name, "Shipments");
        assert!(!c.contains("XYZ"));
        let t = c.readiness_timeouts();
        assert_eq!(t.class_of("CMP"), LatencyClass::Slow);
        assert_eq!(t.class_of("SHP"), LatencyClass::Normal);
    }

    #[test]
    fn test_slow_flag_not_exposed() {
        let c = Catalog::from_json(SAMPLE).unwrap();
        let json = serde_json::to_value(c.get("CMP").unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"code": "CMP", "name": "Composite Index"}));
    }

    #[test]
    fn test_rejects_bad_catalogs() {
        assert!(matches!(Catalog::from_json("[]"), Err(CatalogError::Empty)));
        assert!(matches!(
            Catalog::from_json(r#"[{"code":"A","name":"a"},{"code":"A","name":"b"}]"#),
            Err(CatalogError::DuplicateCode(code)) if code == "A"
        ));
        assert!(matches!(Catalog::from_json("{"), Err(CatalogError::Parse(_))));
    }
}
