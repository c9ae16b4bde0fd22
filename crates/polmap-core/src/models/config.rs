//! Configuration for the mapping engine.
//!
//! Every tunable constant lives here so tenant overrides stay testable:
//! default fallback values, reconciliation thresholds, quality buckets and
//! the advisory-finding heuristics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main configuration for a [`crate::mapping::PolicyMapper`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Fallback values applied when a field cannot be resolved.
    pub defaults: DefaultValues,

    /// Master-data reconciliation tuning.
    pub reconciliation: ReconciliationConfig,

    /// Confidence thresholds for the qualitative mapping label.
    pub quality: QualityThresholds,

    /// Bounds for the advisory automatic-findings pass.
    pub findings: FindingsConfig,
}

/// Fallback values for unresolved fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultValues {
    /// Currency code when none is detected.
    pub currency: String,

    /// Endorsement number when none is detected.
    pub endorsement: String,

    /// Installment count when none is detected.
    pub installment_count: u32,
}

impl Default for DefaultValues {
    fn default() -> Self {
        Self {
            currency: "UYU".to_string(),
            endorsement: "0".to_string(),
            installment_count: 1,
        }
    }
}

/// Master-data reconciliation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Minimum confidence for accepting a fuzzy match.
    pub min_confidence: f32,

    /// Confidence below which an accepted match is still flagged for
    /// review.
    pub review_confidence: f32,

    /// Number of ranked alternatives retained per suggestion.
    pub top_k: usize,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            review_confidence: 0.7,
            top_k: 3,
        }
    }
}

/// Confidence thresholds bucketing the overall mapping quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub excellent: f32,
    pub good: f32,
    pub acceptable: f32,
    pub needs_improvement: f32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.9,
            good: 0.7,
            acceptable: 0.5,
            needs_improvement: 0.3,
        }
    }
}

/// Bounds for the advisory automatic-findings pass.
///
/// The premium band and validity span are pragmatic heuristics inherited
/// from production data; revisit the exact numbers with the domain owner
/// before treating them as business rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FindingsConfig {
    /// Lower bound of the plausible premium band.
    pub premium_min: Decimal,

    /// Upper bound of the plausible premium band.
    pub premium_max: Decimal,

    /// Maximum plausible validity span in calendar months.
    pub max_validity_months: u32,

    /// Earliest plausible vehicle year.
    pub min_vehicle_year: i32,
}

impl Default for FindingsConfig {
    fn default() -> Self {
        Self {
            premium_min: Decimal::new(1000, 0),
            premium_max: Decimal::new(500_000, 0),
            max_validity_months: 13,
            min_vehicle_year: 1950,
        }
    }
}

impl MapperConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapperConfig::default();
        assert_eq!(config.defaults.currency, "UYU");
        assert_eq!(config.defaults.endorsement, "0");
        assert_eq!(config.reconciliation.top_k, 3);
        assert_eq!(config.findings.premium_min, Decimal::new(1000, 0));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: MapperConfig =
            serde_json::from_str(r#"{"defaults": {"currency": "USD"}}"#).unwrap();
        assert_eq!(config.defaults.currency, "USD");
        assert_eq!(config.defaults.endorsement, "0");
        assert_eq!(config.quality.excellent, 0.9);
    }
}
