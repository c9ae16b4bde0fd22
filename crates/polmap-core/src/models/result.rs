//! Mapping result types: issues, suggestions, metrics, conflict validation.

use serde::{Deserialize, Serialize};

use super::config::QualityThresholds;
use super::policy::{
    CanonicalField, InstallmentSchedule, MappedPolicyData, MappingIntent, ObservationsDocument,
};

/// Why a field needs human attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// No candidate source key yielded a value.
    Missing,
    /// Several catalog entries matched without a clear winner.
    Ambiguous,
    /// A value was found but failed locale parsing or plausibility checks.
    InvalidFormat,
    /// A match was accepted but with low confidence.
    LowConfidence,
}

/// Severity of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

/// A per-field problem recorded during a mapping run. Never mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMappingIssue {
    pub field: CanonicalField,

    /// Raw scanned value, preserved for manual review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned_value: Option<String>,

    pub kind: IssueKind,
    pub severity: IssueSeverity,

    /// Whether the field is required for building a policy request.
    pub required: bool,
}

impl FieldMappingIssue {
    /// Issue for a field no candidate key could resolve.
    pub fn missing(field: CanonicalField) -> Self {
        Self {
            field,
            scanned_value: None,
            kind: IssueKind::Missing,
            severity: if field.is_required() {
                IssueSeverity::Error
            } else {
                IssueSeverity::Warning
            },
            required: field.is_required(),
        }
    }

    /// Issue for a resolved value that failed parsing or plausibility.
    pub fn invalid_format(field: CanonicalField, scanned: impl Into<String>) -> Self {
        Self {
            field,
            scanned_value: Some(scanned.into()),
            kind: IssueKind::InvalidFormat,
            severity: IssueSeverity::Warning,
            required: field.is_required(),
        }
    }

    /// Issue for a catalog lookup with matches but no clear winner.
    pub fn ambiguous(field: CanonicalField, scanned: impl Into<String>) -> Self {
        Self {
            field,
            scanned_value: Some(scanned.into()),
            kind: IssueKind::Ambiguous,
            severity: IssueSeverity::Warning,
            required: field.is_required(),
        }
    }

    /// Issue flagging an accepted but low-confidence match.
    pub fn low_confidence(field: CanonicalField, scanned: impl Into<String>) -> Self {
        Self {
            field,
            scanned_value: Some(scanned.into()),
            kind: IssueKind::LowConfidence,
            severity: IssueSeverity::Info,
            required: field.is_required(),
        }
    }

    /// Whether this issue should count toward "requires attention".
    pub fn needs_attention(&self) -> bool {
        self.required || self.severity >= IssueSeverity::Warning
    }
}

/// Provenance of a master-data match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Case/diacritic-insensitive equality with a catalog name or code.
    Exact,
    /// Similarity-ranked match.
    Fuzzy,
    /// Catalog fallback entry, applied below the confidence floor.
    Default,
}

/// A ranked alternative candidate from catalog reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeMatch {
    pub code: String,
    pub name: String,
    pub confidence: f32,
}

/// Best-match suggestion for one reconciled field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSuggestion {
    pub field: CanonicalField,

    /// Scanned text that was reconciled.
    pub scanned_value: String,

    /// Suggested catalog entry.
    pub suggested_id: i64,
    pub suggested_code: String,
    pub suggested_name: String,

    /// Confidence in [0, 1].
    pub confidence: f32,

    pub source: MatchSource,

    /// Ranked runner-up candidates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<AlternativeMatch>,
}

/// Qualitative bucket for the overall mapping confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingQuality {
    Excellent,
    Good,
    Acceptable,
    NeedsImprovement,
    Problematic,
}

impl MappingQuality {
    /// Bucket a confidence value using configured thresholds.
    pub fn from_confidence(confidence: f32, thresholds: &QualityThresholds) -> Self {
        if confidence >= thresholds.excellent {
            MappingQuality::Excellent
        } else if confidence >= thresholds.good {
            MappingQuality::Good
        } else if confidence >= thresholds.acceptable {
            MappingQuality::Acceptable
        } else if confidence >= thresholds.needs_improvement {
            MappingQuality::NeedsImprovement
        } else {
            MappingQuality::Problematic
        }
    }
}

/// Aggregate counters and quality signal for a mapping run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingMetrics {
    pub fields_scanned: usize,
    pub fields_mapped: usize,
    pub fields_with_issues: usize,
    pub fields_requiring_attention: usize,

    /// Arithmetic mean of per-field suggestion confidences for fields that
    /// required reconciliation.
    pub overall_confidence: f32,

    pub quality: MappingQuality,

    /// Required fields that could not be resolved at all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_critical: Vec<CanonicalField>,
}

/// The complete output of one mapping run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingResult {
    pub intent: MappingIntent,
    pub company_code: String,
    pub data: MappedPolicyData,
    pub issues: Vec<FieldMappingIssue>,
    pub suggestions: Vec<FieldSuggestion>,
    pub metrics: MappingMetrics,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<InstallmentSchedule>,

    pub observations: ObservationsDocument,

    /// Advisory findings from the automatic inspection pass. Never block
    /// processing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<String>,
}

/// Remedial action offered alongside a conflict validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    ModifyExisting,
    RenewExisting,
    CreateNew,
    ReviewPolicyNumber,
}

/// Outcome of the policy-conflict check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictValidation {
    pub is_valid: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_policy_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_status: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<SuggestedAction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_buckets() {
        let t = QualityThresholds::default();
        assert_eq!(MappingQuality::from_confidence(0.95, &t), MappingQuality::Excellent);
        assert_eq!(MappingQuality::from_confidence(0.9, &t), MappingQuality::Excellent);
        assert_eq!(MappingQuality::from_confidence(0.75, &t), MappingQuality::Good);
        assert_eq!(MappingQuality::from_confidence(0.6, &t), MappingQuality::Acceptable);
        assert_eq!(MappingQuality::from_confidence(0.35, &t), MappingQuality::NeedsImprovement);
        assert_eq!(MappingQuality::from_confidence(0.1, &t), MappingQuality::Problematic);
    }

    #[test]
    fn test_quality_respects_configured_thresholds() {
        let t = QualityThresholds {
            excellent: 0.99,
            good: 0.95,
            acceptable: 0.9,
            needs_improvement: 0.8,
        };
        assert_eq!(MappingQuality::from_confidence(0.96, &t), MappingQuality::Good);
        assert_eq!(MappingQuality::from_confidence(0.85, &t), MappingQuality::NeedsImprovement);
    }

    #[test]
    fn test_missing_issue_severity_tracks_required() {
        let required = FieldMappingIssue::missing(CanonicalField::PolicyNumber);
        assert_eq!(required.severity, IssueSeverity::Error);
        assert!(required.needs_attention());

        let optional = FieldMappingIssue::missing(CanonicalField::MotorNumber);
        assert_eq!(optional.severity, IssueSeverity::Warning);
    }
}
