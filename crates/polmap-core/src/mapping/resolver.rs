//! Ordered multi-candidate field resolution.
//!
//! A canonical field is resolved by trying an ordered list of source keys
//! against the raw record. A candidate may carry a sub-extraction pattern
//! that pulls the logical field out of a composite "blob" value; a pattern
//! that fails to match is a non-match and resolution moves on. Resolution is
//! deterministic and total: first valid value in priority order, or NotFound.

use regex::Regex;

use super::patterns::{self, PLATE_PLACEHOLDERS};
use crate::error::ValueError;
use crate::models::record::RawExtractionRecord;

/// One (source key, optional sub-extraction pattern) candidate.
#[derive(Debug, Clone, Copy)]
pub struct FieldCandidate {
    pub key: &'static str,
    pub pattern: Option<&'static Regex>,
}

impl FieldCandidate {
    /// Candidate taking the whole value of `key`.
    pub fn plain(key: &'static str) -> Self {
        Self { key, pattern: None }
    }

    /// Candidate extracting a sub-field of `key` via `pattern` (capture
    /// group 1, or the whole match when the pattern has no groups).
    pub fn with_pattern(key: &'static str, pattern: &'static Regex) -> Self {
        Self {
            key,
            pattern: Some(pattern),
        }
    }
}

/// A resolved value together with the source key that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub value: String,
    pub source_key: String,
}

/// Resolve a field against the record, in candidate priority order.
pub fn resolve(
    record: &RawExtractionRecord,
    candidates: &[FieldCandidate],
) -> Result<ResolvedField, ValueError> {
    for candidate in candidates {
        let Some(raw) = record.get(candidate.key) else {
            continue;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let value = match candidate.pattern {
            Some(pattern) => match pattern.captures(raw) {
                Some(caps) => caps
                    .get(1)
                    .or_else(|| caps.get(0))
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default(),
                None => continue,
            },
            None => raw.to_string(),
        };

        if value.is_empty() {
            continue;
        }

        return Ok(ResolvedField {
            value,
            source_key: candidate.key.to_string(),
        });
    }

    Err(ValueError::NotFound)
}

/// Resolve a vehicle plate.
///
/// Labeled candidates are tried first; when the resolved value is itself a
/// placeholder label (literal "PATENTE", "MATRICULA", ...) or nothing
/// resolves, every record value is blind-scanned against the country plate
/// shapes and each match is validated with letter/digit-count heuristics.
pub fn resolve_plate(
    record: &RawExtractionRecord,
    candidates: &[FieldCandidate],
) -> Result<ResolvedField, ValueError> {
    match resolve(record, candidates) {
        Ok(resolved) if !is_plate_placeholder(&resolved.value) => Ok(resolved),
        _ => blind_scan_plate(record),
    }
}

/// Whether a resolved plate value is an OCR placeholder label.
pub fn is_plate_placeholder(value: &str) -> bool {
    let upper = value.trim().to_uppercase();
    PLATE_PLACEHOLDERS.iter().any(|p| upper == *p)
}

fn blind_scan_plate(record: &RawExtractionRecord) -> Result<ResolvedField, ValueError> {
    for (key, value) in record.iter() {
        for pattern in patterns::plate_patterns() {
            for caps in pattern.captures_iter(value) {
                let candidate = caps[1].replace(' ', "");
                if plate_shape_ok(&candidate) {
                    return Ok(ResolvedField {
                        value: candidate,
                        source_key: key.to_string(),
                    });
                }
            }
        }
    }
    Err(ValueError::NotFound)
}

/// Letter/digit-count heuristics for accepting a blind-scanned plate.
fn plate_shape_ok(candidate: &str) -> bool {
    let letters = candidate.chars().filter(|c| c.is_ascii_alphabetic()).count();
    let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
    letters >= 2 && digits >= 3 && (5..=8).contains(&candidate.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::patterns::{ENDORSEMENT_LABEL, POLICY_DIGITS};

    #[test]
    fn test_resolve_priority_order() {
        let record = RawExtractionRecord::from_pairs([
            ("secondary", "222"),
            ("primary", "111"),
        ]);
        let candidates = [
            FieldCandidate::plain("primary"),
            FieldCandidate::plain("secondary"),
        ];

        let resolved = resolve(&record, &candidates).unwrap();
        assert_eq!(resolved.value, "111");
        assert_eq!(resolved.source_key, "primary");
    }

    #[test]
    fn test_resolve_skips_blank_values() {
        let record = RawExtractionRecord::from_pairs([
            ("primary", "   "),
            ("secondary", "fallback"),
        ]);
        let candidates = [
            FieldCandidate::plain("primary"),
            FieldCandidate::plain("secondary"),
        ];

        assert_eq!(resolve(&record, &candidates).unwrap().value, "fallback");
    }

    #[test]
    fn test_resolve_blob_sub_extraction() {
        let record = RawExtractionRecord::from_pairs([(
            "poliza.numero",
            "Nº de Póliza: 1234567",
        )]);
        let candidates = [FieldCandidate::with_pattern("poliza.numero", &POLICY_DIGITS)];

        assert_eq!(resolve(&record, &candidates).unwrap().value, "1234567");
    }

    #[test]
    fn test_resolve_pattern_miss_falls_through() {
        let record = RawExtractionRecord::from_pairs([
            ("blob", "sin numero aqui"),
            ("endoso", "Endoso: 3"),
        ]);
        let candidates = [
            FieldCandidate::with_pattern("blob", &POLICY_DIGITS),
            FieldCandidate::with_pattern("endoso", &ENDORSEMENT_LABEL),
        ];

        assert_eq!(resolve(&record, &candidates).unwrap().value, "3");
    }

    #[test]
    fn test_resolve_not_found_never_panics() {
        let record = RawExtractionRecord::from_pairs([("otro", "dato")]);
        let candidates = [FieldCandidate::plain("inexistente")];

        assert_eq!(resolve(&record, &candidates), Err(ValueError::NotFound));
    }

    #[test]
    fn test_plate_placeholder_triggers_blind_scan() {
        let record = RawExtractionRecord::from_pairs([
            ("vehiculo.matricula", "PATENTE"),
            ("notas", "Unidad SAB1234 al dia"),
        ]);
        let candidates = [FieldCandidate::plain("vehiculo.matricula")];

        let resolved = resolve_plate(&record, &candidates).unwrap();
        assert_eq!(resolved.value, "SAB1234");
        assert_eq!(resolved.source_key, "notas");
    }

    #[test]
    fn test_plate_labeled_value_wins_over_scan() {
        let record = RawExtractionRecord::from_pairs([
            ("vehiculo.matricula", "ABC1234"),
            ("notas", "otra chapa XYZ9876"),
        ]);
        let candidates = [FieldCandidate::plain("vehiculo.matricula")];

        assert_eq!(resolve_plate(&record, &candidates).unwrap().value, "ABC1234");
    }

    #[test]
    fn test_plate_shape_heuristics() {
        assert!(plate_shape_ok("SAB1234"));
        assert!(plate_shape_ok("AB123CD"));
        assert!(!plate_shape_ok("A1"));
        assert!(!plate_shape_ok("ABCDEFGHI"));
    }
}
