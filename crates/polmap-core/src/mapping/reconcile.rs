//! Master-data reconciliation with confidence scoring.
//!
//! Matches resolved text values against reference catalogs. Exact matches
//! (case- and diacritic-insensitive) score 1.0; everything else is ranked by
//! the maximum of Jaro-Winkler similarity and token overlap, both monotonic
//! in shared tokens / edit proximity.

use tracing::debug;

use crate::models::catalog::{Catalog, CatalogEntry};
use crate::models::config::ReconciliationConfig;
use crate::models::policy::CanonicalField;
use crate::models::result::{
    AlternativeMatch, FieldMappingIssue, FieldSuggestion, MatchSource,
};

/// Outcome of reconciling one field against a catalog.
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// A usable suggestion, possibly flagged for review by the caller.
    Suggestion(FieldSuggestion),
    /// No suggestion could be made; the issue describes why.
    Issue(FieldMappingIssue),
}

/// Reconcile a scanned value against a catalog.
pub fn suggest(
    field: CanonicalField,
    scanned: &str,
    catalog: &Catalog,
    config: &ReconciliationConfig,
) -> ReconcileOutcome {
    if catalog.is_empty() {
        return ReconcileOutcome::Issue(FieldMappingIssue::missing(field));
    }

    let needle = fold(scanned);

    // Exact match on canonical name or code
    for entry in &catalog.entries {
        if fold(&entry.name) == needle || fold(&entry.code) == needle {
            return ReconcileOutcome::Suggestion(FieldSuggestion {
                field,
                scanned_value: scanned.to_string(),
                suggested_id: entry.id,
                suggested_code: entry.code.clone(),
                suggested_name: entry.name.clone(),
                confidence: 1.0,
                source: MatchSource::Exact,
                alternatives: Vec::new(),
            });
        }
    }

    // Fuzzy ranking over the whole catalog
    let mut ranked: Vec<(&CatalogEntry, f32)> = catalog
        .entries
        .iter()
        .map(|entry| (entry, similarity(&needle, &fold(&entry.name))))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (best, best_score) = ranked[0];
    if best_score >= config.min_confidence {
        let alternatives = ranked
            .iter()
            .skip(1)
            .take(config.top_k)
            .filter(|(_, score)| *score > 0.0)
            .map(|(entry, score)| AlternativeMatch {
                code: entry.code.clone(),
                name: entry.name.clone(),
                confidence: *score,
            })
            .collect();

        return ReconcileOutcome::Suggestion(FieldSuggestion {
            field,
            scanned_value: scanned.to_string(),
            suggested_id: best.id,
            suggested_code: best.code.clone(),
            suggested_name: best.name.clone(),
            confidence: best_score,
            source: MatchSource::Fuzzy,
            alternatives,
        });
    }

    // Below the floor: catalog default, or an issue
    if let Some(default) = catalog.default_entry() {
        debug!(
            "no match for {} value {:?}, applying catalog default {}",
            field, scanned, default.code
        );
        return ReconcileOutcome::Suggestion(FieldSuggestion {
            field,
            scanned_value: scanned.to_string(),
            suggested_id: default.id,
            suggested_code: default.code.clone(),
            suggested_name: default.name.clone(),
            confidence: config.min_confidence,
            source: MatchSource::Default,
            alternatives: Vec::new(),
        });
    }

    if best_score > 0.0 {
        ReconcileOutcome::Issue(FieldMappingIssue::ambiguous(field, scanned))
    } else {
        ReconcileOutcome::Issue(FieldMappingIssue::missing(field))
    }
}

/// Similarity in [0, 1]: max of Jaro-Winkler and token overlap.
fn similarity(a: &str, b: &str) -> f32 {
    let jw = strsim::jaro_winkler(a, b) as f32;
    jw.max(token_overlap(a, b))
}

/// Shared tokens over the larger token count.
fn token_overlap(a: &str, b: &str) -> f32 {
    let tokens_a: Vec<&str> = a.split_whitespace().collect();
    let tokens_b: Vec<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let shared = tokens_a.iter().filter(|t| tokens_b.contains(t)).count();
    shared as f32 / tokens_a.len().max(tokens_b.len()) as f32
}

/// Lowercase and fold Spanish diacritics for lookup comparison.
fn fold(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departments() -> Catalog {
        Catalog::new(vec![
            CatalogEntry {
                id: 1,
                code: "MVD".to_string(),
                name: "Montevideo".to_string(),
            },
            CatalogEntry {
                id: 2,
                code: "CAN".to_string(),
                name: "Canelones".to_string(),
            },
            CatalogEntry {
                id: 3,
                code: "PAY".to_string(),
                name: "Paysandú".to_string(),
            },
        ])
    }

    fn config() -> ReconciliationConfig {
        ReconciliationConfig::default()
    }

    #[test]
    fn test_exact_match_is_confidence_one() {
        let outcome = suggest(CanonicalField::Department, "MONTEVIDEO", &departments(), &config());
        match outcome {
            ReconcileOutcome::Suggestion(s) => {
                assert_eq!(s.confidence, 1.0);
                assert_eq!(s.source, MatchSource::Exact);
                assert_eq!(s.suggested_code, "MVD");
                assert!(s.alternatives.is_empty());
            }
            ReconcileOutcome::Issue(_) => panic!("expected suggestion"),
        }
    }

    #[test]
    fn test_exact_match_ignores_diacritics() {
        let outcome = suggest(CanonicalField::Department, "paysandu", &departments(), &config());
        match outcome {
            ReconcileOutcome::Suggestion(s) => {
                assert_eq!(s.source, MatchSource::Exact);
                assert_eq!(s.suggested_code, "PAY");
            }
            ReconcileOutcome::Issue(_) => panic!("expected suggestion"),
        }
    }

    #[test]
    fn test_exact_match_on_code() {
        let outcome = suggest(CanonicalField::Department, "can", &departments(), &config());
        match outcome {
            ReconcileOutcome::Suggestion(s) => {
                assert_eq!(s.source, MatchSource::Exact);
                assert_eq!(s.suggested_id, 2);
            }
            ReconcileOutcome::Issue(_) => panic!("expected suggestion"),
        }
    }

    #[test]
    fn test_fuzzy_match_with_alternatives() {
        // OCR noise: one character off
        let outcome = suggest(CanonicalField::Department, "MONTEVIDE0", &departments(), &config());
        match outcome {
            ReconcileOutcome::Suggestion(s) => {
                assert_eq!(s.source, MatchSource::Fuzzy);
                assert_eq!(s.suggested_code, "MVD");
                assert!(s.confidence > 0.8);
                assert!(s.alternatives.len() <= config().top_k);
            }
            ReconcileOutcome::Issue(_) => panic!("expected suggestion"),
        }
    }

    #[test]
    fn test_unmatched_without_default_yields_issue() {
        let outcome = suggest(CanonicalField::Department, "XQZWK", &departments(), &config());
        assert!(matches!(outcome, ReconcileOutcome::Issue(_)));
    }

    #[test]
    fn test_unmatched_with_default_yields_default_suggestion() {
        let catalog = departments().with_default("MVD");
        let outcome = suggest(CanonicalField::Department, "XQZWK", &catalog, &config());
        match outcome {
            ReconcileOutcome::Suggestion(s) => {
                assert_eq!(s.source, MatchSource::Default);
                assert_eq!(s.suggested_code, "MVD");
            }
            ReconcileOutcome::Issue(_) => panic!("expected default suggestion"),
        }
    }

    #[test]
    fn test_empty_catalog_yields_issue() {
        let outcome = suggest(CanonicalField::Department, "Montevideo", &Catalog::default(), &config());
        assert!(matches!(outcome, ReconcileOutcome::Issue(_)));
    }

    #[test]
    fn test_similarity_monotonic_in_shared_tokens() {
        let one_shared = similarity("juan perez", "juan gomez");
        let two_shared = similarity("juan perez", "juan perez");
        assert!(two_shared > one_shared);
    }
}
