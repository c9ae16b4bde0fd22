//! Raw extraction record produced by the upstream OCR/AI step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A raw key/value extraction record.
///
/// Keys are dotted/indexed paths (`pago.cuotas[0].prima`) or free-form OCR
/// labels; values are scalar text. Keys are not guaranteed consistent across
/// documents of the same insurer, and a single value may be a multi-line
/// "blob" embedding several logical fields. The record is read-only to the
/// engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawExtractionRecord {
    entries: BTreeMap<String, String>,
}

impl RawExtractionRecord {
    /// Build a record from key/value pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a value by source key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    /// Iterate over all (key, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
