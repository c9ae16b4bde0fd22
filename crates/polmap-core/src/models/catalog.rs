//! Master-data catalogs and external policy lookup results.
//!
//! Catalogs are read-only snapshots supplied per call by the caller; the
//! engine never mutates them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One entry of a reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Identifier in the external policy-management system.
    pub id: i64,

    /// Short code (broker code, department code, ...).
    pub code: String,

    /// Canonical display name.
    pub name: String,
}

/// A reference catalog with an optional fallback entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,

    /// Code of the entry to suggest when no match clears the confidence
    /// floor. Absent for catalogs with no sensible fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_code: Option<String>,
}

impl Catalog {
    /// Build a catalog from entries, without a default.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            default_code: None,
        }
    }

    /// Set the fallback entry code.
    pub fn with_default(mut self, code: impl Into<String>) -> Self {
        self.default_code = Some(code.into());
        self
    }

    /// The fallback entry, if one is configured and present.
    pub fn default_entry(&self) -> Option<&CatalogEntry> {
        let code = self.default_code.as_deref()?;
        self.entries.iter().find(|e| e.code == code)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full set of master-data catalogs a mapping run reconciles against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterCatalogs {
    pub clients: Catalog,
    pub brokers: Catalog,
    pub companies: Catalog,
    pub departments: Catalog,
    pub fuel_types: Catalog,
    pub destinations: Catalog,
    pub categories: Catalog,
    pub qualities: Catalog,
    pub tariffs: Catalog,
    pub currencies: Catalog,
}

/// Summary of an existing policy, as returned by the external
/// policy-management system lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingPolicy {
    pub id: i64,

    /// Status in the external system (e.g. "VIGENTE", "VENCIDA").
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entry_lookup() {
        let catalog = Catalog::new(vec![
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
        ])
        .with_default("MVD");

        assert_eq!(catalog.default_entry().unwrap().name, "Montevideo");
    }

    #[test]
    fn test_no_default() {
        let catalog = Catalog::new(vec![]);
        assert!(catalog.default_entry().is_none());
    }
}
