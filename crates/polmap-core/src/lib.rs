//! Core library for scanned insurance-policy field mapping.
//!
//! This crate provides:
//! - Ordered multi-candidate field resolution over raw OCR key/value records
//! - Uruguayan/US locale parsing for amounts and dates
//! - Per-insurer mapping strategies (BSE, SURA, MAPFRE, generic fallback)
//! - Master-data reconciliation with confidence scoring
//! - Installment schedules, observation documents and conflict checks

pub mod error;
pub mod mapping;
pub mod models;

pub use error::{PolmapError, Result, ValueError};
pub use mapping::{check_policy_conflict, MappingContext, PolicyMapper};
pub use models::catalog::{Catalog, CatalogEntry, ExistingPolicy, MasterCatalogs};
pub use models::config::MapperConfig;
pub use models::policy::{
    CanonicalField, InstallmentSchedule, MappedPolicyData, MappingIntent,
};
pub use models::record::RawExtractionRecord;
pub use models::result::{ConflictValidation, MappingQuality, MappingResult};
