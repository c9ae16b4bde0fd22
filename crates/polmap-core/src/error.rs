//! Error types for the polmap-core library.

use thiserror::Error;

/// Main error type for the polmap library.
///
/// Per-field resolution failures never surface here: they are recorded as
/// [`crate::models::result::FieldMappingIssue`] entries on the mapping
/// result. Only structurally invalid input aborts a run.
#[derive(Error, Debug)]
pub enum PolmapError {
    /// The raw extraction record itself is absent or malformed.
    #[error("structural error: {0}")]
    Structural(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (config file load/save).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors for single-value lookup and locale parsing.
///
/// These are captured locally by the orchestrator and downgraded to issues;
/// they exist as a type so resolver and parser contracts stay explicit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// No candidate source key yielded a usable value.
    #[error("no candidate value found")]
    NotFound,

    /// A value was found but failed locale parsing. The raw text is
    /// preserved for manual review.
    #[error("value {0:?} failed locale parsing")]
    Format(String),
}

/// Result type for the polmap library.
pub type Result<T> = std::result::Result<T, PolmapError>;
