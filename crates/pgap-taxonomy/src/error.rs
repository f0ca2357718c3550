//! Taxonomy loading and validation errors.
//!
//! Every variant is fatal: no analysis can run against a taxonomy that failed
//! to load. Variants carry the file path or the `domain / section / clause`
//! path of the offending entry.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or validating a taxonomy.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// A required file was not found.
    #[error("taxonomy file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Reading the file failed for a reason other than absence.
    #[error("failed to read taxonomy file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file extension does not name a supported format.
    #[error("unsupported taxonomy format for {path} (expected .yaml, .yml or .json)")]
    UnsupportedFormat { path: PathBuf },

    /// YAML parsing failed.
    #[error("failed to parse YAML taxonomy at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing failed.
    #[error("failed to parse JSON taxonomy at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The taxonomy has no domains.
    #[error("taxonomy must contain at least one domain")]
    NoDomains,

    /// A title is empty or whitespace-only.
    #[error("empty {kind} title at position {position} in {scope}")]
    EmptyTitle {
        kind: &'static str,
        scope: String,
        position: usize,
    },

    /// Two siblings share a title.
    #[error("duplicate {kind} title {title:?} in {scope}")]
    DuplicateTitle {
        kind: &'static str,
        scope: String,
        title: String,
    },

    /// A domain has no sections.
    #[error("domain {domain:?} must contain at least one section")]
    NoSections { domain: String },

    /// A section has no clauses, which would leave its score undefined.
    #[error("section {path} must contain at least one clause")]
    NoClauses { path: String },

    /// A clause has empty canonical text.
    #[error("clause {path} has empty content")]
    EmptyContent { path: String },

    /// A clause weight is not a positive finite number.
    #[error("clause {path} has invalid weight {weight} (expected a positive finite number)")]
    InvalidWeight { path: String, weight: f64 },

    /// Computing the version digest failed.
    #[error("failed to compute taxonomy version digest: {0}")]
    Digest(#[from] pgap_core::PgapError),
}

/// Convenience alias for taxonomy results.
pub type TaxonomyResult<T> = Result<T, TaxonomyError>;
