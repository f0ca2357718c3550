//! Errors raised while assembling analysis results.

use pgap_core::ValidationError;
use thiserror::Error;

/// Failures building results, gap records or recommendations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    /// The number of clause scores for a domain does not match its clauses.
    #[error("domain {domain:?} has {expected} clauses but {actual} scores were supplied")]
    ClauseCountMismatch {
        domain: String,
        expected: usize,
        actual: usize,
    },

    /// The number of per-domain score lists does not match the taxonomy.
    #[error("taxonomy has {expected} domains but {actual} score lists were supplied")]
    DomainCountMismatch { expected: usize, actual: usize },

    /// A recommendation template lacks the `{clause}` placeholder or names
    /// an unknown placeholder.
    #[error("invalid recommendation template: {0}")]
    InvalidTemplate(String),

    /// A threshold or weight was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
