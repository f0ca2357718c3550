//! Scoring error types.

use thiserror::Error;

/// Errors from a similarity scorer or its backend.
///
/// Only [`ScoringError::Unavailable`] is transient. Everything else is a
/// definitive answer from the backend (or a local misconfiguration) and is
/// not worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// The backend could not be reached or is temporarily failing
    /// (connection refused, timeout, HTTP 429, HTTP 5xx).
    #[error("scoring backend {backend} unavailable: {reason}")]
    Unavailable { backend: String, reason: String },

    /// The backend refused the request (HTTP 4xx other than 429).
    #[error("scoring backend {backend} rejected the request with HTTP {status}: {body}")]
    Rejected {
        backend: String,
        status: u16,
        body: String,
    },

    /// The backend answered with something that cannot be used: malformed
    /// body, wrong number of vectors, inconsistent dimensions, or a score
    /// matrix of the wrong shape.
    #[error("invalid response from scoring backend {backend}: {reason}")]
    InvalidResponse { backend: String, reason: String },

    /// The scorer could not be constructed.
    #[error("scorer configuration error: {0}")]
    Config(String),
}

impl ScoringError {
    /// Whether retrying the same call might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub(crate) fn invalid(backend: &str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            backend: backend.to_string(),
            reason: reason.into(),
        }
    }
}
