//! # Identifiers
//!
//! [`DocumentId`] names the document under analysis. It is the key for
//! single-flight collapsing and report caching, so two requests with the
//! same `DocumentId` are assumed to carry the same content.
//!
//! [`AnalysisId`] names one execution of the pipeline. Every run gets a fresh
//! UUID, including retries of the same document.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::digest::ContentDigest;
use crate::error::ValidationError;

/// Identity of a document submitted for analysis.
///
/// # Validation
///
/// Must be a non-empty, non-whitespace string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a document identifier, validating non-emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDocumentId`] if the string is empty or
    /// whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(ValidationError::EmptyDocumentId);
        }
        Ok(Self(s))
    }

    /// Derive an identifier from document content.
    ///
    /// Each part is length-prefixed before hashing so that
    /// `["ab", "c"]` and `["a", "bc"]` produce different identities.
    pub fn from_content<S: AsRef<str>>(parts: &[S]) -> Self {
        let mut buf = Vec::new();
        for part in parts {
            let bytes = part.as_ref().as_bytes();
            buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
            buf.extend_from_slice(bytes);
        }
        Self(format!("sha256:{}", ContentDigest::of_bytes(&buf).to_hex()))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique identifier for one pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisId(Uuid);

impl AnalysisId {
    /// Create a new random analysis identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
