//! Serialized taxonomy payload.
//!
//! The on-disk schema is either a bare list of domains:
//!
//! ```yaml
//! - domain: "Legal & Compliance"
//!   sections:
//!     - title: "Confidentiality"
//!       clauses:
//!         - title: "Definition of Confidential Information"
//!           content: "Confidential Information includes ..."
//! ```
//!
//! or a mapping with an optional version label:
//!
//! ```yaml
//! version: "2024.2"
//! domains:
//!   - domain: ...
//! ```
//!
//! Unknown fields are rejected at every level.

use serde::{Deserialize, Serialize};

/// Top-level payload: optional version label plus ordered domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyPayload {
    /// Human-readable version label (e.g. `"2024.2"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Ordered domains.
    pub domains: Vec<DomainPayload>,
}

impl From<Vec<DomainPayload>> for TaxonomyPayload {
    fn from(domains: Vec<DomainPayload>) -> Self {
        Self {
            version: None,
            domains,
        }
    }
}

/// A domain and its ordered sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainPayload {
    /// Domain name, unique within the taxonomy.
    pub domain: String,
    /// Ordered sections.
    pub sections: Vec<SectionPayload>,
}

/// A section and its ordered clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionPayload {
    /// Section title, unique within its domain.
    pub title: String,
    /// Ordered clauses.
    pub clauses: Vec<ClausePayload>,
}

/// A clause with its canonical reference text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClausePayload {
    /// Clause title, unique within its section.
    pub title: String,
    /// Canonical text the document is compared against.
    pub content: String,
    /// Relative weight for clause-weighted aggregation. Defaults to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}
