//! # Taxonomy Model
//!
//! The validated, immutable in-memory taxonomy. A [`Taxonomy`] is built once
//! from a [`TaxonomyPayload`] and then shared read-only (typically behind an
//! `Arc`) by every concurrent analysis. There are no mutating methods.
//!
//! Ordering is significant: domains, sections and clauses iterate in payload
//! order, and every downstream result structure preserves that order.

use serde::Serialize;

use pgap_core::{sha256_digest, ContentDigest};

use crate::error::TaxonomyResult;
use crate::payload::TaxonomyPayload;
use crate::validation::validate_payload;

/// Default clause weight when the payload does not specify one.
pub const DEFAULT_CLAUSE_WEIGHT: f64 = 1.0;

/// Version identity of a taxonomy.
///
/// The digest covers the normalized domain tree only (trimmed titles,
/// resolved weights), so relabelling a taxonomy or re-indenting its titles
/// does not change its digest while any content edit does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaxonomyVersion {
    label: Option<String>,
    digest: ContentDigest,
}

impl TaxonomyVersion {
    /// The human-readable label, if the payload carried one.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// SHA-256 digest of the canonical domain tree.
    pub fn digest(&self) -> &ContentDigest {
        &self.digest
    }
}

impl std::fmt::Display for TaxonomyVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label}@{}", self.digest.short_hex(12)),
            None => write!(f, "{}", self.digest.short_hex(12)),
        }
    }
}

/// A clause: the unit of comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clause {
    title: String,
    content: String,
    weight: f64,
}

impl Clause {
    /// Clause title, unique within its section.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Canonical reference text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Positive aggregation weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A section: an ordered, non-empty group of clauses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    title: String,
    clauses: Vec<Clause>,
}

impl Section {
    /// Section title, unique within its domain.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Clauses in taxonomy order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Sum of clause weights.
    pub fn total_weight(&self) -> f64 {
        self.clauses.iter().map(Clause::weight).sum()
    }
}

/// A domain: an ordered, non-empty group of sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Domain {
    name: String,
    sections: Vec<Section>,
}

impl Domain {
    /// Domain name, unique within the taxonomy.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sections in taxonomy order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All clauses of the domain, flattened in taxonomy order.
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.sections.iter().flat_map(|s| s.clauses.iter())
    }

    /// Number of clauses across all sections.
    pub fn clause_count(&self) -> usize {
        self.sections.iter().map(|s| s.clauses.len()).sum()
    }
}

/// The validated reference taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    version: TaxonomyVersion,
    domains: Vec<Domain>,
}

impl Taxonomy {
    /// Validate a payload and build the taxonomy.
    ///
    /// Titles are stored trimmed. Clause content is stored verbatim.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation found by
    /// [`validate_payload`], or a digest failure.
    pub fn from_payload(payload: TaxonomyPayload) -> TaxonomyResult<Self> {
        validate_payload(&payload)?;

        let domains: Vec<Domain> = payload
            .domains
            .into_iter()
            .map(|d| Domain {
                name: d.domain.trim().to_string(),
                sections: d
                    .sections
                    .into_iter()
                    .map(|s| Section {
                        title: s.title.trim().to_string(),
                        clauses: s
                            .clauses
                            .into_iter()
                            .map(|c| Clause {
                                title: c.title.trim().to_string(),
                                content: c.content,
                                weight: c.weight.unwrap_or(DEFAULT_CLAUSE_WEIGHT),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        let digest = sha256_digest(&domains)?;

        let taxonomy = Self {
            version: TaxonomyVersion {
                label: payload.version,
                digest,
            },
            domains,
        };

        tracing::debug!(
            version = %taxonomy.version,
            domains = taxonomy.domain_count(),
            sections = taxonomy.section_count(),
            clauses = taxonomy.clause_count(),
            "taxonomy loaded"
        );

        Ok(taxonomy)
    }

    /// Version identity.
    pub fn version(&self) -> &TaxonomyVersion {
        &self.version
    }

    /// Domains in taxonomy order.
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Look up a domain by name.
    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// Every clause with its parents, in taxonomy order.
    pub fn clauses(&self) -> impl Iterator<Item = (&Domain, &Section, &Clause)> {
        self.domains.iter().flat_map(|d| {
            d.sections
                .iter()
                .flat_map(move |s| s.clauses.iter().map(move |c| (d, s, c)))
        })
    }

    /// Number of domains.
    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    /// Number of sections across all domains.
    pub fn section_count(&self) -> usize {
        self.domains.iter().map(|d| d.sections.len()).sum()
    }

    /// Number of clauses across all domains.
    pub fn clause_count(&self) -> usize {
        self.domains.iter().map(Domain::clause_count).sum()
    }
}
