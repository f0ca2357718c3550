//! # pgap-taxonomy: Reference Policy Taxonomy
//!
//! The fixed, versioned hierarchy that documents are compared against:
//!
//! ```text
//! Taxonomy
//!   └─ Domain      (name unique within the taxonomy)
//!       └─ Section (title unique within its domain)
//!           └─ Clause (title unique within its section, canonical text)
//! ```
//!
//! A taxonomy is loaded once at process start, validated fail-fast, and then
//! shared read-only by every analysis. Any load or validation failure is a
//! [`TaxonomyError`] and is fatal: no analysis can proceed without a valid
//! taxonomy.

pub mod error;
pub mod model;
pub mod parser;
pub mod payload;
pub mod reference;
pub mod validation;

pub use error::{TaxonomyError, TaxonomyResult};
pub use model::{Clause, Domain, Section, Taxonomy, TaxonomyVersion};
pub use parser::{load_taxonomy, taxonomy_from_json_str, taxonomy_from_yaml_str, PayloadFormat};
pub use payload::{ClausePayload, DomainPayload, SectionPayload, TaxonomyPayload};
pub use reference::standard_policies;
