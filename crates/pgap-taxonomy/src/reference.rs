//! The bundled standard policy taxonomy.
//!
//! Used when no taxonomy file is configured. The payload is compiled into the
//! binary and validated on every call, so a malformed edit to the data file
//! fails the test suite rather than a deployment.

use crate::error::TaxonomyResult;
use crate::model::Taxonomy;
use crate::parser::taxonomy_from_yaml_str;

/// Raw YAML of the standard policy set.
pub const STANDARD_POLICIES_YAML: &str = include_str!("../data/standard-policies.yaml");

/// Build the standard policy taxonomy.
pub fn standard_policies() -> TaxonomyResult<Taxonomy> {
    taxonomy_from_yaml_str(STANDARD_POLICIES_YAML)
}
