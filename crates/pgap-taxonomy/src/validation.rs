//! Fail-fast structural validation of a taxonomy payload.
//!
//! Rules, checked in taxonomy order and reported at the first violation:
//!
//! - at least one domain; every domain has at least one section; every
//!   section has at least one clause
//! - domain names, section titles and clause titles are non-empty after
//!   trimming and unique (after trimming) within their parent scope
//! - clause content is non-empty after trimming
//! - clause weights, when present, are finite and strictly positive

use std::collections::HashSet;

use crate::error::{TaxonomyError, TaxonomyResult};
use crate::payload::TaxonomyPayload;

/// Validate a payload. Returns the first violation found.
pub fn validate_payload(payload: &TaxonomyPayload) -> TaxonomyResult<()> {
    if payload.domains.is_empty() {
        return Err(TaxonomyError::NoDomains);
    }

    let mut domain_names = HashSet::new();
    for (d_idx, domain) in payload.domains.iter().enumerate() {
        let domain_name = checked_title(&domain.domain, "domain", "taxonomy", d_idx)?;
        if !domain_names.insert(domain_name) {
            return Err(TaxonomyError::DuplicateTitle {
                kind: "domain",
                scope: "taxonomy".to_string(),
                title: domain_name.to_string(),
            });
        }
        if domain.sections.is_empty() {
            return Err(TaxonomyError::NoSections {
                domain: domain_name.to_string(),
            });
        }

        let mut section_titles = HashSet::new();
        for (s_idx, section) in domain.sections.iter().enumerate() {
            let section_title = checked_title(&section.title, "section", domain_name, s_idx)?;
            if !section_titles.insert(section_title) {
                return Err(TaxonomyError::DuplicateTitle {
                    kind: "section",
                    scope: domain_name.to_string(),
                    title: section_title.to_string(),
                });
            }
            let section_path = format!("{domain_name} / {section_title}");
            if section.clauses.is_empty() {
                return Err(TaxonomyError::NoClauses { path: section_path });
            }

            let mut clause_titles = HashSet::new();
            for (c_idx, clause) in section.clauses.iter().enumerate() {
                let clause_title = checked_title(&clause.title, "clause", &section_path, c_idx)?;
                if !clause_titles.insert(clause_title) {
                    return Err(TaxonomyError::DuplicateTitle {
                        kind: "clause",
                        scope: section_path.clone(),
                        title: clause_title.to_string(),
                    });
                }
                let clause_path = format!("{section_path} / {clause_title}");
                if clause.content.trim().is_empty() {
                    return Err(TaxonomyError::EmptyContent { path: clause_path });
                }
                if let Some(weight) = clause.weight {
                    if !weight.is_finite() || weight <= 0.0 {
                        return Err(TaxonomyError::InvalidWeight {
                            path: clause_path,
                            weight,
                        });
                    }
                }
            }
        }
    }

    Ok(())
}

fn checked_title<'a>(
    raw: &'a str,
    kind: &'static str,
    scope: &str,
    position: usize,
) -> TaxonomyResult<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaxonomyError::EmptyTitle {
            kind,
            scope: scope.to_string(),
            position,
        });
    }
    Ok(trimmed)
}
