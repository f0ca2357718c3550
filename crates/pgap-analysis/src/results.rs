//! # Result Tree
//!
//! [`DomainResult`] → [`SectionResult`] → [`ClauseResult`] mirror the
//! taxonomy one-to-one and in the same order. Results are built from the
//! best segment score of every clause, flattened in taxonomy order.

use pgap_core::Score;
use pgap_taxonomy::{Domain, Taxonomy};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregation;
use crate::error::ReportError;
use crate::grade::AlignmentLabel;

/// Score of one clause: its best match against any segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseResult {
    /// Clause title.
    pub clause: String,
    /// Best segment similarity.
    pub score: Score,
}

/// Score of one section and its clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResult {
    /// Section title.
    pub section: String,
    /// Aggregate of the clause scores.
    pub score: Score,
    /// Clause results in taxonomy order.
    pub clauses: Vec<ClauseResult>,
}

/// Score of one domain and its sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResult {
    /// Domain name.
    pub domain: String,
    /// Aggregate of the section scores.
    pub score: Score,
    /// Label derived from `score`.
    pub alignment: AlignmentLabel,
    /// Section results in taxonomy order.
    pub sections: Vec<SectionResult>,
}

impl DomainResult {
    /// Build the result tree of one domain.
    ///
    /// `clause_scores` holds one score per clause of `domain`, flattened in
    /// taxonomy order (section by section).
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::ClauseCountMismatch`] when the number of
    /// scores differs from the number of clauses.
    pub fn build(
        domain: &Domain,
        clause_scores: &[Score],
        aggregation: &dyn Aggregation,
    ) -> Result<Self, ReportError> {
        if clause_scores.len() != domain.clause_count() {
            return Err(ReportError::ClauseCountMismatch {
                domain: domain.name().to_string(),
                expected: domain.clause_count(),
                actual: clause_scores.len(),
            });
        }

        let mut offset = 0;
        let mut sections = Vec::with_capacity(domain.sections().len());
        for section in domain.sections() {
            let n = section.clauses().len();
            let scores = &clause_scores[offset..offset + n];
            offset += n;
            let clauses = section
                .clauses()
                .iter()
                .zip(scores)
                .map(|(clause, score)| ClauseResult {
                    clause: clause.title().to_string(),
                    score: *score,
                })
                .collect();
            sections.push(SectionResult {
                section: section.title().to_string(),
                score: aggregation.section_score(section, scores),
                clauses,
            });
        }

        let section_scores: Vec<Score> = sections.iter().map(|s| s.score).collect();
        let score = aggregation.domain_score(domain, &section_scores);
        Ok(Self {
            domain: domain.name().to_string(),
            score,
            alignment: AlignmentLabel::for_score(score),
            sections,
        })
    }

    /// Look up a section by title.
    pub fn section(&self, title: &str) -> Option<&SectionResult> {
        self.sections.iter().find(|s| s.section == title)
    }
}

impl SectionResult {
    /// Look up a clause by title.
    pub fn clause(&self, title: &str) -> Option<&ClauseResult> {
        self.clauses.iter().find(|c| c.clause == title)
    }
}

/// Build results for every domain of `taxonomy`.
///
/// `per_domain[i]` holds the flattened clause scores of domain `i`.
///
/// # Errors
///
/// Returns [`ReportError::DomainCountMismatch`] or
/// [`ReportError::ClauseCountMismatch`] on shape errors.
pub fn build_results(
    taxonomy: &Taxonomy,
    per_domain: &[Vec<Score>],
    aggregation: &dyn Aggregation,
) -> Result<Vec<DomainResult>, ReportError> {
    if per_domain.len() != taxonomy.domain_count() {
        return Err(ReportError::DomainCountMismatch {
            expected: taxonomy.domain_count(),
            actual: per_domain.len(),
        });
    }
    taxonomy
        .domains()
        .iter()
        .zip(per_domain)
        .map(|(domain, scores)| DomainResult::build(domain, scores, aggregation))
        .collect()
}
