//! # Analysis Report
//!
//! The structured result of one analysis. Serializes to the camelCase JSON
//! document consumed by callers:
//!
//! ```text
//! { documentId, documentName, taxonomyVersion, overallScore,
//!   domains: [...], gaps: [...], domainGaps?: [...], recommendations: [...] }
//! ```
//!
//! The report holds no timestamps or run identifiers, so identical input
//! produces byte-identical JSON.

use pgap_core::DocumentId;
use serde::{Deserialize, Serialize};

use crate::aggregate::overall_percent;
use crate::gaps::{DomainGap, GapRecord, GapReport};
use crate::grade::ComplianceLevel;
use crate::recommend::Recommendation;
use crate::results::DomainResult;

/// Identity fields copied into a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    /// Document identity.
    pub document_id: DocumentId,
    /// Display name.
    pub document_name: String,
    /// Rendered taxonomy version.
    pub taxonomy_version: String,
}

/// The full analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Document identity.
    pub document_id: DocumentId,
    /// Display name.
    pub document_name: String,
    /// Version of the taxonomy the document was compared against.
    pub taxonomy_version: String,
    /// Mean of the domain scores as a whole percentage.
    pub overall_score: u8,
    /// Per-domain results in taxonomy order.
    pub domains: Vec<DomainResult>,
    /// Section gaps in taxonomy order.
    pub gaps: Vec<GapRecord>,
    /// Domain gaps; omitted from JSON when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_gaps: Vec<DomainGap>,
    /// Recommendations in gap order.
    pub recommendations: Vec<Recommendation>,
}

/// Counts for log lines and CLI summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Overall score as a whole percentage.
    pub overall_score: u8,
    /// Grade derived from `overall_score`.
    pub compliance: ComplianceLevel,
    /// Domains analyzed.
    pub domains: usize,
    /// Sections across all domains.
    pub sections: usize,
    /// Clauses across all sections.
    pub clauses: usize,
    /// Section gaps found.
    pub gaps: usize,
    /// Missing clauses across all gaps.
    pub missing_clauses: usize,
    /// Domain gaps found.
    pub domain_gaps: usize,
    /// Recommendations produced.
    pub recommendations: usize,
}

impl AnalysisReport {
    /// Assemble a report and compute the overall score.
    pub fn new(
        context: ReportContext,
        domains: Vec<DomainResult>,
        gaps: GapReport,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        let scores: Vec<_> = domains.iter().map(|d| d.score).collect();
        Self {
            document_id: context.document_id,
            document_name: context.document_name,
            taxonomy_version: context.taxonomy_version,
            overall_score: overall_percent(&scores),
            domains,
            gaps: gaps.gaps,
            domain_gaps: gaps.domain_gaps,
            recommendations,
        }
    }

    /// Look up a domain result by name.
    pub fn domain(&self, name: &str) -> Option<&DomainResult> {
        self.domains.iter().find(|d| d.domain == name)
    }

    /// Compliance grade of the overall score.
    pub fn compliance(&self) -> ComplianceLevel {
        ComplianceLevel::for_percent(self.overall_score)
    }

    /// Whether the overall score reaches `percent`.
    pub fn meets(&self, percent: u8) -> bool {
        self.overall_score >= percent
    }

    /// Summary counts.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            overall_score: self.overall_score,
            compliance: self.compliance(),
            domains: self.domains.len(),
            sections: self.domains.iter().map(|d| d.sections.len()).sum(),
            clauses: self
                .domains
                .iter()
                .flat_map(|d| &d.sections)
                .map(|s| s.clauses.len())
                .sum(),
            gaps: self.gaps.len(),
            missing_clauses: self.gaps.iter().map(|g| g.missing_clauses.len()).sum(),
            domain_gaps: self.domain_gaps.len(),
            recommendations: self.recommendations.len(),
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
