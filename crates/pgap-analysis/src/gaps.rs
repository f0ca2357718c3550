//! # Gap Detection
//!
//! A section is a gap when its score is strictly below
//! [`GapThresholds::section_gap`]. Inside a gapped section, a clause is
//! missing when its score is strictly below
//! [`GapThresholds::clause_missing`]. A score equal to a threshold passes.
//!
//! Domains are not flagged unless [`GapThresholds::domain_gap`] is set; a
//! domain gap is reported separately and never affects section gaps.

use pgap_core::{Score, ValidationError};
use serde::{Deserialize, Serialize};

use crate::grade::GapSeverity;
use crate::results::DomainResult;

/// Default section gap threshold.
pub const DEFAULT_SECTION_GAP: f64 = 0.6;

/// Default missing-clause threshold.
pub const DEFAULT_CLAUSE_MISSING: f64 = 0.5;

/// Gap thresholds, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GapThresholds {
    /// Sections scoring below this are gaps.
    pub section_gap: f64,
    /// Clauses of a gapped section scoring below this are missing.
    pub clause_missing: f64,
    /// Domains scoring below this are domain gaps. Off when `None`.
    pub domain_gap: Option<f64>,
}

impl Default for GapThresholds {
    fn default() -> Self {
        Self {
            section_gap: DEFAULT_SECTION_GAP,
            clause_missing: DEFAULT_CLAUSE_MISSING,
            domain_gap: None,
        }
    }
}

impl GapThresholds {
    /// Check every threshold lies in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidThreshold`] naming the first bad
    /// setting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks = [
            ("section_gap", Some(self.section_gap)),
            ("clause_missing", Some(self.clause_missing)),
            ("domain_gap", self.domain_gap),
        ];
        for (name, value) in checks {
            if let Some(value) = value {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(ValidationError::InvalidThreshold {
                        name: name.to_string(),
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A section that fell below the section threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapRecord {
    /// Parent domain name.
    pub domain: String,
    /// Section title.
    pub section: String,
    /// Section score.
    pub score: Score,
    /// Severity derived from `score`.
    pub severity: GapSeverity,
    /// Titles of clauses below the clause threshold, in taxonomy order.
    pub missing_clauses: Vec<String>,
}

/// A domain that fell below the optional domain threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainGap {
    /// Domain name.
    pub domain: String,
    /// Domain score.
    pub score: Score,
}

/// Section and domain gaps of one analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapReport {
    /// Section gaps in taxonomy order.
    pub gaps: Vec<GapRecord>,
    /// Domain gaps in taxonomy order; empty unless a domain threshold is set.
    pub domain_gaps: Vec<DomainGap>,
}

impl GapReport {
    /// Total missing clauses across all gaps.
    pub fn missing_clause_count(&self) -> usize {
        self.gaps.iter().map(|g| g.missing_clauses.len()).sum()
    }
}

/// Applies [`GapThresholds`] to a result tree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GapDetector {
    thresholds: GapThresholds,
}

impl GapDetector {
    /// Create a detector after validating the thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidThreshold`] for out-of-range
    /// thresholds.
    pub fn new(thresholds: GapThresholds) -> Result<Self, ValidationError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// The thresholds in effect.
    pub fn thresholds(&self) -> &GapThresholds {
        &self.thresholds
    }

    /// Whether a section score is a gap.
    pub fn is_section_gap(&self, score: Score) -> bool {
        score.value() < self.thresholds.section_gap
    }

    /// Whether a clause score counts as missing inside a gapped section.
    pub fn is_clause_missing(&self, score: Score) -> bool {
        score.value() < self.thresholds.clause_missing
    }

    /// Section gap records in taxonomy order.
    pub fn section_gaps(&self, domains: &[DomainResult]) -> Vec<GapRecord> {
        domains
            .iter()
            .flat_map(|d| d.sections.iter().map(move |s| (d, s)))
            .filter(|(_, s)| self.is_section_gap(s.score))
            .map(|(d, s)| GapRecord {
                domain: d.domain.clone(),
                section: s.section.clone(),
                score: s.score,
                severity: GapSeverity::for_score(s.score),
                missing_clauses: s
                    .clauses
                    .iter()
                    .filter(|c| self.is_clause_missing(c.score))
                    .map(|c| c.clause.clone())
                    .collect(),
            })
            .collect()
    }

    /// Domain gaps in taxonomy order; empty when no domain threshold is set.
    pub fn domain_gaps(&self, domains: &[DomainResult]) -> Vec<DomainGap> {
        let Some(threshold) = self.thresholds.domain_gap else {
            return Vec::new();
        };
        domains
            .iter()
            .filter(|d| d.score.value() < threshold)
            .map(|d| DomainGap {
                domain: d.domain.clone(),
                score: d.score,
            })
            .collect()
    }

    /// Detect section and domain gaps.
    pub fn detect(&self, domains: &[DomainResult]) -> GapReport {
        let report = GapReport {
            gaps: self.section_gaps(domains),
            domain_gaps: self.domain_gaps(domains),
        };
        tracing::debug!(
            gaps = report.gaps.len(),
            missing_clauses = report.missing_clause_count(),
            domain_gaps = report.domain_gaps.len(),
            "gap detection complete"
        );
        report
    }
}
