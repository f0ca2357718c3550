//! # Qualitative Grades
//!
//! Labels derived from scores for readers of a report:
//!
//! | grade             | applies to       | bands                                   |
//! |-------------------|------------------|-----------------------------------------|
//! | [`AlignmentLabel`]  | domain score     | ≥ 0.8 good, ≥ 0.6 partial, else gaps    |
//! | [`ComplianceLevel`] | overall percent  | ≥ 80 high, ≥ 60 moderate, else low      |
//! | [`GapSeverity`]     | gap section score| < 0.4 severe, else moderate             |
//!
//! Every lower bound is inclusive.

use std::fmt;

use pgap_core::Score;
use serde::{Deserialize, Serialize};

/// Lowest domain score labelled good alignment.
pub const GOOD_ALIGNMENT: f64 = 0.8;

/// Lowest domain score labelled partial alignment.
pub const PARTIAL_ALIGNMENT: f64 = 0.6;

/// Lowest overall percentage graded high compliance.
pub const HIGH_COMPLIANCE_PERCENT: u8 = 80;

/// Lowest overall percentage graded moderate compliance.
pub const MODERATE_COMPLIANCE_PERCENT: u8 = 60;

/// Gap sections scoring below this are severe.
pub const SEVERE_GAP_BELOW: f64 = 0.4;

/// How closely a domain matches the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentLabel {
    Good,
    Partial,
    SignificantGaps,
}

impl AlignmentLabel {
    /// Label for a domain score.
    pub fn for_score(score: Score) -> Self {
        let v = score.value();
        if v >= GOOD_ALIGNMENT {
            Self::Good
        } else if v >= PARTIAL_ALIGNMENT {
            Self::Partial
        } else {
            Self::SignificantGaps
        }
    }

    /// Display text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good alignment",
            Self::Partial => "Partial alignment",
            Self::SignificantGaps => "Significant gaps",
        }
    }
}

impl fmt::Display for AlignmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall compliance grade of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceLevel {
    High,
    Moderate,
    Low,
}

impl ComplianceLevel {
    /// Grade for an overall percentage.
    pub fn for_percent(percent: u8) -> Self {
        if percent >= HIGH_COMPLIANCE_PERCENT {
            Self::High
        } else if percent >= MODERATE_COMPLIANCE_PERCENT {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Display text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High Compliance",
            Self::Moderate => "Moderate Compliance",
            Self::Low => "Low Compliance",
        }
    }
}

impl fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a section gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapSeverity {
    Severe,
    Moderate,
}

impl GapSeverity {
    /// Severity for a gap section score.
    pub fn for_score(score: Score) -> Self {
        if score.value() < SEVERE_GAP_BELOW {
            Self::Severe
        } else {
            Self::Moderate
        }
    }

    /// Display text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Severe => "severe",
            Self::Moderate => "moderate",
        }
    }
}

impl fmt::Display for GapSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
