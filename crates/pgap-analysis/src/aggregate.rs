//! # Score Aggregation
//!
//! Clause scores roll up into section scores, and section scores into domain
//! scores, through an [`Aggregation`]. Two modes exist:
//!
//! - [`ArithmeticMean`] (the default): every child counts equally.
//! - [`ClauseWeighted`]: clause weights from the taxonomy. A section weighs
//!   each clause by its weight; a domain weighs each section by the sum of
//!   its clause weights.
//!
//! Both are weighted means with strictly positive weights, so raising any
//! child score never lowers the parent. An empty child list aggregates to
//! zero.

use std::fmt;

use pgap_core::Score;
use pgap_taxonomy::{Domain, Section};
use serde::{Deserialize, Serialize};

/// Aggregation mode named in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Unweighted arithmetic mean.
    #[default]
    Mean,
    /// Mean weighted by clause weight.
    ClauseWeighted,
}

impl AggregationMode {
    /// The aggregation implementing this mode.
    pub fn aggregation(self) -> &'static dyn Aggregation {
        static MEAN: ArithmeticMean = ArithmeticMean;
        static WEIGHTED: ClauseWeighted = ClauseWeighted;
        match self {
            Self::Mean => &MEAN,
            Self::ClauseWeighted => &WEIGHTED,
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mean => "mean",
            Self::ClauseWeighted => "clause_weighted",
        })
    }
}

/// Monotonic roll-up of child scores.
pub trait Aggregation: Send + Sync + fmt::Debug {
    /// Mode identifier.
    fn mode(&self) -> AggregationMode;

    /// Score of `section` given its clause scores in taxonomy order.
    fn section_score(&self, section: &Section, clause_scores: &[Score]) -> Score;

    /// Score of `domain` given its section scores in taxonomy order.
    fn domain_score(&self, domain: &Domain, section_scores: &[Score]) -> Score;
}

/// Plain arithmetic mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticMean;

impl Aggregation for ArithmeticMean {
    fn mode(&self) -> AggregationMode {
        AggregationMode::Mean
    }

    fn section_score(&self, _section: &Section, clause_scores: &[Score]) -> Score {
        mean(clause_scores)
    }

    fn domain_score(&self, _domain: &Domain, section_scores: &[Score]) -> Score {
        mean(section_scores)
    }
}

/// Mean weighted by clause weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClauseWeighted;

impl Aggregation for ClauseWeighted {
    fn mode(&self) -> AggregationMode {
        AggregationMode::ClauseWeighted
    }

    fn section_score(&self, section: &Section, clause_scores: &[Score]) -> Score {
        weighted_mean(
            clause_scores
                .iter()
                .zip(section.clauses())
                .map(|(s, c)| (*s, c.weight())),
        )
    }

    fn domain_score(&self, domain: &Domain, section_scores: &[Score]) -> Score {
        weighted_mean(
            section_scores
                .iter()
                .zip(domain.sections())
                .map(|(s, sec)| (*s, sec.total_weight())),
        )
    }
}

/// Arithmetic mean; zero for no input.
pub fn mean(scores: &[Score]) -> Score {
    if scores.is_empty() {
        return Score::ZERO;
    }
    let sum: f64 = scores.iter().map(|s| s.value()).sum();
    Score::clamped(sum / scores.len() as f64)
}

/// Weighted mean over `(score, weight)` pairs. Non-positive or non-finite
/// weights are skipped; zero for no usable input.
pub fn weighted_mean(items: impl IntoIterator<Item = (Score, f64)>) -> Score {
    let (mut num, mut den) = (0.0f64, 0.0f64);
    for (score, weight) in items {
        if weight.is_finite() && weight > 0.0 {
            num += score.value() * weight;
            den += weight;
        }
    }
    if den == 0.0 {
        return Score::ZERO;
    }
    Score::clamped(num / den)
}

/// The overall document score: mean of domain scores as a whole percentage.
pub fn overall_percent(domain_scores: &[Score]) -> u8 {
    mean(domain_scores).percent()
}
