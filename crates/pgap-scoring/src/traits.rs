//! # The Similarity Scorer Capability
//!
//! Pipeline code depends only on [`SimilarityScorer`]. Concrete backends
//! (lexical overlap, embedding cosine, remote embedding services) are
//! interchangeable trait objects behind `Arc<dyn SimilarityScorer>`.
//!
//! The primary entry point is [`SimilarityScorer::score_batch`], which scores
//! every (clause, segment) pair at once so that remote backends can batch
//! their requests. [`SimilarityScorer::score`] is a convenience for a single
//! pair.

use std::fmt;

use futures::future::{BoxFuture, FutureExt};
use pgap_core::Score;
use pgap_taxonomy::Clause;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::segment::Segment;

/// The family of similarity measure a scorer implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerCapability {
    /// Token overlap between segment and clause text.
    LexicalOverlap,
    /// Cosine similarity between text embeddings.
    EmbeddingCosine,
}

impl fmt::Display for ScorerCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LexicalOverlap => "lexical-overlap",
            Self::EmbeddingCosine => "embedding-cosine",
        })
    }
}

/// Scores for every (clause, segment) pair of one batch.
///
/// Rows are clauses, columns are segments, both in the order they were
/// passed to [`SimilarityScorer::score_batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    values: Vec<Score>,
}

impl SimilarityMatrix {
    /// Build from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::InvalidResponse`] when `values.len()` is not
    /// `rows * cols`.
    pub fn new(rows: usize, cols: usize, values: Vec<Score>) -> Result<Self, ScoringError> {
        if rows.checked_mul(cols) != Some(values.len()) {
            return Err(ScoringError::invalid(
                "matrix",
                format!("{} values for a {rows}x{cols} matrix", values.len()),
            ));
        }
        Ok(Self { rows, cols, values })
    }

    /// Build from one `Vec` per clause.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::InvalidResponse`] when rows differ in length.
    pub fn from_rows(rows: Vec<Vec<Score>>) -> Result<Self, ScoringError> {
        let row_count = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
            return Err(ScoringError::invalid(
                "matrix",
                format!("row {bad} has {} columns, expected {cols}", rows[bad].len()),
            ));
        }
        Ok(Self {
            rows: row_count,
            cols,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// A matrix with every entry zero.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![Score::ZERO; rows * cols],
        }
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of clause rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of segment columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The score of `clause` against `segment`, if in range.
    pub fn get(&self, clause: usize, segment: usize) -> Option<Score> {
        if clause >= self.rows || segment >= self.cols {
            return None;
        }
        self.values.get(clause * self.cols + segment).copied()
    }

    /// All segment scores for one clause.
    pub fn row(&self, clause: usize) -> Option<&[Score]> {
        if clause >= self.rows {
            return None;
        }
        let start = clause * self.cols;
        self.values.get(start..start + self.cols)
    }

    /// The best segment match for each clause. A clause with no segments
    /// scores zero.
    pub fn best_per_clause(&self) -> Vec<Score> {
        (0..self.rows)
            .map(|r| {
                self.row(r)
                    .unwrap_or_default()
                    .iter()
                    .fold(Score::ZERO, |best, s| best.max(*s))
            })
            .collect()
    }
}

/// Bounded similarity between document segments and taxonomy clauses.
///
/// Implementations must return scores in `[0, 1]` (guaranteed by
/// [`Score`]), must score blank segments as zero, and must be deterministic
/// for a fixed model unless [`is_deterministic`](Self::is_deterministic)
/// returns `false`. Backend failures are reported as errors and never
/// mapped to a zero score.
pub trait SimilarityScorer: Send + Sync + fmt::Debug {
    /// A short, stable backend name for logs and error messages.
    fn name(&self) -> &str;

    /// The similarity measure implemented.
    fn capability(&self) -> ScorerCapability;

    /// Whether identical input always yields identical scores.
    fn is_deterministic(&self) -> bool {
        true
    }

    /// Score every clause against every segment.
    ///
    /// The result has `clauses.len()` rows and `segments.len()` columns.
    fn score_batch<'a>(
        &'a self,
        segments: &'a [Segment],
        clauses: &'a [&'a Clause],
    ) -> BoxFuture<'a, Result<SimilarityMatrix, ScoringError>>;

    /// Score one segment against one clause.
    fn score<'a>(
        &'a self,
        segment: &'a Segment,
        clause: &'a Clause,
    ) -> BoxFuture<'a, Result<Score, ScoringError>> {
        async move {
            let clauses = [clause];
            let matrix = self
                .score_batch(std::slice::from_ref(segment), &clauses)
                .await?;
            matrix
                .get(0, 0)
                .ok_or_else(|| ScoringError::invalid(self.name(), "empty matrix for a single pair"))
        }
        .boxed()
    }
}
