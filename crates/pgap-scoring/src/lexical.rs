//! # Lexical Overlap Scoring
//!
//! Texts are reduced to lower-cased alphanumeric tokens with common English
//! stop-words removed. The score of a segment against a clause is the
//! fraction of the clause's distinct tokens that the segment contains
//! (clause-token recall). A segment that quotes the clause verbatim scores
//! exactly 1.0, and extra surrounding text never lowers the score.

use std::collections::BTreeSet;

use futures::future::{BoxFuture, FutureExt};
use pgap_core::Score;
use pgap_taxonomy::Clause;

use crate::error::ScoringError;
use crate::segment::Segment;
use crate::traits::{ScorerCapability, SimilarityMatrix, SimilarityScorer};

const BACKEND: &str = "lexical";

/// Sorted for binary search.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at",
    "be", "been", "before", "being", "below", "between", "both", "but", "by", "can", "could",
    "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further", "had",
    "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my", "no", "nor", "not",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out", "over", "own", "same",
    "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "you", "your", "yours",
];

/// Whether `token` (already lower-cased) is a stop-word.
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Lower-cased alphanumeric tokens of `text`, in order, duplicates kept.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Tokens of `text` with stop-words removed.
pub fn content_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stopword(t))
        .collect()
}

/// Distinct tokens used for overlap. Falls back to all tokens when the text
/// consists of stop-words only, so such a clause is still matchable.
fn token_set(text: &str, remove_stopwords: bool) -> BTreeSet<String> {
    let all = tokenize(text);
    if !remove_stopwords {
        return all.into_iter().collect();
    }
    let content: BTreeSet<String> = all.iter().filter(|t| !is_stopword(t)).cloned().collect();
    if content.is_empty() {
        all.into_iter().collect()
    } else {
        content
    }
}

/// Fraction of `clause` tokens present in `segment`.
fn recall(clause: &BTreeSet<String>, segment: &BTreeSet<String>) -> Score {
    if clause.is_empty() || segment.is_empty() {
        return Score::ZERO;
    }
    let hits = clause.iter().filter(|t| segment.contains(*t)).count();
    Score::clamped(hits as f64 / clause.len() as f64)
}

/// Clause-token recall scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalOverlapScorer {
    remove_stopwords: bool,
}

impl Default for LexicalOverlapScorer {
    fn default() -> Self {
        Self {
            remove_stopwords: true,
        }
    }
}

impl LexicalOverlapScorer {
    /// Scorer with stop-word removal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scorer with stop-word removal switched on or off.
    pub fn with_stopwords_removed(remove_stopwords: bool) -> Self {
        Self { remove_stopwords }
    }

    fn matrix(&self, segments: &[Segment], clauses: &[&Clause]) -> Result<SimilarityMatrix, ScoringError> {
        let segment_sets: Vec<BTreeSet<String>> = segments
            .iter()
            .map(|s| {
                if s.is_blank() {
                    BTreeSet::new()
                } else {
                    token_set(&s.text, self.remove_stopwords)
                }
            })
            .collect();
        let mut values = Vec::with_capacity(clauses.len() * segments.len());
        for clause in clauses {
            let clause_set = token_set(clause.content(), self.remove_stopwords);
            values.extend(segment_sets.iter().map(|seg| recall(&clause_set, seg)));
        }
        shaped(clauses.len(), segments.len(), values)
    }
}

/// Assemble a row-major matrix, reporting a length mismatch as an invalid
/// response from this scorer.
fn shaped(rows: usize, cols: usize, values: Vec<Score>) -> Result<SimilarityMatrix, ScoringError> {
    SimilarityMatrix::new(rows, cols, values).map_err(|e| match e {
        ScoringError::InvalidResponse { reason, .. } => ScoringError::invalid(BACKEND, reason),
        other => other,
    })
}

impl SimilarityScorer for LexicalOverlapScorer {
    fn name(&self) -> &str {
        BACKEND
    }

    fn capability(&self) -> ScorerCapability {
        ScorerCapability::LexicalOverlap
    }

    fn score_batch<'a>(
        &'a self,
        segments: &'a [Segment],
        clauses: &'a [&'a Clause],
    ) -> BoxFuture<'a, Result<SimilarityMatrix, ScoringError>> {
        futures::future::ready(self.matrix(segments, clauses)).boxed()
    }
}
