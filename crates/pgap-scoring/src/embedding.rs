//! # Embedding-Cosine Scoring
//!
//! An [`Embedder`] maps texts to vectors. [`EmbeddingScorer`] turns any
//! embedder into a [`SimilarityScorer`]: clause and segment texts are
//! embedded in one batch and each pair scores the cosine similarity of its
//! vectors, with negative similarities clamped to zero.
//!
//! [`HashingEmbedder`] is a dependency-free local embedder (feature hashing
//! over content tokens). It is deterministic and good enough for offline
//! analysis; [`crate::http::HttpEmbedder`] talks to a real model service.

use futures::future::{BoxFuture, FutureExt};
use pgap_core::Score;
use pgap_taxonomy::Clause;
use sha2::{Digest, Sha256};

use crate::error::ScoringError;
use crate::lexical::content_tokens;
use crate::segment::Segment;
use crate::traits::{ScorerCapability, SimilarityMatrix, SimilarityScorer};

/// Default vector dimension of [`HashingEmbedder`].
pub const DEFAULT_HASHING_DIMENSIONS: usize = 256;

/// Maps texts to embedding vectors.
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Backend name for logs and errors.
    fn name(&self) -> &str;

    /// Whether identical input always yields identical vectors.
    fn is_deterministic(&self) -> bool {
        true
    }

    /// Embed `texts`, returning one vector per input in input order.
    fn embed<'a>(&'a self, texts: &'a [&'a str]) -> BoxFuture<'a, Result<Vec<Vec<f32>>, ScoringError>>;
}

/// Cosine similarity of two vectors.
///
/// Returns `None` when the lengths differ and `Some(0.0)` when either vector
/// has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Scores pairs by the cosine similarity of their embeddings.
#[derive(Debug, Clone)]
pub struct EmbeddingScorer<E> {
    embedder: E,
}

impl<E: Embedder> EmbeddingScorer<E> {
    /// Wrap an embedder.
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    /// The wrapped embedder.
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    async fn matrix(
        &self,
        segments: &[Segment],
        clauses: &[&Clause],
    ) -> Result<SimilarityMatrix, ScoringError> {
        // Blank segments are never sent to the backend.
        let live: Vec<usize> = segments
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_blank())
            .map(|(i, _)| i)
            .collect();
        if clauses.is_empty() || live.is_empty() {
            return Ok(SimilarityMatrix::zeros(clauses.len(), segments.len()));
        }

        let texts: Vec<&str> = clauses
            .iter()
            .map(|c| c.content())
            .chain(live.iter().map(|&i| segments[i].text.as_str()))
            .collect();
        tracing::debug!(
            backend = self.embedder.name(),
            clauses = clauses.len(),
            segments = live.len(),
            "embedding batch"
        );
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(ScoringError::invalid(
                self.embedder.name(),
                format!("{} vectors for {} inputs", vectors.len(), texts.len()),
            ));
        }
        let (clause_vecs, segment_vecs) = vectors.split_at(clauses.len());

        let mut matrix = vec![vec![Score::ZERO; segments.len()]; clauses.len()];
        for (row, clause_vec) in matrix.iter_mut().zip(clause_vecs) {
            for (&col, segment_vec) in live.iter().zip(segment_vecs) {
                let cosine = cosine_similarity(clause_vec, segment_vec).ok_or_else(|| {
                    ScoringError::invalid(
                        self.embedder.name(),
                        format!(
                            "embedding dimensions differ ({} vs {})",
                            clause_vec.len(),
                            segment_vec.len()
                        ),
                    )
                })?;
                row[col] = Score::clamped(cosine);
            }
        }
        SimilarityMatrix::from_rows(matrix)
    }
}

impl<E: Embedder> SimilarityScorer for EmbeddingScorer<E> {
    fn name(&self) -> &str {
        self.embedder.name()
    }

    fn capability(&self) -> ScorerCapability {
        ScorerCapability::EmbeddingCosine
    }

    fn is_deterministic(&self) -> bool {
        self.embedder.is_deterministic()
    }

    fn score_batch<'a>(
        &'a self,
        segments: &'a [Segment],
        clauses: &'a [&'a Clause],
    ) -> BoxFuture<'a, Result<SimilarityMatrix, ScoringError>> {
        self.matrix(segments, clauses).boxed()
    }
}

/// Local embedder using unsigned feature hashing of content tokens.
///
/// Each token increments the bucket selected by the first eight bytes of its
/// SHA-256 digest. Vectors are term-frequency counts, so cosine similarity
/// is a bag-of-words overlap measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_HASHING_DIMENSIONS,
        }
    }
}

impl HashingEmbedder {
    /// Embedder with the given vector dimension.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Config`] when `dimensions` is zero.
    pub fn new(dimensions: usize) -> Result<Self, ScoringError> {
        if dimensions == 0 {
            return Err(ScoringError::Config(
                "hashing embedder needs at least one dimension".into(),
            ));
        }
        Ok(Self { dimensions })
    }

    /// Vector dimension.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed one text.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in content_tokens(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut head = [0u8; 8];
            head.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(head) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn embed<'a>(&'a self, texts: &'a [&'a str]) -> BoxFuture<'a, Result<Vec<Vec<f32>>, ScoringError>> {
        let vectors = texts.iter().map(|t| self.embed_one(t)).collect();
        futures::future::ready(Ok(vectors)).boxed()
    }
}
