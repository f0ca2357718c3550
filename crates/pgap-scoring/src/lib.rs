//! # pgap-scoring: Segment/Clause Similarity
//!
//! Every analysis compares each document [`Segment`] against each taxonomy
//! clause. This crate provides:
//!
//! - **The capability** ([`traits`]): [`SimilarityScorer`], implemented by
//!   every backend, and [`SimilarityMatrix`], its batch result.
//! - **Lexical overlap** ([`lexical`]): clause-token recall over
//!   stop-word-filtered tokens. Deterministic, no model.
//! - **Embedding cosine** ([`embedding`]): [`EmbeddingScorer`] over any
//!   [`Embedder`], with a local [`HashingEmbedder`] and a remote
//!   [`HttpEmbedder`] ([`http`]).
//! - **Retry** ([`retry`]): exponential backoff over transient
//!   [`ScoringError`]s.
//! - **Segmentation** ([`segment`]): the [`Segmenter`] trait and a
//!   paragraph splitter for plain text.
//!
//! Scores are [`pgap_core::Score`] values, so the `[0, 1]` bound holds by
//! construction for every backend.

pub mod config;
pub mod embedding;
pub mod error;
pub mod http;
pub mod lexical;
pub mod retry;
pub mod segment;
pub mod traits;

pub use config::{build_scorer, ScorerConfig};
pub use embedding::{cosine_similarity, Embedder, EmbeddingScorer, HashingEmbedder};
pub use error::ScoringError;
pub use http::{EmbeddingApiConfig, HttpEmbedder};
pub use lexical::LexicalOverlapScorer;
pub use retry::{retry_with_backoff, RetryFailure, RetryPolicy};
pub use segment::{segments_from_texts, ParagraphSegmenter, Segment, SegmentationError, Segmenter};
pub use traits::{ScorerCapability, SimilarityMatrix, SimilarityScorer};
