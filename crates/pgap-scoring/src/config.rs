//! Scorer selection from configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::embedding::{EmbeddingScorer, HashingEmbedder, DEFAULT_HASHING_DIMENSIONS};
use crate::error::ScoringError;
use crate::http::{EmbeddingApiConfig, HttpEmbedder};
use crate::lexical::LexicalOverlapScorer;
use crate::traits::SimilarityScorer;

/// Which scorer an analyzer uses.
///
/// ```yaml
/// scorer:
///   kind: hashing_embedding
///   dimensions: 512
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScorerConfig {
    /// [`LexicalOverlapScorer`].
    Lexical {
        #[serde(default = "default_true")]
        remove_stopwords: bool,
    },
    /// [`EmbeddingScorer`] over a local [`HashingEmbedder`].
    HashingEmbedding {
        #[serde(default = "default_dimensions")]
        dimensions: usize,
    },
    /// [`EmbeddingScorer`] over an [`HttpEmbedder`]. Connection settings
    /// come from the `PGAP_EMBEDDING_*` environment; `base_url` and `model`
    /// override them when present. The token is only read from the
    /// environment.
    HttpEmbedding {
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
        #[serde(default = "default_true")]
        deterministic: bool,
    },
}

fn default_true() -> bool {
    true
}

fn default_dimensions() -> usize {
    DEFAULT_HASHING_DIMENSIONS
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self::Lexical {
            remove_stopwords: true,
        }
    }
}

/// Construct the configured scorer.
///
/// # Errors
///
/// Returns [`ScoringError::Config`] for invalid settings or a missing
/// embedding endpoint.
pub fn build_scorer(config: &ScorerConfig) -> Result<Arc<dyn SimilarityScorer>, ScoringError> {
    let scorer: Arc<dyn SimilarityScorer> = match config {
        ScorerConfig::Lexical { remove_stopwords } => {
            Arc::new(LexicalOverlapScorer::with_stopwords_removed(*remove_stopwords))
        }
        ScorerConfig::HashingEmbedding { dimensions } => {
            Arc::new(EmbeddingScorer::new(HashingEmbedder::new(*dimensions)?))
        }
        ScorerConfig::HttpEmbedding {
            base_url,
            model,
            deterministic,
        } => {
            let mut api = match base_url {
                Some(url) => {
                    let mut api = EmbeddingApiConfig::new(url)?;
                    if let Ok(token) = std::env::var("PGAP_EMBEDDING_API_TOKEN") {
                        if !token.is_empty() {
                            api = api.with_token(token);
                        }
                    }
                    api
                }
                None => EmbeddingApiConfig::from_env()?,
            };
            if let Some(model) = model {
                api.model = model.clone();
            }
            api.deterministic = *deterministic;
            tracing::debug!(config = ?api, "building HTTP embedding scorer");
            Arc::new(EmbeddingScorer::new(HttpEmbedder::new(api)?))
        }
    };
    Ok(scorer)
}
