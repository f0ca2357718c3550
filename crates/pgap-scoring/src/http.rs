//! # HTTP Embedding Client
//!
//! [`HttpEmbedder`] calls an OpenAI-compatible `POST {base_url}/embeddings`
//! endpoint. Failures are mapped onto [`ScoringError`]:
//!
//! | condition                                  | error              |
//! |--------------------------------------------|--------------------|
//! | connect failure, timeout, HTTP 429, 5xx    | `Unavailable`      |
//! | other HTTP 4xx                             | `Rejected`         |
//! | malformed body, wrong vector count         | `InvalidResponse`  |
//!
//! Retries are not built into the client. The analyzer wraps every scoring
//! call in [`crate::retry::retry_with_backoff`].

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::embedding::Embedder;
use crate::error::ScoringError;

const BACKEND: &str = "http-embeddings";

/// Default model requested when `PGAP_EMBEDDING_MODEL` is unset.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest response body excerpt kept in error messages.
const BODY_EXCERPT_CHARS: usize = 512;

/// Connection settings for an embedding service.
///
/// Custom `Debug` implementation redacts the `api_token` field.
#[derive(Clone)]
pub struct EmbeddingApiConfig {
    /// Service base URL; `/embeddings` is appended.
    pub base_url: Url,
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer token, if the service requires one.
    pub api_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Whether the service returns identical vectors for identical input.
    pub deterministic: bool,
}

impl std::fmt::Debug for EmbeddingApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingApiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("deterministic", &self.deterministic)
            .finish()
    }
}

impl EmbeddingApiConfig {
    /// Configuration for `base_url` with default model and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Config`] if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, ScoringError> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            deterministic: true,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PGAP_EMBEDDING_URL` (required)
    /// - `PGAP_EMBEDDING_MODEL` (default: `text-embedding-3-small`)
    /// - `PGAP_EMBEDDING_API_TOKEN` (optional)
    /// - `PGAP_EMBEDDING_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ScoringError> {
        let raw_url = std::env::var("PGAP_EMBEDDING_URL").map_err(|_| {
            ScoringError::Config("PGAP_EMBEDDING_URL environment variable is required".into())
        })?;
        Ok(Self {
            base_url: parse_url("PGAP_EMBEDDING_URL", &raw_url)?,
            model: std::env::var("PGAP_EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            api_token: std::env::var("PGAP_EMBEDDING_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            timeout_secs: std::env::var("PGAP_EMBEDDING_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            deterministic: true,
        })
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.as_str().trim_end_matches('/'))
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ScoringError> {
    Url::parse(raw).map_err(|e| ScoringError::Config(format!("invalid URL for {name}: {e}")))
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedder backed by a remote embedding service.
#[derive(Debug)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    deterministic: bool,
}

impl HttpEmbedder {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Config`] for a token with invalid header
    /// characters or if the client cannot be built.
    pub fn new(config: EmbeddingApiConfig) -> Result<Self, ScoringError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ScoringError::Config("invalid API token characters".into()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ScoringError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
            model: config.model,
            deterministic: config.deterministic,
        })
    }

    async fn request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ScoringError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoringError::Unavailable {
                backend: BACKEND.to_string(),
                reason: if e.is_timeout() {
                    format!("request to {} timed out", self.endpoint)
                } else {
                    format!("request to {} failed: {e}", self.endpoint)
                },
            })?;

        let status = resp.status();
        if status.as_u16() == 429 || status.is_server_error() {
            let body = excerpt(resp.text().await.unwrap_or_default());
            return Err(ScoringError::Unavailable {
                backend: BACKEND.to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }
        if !status.is_success() {
            let body = excerpt(resp.text().await.unwrap_or_default());
            return Err(ScoringError::Rejected {
                backend: BACKEND.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await.map_err(|e| ScoringError::Unavailable {
            backend: BACKEND.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;
        let parsed: EmbeddingResponse = serde_json::from_str(&text)
            .map_err(|e| ScoringError::invalid(BACKEND, format!("malformed body: {e}")))?;
        order_vectors(parsed.data, texts.len())
    }
}

/// Sort response items by `index` and check every input got exactly one
/// vector.
fn order_vectors(mut data: Vec<EmbeddingDatum>, expected: usize) -> Result<Vec<Vec<f32>>, ScoringError> {
    if data.len() != expected {
        return Err(ScoringError::invalid(
            BACKEND,
            format!("{} vectors for {expected} inputs", data.len()),
        ));
    }
    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(ScoringError::invalid(BACKEND, "response indices are not 0..n"));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

fn excerpt(body: String) -> String {
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        return body;
    }
    body.chars().take(BODY_EXCERPT_CHARS).collect::<String>() + "..."
}

impl Embedder for HttpEmbedder {
    fn name(&self) -> &str {
        BACKEND
    }

    fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    fn embed<'a>(&'a self, texts: &'a [&'a str]) -> BoxFuture<'a, Result<Vec<Vec<f32>>, ScoringError>> {
        self.request(texts).boxed()
    }
}
