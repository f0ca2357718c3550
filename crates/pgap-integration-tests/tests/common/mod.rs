//! Shared fixtures: taxonomies, configurations and instrumented scorers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use pgap_core::Score;
use pgap_engine::AnalyzerConfig;
use pgap_scoring::{
    LexicalOverlapScorer, RetryPolicy, ScorerCapability, ScoringError, Segment, SimilarityMatrix,
    SimilarityScorer,
};
use pgap_taxonomy::{standard_policies, taxonomy_from_yaml_str, Clause, Taxonomy};

/// Two domains with disjoint vocabulary, so matching one leaves the other
/// at exactly zero.
pub const DISJOINT_YAML: &str = r#"
version: disjoint-1
domains:
  - domain: Security
    sections:
      - title: Access Control
        clauses:
          - title: Passwords
            content: Passwords rotate quarterly using fourteen characters.
          - title: MFA
            content: Remote logins require hardware token verification.
      - title: Incident Response
        clauses:
          - title: Reporting
            content: Breaches escalate within twenty four hours.
  - domain: Finance
    sections:
      - title: Expenses
        clauses:
          - title: Receipts
            content: Reimbursement claims need itemised invoices attached.
          - title: Approval
            content: Managers sign purchases exceeding budget limits.
"#;

/// One domain, for exact per-call accounting.
pub const SINGLE_DOMAIN_YAML: &str = r#"
- domain: Security
  sections:
    - title: Access Control
      clauses:
        - title: Passwords
          content: Passwords rotate quarterly using fourteen characters.
"#;

pub fn standard() -> Arc<Taxonomy> {
    Arc::new(standard_policies().unwrap())
}

pub fn disjoint() -> Arc<Taxonomy> {
    Arc::new(taxonomy_from_yaml_str(DISJOINT_YAML).unwrap())
}

pub fn single_domain() -> Arc<Taxonomy> {
    Arc::new(taxonomy_from_yaml_str(SINGLE_DOMAIN_YAML).unwrap())
}

/// Canonical clause texts of one domain, as segments.
pub fn domain_segments(taxonomy: &Taxonomy, domain: &str) -> Vec<Segment> {
    taxonomy
        .domain(domain)
        .unwrap()
        .clauses()
        .enumerate()
        .map(|(i, c)| Segment::new(i, c.content()))
        .collect()
}

/// Canonical clause texts of the whole taxonomy, as segments.
pub fn all_segments(taxonomy: &Taxonomy) -> Vec<Segment> {
    taxonomy
        .clauses()
        .enumerate()
        .map(|(i, (_, _, c))| Segment::new(i, c.content()))
        .collect()
}

/// Default configuration with millisecond backoff.
pub fn config() -> AnalyzerConfig {
    AnalyzerConfig {
        retry: RetryPolicy {
            max_retries: 3,
            base_delay_ms: 1,
        },
        ..AnalyzerConfig::default()
    }
}

/// Lexical scoring that counts calls and optionally sleeps first.
#[derive(Debug, Default)]
pub struct CountingScorer {
    inner: LexicalOverlapScorer,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SimilarityScorer for CountingScorer {
    fn name(&self) -> &str {
        "counting"
    }

    fn capability(&self) -> ScorerCapability {
        ScorerCapability::LexicalOverlap
    }

    fn score_batch<'a>(
        &'a self,
        segments: &'a [Segment],
        clauses: &'a [&'a Clause],
    ) -> BoxFuture<'a, Result<SimilarityMatrix, ScoringError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.inner.score_batch(segments, clauses).await
        }
        .boxed()
    }
}

/// Fails the first `failures` calls with `error`, then scores lexically.
#[derive(Debug)]
pub struct FlakyScorer {
    inner: LexicalOverlapScorer,
    failures: usize,
    error: ScoringError,
    calls: AtomicUsize,
}

impl FlakyScorer {
    pub fn new(failures: usize, error: ScoringError) -> Self {
        Self {
            inner: LexicalOverlapScorer::new(),
            failures,
            error,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails every call.
    pub fn always(error: ScoringError) -> Self {
        Self::new(usize::MAX, error)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn unavailable() -> ScoringError {
    ScoringError::Unavailable {
        backend: "flaky".to_string(),
        reason: "connection reset".to_string(),
    }
}

pub fn rejected() -> ScoringError {
    ScoringError::Rejected {
        backend: "flaky".to_string(),
        status: 400,
        body: "bad input".to_string(),
    }
}

impl SimilarityScorer for FlakyScorer {
    fn name(&self) -> &str {
        "flaky"
    }

    fn capability(&self) -> ScorerCapability {
        ScorerCapability::EmbeddingCosine
    }

    fn score_batch<'a>(
        &'a self,
        segments: &'a [Segment],
        clauses: &'a [&'a Clause],
    ) -> BoxFuture<'a, Result<SimilarityMatrix, ScoringError>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            let error = self.error.clone();
            return async move { Err(error) }.boxed();
        }
        self.inner.score_batch(segments, clauses)
    }
}

/// Never completes.
#[derive(Debug, Default)]
pub struct StallingScorer {
    calls: AtomicUsize,
}

impl StallingScorer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SimilarityScorer for StallingScorer {
    fn name(&self) -> &str {
        "stalling"
    }

    fn capability(&self) -> ScorerCapability {
        ScorerCapability::EmbeddingCosine
    }

    fn score_batch<'a>(
        &'a self,
        _segments: &'a [Segment],
        _clauses: &'a [&'a Clause],
    ) -> BoxFuture<'a, Result<SimilarityMatrix, ScoringError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        futures::future::pending().boxed()
    }
}

/// Lexical scores perturbed by up to `amplitude` per cell, varying with
/// every call. Stands in for a sampling embedding backend.
#[derive(Debug)]
pub struct JitterScorer {
    inner: LexicalOverlapScorer,
    amplitude: f64,
    calls: AtomicUsize,
}

impl JitterScorer {
    pub fn new(amplitude: f64) -> Self {
        Self {
            inner: LexicalOverlapScorer::new(),
            amplitude,
            calls: AtomicUsize::new(0),
        }
    }

    /// Noise in [-1, 1] from a 64-bit mix of the call and cell numbers.
    fn noise(call: usize, cell: usize) -> f64 {
        let mut x = (call as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (cell as u64);
        x ^= x >> 33;
        x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
        x ^= x >> 33;
        (x as f64 / u64::MAX as f64) * 2.0 - 1.0
    }
}

impl SimilarityScorer for JitterScorer {
    fn name(&self) -> &str {
        "jitter"
    }

    fn capability(&self) -> ScorerCapability {
        ScorerCapability::EmbeddingCosine
    }

    fn is_deterministic(&self) -> bool {
        false
    }

    fn score_batch<'a>(
        &'a self,
        segments: &'a [Segment],
        clauses: &'a [&'a Clause],
    ) -> BoxFuture<'a, Result<SimilarityMatrix, ScoringError>> {
        async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let base = self.inner.score_batch(segments, clauses).await?;
            let (rows, cols) = base.shape();
            let mut values = Vec::with_capacity(rows * cols);
            for r in 0..rows {
                for c in 0..cols {
                    let v = base.get(r, c).unwrap_or(Score::ZERO).value();
                    let jitter = self.amplitude * Self::noise(call, r * cols + c);
                    values.push(Score::clamped(v + jitter));
                }
            }
            SimilarityMatrix::new(rows, cols, values)
        }
        .boxed()
    }
}
