//! # The Analysis Pipeline
//!
//! [`Analyzer`] runs one document through
//! segment → score → aggregate → detect gaps → recommend, recording every
//! stage on an [`AnalysisRun`].
//!
//! ## Concurrency
//!
//! Scoring fans out one task per domain on a [`JoinSet`]; results are
//! placed back by domain index, so ordering never depends on completion
//! order. Each task wraps its scorer call in
//! [`retry_with_backoff`]. The first failing domain aborts the rest.
//!
//! The whole pipeline runs under an optional deadline. Concurrent requests
//! with one [`ReportKey`] (document identity and display name) share a
//! single computation, and completed reports are served from a
//! [`ReportCache`] under the same key. Dropping the computation (deadline, or
//! every caller cancelled) drops the `JoinSet` and aborts its tasks; a
//! partial report is never produced.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use pgap_analysis::{
    build_results, AggregationMode, AnalysisReport, GapDetector, RecommendationGenerator,
    ReportContext,
};
use pgap_core::{DocumentId, Score};
use pgap_scoring::{
    build_scorer, retry_with_backoff, ParagraphSegmenter, RetryPolicy, Segment, Segmenter,
    SimilarityScorer,
};
use pgap_taxonomy::{Clause, Taxonomy};

use crate::cache::ReportCache;
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, ConfigError};
use crate::flight::{FlightOutcome, SingleFlight};
use crate::request::{AnalysisRequest, DocumentInput, ReportKey};
use crate::stage::{AnalysisRun, AnalysisStage, StageError, StageTracker};

type ReportResult = Result<Arc<AnalysisReport>, AnalysisError>;

struct Inner {
    taxonomy: Arc<Taxonomy>,
    scorer: Arc<dyn SimilarityScorer>,
    segmenter: Arc<dyn Segmenter>,
    aggregation: AggregationMode,
    detector: GapDetector,
    generator: RecommendationGenerator,
    retry: RetryPolicy,
    timeout: Option<Duration>,
    cache: ReportCache,
    flights: SingleFlight<ReportKey, ReportResult, StageTracker>,
}

/// Compares documents against a taxonomy.
///
/// Cheap to clone; clones share the taxonomy, scorer, cache and in-flight
/// registry.
#[derive(Clone)]
pub struct Analyzer {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("taxonomy", &self.inner.taxonomy.version().to_string())
            .field("scorer", &self.inner.scorer.name())
            .field("aggregation", &self.inner.aggregation)
            .field("timeout", &self.inner.timeout)
            .field("cached_reports", &self.inner.cache.len())
            .finish()
    }
}

impl Analyzer {
    /// Build an analyzer with the scorer named in `config`.
    pub fn from_config(taxonomy: Arc<Taxonomy>, config: &AnalyzerConfig) -> Result<Self, ConfigError> {
        let scorer = build_scorer(&config.scorer)?;
        Self::new(taxonomy, scorer, config)
    }

    /// Build an analyzer with an explicit scorer.
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        scorer: Arc<dyn SimilarityScorer>,
        config: &AnalyzerConfig,
    ) -> Result<Self, ConfigError> {
        let segmenter: Arc<dyn Segmenter> = match config.max_segment_chars {
            Some(max) => Arc::new(ParagraphSegmenter::with_max_chars(max)),
            None => Arc::new(ParagraphSegmenter::new()),
        };
        Self::with_segmenter(taxonomy, scorer, segmenter, config)
    }

    /// Build an analyzer with an explicit scorer and segmenter.
    pub fn with_segmenter(
        taxonomy: Arc<Taxonomy>,
        scorer: Arc<dyn SimilarityScorer>,
        segmenter: Arc<dyn Segmenter>,
        config: &AnalyzerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let detector = GapDetector::new(config.thresholds)?;
        let generator = RecommendationGenerator::new(config.template()?);
        tracing::info!(
            taxonomy = %taxonomy.version(),
            domains = taxonomy.domain_count(),
            clauses = taxonomy.clause_count(),
            scorer = scorer.name(),
            capability = %scorer.capability(),
            aggregation = %config.aggregation,
            "analyzer ready"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                taxonomy,
                scorer,
                segmenter,
                aggregation: config.aggregation,
                detector,
                generator,
                retry: config.retry,
                timeout: config.timeout(),
                cache: ReportCache::new(config.cache_capacity),
                flights: SingleFlight::new(),
            }),
        })
    }

    /// The taxonomy documents are compared against.
    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.inner.taxonomy
    }

    /// The scorer in use.
    pub fn scorer(&self) -> &Arc<dyn SimilarityScorer> {
        &self.inner.scorer
    }

    /// The report cache.
    pub fn cache(&self) -> &ReportCache {
        &self.inner.cache
    }

    /// Analyze a document.
    pub async fn analyze(&self, request: AnalysisRequest) -> ReportResult {
        self.analyze_with_cancel(request, &CancellationToken::new()).await
    }

    /// Analyze a document, giving up when `cancel` fires.
    ///
    /// Cancelling abandons only this caller's wait. The shared computation
    /// keeps running while any other caller waits for the same document.
    pub async fn analyze_with_cancel(
        &self,
        request: AnalysisRequest,
        cancel: &CancellationToken,
    ) -> ReportResult {
        let key = request.key();
        let document_id = key.document_id.clone();
        if let Some(report) = self.inner.cache.get(&key) {
            tracing::debug!(document_id = %document_id, "serving cached report");
            return Ok(report);
        }

        let inner = Arc::clone(&self.inner);
        let outcome = self
            .inner
            .flights
            .run(key, cancel, move || {
                let tracker = StageTracker::new();
                let future = Inner::run(inner, request, tracker.clone()).boxed();
                (future, tracker)
            })
            .await;

        match outcome {
            FlightOutcome::Completed { value, joined } => {
                if joined {
                    tracing::debug!(document_id = %document_id, "joined in-flight analysis");
                }
                value
            }
            FlightOutcome::Cancelled { progress } => {
                let stage = progress.get();
                tracing::info!(document_id = %document_id, stage = %stage, "analysis cancelled by caller");
                Err(AnalysisError::Cancelled { document_id, stage })
            }
        }
    }
}

impl Inner {
    async fn run(
        self: Arc<Self>,
        request: AnalysisRequest,
        tracker: StageTracker,
    ) -> ReportResult {
        let key = request.key();
        let document_id = key.document_id.clone();
        let started = Instant::now();
        let mut run = AnalysisRun::with_tracker(document_id.clone(), tracker);

        let result = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.execute(&mut run, request)).await {
                    Ok(result) => result,
                    Err(_) => Err(AnalysisError::AnalysisTimeout {
                        document_id: document_id.clone(),
                        stage: run.stage(),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    }),
                }
            }
            None => self.execute(&mut run, request).await,
        };

        match result {
            Ok(report) => {
                let report = Arc::new(report);
                self.cache.insert(key, Arc::clone(&report));
                let summary = report.summary();
                tracing::info!(
                    document_id = %document_id,
                    run_id = %run.id,
                    overall_score = summary.overall_score,
                    gaps = summary.gaps,
                    recommendations = summary.recommendations,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "analysis complete"
                );
                Ok(report)
            }
            Err(err) => {
                if let Err(stage_err) = run.fail() {
                    tracing::debug!(document_id = %document_id, "{stage_err}");
                }
                tracing::warn!(
                    document_id = %document_id,
                    run_id = %run.id,
                    stage = %err.stage(),
                    "analysis failed: {err}"
                );
                Err(err)
            }
        }
    }

    async fn execute(&self, run: &mut AnalysisRun, request: AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        let document_id = request.document_id;

        transition(run, AnalysisStage::Segmenting)?;
        let segments = match request.input {
            DocumentInput::Segments(segments) => segments,
            DocumentInput::Text(text) => {
                self.segmenter
                    .segment(&text)
                    .map_err(|e| AnalysisError::DocumentUnreadable {
                        document_id: document_id.clone(),
                        stage: AnalysisStage::Segmenting,
                        reason: e.to_string(),
                    })?
            }
        };
        tracing::debug!(document_id = %document_id, segments = segments.len(), "document segmented");

        transition(run, AnalysisStage::Scoring)?;
        let clause_scores = self.score_domains(&document_id, segments).await?;

        transition(run, AnalysisStage::Aggregating)?;
        let domains = build_results(&self.taxonomy, &clause_scores, self.aggregation.aggregation())
            .map_err(|e| AnalysisError::failed(&document_id, AnalysisStage::Aggregating, e))?;

        transition(run, AnalysisStage::GapDetecting)?;
        let gaps = self.detector.detect(&domains);

        transition(run, AnalysisStage::RecommendationGenerating)?;
        let recommendations = self.generator.generate(&gaps.gaps);

        let report = AnalysisReport::new(
            ReportContext {
                document_id,
                document_name: request.document_name,
                taxonomy_version: self.taxonomy.version().to_string(),
            },
            domains,
            gaps,
            recommendations,
        );
        transition(run, AnalysisStage::Complete)?;
        Ok(report)
    }

    /// Best clause scores per domain, in taxonomy order.
    async fn score_domains(
        &self,
        document_id: &DocumentId,
        segments: Vec<Segment>,
    ) -> Result<Vec<Vec<Score>>, AnalysisError> {
        let segments = Arc::new(segments);
        let domain_count = self.taxonomy.domain_count();
        let mut tasks = JoinSet::new();

        for index in 0..domain_count {
            let taxonomy = Arc::clone(&self.taxonomy);
            let scorer = Arc::clone(&self.scorer);
            let segments = Arc::clone(&segments);
            let retry = self.retry;
            let document_id = document_id.clone();
            tasks.spawn(async move {
                let result =
                    score_domain(&taxonomy, index, scorer.as_ref(), &segments, &retry, &document_id).await;
                (index, result)
            });
        }

        let mut per_domain: Vec<Option<Vec<Score>>> = vec![None; domain_count];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(scores))) => {
                    if let Some(slot) = per_domain.get_mut(index) {
                        *slot = Some(scores);
                    }
                }
                Ok((_, Err(err))) => {
                    tasks.abort_all();
                    return Err(err);
                }
                Err(join_err) => {
                    tasks.abort_all();
                    return Err(AnalysisError::failed(
                        document_id,
                        AnalysisStage::Scoring,
                        format!("scoring task failed: {join_err}"),
                    ));
                }
            }
        }

        per_domain
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| AnalysisError::failed(document_id, AnalysisStage::Scoring, "a domain produced no scores"))
    }
}

/// Score every clause of domain `index` against all segments.
async fn score_domain(
    taxonomy: &Taxonomy,
    index: usize,
    scorer: &dyn SimilarityScorer,
    segments: &[Segment],
    retry: &RetryPolicy,
    document_id: &DocumentId,
) -> Result<Vec<Score>, AnalysisError> {
    let domain = taxonomy.domains().get(index).ok_or_else(|| {
        AnalysisError::failed(document_id, AnalysisStage::Scoring, format!("no domain at index {index}"))
    })?;
    let clauses: Vec<&Clause> = domain.clauses().collect();
    tracing::debug!(
        document_id = %document_id,
        domain = domain.name(),
        clauses = clauses.len(),
        segments = segments.len(),
        "scoring domain"
    );

    let matrix = retry_with_backoff(retry, domain.name(), || scorer.score_batch(segments, &clauses))
        .await
        .map_err(|failure| {
            AnalysisError::failed(
                document_id,
                AnalysisStage::Scoring,
                format!("domain {:?}: {failure}", domain.name()),
            )
        })?;

    if matrix.shape() != (clauses.len(), segments.len()) {
        let (rows, cols) = matrix.shape();
        return Err(AnalysisError::failed(
            document_id,
            AnalysisStage::Scoring,
            format!(
                "domain {:?}: scorer {} returned a {rows}x{cols} matrix, expected {}x{}",
                domain.name(),
                scorer.name(),
                clauses.len(),
                segments.len()
            ),
        ));
    }
    Ok(matrix.best_per_clause())
}

fn transition(run: &mut AnalysisRun, to: AnalysisStage) -> Result<(), AnalysisError> {
    run.advance_to(to).map_err(|e: StageError| {
        let stage = match &e {
            StageError::InvalidTransition { from, .. } => *from,
            StageError::AlreadyTerminal { state } => *state,
        };
        AnalysisError::failed(&run.document_id, stage, e)
    })
}
