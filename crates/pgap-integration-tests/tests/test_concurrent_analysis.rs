//! # Concurrent Analysis
//!
//! Pipeline behavior under concurrency and failure:
//!
//! 1. Concurrent requests for one document share a single computation.
//! 2. Caller cancellation and the pipeline deadline.
//! 3. Retry of transient scorer failures.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use pgap_engine::{AnalysisError, AnalysisRequest, AnalysisStage, Analyzer, AnalyzerConfig};
use pgap_scoring::{segments_from_texts, SimilarityScorer};
use pgap_taxonomy::Taxonomy;

fn analyzer<S: SimilarityScorer + 'static>(
    taxonomy: Arc<Taxonomy>,
    scorer: Arc<S>,
    config: &AnalyzerConfig,
) -> Analyzer {
    Analyzer::new(taxonomy, scorer, config).unwrap()
}

fn request(name: &str) -> AnalysisRequest {
    AnalysisRequest::from_segments(
        name,
        segments_from_texts([
            "Passwords rotate quarterly using fourteen characters.",
            format!("Document {name}.").as_str(),
        ]),
    )
}

// ---------------------------------------------------------------------------
// 1. Single-flight
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn concurrent_requests_score_each_domain_once() {
    let taxonomy = common::disjoint();
    let domains = taxonomy.domain_count();
    let scorer = Arc::new(common::CountingScorer::with_delay(Duration::from_millis(50)));
    let analyzer = analyzer(taxonomy, Arc::clone(&scorer), &common::config());

    let reports = join_all((0..8).map(|_| analyzer.analyze(request("shared")))).await;

    assert_eq!(scorer.calls(), domains);
    let first = reports[0].as_ref().unwrap();
    for report in &reports {
        assert!(Arc::ptr_eq(first, report.as_ref().unwrap()));
    }
}

#[tokio::test(start_paused = true)]
async fn distinct_documents_are_not_collapsed() {
    let taxonomy = common::disjoint();
    let domains = taxonomy.domain_count();
    let scorer = Arc::new(common::CountingScorer::with_delay(Duration::from_millis(50)));
    let analyzer = analyzer(taxonomy, Arc::clone(&scorer), &common::config());

    let (a, b) = tokio::join!(analyzer.analyze(request("a")), analyzer.analyze(request("b")));
    assert_ne!(a.unwrap().document_id, b.unwrap().document_id);
    assert_eq!(scorer.calls(), 2 * domains);
}

#[tokio::test(start_paused = true)]
async fn later_requests_are_served_from_cache() {
    let taxonomy = common::disjoint();
    let domains = taxonomy.domain_count();
    let scorer = Arc::new(common::CountingScorer::new());
    let analyzer = analyzer(taxonomy, Arc::clone(&scorer), &common::config());

    let first = analyzer.analyze(request("cached")).await.unwrap();
    let second = analyzer.analyze(request("cached")).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(scorer.calls(), domains);
}

#[tokio::test(start_paused = true)]
async fn same_body_under_another_name_gets_its_own_report() {
    let scorer = Arc::new(common::CountingScorer::new());
    let analyzer = analyzer(common::disjoint(), Arc::clone(&scorer), &common::config());

    let a = analyzer
        .analyze(AnalysisRequest::from_text("a.txt", "Same body text."))
        .await
        .unwrap();
    let b = analyzer
        .analyze(AnalysisRequest::from_text("b.txt", "Same body text."))
        .await
        .unwrap();
    assert_eq!(a.document_name, "a.txt");
    assert_eq!(b.document_name, "b.txt");
    assert_eq!(a.document_id, b.document_id);
    assert_eq!(analyzer.cache().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_with_different_names_are_not_joined() {
    let scorer = Arc::new(common::CountingScorer::with_delay(Duration::from_millis(50)));
    let analyzer = analyzer(common::disjoint(), Arc::clone(&scorer), &common::config());

    let (a, b) = tokio::join!(
        analyzer.analyze(AnalysisRequest::from_text("a.txt", "Same body text.")),
        analyzer.analyze(AnalysisRequest::from_text("b.txt", "Same body text.")),
    );
    assert_eq!(a.unwrap().document_name, "a.txt");
    assert_eq!(b.unwrap().document_name, "b.txt");
}

#[tokio::test(start_paused = true)]
async fn text_and_single_segment_of_the_same_string_are_cached_apart() {
    let taxonomy = common::disjoint();
    let domains = taxonomy.domain_count();
    let scorer = Arc::new(common::CountingScorer::new());
    let analyzer = analyzer(taxonomy, Arc::clone(&scorer), &common::config());
    let body = "Passwords rotate quarterly.\n\nReceipts are kept for audit.";

    let text = analyzer.analyze(AnalysisRequest::from_text("d", body)).await.unwrap();
    let segments = analyzer
        .analyze(AnalysisRequest::from_segments("d", segments_from_texts([body])))
        .await
        .unwrap();
    assert!(!Arc::ptr_eq(&text, &segments));
    assert_ne!(text.document_id, segments.document_id);
    assert_eq!(scorer.calls(), 2 * domains);
}

// ---------------------------------------------------------------------------
// 2. Cancellation and deadline
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn cancelled_caller_gets_cancelled_error() {
    let scorer = Arc::new(common::StallingScorer::default());
    let analyzer = analyzer(common::disjoint(), Arc::clone(&scorer), &common::config());

    let cancel = CancellationToken::new();
    let task = {
        let analyzer = analyzer.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { analyzer.analyze_with_cancel(request("stuck"), &cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    cancel.cancel();

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, AnalysisError::Cancelled { .. }), "{err}");
    assert_eq!(err.stage(), AnalysisStage::Scoring);
    assert_eq!(err.document_id(), &request("stuck").document_id);
    assert!(analyzer.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn one_cancelled_waiter_does_not_stop_the_others() {
    let taxonomy = common::disjoint();
    let domains = taxonomy.domain_count();
    let scorer = Arc::new(common::CountingScorer::with_delay(Duration::from_millis(100)));
    let analyzer = analyzer(taxonomy, Arc::clone(&scorer), &common::config());

    let cancel = CancellationToken::new();
    let leaving = {
        let analyzer = analyzer.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { analyzer.analyze_with_cancel(request("shared"), &cancel).await })
    };
    let staying = {
        let analyzer = analyzer.clone();
        tokio::spawn(async move { analyzer.analyze(request("shared")).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    cancel.cancel();

    assert!(matches!(leaving.await.unwrap(), Err(AnalysisError::Cancelled { .. })));
    let report = staying.await.unwrap().unwrap();
    assert_eq!(report.document_name, "shared");
    assert_eq!(scorer.calls(), domains);
}

#[tokio::test(start_paused = true)]
async fn deadline_yields_timeout_during_scoring() {
    let config = AnalyzerConfig {
        timeout_secs: 1,
        ..common::config()
    };
    let scorer = Arc::new(common::StallingScorer::default());
    let analyzer = analyzer(common::disjoint(), Arc::clone(&scorer), &config);

    let err = analyzer.analyze(request("slow")).await.unwrap_err();
    match &err {
        AnalysisError::AnalysisTimeout { stage, .. } => assert_eq!(*stage, AnalysisStage::Scoring),
        other => panic!("expected timeout, got {other}"),
    }
    assert!(analyzer.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn timed_out_document_can_be_retried() {
    let config = AnalyzerConfig {
        timeout_secs: 1,
        ..common::config()
    };
    let scorer = Arc::new(common::StallingScorer::default());
    let analyzer = analyzer(common::disjoint(), Arc::clone(&scorer), &config);

    assert!(analyzer.analyze(request("slow")).await.is_err());
    let calls = scorer.calls();
    assert!(analyzer.analyze(request("slow")).await.is_err());
    assert_eq!(scorer.calls(), 2 * calls);
}

// ---------------------------------------------------------------------------
// 3. Retry
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn transient_failures_then_success_produce_a_report() {
    let scorer = Arc::new(common::FlakyScorer::new(2, common::unavailable()));
    let analyzer = analyzer(common::single_domain(), Arc::clone(&scorer), &common::config());

    let report = analyzer.analyze(request("flaky")).await.unwrap();
    assert_eq!(report.overall_score, 100);
    assert_eq!(scorer.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn persistent_failures_exhaust_retries() {
    let config = common::config();
    let scorer = Arc::new(common::FlakyScorer::always(common::unavailable()));
    let analyzer = analyzer(common::single_domain(), Arc::clone(&scorer), &config);

    let err = analyzer.analyze(request("down")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::AnalysisFailed { .. }));
    assert_eq!(err.stage(), AnalysisStage::Scoring);
    assert_eq!(scorer.calls(), config.retry.max_retries as usize + 1);
    assert!(err.to_string().contains("after 4 attempt(s)"));
    assert!(analyzer.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rejected_requests_are_not_retried() {
    let scorer = Arc::new(common::FlakyScorer::always(common::rejected()));
    let analyzer = analyzer(common::single_domain(), Arc::clone(&scorer), &common::config());

    let err = analyzer.analyze(request("bad")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::AnalysisFailed { .. }));
    assert_eq!(scorer.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn failures_are_shared_by_joined_callers() {
    let scorer = Arc::new(common::FlakyScorer::always(common::unavailable()));
    let analyzer = analyzer(common::single_domain(), Arc::clone(&scorer), &common::config());

    let results = join_all((0..4).map(|_| analyzer.analyze(request("down")))).await;
    let errors: Vec<AnalysisError> = results.into_iter().map(|r| r.unwrap_err()).collect();
    assert!(errors.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(scorer.calls(), 4);
}
