//! # Report Determinism
//!
//! With a deterministic scorer, identical input and taxonomy produce
//! byte-identical report JSON, across fresh analyzers and regardless of the
//! order in which domain scoring tasks finish. A stochastic scorer declares
//! itself non-deterministic, and its score spread stays within the jitter it
//! injects.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pgap_engine::{AnalysisRequest, Analyzer, AnalyzerConfig};
use pgap_scoring::{
    segments_from_texts, EmbeddingScorer, HashingEmbedder, LexicalOverlapScorer, SimilarityScorer,
};

const HANDBOOK: &str = "\
All passwords rotate quarterly and must use fourteen characters.

Remote logins require verification with a hardware token.

Reimbursement claims need invoices attached.
";

fn uncached() -> AnalyzerConfig {
    AnalyzerConfig {
        cache_capacity: 0,
        ..common::config()
    }
}

async fn report_json(scorer: Arc<dyn SimilarityScorer>) -> String {
    let analyzer = Analyzer::new(common::disjoint(), scorer, &uncached()).unwrap();
    analyzer
        .analyze(AnalysisRequest::from_text("handbook.txt", HANDBOOK))
        .await
        .unwrap()
        .to_json_pretty()
        .unwrap()
}

#[tokio::test]
async fn lexical_reports_are_byte_identical() {
    let a = report_json(Arc::new(LexicalOverlapScorer::new())).await;
    let b = report_json(Arc::new(LexicalOverlapScorer::new())).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn hashing_embedding_reports_are_byte_identical() {
    let scorer = || -> Arc<dyn SimilarityScorer> {
        Arc::new(EmbeddingScorer::new(HashingEmbedder::new(128).unwrap()))
    };
    assert_eq!(report_json(scorer()).await, report_json(scorer()).await);
}

#[tokio::test]
async fn rerun_on_one_analyzer_is_identical() {
    let analyzer =
        Analyzer::new(common::standard(), Arc::new(LexicalOverlapScorer::new()), &uncached()).unwrap();
    let request = AnalysisRequest::from_segments(
        "policy",
        segments_from_texts([
            "Confidential Information includes trade secrets and customer lists.",
            "Personal data is retained only as long as necessary.",
        ]),
    );
    let first = analyzer.analyze(request.clone()).await.unwrap();
    let second = analyzer.analyze(request).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn completion_order_does_not_affect_the_report() {
    let slow = Analyzer::new(
        common::disjoint(),
        Arc::new(common::CountingScorer::with_delay(Duration::from_millis(5))),
        &uncached(),
    )
    .unwrap();
    let fast = Analyzer::new(
        common::disjoint(),
        Arc::new(LexicalOverlapScorer::new()),
        &uncached(),
    )
    .unwrap();

    let request = AnalysisRequest::from_text("handbook.txt", HANDBOOK);
    let a = slow.analyze(request.clone()).await.unwrap();
    let b = fast.analyze(request).await.unwrap();
    assert_eq!(a.to_json_pretty().unwrap(), b.to_json_pretty().unwrap());
}

#[tokio::test]
async fn stochastic_scorer_has_bounded_variance() {
    const AMPLITUDE: f64 = 0.02;
    const RUNS: usize = 10;

    let scorer = Arc::new(common::JitterScorer::new(AMPLITUDE));
    assert!(!scorer.is_deterministic());

    let baseline = Analyzer::new(common::disjoint(), Arc::new(LexicalOverlapScorer::new()), &uncached())
        .unwrap()
        .analyze(AnalysisRequest::from_text("handbook.txt", HANDBOOK))
        .await
        .unwrap();

    let analyzer = Analyzer::new(common::disjoint(), scorer, &uncached()).unwrap();
    let mut spreads = vec![(f64::MAX, f64::MIN); baseline.domains.len()];
    for _ in 0..RUNS {
        let report = analyzer
            .analyze(AnalysisRequest::from_text("handbook.txt", HANDBOOK))
            .await
            .unwrap();
        for (i, domain) in report.domains.iter().enumerate() {
            let v = domain.score.value();
            let base = baseline.domains[i].score.value();
            assert!((v - base).abs() <= AMPLITUDE + 1e-9, "domain {} drifted", domain.domain);
            spreads[i] = (spreads[i].0.min(v), spreads[i].1.max(v));
        }
    }
    for (min, max) in spreads {
        assert!(max - min <= 2.0 * AMPLITUDE + 1e-9);
    }
}
