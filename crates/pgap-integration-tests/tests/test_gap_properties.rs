//! # Gap Detection Properties
//!
//! Property tests over arbitrary clause scores for the standard taxonomy:
//! the gap set is exactly the sections under threshold, the missing list is
//! exactly the clauses under threshold inside those sections, and there is
//! one recommendation per missing clause.

mod common;

use pgap_analysis::{
    build_results, AggregationMode, AnalysisReport, DomainResult, GapDetector, GapThresholds,
    RecommendationGenerator, ReportContext,
};
use pgap_core::{DocumentId, Score};
use pgap_taxonomy::Taxonomy;
use proptest::prelude::*;

fn per_domain(taxonomy: &Taxonomy, flat: &[f64]) -> Vec<Vec<Score>> {
    let mut values = flat.iter().copied();
    taxonomy
        .domains()
        .iter()
        .map(|d| {
            (0..d.clause_count())
                .map(|_| Score::clamped(values.next().unwrap_or(0.0)))
                .collect()
        })
        .collect()
}

fn results(taxonomy: &Taxonomy, flat: &[f64], mode: AggregationMode) -> Vec<DomainResult> {
    build_results(taxonomy, &per_domain(taxonomy, flat), mode.aggregation()).unwrap()
}

fn clause_count() -> usize {
    common::standard().clause_count()
}

fn modes() -> impl Strategy<Value = AggregationMode> {
    prop_oneof![Just(AggregationMode::Mean), Just(AggregationMode::ClauseWeighted)]
}

proptest! {
    #[test]
    fn gap_set_matches_thresholds(
        flat in prop::collection::vec(0.0f64..=1.0, clause_count()),
        section_gap in 0.0f64..=1.0,
        clause_missing in 0.0f64..=1.0,
        mode in modes(),
    ) {
        let taxonomy = common::standard();
        let domains = results(&taxonomy, &flat, mode);
        let detector = GapDetector::new(GapThresholds {
            section_gap,
            clause_missing,
            domain_gap: None,
        })
        .unwrap();
        let report = detector.detect(&domains);

        let expected: Vec<(&str, &str)> = domains
            .iter()
            .flat_map(|d| d.sections.iter().map(move |s| (d, s)))
            .filter(|(_, s)| s.score.value() < section_gap)
            .map(|(d, s)| (d.domain.as_str(), s.section.as_str()))
            .collect();
        let actual: Vec<(&str, &str)> = report
            .gaps
            .iter()
            .map(|g| (g.domain.as_str(), g.section.as_str()))
            .collect();
        prop_assert_eq!(actual, expected);

        for gap in &report.gaps {
            let section = domains
                .iter()
                .find(|d| d.domain == gap.domain)
                .and_then(|d| d.section(&gap.section))
                .unwrap();
            let expected: Vec<&str> = section
                .clauses
                .iter()
                .filter(|c| c.score.value() < clause_missing)
                .map(|c| c.clause.as_str())
                .collect();
            prop_assert_eq!(&gap.missing_clauses, &expected);
            prop_assert_eq!(gap.score, section.score);
        }

        let recommendations = RecommendationGenerator::default().generate(&report.gaps);
        prop_assert_eq!(recommendations.len(), report.missing_clause_count());
    }

    #[test]
    fn every_score_is_bounded(
        flat in prop::collection::vec(0.0f64..=1.0, clause_count()),
        mode in modes(),
    ) {
        let taxonomy = common::standard();
        let domains = results(&taxonomy, &flat, mode);
        for d in &domains {
            prop_assert!((0.0..=1.0).contains(&d.score.value()));
            for s in &d.sections {
                prop_assert!((0.0..=1.0).contains(&s.score.value()));
            }
        }
        let report = AnalysisReport::new(
            ReportContext {
                document_id: DocumentId::new("prop").unwrap(),
                document_name: "prop".to_string(),
                taxonomy_version: taxonomy.version().to_string(),
            },
            domains,
            Default::default(),
            Vec::new(),
        );
        prop_assert!(report.overall_score <= 100);
    }

    #[test]
    fn raising_one_clause_never_lowers_any_score(
        flat in prop::collection::vec(0.0f64..=1.0, clause_count()),
        index in 0..clause_count(),
        bump in 0.0f64..=1.0,
        mode in modes(),
    ) {
        let taxonomy = common::standard();
        let before = results(&taxonomy, &flat, mode);
        let mut raised = flat.clone();
        raised[index] = (raised[index] + bump).min(1.0);
        let after = results(&taxonomy, &raised, mode);

        for (b, a) in before.iter().zip(&after) {
            prop_assert!(a.score.value() >= b.score.value() - 1e-12);
            for (bs, as_) in b.sections.iter().zip(&a.sections) {
                prop_assert!(as_.score.value() >= bs.score.value() - 1e-12);
            }
        }
    }
}

#[test]
fn section_exactly_at_threshold_is_not_a_gap() {
    let taxonomy = common::disjoint();
    // Access Control has two clauses: mean(0.6, 0.6) = 0.6.
    let flat = vec![0.6, 0.6, 0.0, 0.9, 0.9];
    let domains = results(&taxonomy, &flat, AggregationMode::Mean);
    let report = GapDetector::default().detect(&domains);

    let sections: Vec<&str> = report.gaps.iter().map(|g| g.section.as_str()).collect();
    assert_eq!(sections, vec!["Incident Response"]);
}

#[test]
fn clause_exactly_at_threshold_is_not_missing() {
    let taxonomy = common::disjoint();
    let flat = vec![0.5, 0.2, 1.0, 1.0, 1.0];
    let domains = results(&taxonomy, &flat, AggregationMode::Mean);
    let report = GapDetector::default().detect(&domains);

    assert_eq!(report.gaps.len(), 1);
    assert_eq!(report.gaps[0].section, "Access Control");
    assert_eq!(report.gaps[0].missing_clauses, vec!["MFA"]);
}

#[test]
fn domain_gaps_only_when_configured() {
    let taxonomy = common::disjoint();
    let flat = vec![1.0, 1.0, 1.0, 0.1, 0.1];
    let domains = results(&taxonomy, &flat, AggregationMode::Mean);

    assert!(GapDetector::default().detect(&domains).domain_gaps.is_empty());

    let detector = GapDetector::new(GapThresholds {
        domain_gap: Some(0.5),
        ..GapThresholds::default()
    })
    .unwrap();
    let report = detector.detect(&domains);
    assert_eq!(report.domain_gaps.len(), 1);
    assert_eq!(report.domain_gaps[0].domain, "Finance");
}
