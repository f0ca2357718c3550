//! # pgap-analysis: From Clause Scores to Recommendations
//!
//! The pure, synchronous half of the pipeline. Given the best segment score
//! of every clause:
//!
//! 1. [`results`] builds the domain/section/clause result tree, rolling
//!    scores up with an [`Aggregation`] from [`aggregate`].
//! 2. [`gaps`] flags sections below the section threshold and, inside
//!    them, clauses below the clause threshold.
//! 3. [`recommend`] turns each missing clause into remediation text.
//! 4. [`report`] assembles the [`AnalysisReport`], with qualitative
//!    labels from [`grade`]; [`export`] renders it.
//!
//! Every structure preserves taxonomy order. Nothing here performs I/O.

pub mod aggregate;
pub mod error;
pub mod export;
pub mod gaps;
pub mod grade;
pub mod recommend;
pub mod report;
pub mod results;

pub use aggregate::{overall_percent, Aggregation, AggregationMode, ArithmeticMean, ClauseWeighted};
pub use error::ReportError;
pub use export::{render_markdown, render_recommendations};
pub use gaps::{DomainGap, GapDetector, GapRecord, GapReport, GapThresholds};
pub use grade::{AlignmentLabel, ComplianceLevel, GapSeverity};
pub use recommend::{Recommendation, RecommendationGenerator, RecommendationTemplate, DEFAULT_TEMPLATE};
pub use report::{AnalysisReport, ReportContext, ReportSummary};
pub use results::{build_results, ClauseResult, DomainResult, SectionResult};
