//! # Analysis Stage Machine
//!
//! Every analysis run moves strictly forward through:
//!
//! ```text
//! Idle → Segmenting → Scoring → Aggregating → GapDetecting
//!      → RecommendationGenerating → Complete
//! ```
//!
//! `Failed` is reachable from any non-terminal stage. There is no way back:
//! a retry is a new run starting from `Idle`. Each transition is recorded
//! with a UTC timestamp.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pgap_core::{AnalysisId, DocumentId};

/// Pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisStage {
    /// Run created, nothing started.
    Idle,
    /// Turning document text into segments.
    Segmenting,
    /// Scoring segments against clauses.
    Scoring,
    /// Rolling clause scores up to sections and domains.
    Aggregating,
    /// Applying gap thresholds.
    GapDetecting,
    /// Producing remediation text.
    RecommendationGenerating,
    /// Report produced. Terminal.
    Complete,
    /// Run aborted. Terminal.
    Failed,
}

impl AnalysisStage {
    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// The canonical string name of this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Segmenting => "SEGMENTING",
            Self::Scoring => "SCORING",
            Self::Aggregating => "AGGREGATING",
            Self::GapDetecting => "GAP_DETECTING",
            Self::RecommendationGenerating => "RECOMMENDATION_GENERATING",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
        }
    }

    /// The next forward stage, if one exists.
    fn next_forward_stage(&self) -> Option<AnalysisStage> {
        match self {
            Self::Idle => Some(Self::Segmenting),
            Self::Segmenting => Some(Self::Scoring),
            Self::Scoring => Some(Self::Aggregating),
            Self::Aggregating => Some(Self::GapDetecting),
            Self::GapDetecting => Some(Self::RecommendationGenerating),
            Self::RecommendationGenerating => Some(Self::Complete),
            Self::Complete | Self::Failed => None,
        }
    }
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Illegal stage transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// The requested stage does not follow the current one.
    #[error("invalid analysis transition from {from} to {to}")]
    InvalidTransition {
        /// Current stage.
        from: AnalysisStage,
        /// Requested stage.
        to: AnalysisStage,
    },
    /// The run already finished.
    #[error("analysis run already terminal in {state}")]
    AlreadyTerminal {
        /// Terminal stage.
        state: AnalysisStage,
    },
}

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    /// Stage left.
    pub from: AnalysisStage,
    /// Stage entered.
    pub to: AnalysisStage,
    /// When the transition happened.
    pub at: DateTime<Utc>,
}

/// A shared view of a run's current stage.
///
/// Callers waiting on a shared computation read it to report where the run
/// was when they gave up.
#[derive(Debug, Clone)]
pub struct StageTracker(Arc<Mutex<AnalysisStage>>);

impl StageTracker {
    /// A tracker reading `Idle`.
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(AnalysisStage::Idle)))
    }

    /// The last stage published.
    pub fn get(&self) -> AnalysisStage {
        *self.0.lock()
    }

    fn set(&self, stage: AnalysisStage) {
        *self.0.lock() = stage;
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// One execution of the pipeline for one document.
#[derive(Debug)]
pub struct AnalysisRun {
    /// Run identifier.
    pub id: AnalysisId,
    /// Document under analysis.
    pub document_id: DocumentId,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
    stage: AnalysisStage,
    transitions: Vec<StageTransition>,
    tracker: StageTracker,
}

impl AnalysisRun {
    /// A fresh run in `Idle`.
    pub fn new(document_id: DocumentId) -> Self {
        Self::with_tracker(document_id, StageTracker::new())
    }

    /// A fresh run publishing its stage to `tracker`.
    pub fn with_tracker(document_id: DocumentId, tracker: StageTracker) -> Self {
        tracker.set(AnalysisStage::Idle);
        Self {
            id: AnalysisId::new(),
            document_id,
            created_at: Utc::now(),
            stage: AnalysisStage::Idle,
            transitions: Vec::new(),
            tracker,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> AnalysisStage {
        self.stage
    }

    /// All transitions so far, oldest first.
    pub fn transitions(&self) -> &[StageTransition] {
        &self.transitions
    }

    /// Move to the next forward stage.
    pub fn advance(&mut self) -> Result<AnalysisStage, StageError> {
        if self.stage.is_terminal() {
            return Err(StageError::AlreadyTerminal { state: self.stage });
        }
        let next = self
            .stage
            .next_forward_stage()
            .ok_or(StageError::AlreadyTerminal { state: self.stage })?;
        self.record(next);
        Ok(next)
    }

    /// Move to `expected`, which must be the next forward stage.
    pub fn advance_to(&mut self, expected: AnalysisStage) -> Result<(), StageError> {
        if self.stage.is_terminal() {
            return Err(StageError::AlreadyTerminal { state: self.stage });
        }
        if self.stage.next_forward_stage() != Some(expected) {
            return Err(StageError::InvalidTransition {
                from: self.stage,
                to: expected,
            });
        }
        self.record(expected);
        Ok(())
    }

    /// Move to `Failed`.
    pub fn fail(&mut self) -> Result<(), StageError> {
        if self.stage.is_terminal() {
            return Err(StageError::AlreadyTerminal { state: self.stage });
        }
        self.record(AnalysisStage::Failed);
        Ok(())
    }

    fn record(&mut self, to: AnalysisStage) {
        let from = self.stage;
        self.stage = to;
        self.tracker.set(to);
        self.transitions.push(StageTransition {
            from,
            to,
            at: Utc::now(),
        });
        tracing::debug!(
            document_id = %self.document_id,
            run_id = %self.id,
            from = %from,
            to = %to,
            "analysis stage transition"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> AnalysisRun {
        AnalysisRun::new(DocumentId::new("doc").unwrap())
    }

    #[test]
    fn advances_through_all_stages() {
        let mut r = run();
        let mut seen = vec![r.stage()];
        while !r.stage().is_terminal() {
            seen.push(r.advance().unwrap());
        }
        assert_eq!(
            seen,
            vec![
                AnalysisStage::Idle,
                AnalysisStage::Segmenting,
                AnalysisStage::Scoring,
                AnalysisStage::Aggregating,
                AnalysisStage::GapDetecting,
                AnalysisStage::RecommendationGenerating,
                AnalysisStage::Complete,
            ]
        );
        assert_eq!(r.transitions().len(), 6);
        assert!(r.transitions().windows(2).all(|w| w[0].at <= w[1].at));
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        let mut r = run();
        let err = r.advance_to(AnalysisStage::Scoring).unwrap_err();
        assert_eq!(
            err,
            StageError::InvalidTransition {
                from: AnalysisStage::Idle,
                to: AnalysisStage::Scoring
            }
        );
        assert_eq!(r.stage(), AnalysisStage::Idle);
        assert!(r.transitions().is_empty());
    }

    #[test]
    fn failed_is_reachable_from_any_active_stage() {
        for steps in 0..6 {
            let mut r = run();
            for _ in 0..steps {
                r.advance().unwrap();
            }
            r.fail().unwrap();
            assert_eq!(r.stage(), AnalysisStage::Failed);
        }
    }

    #[test]
    fn terminal_stages_are_final() {
        let mut r = run();
        r.fail().unwrap();
        assert!(matches!(r.advance(), Err(StageError::AlreadyTerminal { .. })));
        assert!(r.fail().is_err());
        assert!(r.advance_to(AnalysisStage::Segmenting).is_err());
    }

    #[test]
    fn tracker_follows_stage() {
        let tracker = StageTracker::new();
        let mut r = AnalysisRun::with_tracker(DocumentId::new("doc").unwrap(), tracker.clone());
        r.advance().unwrap();
        r.advance().unwrap();
        assert_eq!(tracker.get(), AnalysisStage::Scoring);
    }

    #[test]
    fn display_names() {
        assert_eq!(AnalysisStage::GapDetecting.to_string(), "GAP_DETECTING");
        assert_eq!(AnalysisStage::RecommendationGenerating.as_str(), "RECOMMENDATION_GENERATING");
    }
}
