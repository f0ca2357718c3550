//! Engine error types.

use std::path::PathBuf;

use pgap_analysis::ReportError;
use pgap_core::{DocumentId, ValidationError};
use pgap_scoring::ScoringError;
use thiserror::Error;

use crate::stage::AnalysisStage;

/// Why an analysis produced no report.
///
/// Every variant names the document and the stage that was running. The
/// type is `Clone` so that one outcome can be handed to every caller
/// sharing an in-flight computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The document text could not be segmented (empty or blank).
    #[error("document {document_id} is unreadable during {stage}: {reason}")]
    DocumentUnreadable {
        document_id: DocumentId,
        stage: AnalysisStage,
        reason: String,
    },

    /// Scoring failed permanently or a result had the wrong shape.
    #[error("analysis of {document_id} failed during {stage}: {reason}")]
    AnalysisFailed {
        document_id: DocumentId,
        stage: AnalysisStage,
        reason: String,
    },

    /// The pipeline deadline elapsed. Outstanding work was aborted.
    #[error("analysis of {document_id} timed out after {elapsed_ms} ms during {stage}")]
    AnalysisTimeout {
        document_id: DocumentId,
        stage: AnalysisStage,
        elapsed_ms: u64,
    },

    /// The caller cancelled.
    #[error("analysis of {document_id} was cancelled during {stage}")]
    Cancelled {
        document_id: DocumentId,
        stage: AnalysisStage,
    },
}

impl AnalysisError {
    /// The document concerned.
    pub fn document_id(&self) -> &DocumentId {
        match self {
            Self::DocumentUnreadable { document_id, .. }
            | Self::AnalysisFailed { document_id, .. }
            | Self::AnalysisTimeout { document_id, .. }
            | Self::Cancelled { document_id, .. } => document_id,
        }
    }

    /// The stage that was running.
    pub fn stage(&self) -> AnalysisStage {
        match self {
            Self::DocumentUnreadable { stage, .. }
            | Self::AnalysisFailed { stage, .. }
            | Self::AnalysisTimeout { stage, .. }
            | Self::Cancelled { stage, .. } => *stage,
        }
    }

    pub(crate) fn failed(document_id: &DocumentId, stage: AnalysisStage, reason: impl ToString) -> Self {
        Self::AnalysisFailed {
            document_id: document_id.clone(),
            stage,
            reason: reason.to_string(),
        }
    }
}

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`crate::AnalyzerConfig`].
    #[error("failed to parse config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidEnv { var: String, value: String },

    /// A threshold was rejected.
    #[error(transparent)]
    Threshold(#[from] ValidationError),

    /// The recommendation template was rejected.
    #[error(transparent)]
    Template(#[from] ReportError),

    /// The configured scorer could not be built.
    #[error(transparent)]
    Scorer(#[from] ScoringError),
}
