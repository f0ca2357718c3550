//! # Error Hierarchy
//!
//! Structured error types shared across the workspace, built with `thiserror`.
//! Subsystem crates define their own error enums (taxonomy loading, scoring,
//! analysis) and embed [`ValidationError`] where a primitive was rejected.

use thiserror::Error;

/// Top-level error type for the foundational layer.
#[derive(Error, Debug)]
pub enum PgapError {
    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON serialization failed while computing canonical bytes.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors for domain primitive newtypes.
///
/// Each error carries the rejected input so that operators can diagnose
/// misconfiguration without guesswork.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Score is a NaN or infinity.
    #[error("score must be a finite number, got {0}")]
    NonFiniteScore(f64),

    /// Score lies outside the closed unit interval.
    #[error("score {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),

    /// Document identifier is empty.
    #[error("invalid document ID: must be non-empty")]
    EmptyDocumentId,

    /// A threshold lies outside the closed unit interval.
    #[error("threshold {name} = {value} is outside [0, 1]")]
    InvalidThreshold {
        /// Name of the threshold setting.
        name: String,
        /// The rejected value.
        value: f64,
    },

    /// An aggregation weight is not a positive finite number.
    #[error("weight must be a positive finite number, got {0}")]
    InvalidWeight(f64),
}
