//! # Bounded Similarity Scores
//!
//! [`Score`] is a similarity value in the closed interval `[0, 1]`. Scores
//! appear at every level of an analysis (clause, section, domain) and the
//! invariant "every score lies in [0, 1]" is enforced here, at construction,
//! rather than checked after the fact.
//!
//! Two constructors exist:
//!
//! - [`Score::new`] rejects out-of-range and non-finite input. Use it at
//!   trust boundaries (configuration, remote backends).
//! - [`Score::clamped`] saturates into range and maps NaN to zero. Use it for
//!   values computed locally where tiny floating-point overshoot is expected
//!   (e.g. cosine of two identical vectors evaluating to `1.0000000002`).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// A similarity score in `[0, 1]`.
///
/// Serializes as a bare JSON number. Deserialization validates the range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// The lowest score: nothing matched.
    pub const ZERO: Score = Score(0.0);

    /// The highest score: a perfect match.
    pub const ONE: Score = Score(1.0);

    /// Create a score, rejecting values outside `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFiniteScore`] for NaN or infinities and
    /// [`ValidationError::ScoreOutOfRange`] for finite values outside range.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteScore(value));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::ScoreOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Create a score by saturating into `[0, 1]`. NaN maps to zero.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// The raw value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// The score as a whole percentage, rounded to the nearest integer.
    pub fn percent(self) -> u8 {
        // Range is [0, 100] by construction, so the cast cannot truncate.
        (self.0 * 100.0).round() as u8
    }

    /// The larger of two scores.
    pub fn max(self, other: Self) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }

    /// Total ordering over scores. Scores are never NaN, so this is exact.
    pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for Score {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Score::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}
