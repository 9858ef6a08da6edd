use serde::Serialize;

use crate::constants::{
    DEFAULT_CURVE_EXPONENT, DEFAULT_HOLISTIC_THRESHOLD, DEFAULT_POINT_THRESHOLD,
    DEFAULT_SHORT_THRESHOLD,
};

use super::error::ValuationError;

/// Similarity → mark conversion.
///
/// Zero below `threshold`; above it the normalized excess `(s − t) / (1 − t)` is raised
/// to `exponent` and scaled by the question's marks. Exponents below 1 are front-loaded:
/// a moderately similar answer already earns most of the marks. Results are rounded to
/// the nearest half mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkCurve {
    pub threshold: f32,
    pub exponent: f32,
}

impl MarkCurve {
    pub fn new(threshold: f32, exponent: f32) -> Result<Self, ValuationError> {
        let curve = Self {
            threshold,
            exponent,
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn short_answer() -> Self {
        Self {
            threshold: DEFAULT_SHORT_THRESHOLD,
            exponent: DEFAULT_CURVE_EXPONENT,
        }
    }

    pub fn holistic() -> Self {
        Self {
            threshold: DEFAULT_HOLISTIC_THRESHOLD,
            exponent: DEFAULT_CURVE_EXPONENT,
        }
    }

    pub fn key_point() -> Self {
        Self {
            threshold: DEFAULT_POINT_THRESHOLD,
            exponent: DEFAULT_CURVE_EXPONENT,
        }
    }

    pub fn validate(&self) -> Result<(), ValuationError> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ValuationError::InvalidCurve {
                reason: format!("threshold must be in (0, 1), got {}", self.threshold),
            });
        }
        if !(self.exponent > 0.0 && self.exponent.is_finite()) {
            return Err(ValuationError::InvalidCurve {
                reason: format!("exponent must be positive, got {}", self.exponent),
            });
        }
        Ok(())
    }

    /// Marks awarded for `similarity` out of `max_mark`.
    pub fn mark(&self, similarity: f32, max_mark: f32) -> f32 {
        if !(similarity >= self.threshold) || max_mark <= 0.0 {
            return 0.0;
        }
        let scale = ((similarity - self.threshold) / (1.0 - self.threshold)).clamp(0.0, 1.0);
        round_to_half(round_to_hundredths(scale.powf(self.exponent) * max_mark))
    }
}

fn round_to_hundredths(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Rounds to the nearest 0.5.
pub fn round_to_half(value: f32) -> f32 {
    (value * 2.0).round() / 2.0
}
