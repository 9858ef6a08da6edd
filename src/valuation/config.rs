use crate::constants::DEFAULT_PASS_RATIO;

use super::curve::MarkCurve;
use super::error::ValuationError;

/// Curves for each scoring path plus the pass mark.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationConfig {
    pub short: MarkCurve,
    /// Whole answer vs. all key points joined.
    pub holistic: MarkCurve,
    /// Each key point vs. its best-matching student paragraph.
    pub point: MarkCurve,
    /// Share of total marks needed to pass.
    pub pass_ratio: f32,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            short: MarkCurve::short_answer(),
            holistic: MarkCurve::holistic(),
            point: MarkCurve::key_point(),
            pass_ratio: DEFAULT_PASS_RATIO,
        }
    }
}

impl ValuationConfig {
    pub fn validate(&self) -> Result<(), ValuationError> {
        self.short.validate()?;
        self.holistic.validate()?;
        self.point.validate()?;
        if !(0.0..=1.0).contains(&self.pass_ratio) {
            return Err(ValuationError::InvalidCurve {
                reason: format!("pass_ratio must be in [0, 1], got {}", self.pass_ratio),
            });
        }
        Ok(())
    }
}
