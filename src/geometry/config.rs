use crate::constants::{
    DIVIDER_FALLBACK_RATIO, EDGE_MARGIN_RATIO, FALLBACK_ROW_PITCH, LINE_CLUSTER_GAP,
    LINE_INK_RATIO, LINE_KERNEL_DIVISOR, MIN_DETECTED_ROWS, MIN_LINE_KERNEL,
};

use super::error::GeometryError;

/// Tunables for [`detect_sheet_geometry`](super::detect_sheet_geometry).
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryConfig {
    /// Divider X as a fraction of width when no vertical line qualifies.
    pub divider_ratio_fallback: f32,
    /// Pitch of the evenly spaced fallback rows, in pixels.
    pub fallback_row_pitch: u32,
    /// Fraction of width ignored at each edge when looking for the divider.
    pub edge_margin_ratio: f32,
    /// Projection must exceed this fraction of the orthogonal page dimension.
    pub ink_ratio: f32,
    pub kernel_divisor: u32,
    pub min_kernel: u32,
    /// Pixel rows at most this far apart merge into one line.
    pub cluster_gap: u32,
    /// Fewer clustered lines than this triggers the row fallback.
    pub min_rows: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            divider_ratio_fallback: DIVIDER_FALLBACK_RATIO,
            fallback_row_pitch: FALLBACK_ROW_PITCH,
            edge_margin_ratio: EDGE_MARGIN_RATIO,
            ink_ratio: LINE_INK_RATIO,
            kernel_divisor: LINE_KERNEL_DIVISOR,
            min_kernel: MIN_LINE_KERNEL,
            cluster_gap: LINE_CLUSTER_GAP,
            min_rows: MIN_DETECTED_ROWS,
        }
    }
}

impl GeometryConfig {
    pub fn validate(&self) -> Result<(), GeometryError> {
        let invalid = |reason: String| Err(GeometryError::InvalidConfig { reason });

        if !(self.divider_ratio_fallback > 0.0 && self.divider_ratio_fallback < 1.0) {
            return invalid(format!(
                "divider_ratio_fallback must be in (0, 1), got {}",
                self.divider_ratio_fallback
            ));
        }
        if self.fallback_row_pitch == 0 {
            return invalid("fallback_row_pitch must be positive".to_string());
        }
        if !(0.0..0.5).contains(&self.edge_margin_ratio) {
            return invalid(format!(
                "edge_margin_ratio must be in [0, 0.5), got {}",
                self.edge_margin_ratio
            ));
        }
        if !(self.ink_ratio > 0.0 && self.ink_ratio <= 1.0) {
            return invalid(format!("ink_ratio must be in (0, 1], got {}", self.ink_ratio));
        }
        if self.kernel_divisor == 0 {
            return invalid("kernel_divisor must be positive".to_string());
        }
        if self.min_rows < 2 {
            return invalid(format!("min_rows must be at least 2, got {}", self.min_rows));
        }
        Ok(())
    }

    /// Length of the line-isolating kernel for a page dimension.
    #[inline]
    pub fn kernel_len(&self, dimension: u32) -> u32 {
        (dimension / self.kernel_divisor).max(self.min_kernel)
    }
}
