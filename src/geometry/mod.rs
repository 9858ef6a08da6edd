//! Sheet Geometry Detector.
//!
//! Finds the vertical label/answer divider and the printed horizontal row grid of a
//! structured answer sheet directly from its pixels:
//!
//! 1. Otsu-binarize the grayscale page (ink = dark).
//! 2. Open with a tall, thin kernel (`height / 8`) to keep only long vertical strokes; the
//!    leftmost column outside a 5% edge margin whose ink count exceeds 25% of the page
//!    height is the divider.
//! 3. Open with a wide, thin kernel (`width / 8`) to keep long horizontal strokes; pixel
//!    rows whose ink count exceeds 25% of the page width are clustered (gap <= 5px) into
//!    one boundary per printed line.
//!
//! Detection never fails on content. Missing lines degrade to fallbacks (fixed divider
//! ratio, evenly spaced rows) with a warning; only an unreadable image is an error.

pub mod binarize;
pub mod config;
pub mod error;
pub mod morphology;

#[cfg(test)]
mod tests;

pub use binarize::{InkMask, binarize_inverted, otsu_level};
pub use config::GeometryConfig;
pub use error::GeometryError;

use std::path::Path;

use image::GrayImage;
use serde::Serialize;
use tracing::{info, warn};

use morphology::{cluster_positions, column_projection, open_horizontal, open_vertical, row_projection};

/// Detected layout of one answer-sheet page. Read-only after detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetGeometry {
    /// Pixel X of the label/answer divider.
    pub divider_x: u32,
    /// Sorted Y positions of the row boundaries.
    pub row_ys: Vec<u32>,
    pub page_width: u32,
    pub page_height: u32,
    /// `false` when `divider_x` came from the ratio fallback.
    pub divider_detected: bool,
    /// `false` when `row_ys` came from the evenly spaced fallback.
    pub rows_detected: bool,
}

impl SheetGeometry {
    /// Row band containing `y` (0-indexed). Anything outside every band maps to the last row.
    pub fn row_index_for_y(&self, y: f32) -> usize {
        for (i, pair) in self.row_ys.windows(2).enumerate() {
            if pair[0] as f32 <= y && y < pair[1] as f32 {
                return i;
            }
        }
        self.row_ys.len().saturating_sub(1)
    }

    /// `true` if `x` lies in the question-label column.
    #[inline]
    pub fn is_label_column(&self, x: f32) -> bool {
        x < self.divider_x as f32
    }

    #[inline]
    pub fn total_rows(&self) -> usize {
        self.row_ys.len()
    }

    pub fn divider_ratio(&self) -> f32 {
        if self.page_width == 0 {
            return crate::constants::DIVIDER_FALLBACK_RATIO;
        }
        self.divider_x as f32 / self.page_width as f32
    }

    /// `true` if at least one of the divider or the row grid was found on the page.
    pub fn is_structured(&self) -> bool {
        self.divider_detected || self.rows_detected
    }

    /// Mean distance between consecutive row boundaries.
    pub fn average_row_height(&self) -> f32 {
        if self.row_ys.len() < 2 {
            return 0.0;
        }
        let span = self.row_ys[self.row_ys.len() - 1] - self.row_ys[0];
        span as f32 / (self.row_ys.len() - 1) as f32
    }
}

impl std::fmt::Display for SheetGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SheetGeometry(divider_x={}, rows={}, page={}x{})",
            self.divider_x,
            self.row_ys.len(),
            self.page_width,
            self.page_height
        )
    }
}

/// Loads an image from disk and detects its geometry.
pub fn detect_sheet_geometry(
    path: &Path,
    config: &GeometryConfig,
) -> Result<SheetGeometry, GeometryError> {
    let image = image::open(path).map_err(|source| GeometryError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;
    detect_from_image(&image.to_luma8(), config)
}

/// Decodes encoded image bytes (PNG/JPEG) and detects their geometry.
pub fn detect_from_bytes(
    bytes: &[u8],
    config: &GeometryConfig,
) -> Result<SheetGeometry, GeometryError> {
    let image =
        image::load_from_memory(bytes).map_err(|source| GeometryError::ImageDecode { source })?;
    detect_from_image(&image.to_luma8(), config)
}

/// Detects geometry on an already-decoded grayscale page.
pub fn detect_from_image(
    gray: &GrayImage,
    config: &GeometryConfig,
) -> Result<SheetGeometry, GeometryError> {
    config.validate()?;

    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return Err(GeometryError::EmptyImage {
            width: w,
            height: h,
        });
    }

    let binary = binarize_inverted(gray);

    let v_lines = open_vertical(&binary, config.kernel_len(h));
    let v_proj = column_projection(&v_lines);
    let margin = (w as f32 * config.edge_margin_ratio) as u32;
    let min_v_ink = h as f32 * config.ink_ratio;

    let detected_divider = (margin..w.saturating_sub(margin))
        .find(|&x| v_proj[x as usize] as f32 > min_v_ink);

    let divider_x = match detected_divider {
        Some(x) => {
            info!(
                divider_x = x,
                ratio = x as f32 / w as f32,
                "Sheet geometry: detected divider"
            );
            x
        }
        None => {
            let x = (w as f32 * config.divider_ratio_fallback) as u32;
            warn!(divider_x = x, "Sheet geometry: divider not detected, using fallback");
            x
        }
    };

    let h_lines = open_horizontal(&binary, config.kernel_len(w));
    let h_proj = row_projection(&h_lines);
    let min_h_ink = w as f32 * config.ink_ratio;
    let raw_ys: Vec<u32> = h_proj
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count as f32 > min_h_ink)
        .map(|(y, _)| y as u32)
        .collect();

    let mut row_ys = cluster_positions(&raw_ys, config.cluster_gap);
    let rows_detected = row_ys.len() >= config.min_rows;
    if !rows_detected {
        warn!(
            found = row_ys.len(),
            pitch = config.fallback_row_pitch,
            "Sheet geometry: horizontal lines not detected, using fallback rows"
        );
        row_ys = (0..h).step_by(config.fallback_row_pitch as usize).collect();
    }

    let geometry = SheetGeometry {
        divider_x,
        row_ys,
        page_width: w,
        page_height: h,
        divider_detected: detected_divider.is_some(),
        rows_detected,
    };

    info!(
        rows = geometry.total_rows(),
        avg_row_height = geometry.average_row_height(),
        "Sheet geometry: row boundaries resolved"
    );

    Ok(geometry)
}
