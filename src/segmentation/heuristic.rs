//! Adaptive paragraph reconstruction for pages without a usable grid.
//!
//! Line height and left margin are measured from the answer's own words, so the same
//! thresholds work for large handwriting and small print. A paragraph break needs a
//! genuine OCR line break plus one supporting signal:
//!
//! * a vertical gap above `gap_factor × median line height`;
//! * a bullet glyph opening the next line;
//! * a moderate gap after a sentence-ending word;
//! * a moderate gap with the next line indented away from the dominant margin.

use tracing::debug;

use crate::constants::{BULLET_MARKERS, SENTENCE_TERMINATORS};
use crate::ocr::Word;

use super::config::ParagraphHeuristics;
use super::reconstruct::tidy_long_answer;

/// Why a paragraph break was inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakSignal {
    LargeGap,
    Bullet,
    SentenceEnd,
    Indentation,
}

/// Measurements of one answer block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockMetrics {
    pub line_height: f32,
    pub left_margin: f32,
    pub large_gap: f32,
    pub moderate_gap: f32,
    pub indent_tolerance: f32,
}

impl BlockMetrics {
    pub fn measure(words: &[Word], heuristics: &ParagraphHeuristics, is_handwritten: bool) -> Self {
        let line_height = median_line_height(words, heuristics);
        Self {
            line_height,
            left_margin: dominant_left_margin(words, heuristics.margin_group_tolerance),
            large_gap: line_height * heuristics.gap_factor(is_handwritten),
            moderate_gap: line_height * heuristics.moderate_gap_factor,
            indent_tolerance: heuristics.indent_tolerance,
        }
    }
}

/// Median height of boxes taller than the noise floor.
pub fn median_line_height(words: &[Word], heuristics: &ParagraphHeuristics) -> f32 {
    let mut heights: Vec<f32> = words
        .iter()
        .map(|w| w.bbox.height())
        .filter(|&h| h > heuristics.min_word_height)
        .collect();

    if heights.is_empty() {
        return heuristics.fallback_line_height;
    }

    heights.sort_by(f32::total_cmp);
    let mid = heights.len() / 2;
    if heights.len() % 2 == 0 {
        (heights[mid - 1] + heights[mid]) / 2.0
    } else {
        heights[mid]
    }
}

/// Mean X of the largest group of word starts lying within `tolerance` of each other.
pub fn dominant_left_margin(words: &[Word], tolerance: f32) -> f32 {
    let mut groups: Vec<(f32, Vec<f32>)> = Vec::new();

    for x in words.iter().map(|w| w.bbox.x) {
        match groups.iter_mut().find(|(key, _)| (x - *key).abs() < tolerance) {
            Some((_, members)) => members.push(x),
            None => groups.push((x, vec![x])),
        }
    }

    // First-seen group wins ties.
    let mut best: Option<&Vec<f32>> = None;
    for (_, members) in &groups {
        if best.is_none_or(|b| members.len() > b.len()) {
            best = Some(members);
        }
    }

    best.map(|members| members.iter().sum::<f32>() / members.len() as f32)
        .unwrap_or(0.0)
}

pub fn is_bullet(text: &str) -> bool {
    let trimmed = text.trim();
    BULLET_MARKERS
        .iter()
        .any(|marker| trimmed == *marker || trimmed.starts_with(marker))
}

fn ends_sentence(text: &str) -> bool {
    text.trim_end().ends_with(SENTENCE_TERMINATORS)
}

/// Decides whether a paragraph starts between `current` and `next`.
pub fn paragraph_break(current: &Word, next: &Word, metrics: &BlockMetrics) -> Option<BreakSignal> {
    if !current.break_kind.is_line_break() {
        return None;
    }

    let gap = next.bbox.y - current.bbox.max_y;

    if gap > metrics.large_gap {
        return Some(BreakSignal::LargeGap);
    }
    if is_bullet(&next.text) {
        return Some(BreakSignal::Bullet);
    }
    if gap > metrics.moderate_gap {
        if ends_sentence(&current.text) {
            return Some(BreakSignal::SentenceEnd);
        }
        return ((next.bbox.x - metrics.left_margin).abs() > metrics.indent_tolerance)
            .then_some(BreakSignal::Indentation);
    }

    None
}

/// Rebuilds a long answer from consecutive OCR words.
pub fn reconstruct_long_adaptive(
    words: &[Word],
    heuristics: &ParagraphHeuristics,
    is_handwritten: bool,
) -> String {
    if words.is_empty() {
        return String::new();
    }

    let metrics = BlockMetrics::measure(words, heuristics, is_handwritten);
    debug!(
        line_height = metrics.line_height,
        left_margin = metrics.left_margin,
        is_handwritten,
        "Adaptive paragraph detection"
    );

    let mut text = String::new();
    let mut breaks = 0usize;

    for (i, word) in words.iter().enumerate() {
        text.push_str(&word.text);
        let Some(next) = words.get(i + 1) else {
            break;
        };

        if let Some(signal) = paragraph_break(word, next, &metrics) {
            text.push_str("\n\n");
            breaks += 1;
            debug!(?signal, next = %next.text, "Paragraph break");
        } else if word.break_kind.is_line_break() || word.has_space_after() {
            text.push(' ');
        }
    }

    debug!(paragraph_breaks = breaks, "Adaptive reconstruction complete");
    tidy_long_answer(&text)
}
