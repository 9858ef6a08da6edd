//! Question-label recognition.
//!
//! A label is `Q` followed by digits, where the `Q` may come back from OCR as `q`, `O`
//! or `0`. Bare numbers and delimiter forms (`1`, `1:`, `1.`) are rejected because they
//! are common inside answer bodies.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{MAX_QUESTION_NUMBER, MIN_QUESTION_NUMBER};
use crate::ocr::Word;

use super::cells::WordCell;

static LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Qq0O](\d+)$").expect("valid label regex"));

/// Returns the question number if `text` is a valid label.
pub fn parse_question_label(text: &str) -> Option<u32> {
    let caps = LABEL_PATTERN.captures(text.trim())?;
    let number: u32 = caps[1].parse().ok()?;
    (MIN_QUESTION_NUMBER..=MAX_QUESTION_NUMBER)
        .contains(&number)
        .then_some(number)
}

/// Scans label-column cells and returns `{row → question number}`.
///
/// When one row holds several label-like words the first one wins.
pub fn extract_row_labels(cells: &[WordCell]) -> BTreeMap<usize, u32> {
    let mut row_to_question = BTreeMap::new();
    for cell in cells.iter().filter(|c| c.is_label_column) {
        if let Some(q) = parse_question_label(&cell.word.text) {
            row_to_question.entry(cell.row).or_insert(q);
        }
    }
    row_to_question
}

/// A label found in the left margin of an unstructured page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginLabel {
    pub word_index: usize,
    pub number: u32,
    /// Top of the label's box; used for spacing checks.
    pub y: f32,
}

/// Heuristic path: labels are words starting left of `left_margin` whose number does not
/// exceed `max_question`.
pub fn find_margin_labels(words: &[Word], left_margin: f32, max_question: u32) -> Vec<MarginLabel> {
    words
        .iter()
        .enumerate()
        .filter(|(_, w)| w.bbox.x < left_margin)
        .filter_map(|(word_index, w)| {
            parse_question_label(&w.text)
                .filter(|&n| n <= max_question)
                .map(|number| MarginLabel {
                    word_index,
                    number,
                    y: w.bbox.y,
                })
        })
        .collect()
}
