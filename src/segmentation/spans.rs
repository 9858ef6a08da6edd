//! Span building and advisory sequence validation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::labels::MarginLabel;
use super::types::AnswerLabel;

/// A contiguous run of rows (geometry path) or word indices (heuristic path) owned by
/// one question label. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionSpan {
    pub number: u32,
    pub label: AnswerLabel,
    pub start: usize,
    pub end: usize,
}

/// Builds spans from `{position → question number}`.
///
/// Spans follow position order, not question order, since students may answer out of
/// sequence. Each span ends one before the next label; the last runs to `total - 1`.
pub fn build_spans(positions: &BTreeMap<usize, u32>, total: usize) -> Vec<QuestionSpan> {
    let entries: Vec<(usize, u32)> = positions.iter().map(|(&p, &q)| (p, q)).collect();

    entries
        .iter()
        .enumerate()
        .map(|(i, &(start, number))| {
            let end = match entries.get(i + 1) {
                Some(&(next, _)) => next - 1,
                None => total.saturating_sub(1).max(start),
            };
            QuestionSpan {
                number,
                label: AnswerLabel::Question(number),
                start,
                end,
            }
        })
        .collect()
}

/// Findings of the sequence check for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceReport {
    /// Distinct question numbers, ascending.
    pub found: Vec<u32>,
    pub writing_order: Vec<u32>,
    pub missing: Vec<u32>,
    pub duplicates: Vec<u32>,
    pub out_of_order: bool,
    pub warnings: Vec<String>,
}

/// Flags missing, duplicated and out-of-order questions. Purely advisory.
///
/// Missing questions are computed against `expected` when given, otherwise against the
/// observed min..=max range.
pub fn validate_sequence(writing_order: &[u32], expected: Option<&[u32]>) -> SequenceReport {
    let found: BTreeSet<u32> = writing_order.iter().copied().collect();

    let missing: Vec<u32> = match expected {
        Some(expected) => expected
            .iter()
            .copied()
            .filter(|q| !found.contains(q))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        None => match (found.first(), found.last()) {
            (Some(&lo), Some(&hi)) => (lo..=hi).filter(|q| !found.contains(q)).collect(),
            _ => Vec::new(),
        },
    };

    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for &q in writing_order {
        *counts.entry(q).or_default() += 1;
    }
    let duplicates: Vec<u32> = counts
        .iter()
        .filter(|&(_, &n)| n > 1)
        .map(|(&q, _)| q)
        .collect();

    let out_of_order = writing_order.windows(2).any(|pair| pair[0] > pair[1]);

    let mut warnings = Vec::new();
    if !missing.is_empty() {
        warnings.push(format!("Missing questions: {}", join_labels(&missing, ", ")));
    }
    if !duplicates.is_empty() {
        warnings.push(format!(
            "Duplicate question labels on this page: {}",
            join_labels(&duplicates, ", ")
        ));
    }
    if out_of_order {
        warnings.push(format!(
            "Questions out of order: {}",
            join_labels(writing_order, " → ")
        ));
    }

    SequenceReport {
        found: found.into_iter().collect(),
        writing_order: writing_order.to_vec(),
        missing,
        duplicates,
        out_of_order,
        warnings,
    }
}

/// Checks vertical spacing between consecutive margin labels.
///
/// Returns `(warnings, errors)`; errors only appear in strict mode.
pub fn check_label_spacing(
    labels: &[MarginLabel],
    tight_spacing: f32,
    strict_spacing: f32,
    strict: bool,
) -> (Vec<String>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    for pair in labels.windows(2) {
        let spacing = pair[1].y - pair[0].y;
        if spacing < tight_spacing {
            warnings.push(format!(
                "Q{} and Q{} are too close. Leave more space.",
                pair[0].number, pair[1].number
            ));
        }
        if strict && spacing < strict_spacing {
            errors.push(format!(
                "Strict mode: Q{} and Q{} must have at least 3 lines of spacing",
                pair[0].number, pair[1].number
            ));
        }
    }

    (warnings, errors)
}

fn join_labels(numbers: &[u32], sep: &str) -> String {
    numbers
        .iter()
        .map(|q| format!("Q{}", q))
        .collect::<Vec<_>>()
        .join(sep)
}
