//! Formatting analysis of reconstructed answers and student-facing hints.

use crate::constants::BULLET_MARKERS;

use super::heuristic::is_bullet;
use super::types::AnswerStructure;

/// Warning recorded when a page yields no label at all.
pub const NO_LABELS_WARNING: &str = "No question labels found on this page";

/// Profiles the paragraph and bullet layout of a long answer.
pub fn analyze_answer_structure(text: &str) -> AnswerStructure {
    let paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let bullet_point_count = paragraphs.iter().filter(|p| is_bullet(p)).count();
    let avg_paragraph_length = if paragraphs.is_empty() {
        0.0
    } else {
        paragraphs.iter().map(|p| p.chars().count()).sum::<usize>() as f32
            / paragraphs.len() as f32
    };

    AnswerStructure {
        paragraph_count: paragraphs.len(),
        bullet_point_count,
        avg_paragraph_length,
        total_length: text.chars().count(),
        has_bullets: bullet_point_count > 0,
        is_structured: bullet_point_count >= 2,
    }
}

/// Rewrites the bullet glyph opening each line to `•`.
///
/// Only line-leading markers are touched, so hyphenated words and arrows inside a
/// sentence are left alone.
pub fn normalize_bullets(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let body = line.trim_start();
            let indent = &line[..line.len() - body.len()];
            match BULLET_MARKERS.iter().find(|m| body.starts_with(**m)) {
                Some(marker) => format!("{}•{}", indent, &body[marker.len()..]),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Maps validation findings to advice for the student.
pub fn formatting_suggestions(warnings: &[String]) -> Vec<String> {
    let mentions = |needle: &str| warnings.iter().any(|w| w.contains(needle));
    let mut suggestions = Vec::new();

    if mentions(NO_LABELS_WARNING) {
        suggestions
            .push("Write 'Q1', 'Q2', etc. at the start of each answer on the left side".to_string());
    }
    if mentions("Duplicate") {
        suggestions
            .push("Check your question numbers; each question should appear only once".to_string());
    }
    if mentions("too close") || mentions("Strict mode") {
        suggestions.push("Leave more space between questions (at least 2-3 blank lines)".to_string());
    }
    if mentions("out of order") {
        suggestions.push(
            "Write questions in order: Q1, Q2, Q3... (or clearly mark continuation pages)"
                .to_string(),
        );
    }

    if suggestions.is_empty() {
        suggestions
            .push("Format looks good! Remember to use bullet points for long answers.".to_string());
    }
    suggestions
}
