//! Answer text reconstruction shared by both segmentation paths.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::cells::WordCell;

static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid regex"));
static BLANK_LINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static TRAILING_LINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +\n").expect("valid regex"));
static LEADING_LINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n +").expect("valid regex"));

/// Flattens words into one space-joined line; line structure is discarded.
pub fn reconstruct_short<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    texts
        .into_iter()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Long answer from grid rows.
///
/// Consecutive occupied rows join with a space; skipping one or more printed rows
/// produces a paragraph break.
pub fn reconstruct_long_from_rows(cells: &[&WordCell]) -> String {
    let mut rows: BTreeMap<usize, Vec<&WordCell>> = BTreeMap::new();
    for cell in cells {
        rows.entry(cell.row).or_default().push(cell);
    }

    let lines: Vec<(usize, String)> = rows
        .into_iter()
        .filter_map(|(row, mut row_cells)| {
            row_cells.sort_by(|a, b| a.word.bbox.x.total_cmp(&b.word.bbox.x));
            let line = reconstruct_short(row_cells.iter().map(|c| c.word.text.as_str()));
            (!line.is_empty()).then_some((row, line))
        })
        .collect();

    let mut text = String::new();
    for (i, (row, line)) in lines.iter().enumerate() {
        text.push_str(line);
        if let Some((next_row, _)) = lines.get(i + 1) {
            if next_row - row > 1 {
                text.push_str("\n\n");
            } else {
                text.push(' ');
            }
        }
    }

    tidy_long_answer(&text)
}

/// Normalizes spacing of a paragraph-structured answer.
///
/// Collapses space runs, reduces 3+ newlines to one blank line and strips spaces
/// hugging a newline.
pub fn tidy_long_answer(text: &str) -> String {
    let text = SPACE_RUNS.replace_all(text, " ");
    let text = BLANK_LINE_RUNS.replace_all(&text, "\n\n");
    let text = TRAILING_LINE_SPACE.replace_all(&text, "\n");
    let text = LEADING_LINE_SPACE.replace_all(&text, "\n");
    text.trim().to_string()
}

/// Removes a copy of the question label captured at the start of the answer text.
///
/// A `Q`-like prefix (`Q3:`, `q 3)`) is always stripped. Without `require_letter` a bare
/// number is stripped too, but only when a delimiter follows it (`3.`, `3)`), so answers
/// that open with a count ("3 reasons") survive.
pub fn strip_label_prefix(text: &str, question: u32, require_letter: bool) -> String {
    let lettered = format!(r"[Qq0O]\s*{}\b\s*[:\.\)]?", question);
    let pattern = if require_letter {
        format!(r"^{}\s*", lettered)
    } else {
        format!(r"^(?:{}|{}\s*[:\.\)](?:\s+|$))\s*", lettered, question)
    };
    match Regex::new(&pattern) {
        Ok(re) => re.replace(text, "").trim().to_string(),
        Err(_) => text.trim().to_string(),
    }
}
