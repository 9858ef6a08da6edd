//! Word-to-cell assignment against a detected sheet grid.

use crate::geometry::SheetGeometry;
use crate::ocr::Word;

/// A word placed in the sheet grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCell {
    pub word: Word,
    pub row: usize,
    pub is_label_column: bool,
}

/// Places every word by its bounding-box center.
///
/// The center is steadier than the top-left corner for tall handwritten strokes that
/// cross a printed line.
pub fn assign_words_to_cells(words: &[Word], geometry: &SheetGeometry) -> Vec<WordCell> {
    words
        .iter()
        .map(|word| WordCell {
            row: geometry.row_index_for_y(word.bbox.center_y()),
            is_label_column: geometry.is_label_column(word.bbox.center_x()),
            word: word.clone(),
        })
        .collect()
}

/// Answer-column cells in `start_row..=end_row`, in reading order (row, then X).
pub fn answer_cells_in_rows(cells: &[WordCell], start_row: usize, end_row: usize) -> Vec<&WordCell> {
    let mut selected: Vec<&WordCell> = cells
        .iter()
        .filter(|c| !c.is_label_column && (start_row..=end_row).contains(&c.row))
        .collect();
    selected.sort_by(|a, b| {
        a.row
            .cmp(&b.row)
            .then(a.word.bbox.x.total_cmp(&b.word.bbox.x))
    });
    selected
}
