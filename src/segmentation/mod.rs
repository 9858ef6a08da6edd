//! Layout segmentation: positioned OCR words → per-question answer map.
//!
//! Two paths share label recognition and answer reconstruction:
//!
//! * **Geometry**: words are placed in the detected sheet grid, labels are read from the
//!   label column, spans are row ranges and long answers take paragraph breaks from
//!   skipped printed rows.
//! * **Heuristic**: labels are words in the left margin, spans are word-index ranges and
//!   long answers take paragraph breaks from self-calibrated Y-gap signals.
//!
//! The geometry path hands over to the heuristic path when the page shows no grid at all
//! or when no label is found in the label column. A non-blank page on which neither path
//! finds a label is returned as a single [`AnswerLabel::UnlabeledContinuation`] entry for
//! the merger to attach to an earlier question. Text above the first label of a labeled
//! page is kept the same way unless [`LeadingTextPolicy::Discard`] is configured.

pub mod cells;
pub mod config;
pub mod error;
pub mod heuristic;
pub mod labels;
pub mod reconstruct;
pub mod spans;
pub mod structure;
pub mod types;


pub use cells::{WordCell, answer_cells_in_rows, assign_words_to_cells};
pub use config::{
    AnswerType, LeadingTextPolicy, ParagraphHeuristics, RepeatedLabelPolicy, SegmentationConfig,
};
pub use error::{LabelParseError, SegmentationError};
pub use heuristic::{BreakSignal, reconstruct_long_adaptive};
pub use labels::{MarginLabel, extract_row_labels, find_margin_labels, parse_question_label};
pub use reconstruct::{reconstruct_long_from_rows, reconstruct_short, strip_label_prefix};
pub use spans::{QuestionSpan, SequenceReport, build_spans, validate_sequence};
pub use structure::{analyze_answer_structure, formatting_suggestions, normalize_bullets};
pub use types::{
    AnswerLabel, AnswerMap, AnswerStructure, SegmentationMetadata, SegmentationMethod,
    SegmentationResult, ValidationReport,
};

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use image::GrayImage;
use tracing::{debug, info, warn};

use crate::geometry::{self, SheetGeometry};
use crate::ocr::Word;

use spans::check_label_spacing;
use structure::NO_LABELS_WARNING;

/// Segments pages with one validated configuration.
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmentationConfig,
}

/// Answers and label order gathered by one path, before validation.
struct PageAnswers {
    answers: AnswerMap,
    writing_order: Vec<u32>,
    spacing_warnings: Vec<String>,
    spacing_errors: Vec<String>,
}

impl PageAnswers {
    fn empty() -> Self {
        Self {
            answers: AnswerMap::new(),
            writing_order: Vec::new(),
            spacing_warnings: Vec::new(),
            spacing_errors: Vec::new(),
        }
    }
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Result<Self, SegmentationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Reads the sheet image from disk, detects its grid and segments `words`.
    pub fn segment_image_path(
        &self,
        path: &Path,
        words: &[Word],
    ) -> Result<SegmentationResult, SegmentationError> {
        let geometry = geometry::detect_sheet_geometry(path, &self.config.geometry)?;
        Ok(self.segment_with_geometry(&geometry, words))
    }

    /// Same as [`Segmenter::segment_image_path`] for encoded image bytes.
    pub fn segment_image_bytes(
        &self,
        bytes: &[u8],
        words: &[Word],
    ) -> Result<SegmentationResult, SegmentationError> {
        let geometry = geometry::detect_from_bytes(bytes, &self.config.geometry)?;
        Ok(self.segment_with_geometry(&geometry, words))
    }

    pub fn segment_gray(
        &self,
        gray: &GrayImage,
        words: &[Word],
    ) -> Result<SegmentationResult, SegmentationError> {
        let geometry = geometry::detect_from_image(gray, &self.config.geometry)?;
        Ok(self.segment_with_geometry(&geometry, words))
    }

    /// Geometry path with automatic heuristic fallback.
    pub fn segment_with_geometry(
        &self,
        geometry: &SheetGeometry,
        words: &[Word],
    ) -> SegmentationResult {
        if !geometry.is_structured() {
            info!(%geometry, "No sheet grid detected, using heuristic segmentation");
            return self.segment_heuristic(words, Some(geometry.clone()));
        }

        let cells = assign_words_to_cells(words, geometry);
        let row_labels = extract_row_labels(&cells);

        if row_labels.is_empty() {
            if is_blank(words) {
                return self.finish(PageAnswers::empty(), SegmentationMethod::Geometry, Some(geometry));
            }
            warn!(
                words = words.len(),
                "No labels in the label column, falling back to heuristic segmentation"
            );
            return self.segment_heuristic(words, Some(geometry.clone()));
        }

        let spans = build_spans(&row_labels, geometry.total_rows());
        info!(
            labels = row_labels.len(),
            rows = geometry.total_rows(),
            divider_x = geometry.divider_x,
            "Geometry segmentation"
        );

        let mut page = PageAnswers::empty();
        if let Some(&first_row) = row_labels.keys().next() {
            if first_row > 0 {
                let leading = answer_cells_in_rows(&cells, 0, first_row - 1);
                let text = reconstruct_short(leading.iter().map(|c| c.word.text.as_str()));
                self.keep_leading_text(&mut page, text);
            }
        }
        for span in &spans {
            let span_cells = answer_cells_in_rows(&cells, span.start, span.end);
            let text = match self.config.answer_type(span.number) {
                AnswerType::Short => {
                    let flat = reconstruct_short(span_cells.iter().map(|c| c.word.text.as_str()));
                    strip_label_prefix(&flat, span.number, true)
                }
                AnswerType::Long => {
                    strip_label_prefix(&reconstruct_long_from_rows(&span_cells), span.number, false)
                }
            };
            debug!(
                question = span.number,
                start_row = span.start,
                end_row = span.end,
                words = span_cells.len(),
                "Reconstructed span"
            );
            self.insert_answer(&mut page.answers, span.label, text);
            page.writing_order.push(span.number);
        }

        self.finish(page, SegmentationMethod::Geometry, Some(geometry))
    }

    /// Heuristic path only, for free-form pages without an image.
    pub fn segment_words(&self, words: &[Word]) -> SegmentationResult {
        self.segment_heuristic(words, None)
    }

    fn segment_heuristic(&self, words: &[Word], geometry: Option<SheetGeometry>) -> SegmentationResult {
        let labels = find_margin_labels(
            words,
            self.config.left_margin_threshold,
            self.config.max_expected_question,
        );

        let mut page = PageAnswers::empty();

        if labels.is_empty() {
            if !is_blank(words) {
                let text = reconstruct_short(words.iter().map(|w| w.text.as_str()));
                warn!(
                    chars = text.len(),
                    "No question labels found, page kept as unlabeled continuation"
                );
                page.answers.insert(AnswerLabel::UnlabeledContinuation, text);
            }
            return self.finish(page, SegmentationMethod::Heuristic, geometry.as_ref());
        }

        let positions: BTreeMap<usize, u32> =
            labels.iter().map(|l| (l.word_index, l.number)).collect();
        let spans = build_spans(&positions, words.len());
        info!(labels = labels.len(), words = words.len(), "Heuristic segmentation");

        if let Some(&first_index) = positions.keys().next() {
            let leading = words.get(..first_index).unwrap_or(&[]);
            let text = reconstruct_short(leading.iter().map(|w| w.text.as_str()));
            self.keep_leading_text(&mut page, text);
        }

        for span in &spans {
            let body = words.get(span.start + 1..=span.end).unwrap_or(&[]);
            let text = match self.config.answer_type(span.number) {
                AnswerType::Short => {
                    let flat = reconstruct_short(body.iter().map(|w| w.text.as_str()));
                    strip_label_prefix(&flat, span.number, true)
                }
                AnswerType::Long => {
                    let long = reconstruct_long_adaptive(
                        body,
                        &self.config.heuristics,
                        self.config.is_handwritten,
                    );
                    strip_label_prefix(&long, span.number, false)
                }
            };
            self.insert_answer(&mut page.answers, span.label, text);
            page.writing_order.push(span.number);
        }

        let heuristics = &self.config.heuristics;
        let (warnings, errors) = check_label_spacing(
            &labels,
            heuristics.tight_label_spacing,
            heuristics.strict_label_spacing,
            self.config.strict_validation,
        );
        page.spacing_warnings = warnings;
        page.spacing_errors = errors;

        self.finish(page, SegmentationMethod::Heuristic, geometry.as_ref())
    }

    fn keep_leading_text(&self, page: &mut PageAnswers, text: String) {
        if text.is_empty() {
            return;
        }
        match self.config.leading_text {
            LeadingTextPolicy::Continuation => {
                info!(chars = text.len(), "Text above the first label kept as continuation");
                page.answers.insert(AnswerLabel::UnlabeledContinuation, text);
            }
            LeadingTextPolicy::Discard => {
                debug!(chars = text.len(), "Text above the first label discarded");
            }
        }
    }

    fn insert_answer(&self, answers: &mut AnswerMap, label: AnswerLabel, text: String) {
        match answers.entry(label) {
            Entry::Vacant(entry) => {
                entry.insert(text);
            }
            Entry::Occupied(mut entry) => match self.config.repeated_labels {
                RepeatedLabelPolicy::Concatenate => {
                    info!(%label, "Repeated label on the same page, appending as continuation");
                    if text.is_empty() {
                        return;
                    }
                    let existing = entry.get_mut();
                    if !existing.is_empty() {
                        existing.push(' ');
                    }
                    existing.push_str(&text);
                }
                RepeatedLabelPolicy::Overwrite => {
                    warn!(%label, "Repeated label on the same page, keeping the later answer");
                    entry.insert(text);
                }
            },
        }
    }

    fn finish(
        &self,
        page: PageAnswers,
        method: SegmentationMethod,
        geometry: Option<&SheetGeometry>,
    ) -> SegmentationResult {
        let sequence = validate_sequence(
            &page.writing_order,
            self.config.expected_questions.as_deref(),
        );

        let mut warnings = sequence.warnings;
        if page.writing_order.is_empty() {
            warnings.push(NO_LABELS_WARNING.to_string());
        }
        warnings.extend(page.spacing_warnings);
        warnings.extend(page.spacing_errors.iter().cloned());

        let is_valid = !page.writing_order.is_empty()
            && page.spacing_errors.is_empty()
            && !(self.config.strict_validation && !warnings.is_empty());

        let answer_structure: BTreeMap<AnswerLabel, AnswerStructure> = page
            .answers
            .iter()
            .filter_map(|(label, text)| {
                let number = label.number()?;
                (self.config.answer_type(number) == AnswerType::Long)
                    .then(|| (*label, analyze_answer_structure(text)))
            })
            .collect();
        for (label, structure) in &answer_structure {
            debug!(
                %label,
                paragraphs = structure.paragraph_count,
                bullets = structure.bullet_point_count,
                "Answer structure"
            );
        }

        let suggestions = formatting_suggestions(&warnings);

        SegmentationResult {
            answers: page.answers,
            metadata: SegmentationMetadata {
                total_questions_found: sequence.found.len(),
                question_numbers: sequence.found,
                writing_order: sequence.writing_order,
                out_of_order: sequence.out_of_order,
                missing_questions: sequence.missing,
                has_duplicates: !sequence.duplicates.is_empty(),
                is_handwritten: self.config.is_handwritten,
                method,
                geometry: geometry.cloned(),
                answer_structure,
            },
            validation: ValidationReport {
                is_valid,
                warnings,
                suggestions,
            },
        }
    }
}

fn is_blank(words: &[Word]) -> bool {
    words.iter().all(|w| w.text.trim().is_empty())
}

/// Segments one page: detects the sheet grid from `image_path` and groups `words` into
/// answers.
pub fn segment(
    image_path: &Path,
    words: &[Word],
    config: SegmentationConfig,
) -> Result<SegmentationResult, SegmentationError> {
    Segmenter::new(config)?.segment_image_path(image_path, words)
}
