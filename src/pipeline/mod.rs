//! End-to-end grading of one submission.
//!
//! Pages are segmented strictly in upload order, merged, converted to student answers
//! and evaluated against the exam's [`GradingPlan`]. Segmentation is configured with the
//! plan's answer types so each question is reconstructed the way it is scored.

pub mod error;
pub mod types;


pub use error::PipelineError;
pub use types::{PageScan, SheetImage, SubmissionReport};

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::embedding::{CachedEmbedder, Embedder, SentenceEmbedder};
use crate::merge::{MergedSubmission, merge_pages};
use crate::ocr::OcrEngine;
use crate::segmentation::{SegmentationConfig, SegmentationError, SegmentationResult, Segmenter};
use crate::valuation::{GradingPlan, QuestionId, StudentAnswers, ValuationEngine};

/// Grades submissions of one exam.
#[derive(Debug)]
pub struct SubmissionGrader<E> {
    plan: GradingPlan,
    segmenter: Segmenter,
    engine: ValuationEngine<E>,
}

impl<E: Embedder> SubmissionGrader<E> {
    /// `segmentation` supplies page-level options; question types come from `plan`.
    pub fn new(
        plan: GradingPlan,
        segmentation: SegmentationConfig,
        engine: ValuationEngine<E>,
    ) -> Result<Self, PipelineError> {
        let config = segmentation.with_question_types(plan.segmentation_types());
        let segmenter = Segmenter::new(config)?;
        Ok(Self {
            plan,
            segmenter,
            engine,
        })
    }

    pub fn plan(&self) -> &GradingPlan {
        &self.plan
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn engine(&self) -> &ValuationEngine<E> {
        &self.engine
    }

    pub fn segment_page(&self, page: &PageScan) -> Result<SegmentationResult, SegmentationError> {
        segment_scan(&self.segmenter, page)
    }

    /// Segments every page in order. The first unreadable page aborts the submission.
    pub fn segment_pages(&self, pages: &[PageScan]) -> Result<Vec<SegmentationResult>, PipelineError> {
        pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                self.segment_page(page).map_err(|source| PipelineError::Page {
                    page: index + 1,
                    source,
                })
            })
            .collect()
    }

    pub fn grade_pages(&self, pages: &[PageScan]) -> Result<SubmissionReport, PipelineError> {
        if pages.is_empty() {
            return Err(PipelineError::NoPages);
        }
        let results = self.segment_pages(pages)?;
        self.grade_segmented(results)
    }

    /// Recognizes each encoded image with `ocr`, then grades as [`Self::grade_pages`].
    pub fn grade_with_ocr<O: OcrEngine>(
        &self,
        ocr: &O,
        images: &[Vec<u8>],
    ) -> Result<SubmissionReport, PipelineError> {
        if images.is_empty() {
            return Err(PipelineError::NoPages);
        }

        let mut results = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            let page = index + 1;
            let recognized = ocr
                .recognize(image)
                .map_err(|source| PipelineError::Recognition { page, source })?;
            info!(page, words = recognized.words.len(), "Page recognized");
            let result = self
                .segmenter
                .segment_image_bytes(image, &recognized.words)
                .map_err(|source| PipelineError::Page { page, source })?;
            results.push(result);
        }
        self.grade_segmented(results)
    }

    /// Merges already segmented pages (in upload order) and evaluates them.
    pub fn grade_segmented(
        &self,
        pages: Vec<SegmentationResult>,
    ) -> Result<SubmissionReport, PipelineError> {
        let merged = merge_pages(&pages);
        let answers = student_answers(&merged);
        let breakdown = self.engine.evaluate(&self.plan, &answers)?;

        let mut warnings: Vec<String> = pages
            .iter()
            .enumerate()
            .flat_map(|(index, page)| {
                page.validation
                    .warnings
                    .iter()
                    .map(move |w| format!("page {}: {}", index + 1, w))
            })
            .collect();
        warnings.extend(breakdown.warnings.iter().cloned());

        let passed = breakdown.passed(self.engine.config().pass_ratio);
        let report = SubmissionReport {
            evaluation_id: Uuid::new_v4(),
            evaluated_at: Utc::now(),
            pages,
            merged,
            breakdown,
            passed,
            warnings,
        };

        info!(
            evaluation_id = %report.evaluation_id,
            pages = report.merged.total_pages,
            obtained = report.breakdown.total_obtained,
            possible = report.breakdown.total_possible,
            passed,
            "Submission graded"
        );
        Ok(report)
    }
}

/// Segments one page with its image when it has one, by the heuristic path otherwise.
pub fn segment_scan(
    segmenter: &Segmenter,
    page: &PageScan,
) -> Result<SegmentationResult, SegmentationError> {
    match &page.image {
        Some(SheetImage::File(path)) => segmenter.segment_image_path(path, &page.words),
        Some(SheetImage::Encoded(bytes)) => segmenter.segment_image_bytes(bytes, &page.words),
        None => Ok(segmenter.segment_words(&page.words)),
    }
}

/// Converts merged page answers into answer-key ids.
pub fn student_answers(merged: &MergedSubmission) -> StudentAnswers {
    let mut answers = StudentAnswers::new();
    for (label, text) in &merged.answers {
        match QuestionId::try_from(*label) {
            Ok(id) => {
                answers.insert(id, text.clone());
            }
            Err(_) => warn!(%label, "Merged answer has no question number, skipping"),
        }
    }
    answers
}

/// Builds a grader for `plan` from the runtime configuration.
pub fn grader_from_config(
    config: &Config,
    plan: GradingPlan,
) -> Result<SubmissionGrader<CachedEmbedder<SentenceEmbedder>>, PipelineError> {
    let embedder = SentenceEmbedder::load(config.embedder_config())?;
    let engine = ValuationEngine::new(
        CachedEmbedder::new(embedder, config.embed_cache_capacity),
        config.valuation_config(),
    )?;
    SubmissionGrader::new(plan, config.segmentation_config(), engine)
}
