//! Paper valuation library crate (used by the CLI and integration tests).
//!
//! Grades photographed, handwritten exam answer sheets:
//!
//! 1. [`geometry`] finds the printed label-column divider and ruled rows of each sheet;
//! 2. [`segmentation`] groups the OCR word stream ([`ocr`]) into per-question answers,
//!    falling back to margin heuristics when the sheet has no usable grid;
//! 3. [`merge`] folds the pages of a submission together in upload order;
//! 4. [`valuation`] scores each answer against the teacher's reference by sentence
//!    embedding similarity ([`embedding`]) and resolves OR groups;
//! 5. [`pipeline`] runs the whole chain and produces a [`SubmissionReport`].
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod geometry;
pub mod merge;
pub mod ocr;
pub mod pipeline;
pub mod segmentation;
pub mod valuation;

pub use config::{Config, ConfigError};
pub use embedding::{
    CachedEmbedder, Embedder, EmbedderConfig, EmbeddingError, SentenceEmbedder, cosine_similarity,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use geometry::{GeometryConfig, GeometryError, SheetGeometry, detect_sheet_geometry};
pub use merge::{MergedSubmission, PageMerger, merge_pages};
#[cfg(any(test, feature = "mock"))]
pub use ocr::MockOcrEngine;
pub use ocr::{BoundingBox, BreakKind, OcrEngine, OcrError, OcrPage, Word};
pub use pipeline::{
    PageScan, PipelineError, SheetImage, SubmissionGrader, SubmissionReport, grader_from_config,
};
pub use segmentation::{
    AnswerLabel, AnswerMap, AnswerType, LeadingTextPolicy, RepeatedLabelPolicy, SegmentationConfig,
    SegmentationError, SegmentationResult, Segmenter, segment,
};
pub use valuation::{
    ExamRecord, GradingPlan, MarkCurve, MarksBreakdown, QuestionId, StudentAnswers,
    ValuationConfig, ValuationEngine, ValuationError,
};
