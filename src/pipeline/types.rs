use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::merge::MergedSubmission;
use crate::ocr::Word;
use crate::segmentation::SegmentationResult;
use crate::valuation::MarksBreakdown;

/// Where a page's sheet image comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetImage {
    File(PathBuf),
    Encoded(Vec<u8>),
}

/// One uploaded page: its recognized words and, when available, the sheet image.
///
/// Pages without an image are segmented by the heuristic path only.
#[derive(Debug, Clone, PartialEq)]
pub struct PageScan {
    pub image: Option<SheetImage>,
    pub words: Vec<Word>,
}

impl PageScan {
    pub fn new(image: SheetImage, words: Vec<Word>) -> Self {
        Self {
            image: Some(image),
            words,
        }
    }

    pub fn words_only(words: Vec<Word>) -> Self {
        Self { image: None, words }
    }
}

/// Full record of one graded submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub evaluation_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    /// Per-page segmentation, in upload order.
    pub pages: Vec<SegmentationResult>,
    pub merged: MergedSubmission,
    pub breakdown: MarksBreakdown,
    pub passed: bool,
    /// Page validation warnings (prefixed with the page number) and grading warnings.
    pub warnings: Vec<String>,
}
