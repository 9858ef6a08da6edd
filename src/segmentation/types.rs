use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::UNLABELED_CONTINUATION;
use crate::geometry::SheetGeometry;

use super::error::LabelParseError;

/// Key of one reconstructed answer.
///
/// Orders by question number, with the unlabeled-continuation bucket last, so an
/// [`AnswerMap`] iterates in ascending question order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnswerLabel {
    Question(u32),
    UnlabeledContinuation,
}

impl AnswerLabel {
    pub fn number(&self) -> Option<u32> {
        match self {
            AnswerLabel::Question(n) => Some(*n),
            AnswerLabel::UnlabeledContinuation => None,
        }
    }

    pub fn is_unlabeled(&self) -> bool {
        matches!(self, AnswerLabel::UnlabeledContinuation)
    }
}

impl fmt::Display for AnswerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerLabel::Question(n) => write!(f, "Q{}", n),
            AnswerLabel::UnlabeledContinuation => f.write_str(UNLABELED_CONTINUATION),
        }
    }
}

impl FromStr for AnswerLabel {
    type Err = LabelParseError;

    /// Accepts `Q7`, `q7` and `7` (answer-key style) as well as the continuation key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == UNLABELED_CONTINUATION {
            return Ok(AnswerLabel::UnlabeledContinuation);
        }

        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed);

        digits
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .map(AnswerLabel::Question)
            .ok_or_else(|| LabelParseError {
                value: s.to_string(),
            })
    }
}

impl Serialize for AnswerLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AnswerLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Label → reconstructed text for one page, ordered by question number.
pub type AnswerMap = BTreeMap<AnswerLabel, String>;

/// Which path produced a page's answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMethod {
    /// Labels and rows came from the detected sheet grid.
    Geometry,
    /// Labels from the left margin, paragraphs from adaptive Y-gap signals.
    Heuristic,
}

/// Formatting profile of one reconstructed long answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerStructure {
    pub paragraph_count: usize,
    pub bullet_point_count: usize,
    pub avg_paragraph_length: f32,
    pub total_length: usize,
    pub has_bullets: bool,
    /// Two or more bulleted paragraphs.
    pub is_structured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationMetadata {
    pub total_questions_found: usize,
    pub question_numbers: Vec<u32>,
    pub writing_order: Vec<u32>,
    pub out_of_order: bool,
    pub missing_questions: Vec<u32>,
    pub has_duplicates: bool,
    pub is_handwritten: bool,
    pub method: SegmentationMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<SheetGeometry>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub answer_structure: BTreeMap<AnswerLabel, AnswerStructure>,
}

/// Advisory outcome of sequence/format checks. Never blocks segmentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Output of segmenting one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationResult {
    pub answers: AnswerMap,
    pub metadata: SegmentationMetadata,
    pub validation: ValidationReport,
}

impl SegmentationResult {
    /// `true` if the page produced nothing but an unlabeled continuation (or nothing).
    pub fn is_unlabeled(&self) -> bool {
        self.answers.keys().all(AnswerLabel::is_unlabeled)
    }

    /// The label written last on the page, by position rather than number.
    pub fn last_written(&self) -> Option<AnswerLabel> {
        self.metadata
            .writing_order
            .last()
            .map(|&n| AnswerLabel::Question(n))
            .or_else(|| {
                self.answers
                    .keys()
                    .rev()
                    .find(|label| !label.is_unlabeled())
                    .copied()
            })
    }
}
