use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LEFT_MARGIN, DEFAULT_MAX_EXPECTED_QUESTION, FALLBACK_LINE_HEIGHT,
    HANDWRITTEN_GAP_FACTOR, INDENT_TOLERANCE, MARGIN_GROUP_TOLERANCE, MAX_QUESTION_NUMBER,
    MIN_WORD_HEIGHT, MODERATE_GAP_FACTOR, PRINTED_GAP_FACTOR, STRICT_LABEL_SPACING,
    TIGHT_LABEL_SPACING,
};
use crate::geometry::GeometryConfig;

use super::error::SegmentationError;

/// Declared shape of a question's answer. Selects both reconstruction and scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    /// One semantic unit; line structure is discarded.
    #[default]
    Short,
    /// Paragraph-structured; scored point by point.
    Long,
}

impl AnswerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerType::Short => "short",
            AnswerType::Long => "long",
        }
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerType {
    type Err = SegmentationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(AnswerType::Short),
            "long" => Ok(AnswerType::Long),
            other => Err(SegmentationError::InvalidConfig {
                reason: format!("unknown answer type '{}': expected 'short' or 'long'", other),
            }),
        }
    }
}

/// What to do when a page carries the same label twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatedLabelPolicy {
    /// Append the later text to the earlier one (space-joined).
    #[default]
    Concatenate,
    /// Keep only the later occurrence.
    Overwrite,
}

/// What to do with answer-area text written above the first label on a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadingTextPolicy {
    /// Keep it as an unlabeled continuation of the previous page's last answer.
    #[default]
    Continuation,
    /// Drop it, for sheets that carry a header (name, roll number) above the first row.
    Discard,
}

impl FromStr for LeadingTextPolicy {
    type Err = SegmentationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continuation" => Ok(LeadingTextPolicy::Continuation),
            "discard" => Ok(LeadingTextPolicy::Discard),
            other => Err(SegmentationError::InvalidConfig {
                reason: format!(
                    "unknown leading text policy '{}': expected 'continuation' or 'discard'",
                    other
                ),
            }),
        }
    }
}

/// Self-calibrating paragraph detection for the heuristic path.
///
/// Gap factors multiply the answer's own median line height.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphHeuristics {
    pub handwritten_gap_factor: f32,
    pub printed_gap_factor: f32,
    /// Gap factor that, combined with a sentence end or indentation, breaks a paragraph.
    pub moderate_gap_factor: f32,
    /// Pixels a line start may deviate from the dominant left margin before it is indentation.
    pub indent_tolerance: f32,
    /// X positions within this distance share a margin group.
    pub margin_group_tolerance: f32,
    /// Boxes shorter than this are noise for line-height estimation.
    pub min_word_height: f32,
    /// Line height used when no word qualifies.
    pub fallback_line_height: f32,
    pub tight_label_spacing: f32,
    pub strict_label_spacing: f32,
}

impl Default for ParagraphHeuristics {
    fn default() -> Self {
        Self {
            handwritten_gap_factor: HANDWRITTEN_GAP_FACTOR,
            printed_gap_factor: PRINTED_GAP_FACTOR,
            moderate_gap_factor: MODERATE_GAP_FACTOR,
            indent_tolerance: INDENT_TOLERANCE,
            margin_group_tolerance: MARGIN_GROUP_TOLERANCE,
            min_word_height: MIN_WORD_HEIGHT,
            fallback_line_height: FALLBACK_LINE_HEIGHT,
            tight_label_spacing: TIGHT_LABEL_SPACING,
            strict_label_spacing: STRICT_LABEL_SPACING,
        }
    }
}

impl ParagraphHeuristics {
    /// Large-gap factor for the document type.
    #[inline]
    pub fn gap_factor(&self, is_handwritten: bool) -> f32 {
        if is_handwritten {
            self.handwritten_gap_factor
        } else {
            self.printed_gap_factor
        }
    }

    pub fn validate(&self) -> Result<(), SegmentationError> {
        let positive = [
            ("handwritten_gap_factor", self.handwritten_gap_factor),
            ("printed_gap_factor", self.printed_gap_factor),
            ("moderate_gap_factor", self.moderate_gap_factor),
            ("fallback_line_height", self.fallback_line_height),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(SegmentationError::InvalidConfig {
                    reason: format!("{} must be positive, got {}", name, value),
                });
            }
        }

        let non_negative = [
            ("indent_tolerance", self.indent_tolerance),
            ("margin_group_tolerance", self.margin_group_tolerance),
            ("min_word_height", self.min_word_height),
            ("tight_label_spacing", self.tight_label_spacing),
            ("strict_label_spacing", self.strict_label_spacing),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(SegmentationError::InvalidConfig {
                    reason: format!("{} must be non-negative, got {}", name, value),
                });
            }
        }

        Ok(())
    }
}

/// Per-page segmentation options.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationConfig {
    pub is_handwritten: bool,
    /// Question number → declared answer type.
    pub question_types: BTreeMap<u32, AnswerType>,
    pub default_answer_type: AnswerType,
    /// Heuristic path: labels must start left of this X.
    pub left_margin_threshold: f32,
    /// Heuristic path: label numbers above this are discarded as misreads.
    pub max_expected_question: u32,
    /// Any sequence warning marks the page invalid.
    pub strict_validation: bool,
    /// Questions expected on the page; missing ones are reported against this set.
    pub expected_questions: Option<Vec<u32>>,
    pub repeated_labels: RepeatedLabelPolicy,
    pub leading_text: LeadingTextPolicy,
    pub heuristics: ParagraphHeuristics,
    pub geometry: GeometryConfig,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            is_handwritten: true,
            question_types: BTreeMap::new(),
            default_answer_type: AnswerType::Short,
            left_margin_threshold: DEFAULT_LEFT_MARGIN,
            max_expected_question: DEFAULT_MAX_EXPECTED_QUESTION,
            strict_validation: false,
            expected_questions: None,
            repeated_labels: RepeatedLabelPolicy::default(),
            leading_text: LeadingTextPolicy::default(),
            heuristics: ParagraphHeuristics::default(),
            geometry: GeometryConfig::default(),
        }
    }
}

impl SegmentationConfig {
    /// Declared type for `question`, falling back to the default type.
    pub fn answer_type(&self, question: u32) -> AnswerType {
        self.question_types
            .get(&question)
            .copied()
            .unwrap_or(self.default_answer_type)
    }

    pub fn with_question_type(mut self, question: u32, answer_type: AnswerType) -> Self {
        self.question_types.insert(question, answer_type);
        self
    }

    pub fn with_question_types(
        mut self,
        types: impl IntoIterator<Item = (u32, AnswerType)>,
    ) -> Self {
        self.question_types.extend(types);
        self
    }

    pub fn with_handwritten(mut self, is_handwritten: bool) -> Self {
        self.is_handwritten = is_handwritten;
        self
    }

    pub fn with_expected_questions(mut self, expected: Vec<u32>) -> Self {
        self.expected_questions = Some(expected);
        self
    }

    pub fn validate(&self) -> Result<(), SegmentationError> {
        if !(self.left_margin_threshold > 0.0) {
            return Err(SegmentationError::InvalidConfig {
                reason: format!(
                    "left_margin_threshold must be positive, got {}",
                    self.left_margin_threshold
                ),
            });
        }

        if self.max_expected_question == 0 || self.max_expected_question > MAX_QUESTION_NUMBER {
            return Err(SegmentationError::InvalidConfig {
                reason: format!(
                    "max_expected_question must be in [1, {}], got {}",
                    MAX_QUESTION_NUMBER, self.max_expected_question
                ),
            });
        }

        if let Some(q) = self.question_types.keys().find(|&&q| q == 0) {
            return Err(SegmentationError::InvalidConfig {
                reason: format!("question_types contains invalid question number {}", q),
            });
        }

        self.heuristics.validate()?;
        self.geometry.validate()?;
        Ok(())
    }
}
