use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::segmentation::{AnswerLabel, AnswerType};

use super::error::ValuationError;

/// Normalized question key of an answer key (`Q5`, `Q5b`).
///
/// Accepts `Q5`, `q5` and `5`; alternative questions of an OR group may carry a
/// letter suffix. Orders numerically, then by suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn from_number(number: u32) -> Self {
        Self(format!("Q{}", number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn digits(&self) -> &str {
        let rest = &self.0[1..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    }

    fn suffix(&self) -> &str {
        &self.0[1 + self.digits().len()..]
    }

    /// Question number for plain `Q<n>` ids; `None` for suffixed ids.
    pub fn number(&self) -> Option<u32> {
        if !self.suffix().is_empty() {
            return None;
        }
        self.digits().parse().ok()
    }

    fn leading_number(&self) -> u64 {
        self.digits().parse().unwrap_or(u64::MAX)
    }
}

impl FromStr for QuestionId {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let rest = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed);

        let invalid = || ValuationError::InvalidQuestionId {
            value: s.to_string(),
        };

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, suffix) = rest.split_at(digits_end);
        let number: u32 = digits.parse().map_err(|_| invalid())?;
        if !suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid());
        }

        Ok(Self(format!("Q{}{}", number, suffix.to_ascii_lowercase())))
    }
}

impl TryFrom<AnswerLabel> for QuestionId {
    type Error = ValuationError;

    fn try_from(label: AnswerLabel) -> Result<Self, Self::Error> {
        label
            .number()
            .map(Self::from_number)
            .ok_or_else(|| ValuationError::InvalidQuestionId {
                value: label.to_string(),
            })
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for QuestionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.leading_number()
            .cmp(&other.leading_number())
            .then_with(|| self.suffix().cmp(other.suffix()))
    }
}

impl PartialOrd for QuestionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for QuestionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Student answers keyed by question.
pub type StudentAnswers = BTreeMap<QuestionId, String>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShortAnswerScore {
    pub marks: f32,
    pub max_marks: f32,
    pub similarity: f32,
}

/// One reference key point matched against the student's paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyPointScore {
    pub key_point: String,
    pub marks: f32,
    pub max_marks: f32,
    pub similarity: f32,
    /// Opening of the best-matching student paragraph.
    pub best_match: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointByPointScore {
    pub marks: f32,
    pub max_marks: f32,
    pub details: Vec<KeyPointScore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HolisticScore {
    pub marks: f32,
    pub max_marks: f32,
    pub similarity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LongScoringMethod {
    PointByPoint,
    Holistic,
}

/// Both long-answer strategies; the final mark is the better of the two.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongAnswerScore {
    pub marks: f32,
    pub max_marks: f32,
    pub method: LongScoringMethod,
    pub point_by_point: PointByPointScore,
    pub holistic: HolisticScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "question_type", rename_all = "lowercase")]
pub enum ScoreDetail {
    Short(ShortAnswerScore),
    Long(LongAnswerScore),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrGroupKind {
    Single,
    Pair,
}

/// How an OR group was resolved for a graded entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrResolution {
    pub group: usize,
    pub kind: OrGroupKind,
    pub chosen: Vec<QuestionId>,
    pub rejected: Vec<QuestionId>,
    /// Marks the rejected option would have earned.
    pub rejected_marks: f32,
}

/// Marks for one graded entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionMarks {
    pub question: QuestionId,
    pub marks_obtained: f32,
    pub max_marks: f32,
    pub question_type: AnswerType,
    /// `false` when the student wrote nothing for this question.
    pub answered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub or_group: Option<OrResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ScoreDetail>,
}

/// Whole-submission result. Built once per evaluation; re-evaluate to change it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarksBreakdown {
    pub questions: BTreeMap<QuestionId, QuestionMarks>,
    pub total_obtained: f32,
    pub total_possible: f32,
    pub percentage: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl MarksBreakdown {
    pub fn from_entries(entries: Vec<QuestionMarks>, warnings: Vec<String>) -> Self {
        let total_obtained: f32 = entries.iter().map(|q| q.marks_obtained).sum();
        let total_possible: f32 = entries.iter().map(|q| q.max_marks).sum();
        let percentage = if total_possible > 0.0 {
            (total_obtained / total_possible * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            questions: entries
                .into_iter()
                .map(|q| (q.question.clone(), q))
                .collect(),
            total_obtained,
            total_possible,
            percentage,
            warnings,
        }
    }

    /// `true` if the obtained share of marks reaches `pass_ratio`.
    pub fn passed(&self, pass_ratio: f32) -> bool {
        self.total_possible > 0.0 && self.total_obtained >= self.total_possible * pass_ratio
    }

    pub fn get(&self, question: &str) -> Option<&QuestionMarks> {
        let id: QuestionId = question.parse().ok()?;
        self.questions.get(&id)
    }
}
