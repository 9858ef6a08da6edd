//! Persisted exam record (read-only here) and the validated grading plan built from it.
//!
//! All configuration problems surface while building the [`GradingPlan`], before any
//! answer is scored.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::segmentation::AnswerType;

use super::error::ValuationError;
use super::split::split_paragraphs;
use super::types::{QuestionId, StudentAnswers};

/// A teacher answer as stored: one text, or an explicit key-point list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeacherAnswer {
    Text(String),
    KeyPoints(Vec<String>),
}

/// Marks per question, either keyed or as a comma-separated list in question order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionMarksSpec {
    PerQuestion(BTreeMap<QuestionId, f32>),
    Listed(String),
}

/// Mutually exclusive alternatives; only the better-scoring one counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrGroup {
    Single {
        options: Vec<QuestionId>,
    },
    Pair {
        option_a: Vec<QuestionId>,
        option_b: Vec<QuestionId>,
    },
}

impl OrGroup {
    pub fn members(&self) -> Vec<&QuestionId> {
        match self {
            OrGroup::Single { options } => options.iter().collect(),
            OrGroup::Pair { option_a, option_b } => option_a.iter().chain(option_b).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    pub answers: StudentAnswers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamRecord {
    #[serde(default)]
    pub question_types: BTreeMap<QuestionId, AnswerType>,
    pub question_marks: QuestionMarksSpec,
    pub teacher_answers: BTreeMap<QuestionId, TeacherAnswer>,
    #[serde(default)]
    pub or_groups: Vec<OrGroup>,
    #[serde(default)]
    pub student_submissions: BTreeMap<String, StudentSubmission>,
}

impl ExamRecord {
    pub fn from_json_str(json: &str) -> Result<Self, ValuationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path(path: &Path) -> Result<Self, ValuationError> {
        let json = std::fs::read_to_string(path).map_err(|source| ValuationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn submission(&self, student_id: &str) -> Option<&StudentSubmission> {
        self.student_submissions.get(student_id)
    }
}

/// Parses `"3,3,5"` into one mark per question.
pub fn parse_marks(marks: &str, question_count: usize) -> Result<Vec<f32>, ValuationError> {
    let parsed = marks
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| {
            m.parse::<f32>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or_else(|| ValuationError::InvalidMark {
                    value: m.to_string(),
                })
        })
        .collect::<Result<Vec<f32>, _>>()?;

    if parsed.len() != question_count {
        return Err(ValuationError::MarkCountMismatch {
            expected: question_count,
            found: parsed.len(),
        });
    }
    Ok(parsed)
}

/// Reference answer bound to its scoring strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "reference", rename_all = "lowercase")]
pub enum ReferenceAnswer {
    Short(String),
    Long(Vec<String>),
}

impl ReferenceAnswer {
    pub fn answer_type(&self) -> AnswerType {
        match self {
            ReferenceAnswer::Short(_) => AnswerType::Short,
            ReferenceAnswer::Long(_) => AnswerType::Long,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedQuestion {
    pub id: QuestionId,
    pub max_marks: f32,
    pub reference: ReferenceAnswer,
}

/// Validated, scoring-ready view of an [`ExamRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingPlan {
    pub questions: BTreeMap<QuestionId, PlannedQuestion>,
    pub or_groups: Vec<OrGroup>,
}

impl GradingPlan {
    pub fn from_record(record: &ExamRecord) -> Result<Self, ValuationError> {
        let ids: Vec<&QuestionId> = record.teacher_answers.keys().collect();
        if ids.is_empty() {
            return Err(ValuationError::InvalidExam {
                reason: "answer key has no questions".to_string(),
            });
        }

        if let Some(unknown) = record
            .question_types
            .keys()
            .find(|id| !record.teacher_answers.contains_key(*id))
        {
            return Err(ValuationError::InvalidExam {
                reason: format!("question type given for {} which has no teacher answer", unknown),
            });
        }

        let marks = resolve_marks(&record.question_marks, &ids)?;

        let mut questions = BTreeMap::new();
        for (id, max_marks) in ids.into_iter().zip(marks) {
            let answer_type = record.question_types.get(id).copied().unwrap_or_default();
            let reference = build_reference(id, answer_type, &record.teacher_answers[id])?;
            debug!(question = %id, %answer_type, max_marks, "Planned question");
            questions.insert(
                id.clone(),
                PlannedQuestion {
                    id: id.clone(),
                    max_marks,
                    reference,
                },
            );
        }

        validate_or_groups(&record.or_groups, &questions)?;

        Ok(Self {
            questions,
            or_groups: record.or_groups.clone(),
        })
    }

    pub fn question(&self, id: &QuestionId) -> Option<&PlannedQuestion> {
        self.questions.get(id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Answer types of plain `Q<n>` questions, for page segmentation.
    pub fn segmentation_types(&self) -> BTreeMap<u32, AnswerType> {
        self.questions
            .values()
            .filter_map(|q| q.id.number().map(|n| (n, q.reference.answer_type())))
            .collect()
    }
}

fn resolve_marks(spec: &QuestionMarksSpec, ids: &[&QuestionId]) -> Result<Vec<f32>, ValuationError> {
    match spec {
        QuestionMarksSpec::Listed(list) => parse_marks(list, ids.len()),
        QuestionMarksSpec::PerQuestion(map) => {
            if let Some(extra) = map.keys().find(|id| !ids.contains(id)) {
                return Err(ValuationError::InvalidExam {
                    reason: format!("marks given for {} which has no teacher answer", extra),
                });
            }
            ids.iter()
                .map(|id| {
                    let mark = map.get(*id).copied().ok_or_else(|| ValuationError::InvalidExam {
                        reason: format!("no marks configured for {}", id),
                    })?;
                    if mark.is_finite() && mark > 0.0 {
                        Ok(mark)
                    } else {
                        Err(ValuationError::InvalidMark {
                            value: mark.to_string(),
                        })
                    }
                })
                .collect()
        }
    }
}

fn build_reference(
    id: &QuestionId,
    answer_type: AnswerType,
    answer: &TeacherAnswer,
) -> Result<ReferenceAnswer, ValuationError> {
    match answer_type {
        AnswerType::Short => {
            let text = match answer {
                TeacherAnswer::Text(text) => text.trim().to_string(),
                TeacherAnswer::KeyPoints(points) => points
                    .iter()
                    .map(|p| p.trim())
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
            };
            if text.is_empty() {
                return Err(ValuationError::InvalidExam {
                    reason: format!("teacher answer for {} is empty", id),
                });
            }
            Ok(ReferenceAnswer::Short(text))
        }
        AnswerType::Long => {
            let points: Vec<String> = match answer {
                TeacherAnswer::Text(text) => split_paragraphs(text),
                TeacherAnswer::KeyPoints(points) => points
                    .iter()
                    .map(|p| p.trim())
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect(),
            };
            if points.is_empty() {
                return Err(ValuationError::EmptyReference {
                    question: id.to_string(),
                });
            }
            Ok(ReferenceAnswer::Long(points))
        }
    }
}

fn validate_or_groups(
    groups: &[OrGroup],
    questions: &BTreeMap<QuestionId, PlannedQuestion>,
) -> Result<(), ValuationError> {
    let mut seen: BTreeSet<&QuestionId> = BTreeSet::new();

    for (index, group) in groups.iter().enumerate() {
        let shape_ok = match group {
            OrGroup::Single { options } => options.len() == 2,
            OrGroup::Pair { option_a, option_b } => !option_a.is_empty() && !option_b.is_empty(),
        };
        if !shape_ok {
            return Err(ValuationError::InvalidExam {
                reason: format!(
                    "OR group {} must have two options (single) or two non-empty sides (pair)",
                    index
                ),
            });
        }

        for member in group.members() {
            if !questions.contains_key(member) {
                return Err(ValuationError::InvalidExam {
                    reason: format!("OR group {} references unknown question {}", index, member),
                });
            }
            if !seen.insert(member) {
                return Err(ValuationError::InvalidExam {
                    reason: format!("question {} appears in more than one OR option", member),
                });
            }
        }
    }
    Ok(())
}
