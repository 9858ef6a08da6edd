use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::constants::MATCH_PREVIEW_CHARS;
use crate::embedding::{Embedder, cosine_similarity};
use crate::segmentation::AnswerType;

use super::config::ValuationConfig;
use super::error::ValuationError;
use super::exam::{GradingPlan, OrGroup, PlannedQuestion, ReferenceAnswer};
use super::split::split_paragraphs;
use super::types::{
    HolisticScore, KeyPointScore, LongAnswerScore, LongScoringMethod, MarksBreakdown,
    OrGroupKind, OrResolution, PointByPointScore, QuestionId, QuestionMarks, ScoreDetail,
    ShortAnswerScore, StudentAnswers,
};

/// Scores answers against a reference with an injected embedder.
#[derive(Debug)]
pub struct ValuationEngine<E> {
    embedder: E,
    config: ValuationConfig,
}

impl<E: Embedder> ValuationEngine<E> {
    pub fn new(embedder: E, config: ValuationConfig) -> Result<Self, ValuationError> {
        config.validate()?;
        Ok(Self { embedder, config })
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Marks for a short answer.
    pub fn score_short(
        &self,
        student: &str,
        teacher: &str,
        max_mark: f32,
    ) -> Result<f32, ValuationError> {
        Ok(self.evaluate_short(student, teacher, max_mark)?.marks)
    }

    /// Marks for a long answer: the better of point-by-point and holistic scoring.
    pub fn score_long(
        &self,
        student: &str,
        key_points: &[String],
        max_mark: f32,
    ) -> Result<f32, ValuationError> {
        Ok(self.evaluate_long(student, key_points, max_mark)?.marks)
    }

    /// Marks for an answer of `answer_type` against raw teacher text.
    ///
    /// Long references are split into key points first.
    pub fn score_text(
        &self,
        answer_type: AnswerType,
        student: &str,
        teacher: &str,
        max_mark: f32,
    ) -> Result<f32, ValuationError> {
        match answer_type {
            AnswerType::Short => self.score_short(student, teacher, max_mark),
            AnswerType::Long => {
                let points = split_paragraphs(teacher);
                if points.is_empty() {
                    return Ok(0.0);
                }
                self.score_long(student, &points, max_mark)
            }
        }
    }

    pub fn evaluate_short(
        &self,
        student: &str,
        teacher: &str,
        max_mark: f32,
    ) -> Result<ShortAnswerScore, ValuationError> {
        let similarity = if student.trim().is_empty() {
            0.0
        } else {
            self.embedder.similarity(student, teacher)?
        };

        Ok(ShortAnswerScore {
            marks: self.config.short.mark(similarity, max_mark),
            max_marks: max_mark,
            similarity,
        })
    }

    pub fn evaluate_long(
        &self,
        student: &str,
        key_points: &[String],
        max_mark: f32,
    ) -> Result<LongAnswerScore, ValuationError> {
        if key_points.is_empty() {
            return Err(ValuationError::InvalidExam {
                reason: "long-answer scoring needs at least one key point".to_string(),
            });
        }

        let point_by_point = self.point_by_point(student, key_points, max_mark)?;
        let holistic = self.holistic(student, key_points, max_mark)?;

        let (marks, method) = if point_by_point.marks >= holistic.marks {
            (point_by_point.marks, LongScoringMethod::PointByPoint)
        } else {
            (holistic.marks, LongScoringMethod::Holistic)
        };

        debug!(
            point_by_point = point_by_point.marks,
            holistic = holistic.marks,
            ?method,
            "Long answer scored"
        );

        Ok(LongAnswerScore {
            marks,
            max_marks: max_mark,
            method,
            point_by_point,
            holistic,
        })
    }

    fn point_by_point(
        &self,
        student: &str,
        key_points: &[String],
        max_mark: f32,
    ) -> Result<PointByPointScore, ValuationError> {
        let mark_per_point = max_mark / key_points.len() as f32;

        let paragraphs = split_paragraphs(student);
        let paragraph_vectors = paragraphs
            .iter()
            .map(|p| self.embedder.embed(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut details = Vec::with_capacity(key_points.len());
        for key_point in key_points {
            let mut best_similarity = 0.0f32;
            let mut best_match = String::new();

            if !paragraph_vectors.is_empty() {
                let key_vector = self.embedder.embed(key_point)?;
                for (paragraph, vector) in paragraphs.iter().zip(&paragraph_vectors) {
                    let similarity = cosine_similarity(&key_vector, vector);
                    if similarity > best_similarity {
                        best_similarity = similarity;
                        best_match = preview(paragraph);
                    }
                }
            }

            details.push(KeyPointScore {
                key_point: key_point.clone(),
                marks: self.config.point.mark(best_similarity, mark_per_point),
                max_marks: mark_per_point,
                similarity: best_similarity,
                best_match,
            });
        }

        Ok(PointByPointScore {
            marks: details.iter().map(|d| d.marks).sum(),
            max_marks: max_mark,
            details,
        })
    }

    fn holistic(
        &self,
        student: &str,
        key_points: &[String],
        max_mark: f32,
    ) -> Result<HolisticScore, ValuationError> {
        let similarity = if student.trim().is_empty() {
            0.0
        } else {
            self.embedder.similarity(student, &key_points.join(" "))?
        };

        Ok(HolisticScore {
            marks: self.config.holistic.mark(similarity, max_mark),
            max_marks: max_mark,
            similarity,
        })
    }

    /// Grades one submission against a plan, resolving OR groups.
    ///
    /// Answers to questions absent from the plan are skipped with a warning.
    pub fn evaluate(
        &self,
        plan: &GradingPlan,
        answers: &StudentAnswers,
    ) -> Result<MarksBreakdown, ValuationError> {
        let mut warnings = Vec::new();
        for id in answers.keys().filter(|id| plan.question(id).is_none()) {
            warn!(question = %id, "Answer has no reference in the answer key, skipping");
            warnings.push(format!(
                "Answer for {} has no reference in the answer key and was skipped",
                id
            ));
        }

        let mut graded: BTreeMap<QuestionId, QuestionMarks> = BTreeMap::new();
        for question in plan.questions.values() {
            let marks = self.grade_question(question, answers.get(&question.id))?;
            graded.insert(question.id.clone(), marks);
        }

        for (index, group) in plan.or_groups.iter().enumerate() {
            resolve_or_group(index, group, &mut graded);
        }

        let breakdown = MarksBreakdown::from_entries(graded.into_values().collect(), warnings);
        info!(
            obtained = breakdown.total_obtained,
            possible = breakdown.total_possible,
            percentage = breakdown.percentage,
            "Submission evaluated"
        );
        Ok(breakdown)
    }

    fn grade_question(
        &self,
        question: &PlannedQuestion,
        answer: Option<&String>,
    ) -> Result<QuestionMarks, ValuationError> {
        let answer = answer.map(|a| a.trim()).filter(|a| !a.is_empty());

        let (marks_obtained, detail) = match (answer, &question.reference) {
            (None, _) => (0.0, None),
            (Some(student), ReferenceAnswer::Short(teacher)) => {
                let score = self.evaluate_short(student, teacher, question.max_marks)?;
                (score.marks, Some(ScoreDetail::Short(score)))
            }
            (Some(student), ReferenceAnswer::Long(points)) => {
                let score = self.evaluate_long(student, points, question.max_marks)?;
                (score.marks, Some(ScoreDetail::Long(score)))
            }
        };

        debug!(
            question = %question.id,
            marks_obtained,
            max_marks = question.max_marks,
            answered = answer.is_some(),
            "Question graded"
        );

        Ok(QuestionMarks {
            question: question.id.clone(),
            marks_obtained,
            max_marks: question.max_marks,
            question_type: question.reference.answer_type(),
            answered: answer.is_some(),
            or_group: None,
            detail,
        })
    }
}

/// Keeps the better option of `group` in `graded` and drops the other.
/// Ties keep the first option (side A for pairs).
fn resolve_or_group(index: usize, group: &OrGroup, graded: &mut BTreeMap<QuestionId, QuestionMarks>) {
    let (kind, side_a, side_b) = match group {
        OrGroup::Single { options } => {
            let (first, second) = options.split_at(options.len().min(1));
            (OrGroupKind::Single, first, second)
        }
        OrGroup::Pair { option_a, option_b } => {
            (OrGroupKind::Pair, option_a.as_slice(), option_b.as_slice())
        }
    };

    let take = |graded: &mut BTreeMap<QuestionId, QuestionMarks>, side: &[QuestionId]| {
        side.iter()
            .filter_map(|id| graded.remove(id))
            .collect::<Vec<_>>()
    };
    let entries_a = take(graded, side_a);
    let entries_b = take(graded, side_b);

    let sum_a: f32 = entries_a.iter().map(|q| q.marks_obtained).sum();
    let sum_b: f32 = entries_b.iter().map(|q| q.marks_obtained).sum();

    let (chosen, chosen_ids, rejected_ids, rejected_marks) = if sum_b > sum_a {
        (entries_b, side_b, side_a, sum_a)
    } else {
        (entries_a, side_a, side_b, sum_b)
    };

    info!(
        group = index,
        ?kind,
        chosen = %join_ids(chosen_ids),
        rejected = %join_ids(rejected_ids),
        "Resolved OR group"
    );

    let resolution = OrResolution {
        group: index,
        kind,
        chosen: chosen_ids.to_vec(),
        rejected: rejected_ids.to_vec(),
        rejected_marks,
    };

    for mut entry in chosen {
        entry.or_group = Some(resolution.clone());
        graded.insert(entry.question.clone(), entry);
    }
}

fn join_ids(ids: &[QuestionId]) -> String {
    ids.iter()
        .map(QuestionId::as_str)
        .collect::<Vec<_>>()
        .join("+")
}

fn preview(paragraph: &str) -> String {
    if paragraph.chars().count() <= MATCH_PREVIEW_CHARS {
        return paragraph.to_string();
    }
    let mut head: String = paragraph.chars().take(MATCH_PREVIEW_CHARS).collect();
    head.push_str("...");
    head
}
