//! Semantic valuation engine.
//!
//! Student answers are compared with the teacher's reference in embedding space and the
//! cosine similarity is converted to marks through a [`MarkCurve`]:
//!
//! - **short** answers: one similarity between the full texts;
//! - **long** answers: the better of point-by-point scoring (each reference key point
//!   against its best-matching student paragraph, `max_mark / key_points` each) and
//!   holistic scoring (whole answer against all key points joined).
//!
//! OR groups keep only the better-scoring alternative. The embedder is injected, so tests
//! run against `MockEmbedder` with exact vectors.

pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod exam;
pub mod split;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::ValuationConfig;
pub use curve::{MarkCurve, round_to_half};
pub use engine::ValuationEngine;
pub use error::ValuationError;
pub use exam::{
    ExamRecord, GradingPlan, OrGroup, PlannedQuestion, QuestionMarksSpec, ReferenceAnswer,
    StudentSubmission, TeacherAnswer, parse_marks,
};
pub use split::split_paragraphs;
pub use types::{
    HolisticScore, KeyPointScore, LongAnswerScore, LongScoringMethod, MarksBreakdown,
    OrGroupKind, OrResolution, PointByPointScore, QuestionId, QuestionMarks, ScoreDetail,
    ShortAnswerScore, StudentAnswers,
};
