//! Multi-Page Merger.
//!
//! Folds per-page answer maps into one submission, strictly in upload order:
//!
//! - a label seen for the first time starts an entry;
//! - a label seen again on a later page is a continuation and is appended, space-joined;
//! - unlabeled text (a whole page, or the part above a page's first label) is appended to
//!   the most recently written label, or to `Q1` when no label has been seen yet. It is
//!   applied before the page's own labels.
//!
//! Unlabeled-page recovery is best effort and always logged.

#[cfg(test)]
mod tests;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::segmentation::{AnswerLabel, AnswerMap, SegmentationResult};

/// All pages of one student's submission, merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedSubmission {
    /// Final answer per question, ascending by question number.
    pub answers: AnswerMap,
    pub total_pages: usize,
    /// 1-based page numbers whose unlabeled text was attached to an earlier answer.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unlabeled_pages: Vec<usize>,
}

impl MergedSubmission {
    pub fn answer(&self, question: u32) -> Option<&str> {
        self.answers
            .get(&AnswerLabel::Question(question))
            .map(String::as_str)
    }
}

/// Incremental merger; feed pages with [`PageMerger::push`] in upload order.
#[derive(Debug, Default)]
pub struct PageMerger {
    answers: AnswerMap,
    total_pages: usize,
    last_label: Option<AnswerLabel>,
    unlabeled_pages: Vec<usize>,
}

impl PageMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: &SegmentationResult) {
        self.push_answers(&page.answers, page.last_written());
    }

    /// Merges a bare answer map. `last_written` is the label the page ended on, if known;
    /// otherwise the highest labeled key is used.
    pub fn push_answers(&mut self, answers: &AnswerMap, last_written: Option<AnswerLabel>) {
        self.total_pages += 1;
        let page_number = self.total_pages;

        if let Some(text) = answers.get(&AnswerLabel::UnlabeledContinuation) {
            let target = self.last_label.unwrap_or(AnswerLabel::Question(1));
            if self.last_label.is_some() {
                info!(page = page_number, %target, "Attaching unlabeled text to last answer");
            } else {
                warn!(page = page_number, %target, "Unlabeled text before any label, defaulting");
            }
            self.unlabeled_pages.push(page_number);
            self.append(target, text, page_number);
        }

        for (label, text) in answers.iter().filter(|(label, _)| !label.is_unlabeled()) {
            self.append(*label, text, page_number);
        }

        let page_last = last_written.or_else(|| {
            answers
                .keys()
                .rev()
                .find(|label| !label.is_unlabeled())
                .copied()
        });
        if let Some(label) = page_last {
            self.last_label = Some(label);
        }
    }

    fn append(&mut self, label: AnswerLabel, text: &str, page_number: usize) {
        match self.answers.get_mut(&label) {
            Some(existing) => {
                debug!(page = page_number, %label, "Continuation");
                if text.is_empty() {
                    return;
                }
                if !existing.is_empty() {
                    existing.push(' ');
                }
                existing.push_str(text);
            }
            None => {
                self.answers.insert(label, text.to_string());
            }
        }
    }

    pub fn finish(self) -> MergedSubmission {
        info!(
            pages = self.total_pages,
            answers = self.answers.len(),
            unlabeled = self.unlabeled_pages.len(),
            "Merged submission"
        );
        MergedSubmission {
            answers: self.answers,
            total_pages: self.total_pages,
            unlabeled_pages: self.unlabeled_pages,
        }
    }
}

/// Merges page results in the given order.
pub fn merge_pages<'a>(pages: impl IntoIterator<Item = &'a SegmentationResult>) -> MergedSubmission {
    let mut merger = PageMerger::new();
    for page in pages {
        merger.push(page);
    }
    merger.finish()
}

/// Merges bare answer maps in the given order.
pub fn merge_answer_maps<'a>(pages: impl IntoIterator<Item = &'a AnswerMap>) -> MergedSubmission {
    let mut merger = PageMerger::new();
    for answers in pages {
        merger.push_answers(answers, None);
    }
    merger.finish()
}
