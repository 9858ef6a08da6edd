use super::*;

fn page(entries: &[(AnswerLabel, &str)]) -> AnswerMap {
    entries
        .iter()
        .map(|(label, text)| (*label, text.to_string()))
        .collect()
}

const Q1: AnswerLabel = AnswerLabel::Question(1);
const Q2: AnswerLabel = AnswerLabel::Question(2);
const Q3: AnswerLabel = AnswerLabel::Question(3);
const UNLABELED: AnswerLabel = AnswerLabel::UnlabeledContinuation;

#[test]
fn test_same_label_on_later_page_is_continuation() {
    let pages = [page(&[(Q1, "a")]), page(&[(Q1, "b")])];
    let merged = merge_answer_maps(&pages);
    assert_eq!(merged.answer(1), Some("a b"));
    assert_eq!(merged.total_pages, 2);
}

#[test]
fn test_distinct_labels_sorted_by_number() {
    let pages = [page(&[(Q2, "b")]), page(&[(Q1, "a")])];
    let merged = merge_answer_maps(&pages);

    let keys: Vec<AnswerLabel> = merged.answers.keys().copied().collect();
    assert_eq!(keys, vec![Q1, Q2]);
    assert_eq!(merged.answer(1), Some("a"));
    assert_eq!(merged.answer(2), Some("b"));
}

#[test]
fn test_unlabeled_page_attaches_to_last_label() {
    let pages = [
        page(&[(Q1, "one"), (Q2, "two")]),
        page(&[(UNLABELED, "more two")]),
    ];
    let merged = merge_answer_maps(&pages);
    assert_eq!(merged.answer(2), Some("two more two"));
    assert_eq!(merged.unlabeled_pages, vec![2]);
    assert!(!merged.answers.contains_key(&UNLABELED));
}

#[test]
fn test_leading_text_attaches_before_page_labels() {
    let pages = [
        page(&[(Q1, "start")]),
        page(&[(UNLABELED, "continued here"), (Q2, "beta")]),
    ];
    let merged = merge_answer_maps(&pages);
    assert_eq!(merged.answer(1), Some("start continued here"));
    assert_eq!(merged.answer(2), Some("beta"));
    assert_eq!(merged.unlabeled_pages, vec![2]);
}

#[test]
fn test_leading_text_then_same_label_continues() {
    let pages = [
        page(&[(Q2, "two")]),
        page(&[(UNLABELED, "still two"), (Q3, "three")]),
        page(&[(UNLABELED, "still three")]),
    ];
    let merged = merge_answer_maps(&pages);
    assert_eq!(merged.answer(2), Some("two still two"));
    assert_eq!(merged.answer(3), Some("three still three"));
    assert_eq!(merged.unlabeled_pages, vec![2, 3]);
}

#[test]
fn test_unlabeled_first_page_seeds_q1() {
    let pages = [page(&[(UNLABELED, "orphan")]), page(&[(Q1, "labeled")])];
    let merged = merge_answer_maps(&pages);
    assert_eq!(merged.answer(1), Some("orphan labeled"));
}

#[test]
fn test_writing_order_decides_last_label() {
    let mut merger = PageMerger::new();
    merger.push_answers(&page(&[(Q1, "x"), (Q3, "y")]), Some(Q1));
    merger.push_answers(&page(&[(UNLABELED, "z")]), None);
    let merged = merger.finish();
    assert_eq!(merged.answer(1), Some("x z"));
    assert_eq!(merged.answer(3), Some("y"));
}

#[test]
fn test_empty_continuation_adds_no_space() {
    let pages = [page(&[(Q1, "a")]), page(&[(Q1, "")])];
    assert_eq!(merge_answer_maps(&pages).answer(1), Some("a"));
}

#[test]
fn test_blank_pages_still_count() {
    let pages = [page(&[(Q1, "a")]), AnswerMap::new()];
    let merged = merge_answer_maps(&pages);
    assert_eq!(merged.total_pages, 2);
    assert_eq!(merged.answers.len(), 1);
}

#[test]
fn test_serializes_like_a_label_map() {
    let merged = merge_answer_maps(&[page(&[(Q2, "b"), (Q1, "a")])]);
    let json = serde_json::to_value(&merged).unwrap();
    assert_eq!(json["answers"]["Q1"], "a");
    assert_eq!(json["total_pages"], 1);
    assert!(json.get("unlabeled_pages").is_none());
}
