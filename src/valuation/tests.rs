use super::*;
use crate::embedding::MockEmbedder;
use crate::segmentation::AnswerType;

fn id(raw: &str) -> QuestionId {
    raw.parse().unwrap()
}

mod curve_tests {
    use super::*;

    #[test]
    fn test_documented_example() {
        let curve = MarkCurve::short_answer();
        assert_eq!(curve.mark(0.8, 3.0), 2.0);
    }

    #[test]
    fn test_zero_below_threshold() {
        let curve = MarkCurve::short_answer();
        assert_eq!(curve.mark(0.54, 3.0), 0.0);
        assert_eq!(curve.mark(-0.3, 3.0), 0.0);
        assert_eq!(curve.mark(f32::NAN, 3.0), 0.0);
    }

    #[test]
    fn test_full_similarity_earns_full_marks() {
        assert_eq!(MarkCurve::short_answer().mark(1.0, 3.0), 3.0);
        assert_eq!(MarkCurve::holistic().mark(1.0, 10.0), 10.0);
    }

    #[test]
    fn test_monotonic_above_threshold() {
        let curve = MarkCurve::key_point();
        let mut previous = 0.0;
        for step in 0..=45 {
            let similarity = 0.55 + step as f32 * 0.01;
            let mark = curve.mark(similarity, 5.0);
            assert!(mark >= previous, "mark dropped at similarity {similarity}");
            assert_eq!(mark * 2.0, (mark * 2.0).round(), "not a half mark: {mark}");
            previous = mark;
        }
    }

    #[test]
    fn test_round_to_half() {
        assert_eq!(round_to_half(2.24), 2.0);
        assert_eq!(round_to_half(2.26), 2.5);
        assert_eq!(round_to_half(2.74), 2.5);
        assert_eq!(round_to_half(2.76), 3.0);
    }

    #[test]
    fn test_curve_validation() {
        assert!(MarkCurve::new(0.0, 0.6).is_err());
        assert!(MarkCurve::new(1.0, 0.6).is_err());
        assert!(MarkCurve::new(0.5, 0.0).is_err());
        assert!(MarkCurve::new(0.5, f32::INFINITY).is_err());
        assert!(MarkCurve::new(0.5, 1.2).is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ValuationConfig::default();
        assert!(config.validate().is_ok());
        config.pass_ratio = 1.5;
        assert!(config.validate().is_err());
    }
}

mod split_tests {
    use super::*;

    #[test]
    fn test_blank_line_paragraphs() {
        assert_eq!(
            split_paragraphs("First idea\n\nSecond idea\n\nThird idea"),
            vec!["First idea", "Second idea", "Third idea"]
        );
    }

    #[test]
    fn test_falls_back_to_lines() {
        assert_eq!(
            split_paragraphs("line one\nline two\nline three"),
            vec!["line one", "line two", "line three"]
        );
    }

    #[test]
    fn test_falls_back_to_sentences() {
        let text = "Water evaporates from oceans. Vapor condenses into clouds. \
                    Rain falls back down to earth. Rivers carry the water to sea.";
        assert_eq!(
            split_paragraphs(text),
            vec![
                "Water evaporates from oceans.",
                "Vapor condenses into clouds.",
                "Rain falls back down to earth.",
                "Rivers carry the water to sea.",
            ]
        );
    }

    #[test]
    fn test_sentences_group_in_threes() {
        let text = (0..9)
            .map(|i| format!("Sentence number {i} is long enough"))
            .collect::<Vec<_>>()
            .join(". ");
        let chunks = split_paragraphs(&text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].starts_with("Sentence number 0"));
        assert!(chunks[0].contains("Sentence number 2"));
        assert!(chunks[1].starts_with("Sentence number 3"));
    }

    #[test]
    fn test_short_text_kept_whole() {
        assert_eq!(
            split_paragraphs("  Just one sentence here.  "),
            vec!["Just one sentence here."]
        );
        assert!(split_paragraphs("   ").is_empty());
    }

    #[test]
    fn test_oversized_paragraph_split_in_pairs() {
        let long = (0..4)
            .map(|i| format!("Sentence number {i} {}", "word ".repeat(15).trim()))
            .collect::<Vec<_>>()
            .join(". ");
        assert!(long.chars().count() > 300);

        let text = format!("Intro paragraph.\n\nSecond short one.\n\n{long}.");
        let chunks = split_paragraphs(&text);

        assert_eq!(chunks.len(), 4);
        assert!(chunks[2].starts_with("Sentence number 0"));
        assert!(chunks[2].contains("Sentence number 1"));
        assert!(chunks[3].starts_with("Sentence number 2"));
        assert!(chunks[3].ends_with('.'));
    }
}

mod id_tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(id("q5").as_str(), "Q5");
        assert_eq!(id("5").as_str(), "Q5");
        assert_eq!(id(" Q05 ").as_str(), "Q5");
        assert_eq!(id("Q5B").as_str(), "Q5b");
        assert_eq!(id("Q5").number(), Some(5));
        assert_eq!(id("Q5b").number(), None);
    }

    #[test]
    fn test_invalid_ids() {
        for raw in ["", "Q", "Qx", "x5", "Q5 b"] {
            assert!(raw.parse::<QuestionId>().is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_numeric_ordering() {
        let mut ids = vec![id("Q10"), id("Q5b"), id("Q2"), id("Q5")];
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(QuestionId::as_str).collect();
        assert_eq!(ordered, vec!["Q2", "Q5", "Q5b", "Q10"]);
    }

    #[test]
    fn test_from_answer_label() {
        use crate::segmentation::AnswerLabel;
        assert_eq!(QuestionId::try_from(AnswerLabel::Question(3)).unwrap(), id("Q3"));
        assert!(QuestionId::try_from(AnswerLabel::UnlabeledContinuation).is_err());
    }
}

mod marks_tests {
    use super::*;

    #[test]
    fn test_parse_marks() {
        assert_eq!(parse_marks("3, 3,5", 3).unwrap(), vec![3.0, 3.0, 5.0]);
    }

    #[test]
    fn test_count_mismatch() {
        assert!(matches!(
            parse_marks("3,3", 3),
            Err(ValuationError::MarkCountMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_invalid_mark() {
        assert!(matches!(
            parse_marks("3,x,5", 3),
            Err(ValuationError::InvalidMark { value }) if value == "x"
        ));
        assert!(parse_marks("3,0,5", 3).is_err());
    }
}

mod scoring_tests {
    use super::*;

    const KEY_POINTS: [&str; 3] = [
        "evaporation converts water to vapor",
        "condensation forms clouds",
        "precipitation returns water to earth",
    ];
    const STUDENT: &str = "Evaporation turns water into vapor.\n\nCondensation then forms clouds.";

    fn water_cycle_embedder() -> MockEmbedder {
        MockEmbedder::new(4)
            .with_vector(KEY_POINTS[0], vec![1.0, 0.0, 0.0, 0.0])
            .with_vector(KEY_POINTS[1], vec![0.0, 1.0, 0.0, 0.0])
            .with_vector(KEY_POINTS[2], vec![0.0, 0.0, 1.0, 0.0])
            .with_vector(KEY_POINTS.join(" "), vec![1.0, 1.0, 1.0, 0.0])
            .with_vector("Evaporation turns water into vapor.", vec![1.0, 0.0, 0.0, 0.0])
            .with_vector("Condensation then forms clouds.", vec![0.0, 1.0, 0.0, 0.0])
            .with_vector(STUDENT, vec![1.0, 0.0, 0.0, 1.0])
    }

    fn key_points() -> Vec<String> {
        KEY_POINTS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partial_coverage_long_answer() {
        let engine = ValuationEngine::new(water_cycle_embedder(), ValuationConfig::default()).unwrap();
        let score = engine.evaluate_long(STUDENT, &key_points(), 9.0).unwrap();

        assert_eq!(score.point_by_point.marks, 6.0);
        assert_eq!(score.holistic.marks, 0.0);
        assert_eq!(score.marks, 6.0);
        assert_eq!(score.method, LongScoringMethod::PointByPoint);

        let details = &score.point_by_point.details;
        assert_eq!(details.len(), 3);
        assert_eq!(details[0].marks, 3.0);
        assert_eq!(details[0].max_marks, 3.0);
        assert_eq!(details[0].best_match, "Evaporation turns water into vapor.");
        assert_eq!(details[2].marks, 0.0);
        assert_eq!(details[2].best_match, "");

        assert_eq!(engine.embedder().call_count(), 7);
    }

    #[test]
    fn test_holistic_wins_for_under_segmented_answer() {
        let embedder = MockEmbedder::new(4)
            .with_vector("alpha", vec![1.0, 0.0, 0.0, 0.0])
            .with_vector("beta", vec![0.0, 1.0, 0.0, 0.0])
            .with_vector("alpha beta", vec![1.0, 1.0, 0.0, 0.0])
            .with_vector("one block", vec![1.0, 1.0, 0.0, 0.0]);
        let engine = ValuationEngine::new(embedder, ValuationConfig::default()).unwrap();

        let points = vec!["alpha".to_string(), "beta".to_string()];
        let score = engine.evaluate_long("one block", &points, 4.0).unwrap();

        assert_eq!(score.point_by_point.marks, 2.0);
        assert_eq!(score.holistic.marks, 4.0);
        assert_eq!(score.marks, 4.0);
        assert_eq!(score.method, LongScoringMethod::Holistic);
    }

    #[test]
    fn test_short_answer_score() {
        let embedder = MockEmbedder::new(4)
            .with_vector("the mitochondria is the powerhouse of the cell", vec![1.0, 0.0])
            .with_vector("mitochondria make energy", vec![0.8, 0.6]);
        let engine = ValuationEngine::new(embedder, ValuationConfig::default()).unwrap();

        let marks = engine
            .score_short(
                "mitochondria make energy",
                "the mitochondria is the powerhouse of the cell",
                3.0,
            )
            .unwrap();
        assert_eq!(marks, 2.0);
    }

    #[test]
    fn test_empty_answer_scores_zero_without_embedding() {
        let engine = ValuationEngine::new(MockEmbedder::new(4), ValuationConfig::default()).unwrap();
        assert_eq!(engine.score_short("   ", "reference", 3.0).unwrap(), 0.0);
        assert_eq!(engine.score_long("", &key_points(), 9.0).unwrap(), 0.0);
        assert_eq!(engine.embedder().call_count(), 0);
    }

    #[test]
    fn test_long_without_key_points_is_error() {
        let engine = ValuationEngine::new(MockEmbedder::new(4), ValuationConfig::default()).unwrap();
        assert!(engine.score_long("text", &[], 5.0).is_err());
    }

    #[test]
    fn test_score_text_dispatch() {
        let engine = ValuationEngine::new(water_cycle_embedder(), ValuationConfig::default()).unwrap();
        let teacher = KEY_POINTS.join("\n\n");
        let marks = engine
            .score_text(AnswerType::Long, STUDENT, &teacher, 9.0)
            .unwrap();
        assert_eq!(marks, 6.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ValuationConfig::default();
        config.short.exponent = -1.0;
        assert!(ValuationEngine::new(MockEmbedder::new(4), config).is_err());
    }
}

mod plan_tests {
    use super::*;

    fn record(json: &str) -> ExamRecord {
        ExamRecord::from_json_str(json).unwrap()
    }

    #[test]
    fn test_plan_binds_answer_types() {
        let exam = record(
            r#"{
                "question_types": {"Q1": "short", "Q2": "long"},
                "question_marks": "3,9",
                "teacher_answers": {
                    "Q1": "Photosynthesis makes food from light.",
                    "Q2": "Evaporation.\n\nCondensation.\n\nPrecipitation."
                }
            }"#,
        );
        let plan = GradingPlan::from_record(&exam).unwrap();

        assert_eq!(plan.len(), 2);
        let q2 = plan.question(&id("Q2")).unwrap();
        assert_eq!(q2.max_marks, 9.0);
        assert_eq!(
            q2.reference,
            ReferenceAnswer::Long(vec![
                "Evaporation.".to_string(),
                "Condensation.".to_string(),
                "Precipitation.".to_string()
            ])
        );
        assert_eq!(
            plan.segmentation_types(),
            std::collections::BTreeMap::from([(1, AnswerType::Short), (2, AnswerType::Long)])
        );
    }

    #[test]
    fn test_missing_type_defaults_to_short() {
        let exam = record(
            r#"{"question_marks": {"1": 2}, "teacher_answers": {"q1": ["a", "b"]}}"#,
        );
        let plan = GradingPlan::from_record(&exam).unwrap();
        assert_eq!(
            plan.question(&id("Q1")).unwrap().reference,
            ReferenceAnswer::Short("a b".to_string())
        );
    }

    #[test]
    fn test_marks_count_mismatch_is_reported() {
        let exam = record(
            r#"{"question_marks": "3,3,5", "teacher_answers": {"Q1": "a", "Q2": "b"}}"#,
        );
        assert!(matches!(
            GradingPlan::from_record(&exam),
            Err(ValuationError::MarkCountMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_missing_marks_is_reported() {
        let exam = record(r#"{"question_marks": {"Q1": 3}, "teacher_answers": {"Q1": "a", "Q2": "b"}}"#);
        assert!(matches!(
            GradingPlan::from_record(&exam),
            Err(ValuationError::InvalidExam { .. })
        ));
    }

    #[test]
    fn test_or_group_validation() {
        let unknown = record(
            r#"{"question_marks": "3", "teacher_answers": {"Q1": "a"},
                "or_groups": [{"type": "single", "options": ["Q1", "Q9"]}]}"#,
        );
        assert!(GradingPlan::from_record(&unknown).is_err());

        let shared = record(
            r#"{"question_marks": "3,3,3", "teacher_answers": {"Q1": "a", "Q2": "b", "Q3": "c"},
                "or_groups": [
                    {"type": "single", "options": ["Q1", "Q2"]},
                    {"type": "single", "options": ["Q2", "Q3"]}
                ]}"#,
        );
        assert!(GradingPlan::from_record(&shared).is_err());

        let three_way = record(
            r#"{"question_marks": "3,3,3", "teacher_answers": {"Q1": "a", "Q2": "b", "Q3": "c"},
                "or_groups": [{"type": "single", "options": ["Q1", "Q2", "Q3"]}]}"#,
        );
        assert!(GradingPlan::from_record(&three_way).is_err());
    }

    #[test]
    fn test_empty_long_reference_is_reported() {
        let exam = record(
            r#"{"question_types": {"Q1": "long"}, "question_marks": "5", "teacher_answers": {"Q1": []}}"#,
        );
        assert!(matches!(
            GradingPlan::from_record(&exam),
            Err(ValuationError::EmptyReference { .. })
        ));
    }

    #[test]
    fn test_submission_lookup() {
        let exam = record(
            r#"{"question_marks": "3", "teacher_answers": {"Q1": "a"},
                "student_submissions": {"s-17": {"student_name": "R. Iyer", "answers": {"Q1": "x"}}}}"#,
        );
        let submission = exam.submission("s-17").unwrap();
        assert_eq!(submission.answers[&id("Q1")], "x");
        assert!(exam.submission("s-99").is_none());
    }
}

mod breakdown_tests {
    use super::*;

    const EXAM: &str = r#"{
        "question_marks": {"Q1": 3, "Q2": 3, "Q3": 3, "Q4": 3, "Q5": 3, "Q5b": 3},
        "teacher_answers": {
            "Q1": "ref one", "Q2": "ref two", "Q3": "ref three",
            "Q4": "ref four", "Q5": "ref five", "Q5b": "ref five b"
        },
        "or_groups": [
            {"type": "single", "options": ["Q5", "Q5b"]},
            {"type": "pair", "option_a": ["Q1", "Q2"], "option_b": ["Q3", "Q4"]}
        ]
    }"#;

    fn engine() -> ValuationEngine<MockEmbedder> {
        let embedder = MockEmbedder::new(4)
            .with_vector("ref one", vec![1.0, 0.0])
            .with_vector("answer one", vec![0.8, 0.6])
            .with_vector("ref three", vec![0.0, 1.0])
            .with_vector("answer three", vec![0.0, 1.0])
            .with_vector("ref five", vec![0.0, 0.0, 1.0])
            .with_vector("answer five", vec![0.6, 0.0, 0.8])
            .with_vector("ref five b", vec![0.0, 0.0, 0.0, 1.0])
            .with_vector("answer five b", vec![0.0, 0.0, 0.0, 1.0]);
        ValuationEngine::new(embedder, ValuationConfig::default()).unwrap()
    }

    fn answers(entries: &[(&str, &str)]) -> StudentAnswers {
        entries
            .iter()
            .map(|(q, a)| (id(q), a.to_string()))
            .collect()
    }

    #[test]
    fn test_or_groups_keep_better_option() {
        let plan = GradingPlan::from_record(&ExamRecord::from_json_str(EXAM).unwrap()).unwrap();
        let breakdown = engine()
            .evaluate(
                &plan,
                &answers(&[
                    ("Q1", "answer one"),
                    ("Q3", "answer three"),
                    ("Q5", "answer five"),
                    ("Q5b", "answer five b"),
                ]),
            )
            .unwrap();

        let graded: Vec<&str> = breakdown.questions.keys().map(QuestionId::as_str).collect();
        assert_eq!(graded, vec!["Q3", "Q4", "Q5b"]);

        let q5b = &breakdown.questions[&id("Q5b")];
        assert_eq!(q5b.marks_obtained, 3.0);
        let or = q5b.or_group.as_ref().unwrap();
        assert_eq!(or.kind, OrGroupKind::Single);
        assert_eq!(or.chosen, vec![id("Q5b")]);
        assert_eq!(or.rejected, vec![id("Q5")]);
        assert_eq!(or.rejected_marks, 2.0);

        let q3 = &breakdown.questions[&id("Q3")];
        assert_eq!(q3.marks_obtained, 3.0);
        assert_eq!(q3.or_group.as_ref().unwrap().rejected_marks, 2.0);
        assert!(!breakdown.questions[&id("Q4")].answered);

        assert_eq!(breakdown.total_obtained, 6.0);
        assert_eq!(breakdown.total_possible, 9.0);
        assert!((breakdown.percentage - 66.67).abs() < 0.01);
        assert!(breakdown.passed(0.4));
        assert!(!breakdown.passed(0.7));
    }

    #[test]
    fn test_ties_keep_first_option() {
        let plan = GradingPlan::from_record(&ExamRecord::from_json_str(EXAM).unwrap()).unwrap();
        let breakdown = engine().evaluate(&plan, &StudentAnswers::new()).unwrap();

        assert!(breakdown.questions.contains_key(&id("Q5")));
        assert!(breakdown.questions.contains_key(&id("Q1")));
        assert!(breakdown.questions.contains_key(&id("Q2")));
        assert!(!breakdown.questions.contains_key(&id("Q3")));
        assert_eq!(breakdown.total_obtained, 0.0);
        assert_eq!(breakdown.total_possible, 9.0);
        assert!(!breakdown.passed(0.4));
    }

    #[test]
    fn test_unknown_answers_are_skipped_with_warning() {
        let plan = GradingPlan::from_record(&ExamRecord::from_json_str(EXAM).unwrap()).unwrap();
        let breakdown = engine()
            .evaluate(&plan, &answers(&[("Q1", "answer one"), ("Q42", "stray")]))
            .unwrap();

        assert_eq!(breakdown.warnings.len(), 1);
        assert!(breakdown.warnings[0].contains("Q42"));
        assert!(breakdown.get("Q42").is_none());
        assert_eq!(breakdown.get("Q1").unwrap().marks_obtained, 2.0);
    }

    #[test]
    fn test_breakdown_serializes() {
        let plan = GradingPlan::from_record(&ExamRecord::from_json_str(EXAM).unwrap()).unwrap();
        let breakdown = engine()
            .evaluate(&plan, &answers(&[("Q5b", "answer five b")]))
            .unwrap();
        let json = serde_json::to_value(&breakdown).unwrap();

        assert_eq!(json["questions"]["Q5b"]["marks_obtained"], 3.0);
        assert_eq!(json["questions"]["Q5b"]["question_type"], "short");
        assert_eq!(json["questions"]["Q5b"]["or_group"]["kind"], "single");
        assert_eq!(json["questions"]["Q5b"]["detail"]["question_type"], "short");
    }
}
