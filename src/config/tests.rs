use super::*;
use serial_test::serial;
use std::env;

const VARS: [&str; 13] = [
    "PAPER_MODEL_PATH",
    "PAPER_EMBEDDER_STUB",
    "PAPER_EMBED_CACHE_CAPACITY",
    "PAPER_HANDWRITTEN",
    "PAPER_DEFAULT_ANSWER_TYPE",
    "PAPER_LEFT_MARGIN",
    "PAPER_MAX_EXPECTED_QUESTION",
    "PAPER_LEADING_TEXT",
    "PAPER_SHORT_THRESHOLD",
    "PAPER_HOLISTIC_THRESHOLD",
    "PAPER_POINT_THRESHOLD",
    "PAPER_CURVE_EXPONENT",
    "PAPER_PASS_RATIO",
];

fn clear_paper_env() {
    // SAFETY: Test code only, env tests run serially.
    for var in VARS {
        unsafe { env::remove_var(var) };
    }
}

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    clear_paper_env();
    // SAFETY: Test code only, env tests run serially.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();
    clear_paper_env();
    result
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert!(config.model_path.is_none());
    assert!(config.is_handwritten);
    assert_eq!(config.default_answer_type, AnswerType::Short);
    assert_eq!(config.left_margin, 400.0);
    assert_eq!(config.max_expected_question, 20);
    assert_eq!(config.short_threshold, 0.55);
    assert_eq!(config.holistic_threshold, 0.50);
    assert_eq!(config.point_threshold, 0.55);
    assert_eq!(config.curve_exponent, 0.6);
    assert_eq!(config.embed_cache_capacity, 4_096);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    let config = with_env_vars(&[], Config::from_env).expect("should parse with defaults");
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    let config = with_env_vars(
        &[
            ("PAPER_HANDWRITTEN", "no"),
            ("PAPER_DEFAULT_ANSWER_TYPE", "Long"),
            ("PAPER_LEFT_MARGIN", " 250.5 "),
            ("PAPER_MAX_EXPECTED_QUESTION", "12"),
            ("PAPER_SHORT_THRESHOLD", "0.6"),
            ("PAPER_CURVE_EXPONENT", "0.8"),
            ("PAPER_EMBED_CACHE_CAPACITY", "0"),
            ("PAPER_LEADING_TEXT", "Discard"),
        ],
        Config::from_env,
    )
    .expect("valid overrides");

    assert!(!config.is_handwritten);
    assert_eq!(config.default_answer_type, AnswerType::Long);
    assert_eq!(config.left_margin, 250.5);
    assert_eq!(config.max_expected_question, 12);
    assert_eq!(config.short_threshold, 0.6);
    assert_eq!(config.curve_exponent, 0.8);
    assert_eq!(config.embed_cache_capacity, 0);
    assert_eq!(config.leading_text, LeadingTextPolicy::Discard);
    assert_eq!(config.segmentation_config().leading_text, LeadingTextPolicy::Discard);
}

#[test]
#[serial]
fn test_unparsable_values_are_errors() {
    let result = with_env_vars(&[("PAPER_SHORT_THRESHOLD", "high")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { name: "PAPER_SHORT_THRESHOLD", .. })
    ));

    let result = with_env_vars(&[("PAPER_HANDWRITTEN", "maybe")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

    let result = with_env_vars(&[("PAPER_DEFAULT_ANSWER_TYPE", "essay")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
#[serial]
fn test_blank_model_path_means_stub() {
    let config = with_env_vars(&[("PAPER_MODEL_PATH", "   ")], Config::from_env).unwrap();
    assert!(config.model_path.is_none());
    assert!(!config.uses_model());
    assert!(config.embedder_config().testing_stub);
}

#[test]
#[serial]
fn test_stub_flag_overrides_model_path() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().to_string_lossy().into_owned();
    let config = with_env_vars(
        &[("PAPER_MODEL_PATH", model.as_str()), ("PAPER_EMBEDDER_STUB", "true")],
        Config::from_env,
    )
    .unwrap();

    assert_eq!(config.model_path.as_deref(), Some(dir.path()));
    assert!(config.embedder_stub);
    assert!(!config.uses_model());
    assert!(config.embedder_config().testing_stub);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_unknown_leading_text_policy_is_error() {
    let result = with_env_vars(&[("PAPER_LEADING_TEXT", "ignore")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { name: "PAPER_LEADING_TEXT", .. })
    ));
}

#[test]
fn test_threshold_ranges() {
    let config = Config {
        holistic_threshold: 1.0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange { name: "PAPER_HOLISTIC_THRESHOLD", .. })
    ));

    let config = Config {
        curve_exponent: 0.0,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        pass_ratio: -0.1,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_stage_validation_is_surfaced() {
    let config = Config {
        max_expected_question: 0,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Segmentation(_))));
}

#[test]
fn test_model_path_checks() {
    let config = Config {
        model_path: Some(PathBuf::from("/nonexistent/paper/model")),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::PathNotFound { .. })));

    let file = tempfile::NamedTempFile::new().unwrap();
    let config = Config {
        model_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::NotADirectory { .. })));

    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        model_path: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Embedding(_))));

    let config = Config {
        model_path: Some(dir.path().to_path_buf()),
        embedder_stub: true,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
    assert!(config.embedder_config().testing_stub);
}

#[test]
fn test_stage_conversions() {
    let config = Config {
        is_handwritten: false,
        left_margin: 300.0,
        point_threshold: 0.6,
        curve_exponent: 0.7,
        ..Default::default()
    };

    let segmentation = config.segmentation_config();
    assert!(!segmentation.is_handwritten);
    assert_eq!(segmentation.left_margin_threshold, 300.0);

    let valuation = config.valuation_config();
    assert_eq!(valuation.point.threshold, 0.6);
    assert_eq!(valuation.point.exponent, 0.7);
    assert_eq!(valuation.short.threshold, 0.55);
    assert_eq!(valuation.holistic.exponent, 0.7);
}
