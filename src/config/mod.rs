//! Environment-backed configuration.
//!
//! Every setting has a default from [`crate::constants`]. Override with `PAPER_*`
//! environment variables; a variable that is set but unparsable is an error, never a
//! silent fallback.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_CURVE_EXPONENT, DEFAULT_EMBED_CACHE_CAPACITY, DEFAULT_HOLISTIC_THRESHOLD,
    DEFAULT_LEFT_MARGIN, DEFAULT_MAX_EXPECTED_QUESTION, DEFAULT_PASS_RATIO,
    DEFAULT_POINT_THRESHOLD, DEFAULT_SHORT_THRESHOLD,
};
use crate::embedding::EmbedderConfig;
use crate::segmentation::{AnswerType, LeadingTextPolicy, SegmentationConfig};
use crate::valuation::{MarkCurve, ValuationConfig};

/// Runtime configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `PAPER_*` overrides on top of defaults, then derive
/// the per-stage configs with [`Config::embedder_config`], [`Config::segmentation_config`]
/// and [`Config::valuation_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Sentence-transformers model directory. `None` runs the embedder in stub mode.
    pub model_path: Option<PathBuf>,

    /// Force stub embeddings even when a model path is set.
    pub embedder_stub: bool,

    /// Max cached embeddings. `0` disables the cache. Default: `4096`.
    pub embed_cache_capacity: u64,

    /// Selects the large-gap factor for paragraph detection. Default: `true`.
    pub is_handwritten: bool,

    /// Answer type of questions the exam does not declare. Default: `short`.
    pub default_answer_type: AnswerType,

    /// Heuristic path: labels must start left of this X. Default: `400`.
    pub left_margin: f32,

    /// Heuristic path: larger label numbers are misreads. Default: `20`.
    pub max_expected_question: u32,

    /// Text above a page's first label: `continuation` (default) or `discard`.
    pub leading_text: LeadingTextPolicy,

    pub short_threshold: f32,
    pub holistic_threshold: f32,
    pub point_threshold: f32,

    /// Exponent shared by all mark curves. Default: `0.6`.
    pub curve_exponent: f32,

    /// Share of total marks needed to pass. Default: `0.4`.
    pub pass_ratio: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: None,
            embedder_stub: false,
            embed_cache_capacity: DEFAULT_EMBED_CACHE_CAPACITY,
            is_handwritten: true,
            default_answer_type: AnswerType::Short,
            left_margin: DEFAULT_LEFT_MARGIN,
            max_expected_question: DEFAULT_MAX_EXPECTED_QUESTION,
            leading_text: LeadingTextPolicy::default(),
            short_threshold: DEFAULT_SHORT_THRESHOLD,
            holistic_threshold: DEFAULT_HOLISTIC_THRESHOLD,
            point_threshold: DEFAULT_POINT_THRESHOLD,
            curve_exponent: DEFAULT_CURVE_EXPONENT,
            pass_ratio: DEFAULT_PASS_RATIO,
        }
    }
}

impl Config {
    const ENV_MODEL_PATH: &'static str = EmbedderConfig::ENV_MODEL_PATH;
    const ENV_EMBEDDER_STUB: &'static str = "PAPER_EMBEDDER_STUB";
    const ENV_EMBED_CACHE_CAPACITY: &'static str = "PAPER_EMBED_CACHE_CAPACITY";
    const ENV_HANDWRITTEN: &'static str = "PAPER_HANDWRITTEN";
    const ENV_DEFAULT_ANSWER_TYPE: &'static str = "PAPER_DEFAULT_ANSWER_TYPE";
    const ENV_LEFT_MARGIN: &'static str = "PAPER_LEFT_MARGIN";
    const ENV_MAX_EXPECTED_QUESTION: &'static str = "PAPER_MAX_EXPECTED_QUESTION";
    const ENV_LEADING_TEXT: &'static str = "PAPER_LEADING_TEXT";
    const ENV_SHORT_THRESHOLD: &'static str = "PAPER_SHORT_THRESHOLD";
    const ENV_HOLISTIC_THRESHOLD: &'static str = "PAPER_HOLISTIC_THRESHOLD";
    const ENV_POINT_THRESHOLD: &'static str = "PAPER_POINT_THRESHOLD";
    const ENV_CURVE_EXPONENT: &'static str = "PAPER_CURVE_EXPONENT";
    const ENV_PASS_RATIO: &'static str = "PAPER_PASS_RATIO";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            model_path: Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH),
            embedder_stub: Self::parse_bool_from_env(Self::ENV_EMBEDDER_STUB, defaults.embedder_stub)?,
            embed_cache_capacity: Self::parse_from_env(
                Self::ENV_EMBED_CACHE_CAPACITY,
                defaults.embed_cache_capacity,
            )?,
            is_handwritten: Self::parse_bool_from_env(Self::ENV_HANDWRITTEN, defaults.is_handwritten)?,
            default_answer_type: Self::parse_from_env(
                Self::ENV_DEFAULT_ANSWER_TYPE,
                defaults.default_answer_type,
            )?,
            left_margin: Self::parse_from_env(Self::ENV_LEFT_MARGIN, defaults.left_margin)?,
            max_expected_question: Self::parse_from_env(
                Self::ENV_MAX_EXPECTED_QUESTION,
                defaults.max_expected_question,
            )?,
            leading_text: Self::parse_from_env(Self::ENV_LEADING_TEXT, defaults.leading_text)?,
            short_threshold: Self::parse_from_env(Self::ENV_SHORT_THRESHOLD, defaults.short_threshold)?,
            holistic_threshold: Self::parse_from_env(
                Self::ENV_HOLISTIC_THRESHOLD,
                defaults.holistic_threshold,
            )?,
            point_threshold: Self::parse_from_env(Self::ENV_POINT_THRESHOLD, defaults.point_threshold)?,
            curve_exponent: Self::parse_from_env(Self::ENV_CURVE_EXPONENT, defaults.curve_exponent)?,
            pass_ratio: Self::parse_from_env(Self::ENV_PASS_RATIO, defaults.pass_ratio)?,
        })
    }

    /// Checks ranges and the model path, then every derived stage config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = [
            (Self::ENV_SHORT_THRESHOLD, self.short_threshold),
            (Self::ENV_HOLISTIC_THRESHOLD, self.holistic_threshold),
            (Self::ENV_POINT_THRESHOLD, self.point_threshold),
        ];
        for (name, value) in thresholds {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    expected: "a value strictly between 0 and 1",
                });
            }
        }

        if !(self.curve_exponent > 0.0 && self.curve_exponent.is_finite()) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_CURVE_EXPONENT,
                value: self.curve_exponent,
                expected: "a positive finite value",
            });
        }

        if !(0.0..=1.0).contains(&self.pass_ratio) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_PASS_RATIO,
                value: self.pass_ratio,
                expected: "a value between 0 and 1",
            });
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        self.segmentation_config().validate()?;
        self.valuation_config().validate()?;
        if self.uses_model() {
            self.embedder_config().validate()?;
        }
        Ok(())
    }

    /// `true` when a real model will be loaded instead of stub embeddings.
    pub fn uses_model(&self) -> bool {
        self.model_path.is_some() && !self.embedder_stub
    }

    pub fn embedder_config(&self) -> EmbedderConfig {
        match &self.model_path {
            Some(path) if !self.embedder_stub => EmbedderConfig::new(path.clone()),
            _ => EmbedderConfig::stub(),
        }
    }

    /// Segmentation defaults with this configuration's overrides; exam-specific question
    /// types are added by the caller.
    pub fn segmentation_config(&self) -> SegmentationConfig {
        SegmentationConfig {
            is_handwritten: self.is_handwritten,
            default_answer_type: self.default_answer_type,
            left_margin_threshold: self.left_margin,
            max_expected_question: self.max_expected_question,
            leading_text: self.leading_text,
            ..SegmentationConfig::default()
        }
    }

    pub fn valuation_config(&self) -> ValuationConfig {
        ValuationConfig {
            short: MarkCurve {
                threshold: self.short_threshold,
                exponent: self.curve_exponent,
            },
            holistic: MarkCurve {
                threshold: self.holistic_threshold,
                exponent: self.curve_exponent,
            },
            point: MarkCurve {
                threshold: self.point_threshold,
                exponent: self.curve_exponent,
            },
            pass_ratio: self.pass_ratio,
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    reason: e.to_string(),
                    value,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    reason: "expected true/false, yes/no, on/off or 1/0".to_string(),
                }),
            },
            Err(_) => Ok(default),
        }
    }
}
