//! Cross-cutting, shared constants.
//!
//! These are the documented defaults for every tunable threshold in the pipeline. Stage
//! config structs start from them; nothing downstream should read them directly when a
//! config value is available.
//!
//! # Threshold Provenance
//!
//! The similarity thresholds, the curve exponent, the paragraph gap factors and the
//! indentation tolerance were chosen empirically on photographed A4 answer sheets
//! (~547px wide after downscaling). Treat them as starting points for tuning.

/// Default embedding dimension (all-MiniLM-L6-v2 hidden size).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Default max tokens fed to the sentence embedder.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

pub const DEFAULT_SHORT_THRESHOLD: f32 = 0.55;
pub const DEFAULT_HOLISTIC_THRESHOLD: f32 = 0.50;
pub const DEFAULT_POINT_THRESHOLD: f32 = 0.55;
pub const DEFAULT_CURVE_EXPONENT: f32 = 0.6;

/// Divider position (fraction of page width) used when no vertical line is found.
pub const DIVIDER_FALLBACK_RATIO: f32 = 0.108;

/// Row pitch in pixels used when fewer than [`MIN_DETECTED_ROWS`] lines are found.
pub const FALLBACK_ROW_PITCH: u32 = 25;

/// Minimum number of clustered horizontal lines that counts as a detected grid.
pub const MIN_DETECTED_ROWS: usize = 3;

/// Pixel rows closer than this are merged into one printed line.
pub const LINE_CLUSTER_GAP: u32 = 5;

/// Fraction of the page excluded at each side when searching for the divider.
pub const EDGE_MARGIN_RATIO: f32 = 0.05;

/// Fraction of page height (divider) or width (rows) a line projection must exceed.
pub const LINE_INK_RATIO: f32 = 0.25;

/// Line kernels span `page_dimension / LINE_KERNEL_DIVISOR` pixels.
pub const LINE_KERNEL_DIVISOR: u32 = 8;

/// Lower bound on line kernel length in pixels.
pub const MIN_LINE_KERNEL: u32 = 20;

/// Smallest and largest question number a label may carry.
pub const MIN_QUESTION_NUMBER: u32 = 1;
pub const MAX_QUESTION_NUMBER: u32 = 50;

/// Heuristic path: labels must start left of this X coordinate.
pub const DEFAULT_LEFT_MARGIN: f32 = 400.0;

/// Heuristic path: label numbers above this are treated as misreads.
pub const DEFAULT_MAX_EXPECTED_QUESTION: u32 = 20;

pub const HANDWRITTEN_GAP_FACTOR: f32 = 1.5;
pub const PRINTED_GAP_FACTOR: f32 = 1.3;
pub const MODERATE_GAP_FACTOR: f32 = 1.0;
pub const INDENT_TOLERANCE: f32 = 30.0;
pub const MARGIN_GROUP_TOLERANCE: f32 = 10.0;
pub const MIN_WORD_HEIGHT: f32 = 5.0;
pub const FALLBACK_LINE_HEIGHT: f32 = 40.0;

/// Heuristic path: labels closer than this (vertically) trigger a spacing warning.
pub const TIGHT_LABEL_SPACING: f32 = 50.0;

/// Strict mode: labels closer than this make the page invalid.
pub const STRICT_LABEL_SPACING: f32 = 100.0;

/// Glyphs that open a bulleted paragraph.
pub const BULLET_MARKERS: &[&str] = &[
    "•", "●", "○", "-", "*", "→", "▸", ">", "■", "□", "▪", "◆", "◇", "►", "»", "–", "—",
];

/// Characters that end a sentence for paragraph detection.
pub const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', ':'];

/// Paragraphs longer than this are re-split into two-sentence chunks.
pub const MAX_CHUNK_CHARS: usize = 300;

/// Sentences shorter than this are dropped by the sentence splitter.
pub const MIN_SENTENCE_CHARS: usize = 10;

/// Length of the best-match preview in long-answer reports.
pub const MATCH_PREVIEW_CHARS: usize = 50;

/// Key used for the text of a page on which no question label was found.
pub const UNLABELED_CONTINUATION: &str = "UNLABELED_CONTINUATION";

/// Default capacity of the embedding cache (entries).
pub const DEFAULT_EMBED_CACHE_CAPACITY: u64 = 4_096;

/// Share of total marks needed to pass.
pub const DEFAULT_PASS_RATIO: f32 = 0.4;
