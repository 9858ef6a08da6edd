use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::OcrError;

/// Axis-aligned pixel box, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, max_x: f32, max_y: f32) -> Self {
        Self { x, y, max_x, max_y }
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        (self.x + self.max_x) / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        (self.y + self.max_y) / 2.0
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max_y - self.y
    }
}

/// What the recognizer detected after a word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Glued to the next symbol.
    #[default]
    None,
    /// Ordinary inter-word space.
    Space,
    /// Wide space the recognizer is confident about.
    SureSpace,
    /// End of a line that also ends a word.
    EolSureSpace,
    /// Hard line break.
    LineBreak,
}

impl BreakKind {
    /// `true` for the kinds that end a printed/handwritten line.
    #[inline]
    pub fn is_line_break(self) -> bool {
        matches!(self, BreakKind::EolSureSpace | BreakKind::LineBreak)
    }

    #[inline]
    pub fn has_space_after(self) -> bool {
        !matches!(self, BreakKind::None)
    }
}

/// A recognized word. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    #[serde(flatten)]
    pub bbox: BoundingBox,
    #[serde(default, rename = "break_type")]
    pub break_kind: BreakKind,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: BoundingBox, break_kind: BreakKind) -> Self {
        Self {
            text: text.into(),
            bbox,
            break_kind,
        }
    }

    #[inline]
    pub fn has_space_after(&self) -> bool {
        self.break_kind.has_space_after()
    }
}

/// Everything the recognizer returned for one page image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    pub words: Vec<Word>,
    /// Unsegmented recognized text (used by identity extraction upstream).
    #[serde(default)]
    pub full_text: String,
}

impl OcrPage {
    pub fn new(words: Vec<Word>) -> Self {
        let full_text = render_full_text(&words);
        Self { words, full_text }
    }

    /// Parses either `{"words": [...], "full_text": "..."}` or a bare `[...]` word array.
    pub fn from_json_str(json: &str) -> Result<Self, OcrError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.is_array() {
            let words: Vec<Word> = serde_json::from_value(value)?;
            return Ok(Self::new(words));
        }

        let mut page: OcrPage = serde_json::from_value(value)?;
        if page.full_text.is_empty() {
            page.full_text = render_full_text(&page.words);
        }
        Ok(page)
    }

    pub fn from_json_path(path: &Path) -> Result<Self, OcrError> {
        let json = std::fs::read_to_string(path).map_err(|source| OcrError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn is_blank(&self) -> bool {
        self.words.iter().all(|w| w.text.trim().is_empty())
    }
}

fn render_full_text(words: &[Word]) -> String {
    let mut out = String::new();
    for word in words {
        out.push_str(&word.text);
        if word.break_kind.is_line_break() {
            out.push('\n');
        } else if word.has_space_after() {
            out.push(' ');
        }
    }
    out.trim_end().to_string()
}
