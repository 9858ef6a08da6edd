//! Synthetic answer sheets and word lists.
//!
//! Sheets are drawn with a label-column divider and evenly ruled rows, saved as PNG in a
//! temporary directory, so tests exercise the real image decoding and grid detection.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use paper_valuation::ocr::{BoundingBox, BreakKind, OcrPage, Word};

pub const WIDTH: u32 = 547;
pub const HEIGHT: u32 = 700;
pub const DIVIDER_X: u32 = 60;
pub const FIRST_ROW: u32 = 100;
pub const PITCH: u32 = 40;
pub const ROWS: u32 = 12;

pub fn blank_sheet() -> GrayImage {
    GrayImage::from_pixel(WIDTH, HEIGHT, Luma([255]))
}

/// Divider at [`DIVIDER_X`], [`ROWS`] horizontal rules from [`FIRST_ROW`].
pub fn ruled_sheet() -> GrayImage {
    let mut img = blank_sheet();
    for y in 0..HEIGHT {
        for dx in 0..2 {
            img.put_pixel(DIVIDER_X + dx, y, Luma([0]));
        }
    }
    for row in 0..ROWS {
        for dy in 0..2 {
            for x in 0..WIDTH {
                img.put_pixel(x, FIRST_ROW + row * PITCH + dy, Luma([0]));
            }
        }
    }
    img
}

pub fn save_png(img: &GrayImage, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("write sheet image");
    path
}

pub fn word(text: &str, x: f32, y: f32, kind: BreakKind) -> Word {
    Word::new(text, BoundingBox::new(x, y, x + 40.0, y + 20.0), kind)
}

/// Words of `text` laid out left to right inside grid row `row`, starting at `x`.
/// The last word ends the line.
pub fn row_words(text: &str, x: f32, row: u32) -> Vec<Word> {
    let y = (FIRST_ROW + row * PITCH + 10) as f32;
    let parts: Vec<&str> = text.split_whitespace().collect();
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let kind = if i + 1 == parts.len() {
                BreakKind::EolSureSpace
            } else {
                BreakKind::Space
            };
            word(part, x + i as f32 * 50.0, y, kind)
        })
        .collect()
}

/// A label in the label column of `row`.
pub fn label(number: u32, row: u32) -> Word {
    word(
        &format!("Q{}", number),
        10.0,
        (FIRST_ROW + row * PITCH + 10) as f32,
        BreakKind::Space,
    )
}

pub fn write_words(dir: &Path, name: &str, words: Vec<Word>) -> PathBuf {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(&OcrPage::new(words)).expect("serialize words");
    std::fs::write(&path, json).expect("write word list");
    path
}

pub fn write_text(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

/// Water-cycle exam: Q1 short (3 marks), Q2 long (9 marks, three key points).
pub const WATER_CYCLE_EXAM: &str = r#"{
    "question_types": {"Q1": "short", "Q2": "long"},
    "question_marks": "3,9",
    "teacher_answers": {
        "Q1": "the sun drives the water cycle",
        "Q2": [
            "evaporation converts water to vapor",
            "condensation forms clouds",
            "precipitation returns water to earth"
        ]
    },
    "student_submissions": {
        "s-1": {"student_name": "A. Rao", "answers": {"Q1": "the sun drives the water cycle"}}
    }
}"#;

pub const KEY_POINTS: [&str; 3] = [
    "evaporation converts water to vapor",
    "condensation forms clouds",
    "precipitation returns water to earth",
];
