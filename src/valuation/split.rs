//! Splits free text into the units compared during point-by-point scoring.
//!
//! Blank-line paragraphs are preferred. If that yields two chunks or fewer, single lines
//! are tried; if that still yields two or fewer, sentences longer than ten characters are
//! grouped into chunks of up to three. Any chunk over 300 characters is finally broken
//! into two-sentence pieces.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{MAX_CHUNK_CHARS, MIN_SENTENCE_CHARS};

static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

pub fn split_paragraphs(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut paragraphs = non_empty(text.split("\n\n"));

    if paragraphs.len() <= 2 {
        let lines = non_empty(text.split('\n'));
        if lines.len() > paragraphs.len() {
            paragraphs = lines;
        }
    }

    if paragraphs.len() <= 2 {
        let sentences: Vec<&str> = SENTENCE_BOUNDARY
            .split(text)
            .map(str::trim)
            .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
            .collect();

        if sentences.len() > 3 {
            let chunk_size = (sentences.len() / 3).clamp(1, 3);
            paragraphs = sentences.chunks(chunk_size).map(join_sentences).collect();
        }
    }

    paragraphs.into_iter().flat_map(split_oversized).collect()
}

fn non_empty<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_oversized(paragraph: String) -> Vec<String> {
    if paragraph.chars().count() <= MAX_CHUNK_CHARS {
        return vec![paragraph];
    }

    let pieces: Vec<String> = {
        let sentences: Vec<&str> = SENTENCE_BOUNDARY
            .split(&paragraph)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if sentences.len() <= 2 {
            Vec::new()
        } else {
            sentences.chunks(2).map(join_sentences).collect()
        }
    };

    if pieces.is_empty() {
        vec![paragraph]
    } else {
        pieces
    }
}

fn join_sentences(sentences: &[&str]) -> String {
    let mut chunk = sentences.join(". ");
    if !chunk.ends_with('.') {
        chunk.push('.');
    }
    chunk
}
