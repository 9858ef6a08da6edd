use std::io;
use std::path::Path;

use tokenizers::{Tokenizer, TruncationParams};

/// Loads `tokenizer.json` from a model directory with truncation at `max_len` tokens.
///
/// Reference answers can run to several paragraphs; anything past the encoder's
/// position limit is cut rather than rejected.
pub fn load_tokenizer(model_dir: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let path = if model_dir.is_dir() {
        model_dir.join("tokenizer.json")
    } else {
        model_dir.to_path_buf()
    };

    let mut tokenizer = Tokenizer::from_file(&path).map_err(io::Error::other)?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            ..Default::default()
        }))
        .map_err(|e| io::Error::other(format!("failed to configure truncation: {}", e)))?;
    tokenizer.with_padding(None);

    Ok(tokenizer)
}
