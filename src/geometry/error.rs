use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("cannot open sheet image at {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot decode sheet image: {source}")]
    ImageDecode {
        #[source]
        source: image::ImageError,
    },

    #[error("sheet image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("invalid geometry configuration: {reason}")]
    InvalidConfig { reason: String },
}
