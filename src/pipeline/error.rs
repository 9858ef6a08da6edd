use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::ocr::OcrError;
use crate::segmentation::SegmentationError;
use crate::valuation::ValuationError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("page {page}: {source}")]
    Page {
        page: usize,
        #[source]
        source: SegmentationError,
    },

    #[error("page {page}: {source}")]
    Recognition {
        page: usize,
        #[source]
        source: OcrError,
    },

    #[error("submission has no pages")]
    NoPages,

    #[error(transparent)]
    Segmentation(#[from] SegmentationError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}
