//! Word stream produced by the OCR collaborator.
//!
//! Recognition itself is external. This module defines what the rest of the pipeline
//! consumes: words with pixel bounding boxes and the recognizer's break classification,
//! plus the [`OcrEngine`] seam used by [`crate::pipeline`].

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use error::OcrError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockOcrEngine;
pub use model::{BoundingBox, BreakKind, OcrPage, Word};

/// External recognizer: image bytes in, positioned words out.
///
/// Calls are blocking; a page waits for its recognition round trip before segmentation.
pub trait OcrEngine {
    fn recognize(&self, image: &[u8]) -> Result<OcrPage, OcrError>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for &T {
    fn recognize(&self, image: &[u8]) -> Result<OcrPage, OcrError> {
        (**self).recognize(image)
    }
}
