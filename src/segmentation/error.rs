use thiserror::Error;

use crate::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("sheet geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("invalid segmentation configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// A string that is neither `Q<n>`, `<n>` nor the unlabeled-continuation key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid answer label '{value}'")]
pub struct LabelParseError {
    pub value: String,
}
