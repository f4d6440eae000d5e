//! Caller-facing transformation requirements: resize, crop and rotate.
//!
//! Requirements describe *what* the output should look like. The decision
//! layer turns them into a concrete plan for a given input.

mod crop;
mod resize;
mod rotate;

use thiserror::Error;

use crate::geometry::{GeometryError, Ratio, Size};

pub use crop::{AbsoluteCrop, CropRegion, CropRequirement, RelativeCrop};
pub use resize::{ResizeMode, ResizeRequirement};
pub use rotate::RotateRequirement;

/// Errors raised while validating or transforming requirements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequirementError {
    /// Crop edges are inverted, empty, or outside `0..=1` for relative crops.
    #[error("Invalid crop values: {values}")]
    InvalidCropValues { values: String },

    /// The crop does not fit into the image it is applied to.
    #[error("Crop {crop} exceeds image bounds {size}")]
    CropOutOfBounds { crop: String, size: Size },

    /// The crop resolves to zero pixels on the image it is applied to.
    #[error("Crop {crop} is empty on image {size}")]
    EmptyCrop { crop: String, size: Size },

    /// Crops only follow plain rotations by multiples of 90 degrees.
    #[error("Crop cannot be rotated with requirement {rotation}")]
    CropCannotRotate { rotation: String },

    /// Scaling a crop by a zero ratio.
    #[error("Invalid ratio {ratio}")]
    InvalidRatio { ratio: Ratio },

    /// A resize target with a zero dimension.
    #[error("Resize target {size} is empty")]
    EmptyResizeTarget { size: Size },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl RequirementError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            RequirementError::InvalidCropValues { .. } => "crop_requirement_invalid_values",
            RequirementError::CropOutOfBounds { .. } => "crop_requirement_out_of_bounds",
            RequirementError::EmptyCrop { .. } => "crop_requirement_empty",
            RequirementError::CropCannotRotate { .. } => {
                "crop_requirement_cannot_rotate_with_requirement"
            }
            RequirementError::InvalidRatio { .. } => "requirement_invalid_ratio",
            RequirementError::EmptyResizeTarget { .. } => "resize_requirement_empty_target",
            RequirementError::Geometry(inner) => inner.code(),
        }
    }
}
