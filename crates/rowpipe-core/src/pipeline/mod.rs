//! Pipeline composition: sources, sinks, plans and the pump that drives
//! scanlines through a chain of blocks.
//!
//! # Architecture
//!
//! ```text
//! ScanlineSource -> [Cropping] -> [Scaling] -> [Rotation] -> converter -> ScanlineSink
//! ```
//!
//! A [`TransformPlan`] picks the blocks from a [`ResizeDecision`] and an
//! [`OrientationDecision`]; a [`ScanlinePump`] then pulls every input row
//! and pushes it down the chain. Everything runs on the calling thread.
//!
//! [`ResizeDecision`]: crate::decision::ResizeDecision
//! [`OrientationDecision`]: crate::decision::OrientationDecision

mod image_io;
mod plan;
mod pump;

pub use image_io::{ImageBufferSink, ImageBufferSource};
pub use plan::TransformPlan;
pub use pump::ScanlinePump;

use thiserror::Error;

use crate::geometry::{GeometryError, Size};
use crate::pixel::{Scanline, ScanlineError};
use crate::proc::BlockError;
use crate::requirements::RequirementError;

/// Errors that abort a transform operation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Requirement(#[from] RequirementError),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Scanline(#[from] ScanlineError),

    /// The in-memory image could not be decoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// No candidate could satisfy the requirements for this input.
    #[error("No valid resize plan for input {input}")]
    InvalidDecision { input: Size },

    #[error("Sink rejected scanline: {reason}")]
    SinkRejected { reason: String },

    #[error("Source ended after {received} of {expected} scanlines")]
    SourceUnderrun { expected: u32, received: u32 },
}

impl PipelineError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Geometry(err) => err.code(),
            PipelineError::Requirement(err) => err.code(),
            PipelineError::Block(err) => err.code(),
            PipelineError::Scanline(err) => err.code(),
            PipelineError::Image(_) => "image_decoding_failed",
            PipelineError::InvalidDecision { .. } => "resize_decision_invalid",
            PipelineError::SinkRejected { .. } => "sink_rejected_scanline",
            PipelineError::SourceUnderrun { .. } => "source_ended_early",
        }
    }
}

/// Produces the input rows of a frame, top to bottom.
pub trait ScanlineSource {
    /// The next row, or `None` once the frame is exhausted.
    fn read_scanline(&mut self) -> Result<Option<Scanline>, PipelineError>;
}

/// Accepts the output rows of a frame, top to bottom.
pub trait ScanlineSink {
    fn write_scanline(&mut self, scanline: Scanline) -> Result<(), PipelineError>;
}

impl<I> ScanlineSource for I
where
    I: Iterator<Item = Scanline>,
{
    fn read_scanline(&mut self) -> Result<Option<Scanline>, PipelineError> {
        Ok(self.next())
    }
}

impl ScanlineSink for Vec<Scanline> {
    fn write_scanline(&mut self, scanline: Scanline) -> Result<(), PipelineError> {
        self.push(scanline);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    #[test]
    fn test_error_codes_delegate() {
        let err = PipelineError::from(BlockError::IdentityRotation);
        assert_eq!(err.code(), "rotation_block_identity_orientation");

        let err = PipelineError::from(GeometryError::Overflow { value: 1e20 });
        assert_eq!(err.code(), "numeric_conversion_overflow");

        let err = PipelineError::from(BlockError::EmptyInput {
            size: Size::new(0, 0),
        });
        assert_eq!(err.to_string(), "Input size 0x0 has no pixels");
    }

    #[test]
    fn test_underrun_message() {
        let err = PipelineError::SourceUnderrun {
            expected: 4,
            received: 2,
        };
        assert_eq!(err.code(), "source_ended_early");
        assert_eq!(err.to_string(), "Source ended after 2 of 4 scanlines");
    }
}
