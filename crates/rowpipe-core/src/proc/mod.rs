//! Streaming scanline processing blocks.
//!
//! Every block follows the same push/pull contract:
//!
//! - [`Block::consume`] takes ownership of the next input row, top to bottom.
//!   The row's pixel specification and width must match what the block was
//!   built for; a mismatch is a programming error and panics.
//! - [`Block::produce`] returns the next output row, or `None` when either
//!   more input is needed or the output is exhausted. It may be called any
//!   number of times.
//!
//! Cropping, bicubic scaling and conversion stream rows through as soon as
//! they have enough input. Rotation and Magic Kernel scaling hold the whole
//! frame before emitting anything.
//!
//! Construction is the only fallible step: each block validates its sizes
//! and specifications up front and reports a [`BlockError`].

mod conversion;
mod crop;
mod rotation;
mod rows;
mod scaling;

pub use conversion::{ConversionBlock, ScanlineConverter};
pub use crop::CroppingBlock;
pub use rotation::RotationBlock;
pub use scaling::ScalingBlock;

use thiserror::Error;

use crate::geometry::{Rect, Size};
use crate::pixel::{PixelSpecification, Scanline};

/// Errors raised while constructing a processing block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("Input size {size} has no pixels")]
    EmptyInput { size: Size },

    #[error("Crop rectangle {rect} has no pixels")]
    EmptyCrop { rect: Rect },

    #[error("Crop rectangle {rect} exceeds input size {size}")]
    CropOutOfBounds { rect: Rect, size: Size },

    #[error("Rotation block requires an orientation other than up")]
    IdentityRotation,

    #[error("Cannot scale {input} to empty size {output}")]
    EmptyScalingSize { input: Size, output: Size },

    #[error("Cannot convert scanline from [{input}] to [{output}]")]
    UnsupportedConversion { input: String, output: String },

    #[error("Premultiplied alpha is not supported: [{specification}]")]
    PremultipliedAlpha { specification: String },
}

impl BlockError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            BlockError::EmptyInput { .. } => "block_input_size_empty",
            BlockError::EmptyCrop { .. } => "crop_block_rect_empty",
            BlockError::CropOutOfBounds { .. } => "crop_block_rect_out_of_bounds",
            BlockError::IdentityRotation => "rotation_block_identity_orientation",
            BlockError::EmptyScalingSize { .. } => "scaling_block_empty_output_size",
            BlockError::UnsupportedConversion { .. } => {
                "cannot_convert_scanline_between_specifications"
            }
            BlockError::PremultipliedAlpha { .. } => {
                "scanline_conversion_unsupported_premultiplied_alpha"
            }
        }
    }
}

/// A processing block in a scanline pipeline.
#[derive(Debug)]
pub enum Block {
    Cropping(CroppingBlock),
    Rotation(RotationBlock),
    Scaling(ScalingBlock),
    Conversion(ConversionBlock),
}

impl Block {
    /// Hand the next input row to the block.
    ///
    /// # Panics
    ///
    /// Panics if the row does not match the block's input specification or
    /// width, or if more rows are pushed than the input height.
    pub fn consume(&mut self, scanline: Scanline) {
        match self {
            Block::Cropping(block) => block.consume(scanline),
            Block::Rotation(block) => block.consume(scanline),
            Block::Scaling(block) => block.consume(scanline),
            Block::Conversion(block) => block.consume(scanline),
        }
    }

    /// The next output row, if one is ready.
    pub fn produce(&mut self) -> Option<Scanline> {
        match self {
            Block::Cropping(block) => block.produce(),
            Block::Rotation(block) => block.produce(),
            Block::Scaling(block) => block.produce(),
            Block::Conversion(block) => block.produce(),
        }
    }

    /// Rows currently held by the block.
    pub fn buffered_rows(&self) -> usize {
        match self {
            Block::Cropping(block) => block.buffered_rows(),
            Block::Rotation(block) => block.buffered_rows(),
            Block::Scaling(block) => block.buffered_rows(),
            Block::Conversion(block) => block.buffered_rows(),
        }
    }

    pub fn output_size(&self) -> Size {
        match self {
            Block::Cropping(block) => block.output_size(),
            Block::Rotation(block) => block.output_size(),
            Block::Scaling(block) => block.output_size(),
            Block::Conversion(block) => block.output_size(),
        }
    }

    pub fn output_specification(&self) -> PixelSpecification {
        match self {
            Block::Cropping(block) => block.specification(),
            Block::Rotation(block) => block.specification(),
            Block::Scaling(block) => block.specification(),
            Block::Conversion(block) => block.output_specification(),
        }
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Block::Cropping(_) => "cropping",
            Block::Rotation(_) => "rotation",
            Block::Scaling(_) => "scaling",
            Block::Conversion(_) => "conversion",
        }
    }
}

impl From<CroppingBlock> for Block {
    fn from(block: CroppingBlock) -> Self {
        Block::Cropping(block)
    }
}

impl From<RotationBlock> for Block {
    fn from(block: RotationBlock) -> Self {
        Block::Rotation(block)
    }
}

impl From<ScalingBlock> for Block {
    fn from(block: ScalingBlock) -> Self {
        Block::Scaling(block)
    }
}

impl From<ConversionBlock> for Block {
    fn from(block: ConversionBlock) -> Self {
        Block::Conversion(block)
    }
}

/// Panic unless `scanline` matches a block's input contract.
#[inline]
pub(crate) fn assert_input(scanline: &Scanline, specification: PixelSpecification, width: u32) {
    assert_eq!(
        scanline.specification(),
        specification,
        "scanline specification does not match block input"
    );
    assert_eq!(scanline.width(), width, "scanline width does not match block input");
}
