use std::collections::VecDeque;

use tracing::debug;

use super::{assert_input, BlockError};
use crate::geometry::{Rect, Size};
use crate::pixel::{PixelSpecification, Scanline};

/// Keeps the rows and columns inside a target rectangle.
///
/// Rows above the target are dropped on arrival. Rows inside it are trimmed
/// to the target width, or moved through untouched when the target spans
/// the full input width.
#[derive(Debug)]
pub struct CroppingBlock {
    specification: PixelSpecification,
    input_size: Size,
    target: Rect,
    next_input_row: u32,
    output: VecDeque<Scanline>,
}

impl CroppingBlock {
    /// # Errors
    ///
    /// Returns `BlockError::EmptyInput` or `BlockError::EmptyCrop` for zero
    /// areas and `BlockError::CropOutOfBounds` when `target` extends past
    /// `input_size`.
    pub fn new(
        specification: PixelSpecification,
        input_size: Size,
        target: Rect,
    ) -> Result<Self, BlockError> {
        if input_size.is_empty() {
            return Err(BlockError::EmptyInput { size: input_size });
        }
        if target.size.is_empty() {
            return Err(BlockError::EmptyCrop { rect: target });
        }
        if target.max_x() > input_size.width || target.max_y() > input_size.height {
            return Err(BlockError::CropOutOfBounds {
                rect: target,
                size: input_size,
            });
        }
        debug!(input = %input_size, target = %target, "cropping block");
        Ok(Self {
            specification,
            input_size,
            target,
            next_input_row: 0,
            output: VecDeque::with_capacity(1),
        })
    }

    pub fn consume(&mut self, scanline: Scanline) {
        assert_input(&scanline, self.specification, self.input_size.width);
        assert!(
            self.next_input_row < self.input_size.height,
            "cropping block received more than {} rows",
            self.input_size.height
        );
        let row = self.next_input_row;
        self.next_input_row += 1;

        if row < self.target.min_y() || row >= self.target.max_y() {
            return;
        }

        if self.target.size.width == self.input_size.width {
            self.output.push_back(scanline);
            return;
        }

        let bpp = scanline.bytes_per_pixel();
        let start = self.target.min_x() as usize * bpp;
        let end = self.target.max_x() as usize * bpp;
        let mut cropped = Scanline::new(self.specification, self.target.size.width);
        cropped
            .data_mut()
            .copy_from_slice(&scanline.data()[start..end]);
        self.output.push_back(cropped);
    }

    pub fn produce(&mut self) -> Option<Scanline> {
        self.output.pop_front()
    }

    pub fn buffered_rows(&self) -> usize {
        self.output.len()
    }

    pub fn specification(&self) -> PixelSpecification {
        self.specification
    }

    pub fn output_size(&self) -> Size {
        self.target.size
    }
}
