use tracing::debug;

use super::rows::RowStore;
use super::{assert_input, BlockError};
use crate::geometry::Size;
use crate::orientation::Orientation;
use crate::pixel::{PixelSpecification, Scanline};

/// Applies one of the seven non-identity orientations to a whole frame.
///
/// No output is produced until every input row has arrived. Input rows are
/// released after the last output row is handed out.
#[derive(Debug)]
pub struct RotationBlock {
    specification: PixelSpecification,
    input_size: Size,
    output_size: Size,
    orientation: Orientation,
    rows: RowStore,
    next_output_row: u32,
}

impl RotationBlock {
    /// # Errors
    ///
    /// Returns `BlockError::IdentityRotation` for `Orientation::Up` and
    /// `BlockError::EmptyInput` for a zero-area input.
    pub fn new(
        specification: PixelSpecification,
        input_size: Size,
        orientation: Orientation,
    ) -> Result<Self, BlockError> {
        if orientation == Orientation::Up {
            return Err(BlockError::IdentityRotation);
        }
        if input_size.is_empty() {
            return Err(BlockError::EmptyInput { size: input_size });
        }
        let output_size = input_size.oriented(orientation);
        debug!(input = %input_size, output = %output_size, %orientation, "rotation block");
        Ok(Self {
            specification,
            input_size,
            output_size,
            orientation,
            rows: RowStore::with_height(input_size.height),
            next_output_row: 0,
        })
    }

    pub fn consume(&mut self, scanline: Scanline) {
        assert_input(&scanline, self.specification, self.input_size.width);
        self.rows.push(scanline);
    }

    pub fn produce(&mut self) -> Option<Scanline> {
        if !self.rows.is_complete() || self.next_output_row >= self.output_size.height {
            return None;
        }

        let row = self.next_output_row;
        let mut output = Scanline::new(self.specification, self.output_size.width);
        for x in 0..self.output_size.width {
            let (source_row, source_column) = self.source(row, x);
            output.copy_pixel_from(self.rows.get(source_row), source_column, x);
        }

        self.next_output_row += 1;
        if self.next_output_row == self.output_size.height {
            self.rows.retire_all();
        }
        Some(output)
    }

    /// Input `(row, column)` feeding output row `row`, column `x`.
    #[inline]
    fn source(&self, row: u32, x: u32) -> (u32, u32) {
        let last_column = self.input_size.width - 1;
        let last_row = self.input_size.height - 1;
        match self.orientation {
            Orientation::Up => (row, x),
            Orientation::UpMirrored => (row, last_column - x),
            Orientation::Right => (last_row - x, row),
            Orientation::RightMirrored => (last_row - x, last_column - row),
            Orientation::Bottom => (last_row - row, last_column - x),
            Orientation::BottomMirrored => (last_row - row, x),
            Orientation::Left => (x, last_column - row),
            Orientation::LeftMirrored => (x, row),
        }
    }

    pub fn buffered_rows(&self) -> usize {
        self.rows.buffered()
    }

    pub fn peak_buffered_rows(&self) -> usize {
        self.rows.peak()
    }

    pub fn specification(&self) -> PixelSpecification {
        self.specification
    }

    pub fn output_size(&self) -> Size {
        self.output_size
    }
}
