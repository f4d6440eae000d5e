//! One row of pixels.

use thiserror::Error;

use super::PixelSpecification;

/// Errors raised when wrapping external bytes into a scanline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanlineError {
    /// The byte buffer does not hold exactly `width * bytes_per_pixel` bytes.
    #[error("Scanline buffer holds {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl ScanlineError {
    pub fn code(&self) -> &'static str {
        match self {
            ScanlineError::LengthMismatch { .. } => "scanline_length_mismatch",
        }
    }
}

/// An owned row of pixel bytes tagged with its pixel specification.
///
/// The buffer always holds exactly `width * bytes_per_pixel` bytes and the
/// specification never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanline {
    specification: PixelSpecification,
    width: u32,
    data: Vec<u8>,
}

impl Scanline {
    /// Create a zero-filled scanline.
    pub fn new(specification: PixelSpecification, width: u32) -> Self {
        let len = width as usize * specification.bytes_per_pixel as usize;
        Self {
            specification,
            width,
            data: vec![0; len],
        }
    }

    /// Wrap existing pixel bytes.
    ///
    /// # Errors
    ///
    /// Returns `ScanlineError::LengthMismatch` if `data` is not exactly
    /// `width * bytes_per_pixel` bytes long.
    pub fn from_bytes(
        specification: PixelSpecification,
        width: u32,
        data: Vec<u8>,
    ) -> Result<Self, ScanlineError> {
        let expected = width as usize * specification.bytes_per_pixel as usize;
        if data.len() != expected {
            return Err(ScanlineError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            specification,
            width,
            data,
        })
    }

    #[inline]
    pub fn specification(&self) -> PixelSpecification {
        self.specification
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.specification.bytes_per_pixel as usize
    }

    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The bytes of the pixel at column `x`.
    #[inline]
    pub fn pixel(&self, x: u32) -> &[u8] {
        let bpp = self.bytes_per_pixel();
        let start = x as usize * bpp;
        &self.data[start..start + bpp]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: u32) -> &mut [u8] {
        let bpp = self.bytes_per_pixel();
        let start = x as usize * bpp;
        &mut self.data[start..start + bpp]
    }

    /// Copy pixel `from` of `source` into pixel `to` of this scanline.
    ///
    /// Both scanlines must share the same pixel specification.
    #[inline]
    pub fn copy_pixel_from(&mut self, source: &Scanline, from: u32, to: u32) {
        debug_assert_eq!(self.specification, source.specification);
        self.pixel_mut(to).copy_from_slice(source.pixel(from));
    }
}
