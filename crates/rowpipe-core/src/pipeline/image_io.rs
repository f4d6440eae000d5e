//! Adapters between `image` crate buffers and scanline streams.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageError, ImageReader, RgbImage, RgbaImage};
use tracing::debug;

use super::{PipelineError, ScanlineSink, ScanlineSource};
use crate::geometry::Size;
use crate::pixel::{PixelSpecification, Scanline};

/// Reads rows out of a decoded image buffer.
#[derive(Debug, Clone)]
pub struct ImageBufferSource {
    specification: PixelSpecification,
    size: Size,
    pixels: Vec<u8>,
    next_row: u32,
}

impl ImageBufferSource {
    fn from_raw(
        specification: PixelSpecification,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Self {
        Self {
            specification,
            size: Size::new(width, height),
            pixels,
            next_row: 0,
        }
    }

    pub fn from_gray(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_raw(PixelSpecification::GRAY, width, height, image.into_raw())
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_raw(PixelSpecification::RGB, width, height, image.into_raw())
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_raw(PixelSpecification::RGBA, width, height, image.into_raw())
    }

    /// Gray, gray-alpha, RGB and RGBA buffers are kept as they are; any
    /// other layout is converted to RGBA first.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(image) => Self::from_gray(image),
            DynamicImage::ImageLumaA8(image) => {
                let (width, height) = image.dimensions();
                Self::from_raw(PixelSpecification::GRAY_A, width, height, image.into_raw())
            }
            DynamicImage::ImageRgb8(image) => Self::from_rgb(image),
            DynamicImage::ImageRgba8(image) => Self::from_rgba(image),
            other => Self::from_rgba(other.into_rgba8()),
        }
    }

    /// Decode an encoded image held in memory.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Image` if the format cannot be guessed or the
    /// data is corrupt.
    pub fn decode(bytes: &[u8]) -> Result<Self, PipelineError> {
        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(ImageError::IoError)?
            .decode()?;
        let source = Self::from_dynamic(image);
        debug!(
            size = %source.size,
            specification = %source.specification,
            "decoded source image"
        );
        Ok(source)
    }

    pub fn specification(&self) -> PixelSpecification {
        self.specification
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

impl ScanlineSource for ImageBufferSource {
    fn read_scanline(&mut self) -> Result<Option<Scanline>, PipelineError> {
        if self.next_row >= self.size.height {
            return Ok(None);
        }
        let pitch = self.size.width as usize * self.specification.bytes_per_pixel as usize;
        let start = self.next_row as usize * pitch;
        let data = self.pixels[start..start + pitch].to_vec();
        self.next_row += 1;
        Ok(Some(Scanline::from_bytes(
            self.specification,
            self.size.width,
            data,
        )?))
    }
}

/// Collects rows into a contiguous buffer that can become an image.
#[derive(Debug, Clone)]
pub struct ImageBufferSink {
    specification: PixelSpecification,
    size: Size,
    pixels: Vec<u8>,
    rows: u32,
}

impl ImageBufferSink {
    pub fn new(specification: PixelSpecification, size: Size) -> Self {
        let capacity =
            size.width as usize * size.height as usize * specification.bytes_per_pixel as usize;
        Self {
            specification,
            size,
            pixels: Vec::with_capacity(capacity),
            rows: 0,
        }
    }

    pub fn specification(&self) -> PixelSpecification {
        self.specification
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn rows_written(&self) -> u32 {
        self.rows
    }

    pub fn is_complete(&self) -> bool {
        self.rows == self.size.height
    }

    /// Raw pixel bytes written so far, row after row.
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    /// `None` unless the sink is complete and holds gray pixels.
    pub fn into_gray_image(self) -> Option<GrayImage> {
        if self.specification != PixelSpecification::GRAY || !self.is_complete() {
            return None;
        }
        GrayImage::from_raw(self.size.width, self.size.height, self.pixels)
    }

    /// `None` unless the sink is complete and holds RGB pixels.
    pub fn into_rgb_image(self) -> Option<RgbImage> {
        if self.specification != PixelSpecification::RGB || !self.is_complete() {
            return None;
        }
        RgbImage::from_raw(self.size.width, self.size.height, self.pixels)
    }

    /// `None` unless the sink is complete and holds RGBA pixels.
    pub fn into_rgba_image(self) -> Option<RgbaImage> {
        if self.specification != PixelSpecification::RGBA || !self.is_complete() {
            return None;
        }
        RgbaImage::from_raw(self.size.width, self.size.height, self.pixels)
    }

    pub fn into_dynamic(self) -> Option<DynamicImage> {
        match self.specification {
            PixelSpecification::GRAY => self.into_gray_image().map(DynamicImage::ImageLuma8),
            PixelSpecification::RGB => self.into_rgb_image().map(DynamicImage::ImageRgb8),
            PixelSpecification::RGBA => self.into_rgba_image().map(DynamicImage::ImageRgba8),
            _ => None,
        }
    }
}

impl ScanlineSink for ImageBufferSink {
    fn write_scanline(&mut self, scanline: Scanline) -> Result<(), PipelineError> {
        if scanline.specification() != self.specification {
            return Err(PipelineError::SinkRejected {
                reason: format!(
                    "expected [{}], got [{}]",
                    self.specification,
                    scanline.specification()
                ),
            });
        }
        if scanline.width() != self.size.width {
            return Err(PipelineError::SinkRejected {
                reason: format!(
                    "expected width {}, got {}",
                    self.size.width,
                    scanline.width()
                ),
            });
        }
        if self.is_complete() {
            return Err(PipelineError::SinkRejected {
                reason: format!("all {} rows already written", self.size.height),
            });
        }
        self.pixels.extend_from_slice(scanline.data());
        self.rows += 1;
        Ok(())
    }
}
