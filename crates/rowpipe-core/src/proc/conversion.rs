//! Pixel specification conversion.
//!
//! A [`ScanlineConverter`] is picked once per pair of specifications:
//!
//! - **Identity** when both specifications are equal (rows move through
//!   without a copy)
//! - **Direct** for the common Gray/RGB/RGBA/ARGB pairs
//! - **Mapped** for any other pair within the RGB and Gray families, driven
//!   by per-specification component index maps
//!
//! When the source carries alpha and the destination does not, pixels are
//! blended onto the configured background color. A destination alpha byte
//! with no source alpha is written as fully opaque.

use std::collections::VecDeque;

use tracing::debug;

use super::{assert_input, BlockError};
use crate::geometry::Size;
use crate::pixel::{Color, ColorModel, ComponentsOrder, PixelSpecification, Scanline};

/// Blend `component` over `background` with straight `alpha`.
#[inline]
fn blend(component: u8, alpha: u8, background: u8) -> u8 {
    match alpha {
        255 => component,
        0 => background,
        _ => {
            let a = alpha as f32 / 255.0;
            (component as f32 * a + background as f32 * (1.0 - a)) as u8
        }
    }
}

#[inline]
fn average(red: u8, green: u8, blue: u8) -> u8 {
    ((red as u16 + green as u16 + blue as u16) / 3) as u8
}

/// Converters with a fixed memory layout on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectConversion {
    GrayToRgb,
    GrayToRgba,
    GrayToArgb,
    RgbToGray,
    RgbToRgba,
    RgbToArgb,
    ArgbToRgba,
    RgbaToArgb,
    RgbaToRgb,
    ArgbToRgb,
    RgbaToGray,
    ArgbToGray,
}

impl DirectConversion {
    const TABLE: [(PixelSpecification, PixelSpecification, DirectConversion); 12] = [
        (PixelSpecification::GRAY, PixelSpecification::RGB, DirectConversion::GrayToRgb),
        (PixelSpecification::GRAY, PixelSpecification::RGBA, DirectConversion::GrayToRgba),
        (PixelSpecification::GRAY, PixelSpecification::ARGB, DirectConversion::GrayToArgb),
        (PixelSpecification::RGB, PixelSpecification::GRAY, DirectConversion::RgbToGray),
        (PixelSpecification::RGB, PixelSpecification::RGBA, DirectConversion::RgbToRgba),
        (PixelSpecification::RGB, PixelSpecification::ARGB, DirectConversion::RgbToArgb),
        (PixelSpecification::ARGB, PixelSpecification::RGBA, DirectConversion::ArgbToRgba),
        (PixelSpecification::RGBA, PixelSpecification::ARGB, DirectConversion::RgbaToArgb),
        (PixelSpecification::RGBA, PixelSpecification::RGB, DirectConversion::RgbaToRgb),
        (PixelSpecification::ARGB, PixelSpecification::RGB, DirectConversion::ArgbToRgb),
        (PixelSpecification::RGBA, PixelSpecification::GRAY, DirectConversion::RgbaToGray),
        (PixelSpecification::ARGB, PixelSpecification::GRAY, DirectConversion::ArgbToGray),
    ];

    fn find(input: PixelSpecification, output: PixelSpecification) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(from, to, _)| *from == input && *to == output)
            .map(|(_, _, conversion)| *conversion)
    }

    fn convert_pixel(self, src: &[u8], dst: &mut [u8], bg: Color) {
        use DirectConversion::*;
        match self {
            GrayToRgb => dst.copy_from_slice(&[src[0], src[0], src[0]]),
            GrayToRgba => dst.copy_from_slice(&[src[0], src[0], src[0], 255]),
            GrayToArgb => dst.copy_from_slice(&[255, src[0], src[0], src[0]]),
            RgbToGray => dst[0] = average(src[0], src[1], src[2]),
            RgbToRgba => dst.copy_from_slice(&[src[0], src[1], src[2], 255]),
            RgbToArgb => dst.copy_from_slice(&[255, src[0], src[1], src[2]]),
            ArgbToRgba => dst.copy_from_slice(&[src[1], src[2], src[3], src[0]]),
            RgbaToArgb => dst.copy_from_slice(&[src[3], src[0], src[1], src[2]]),
            RgbaToRgb => dst.copy_from_slice(&[
                blend(src[0], src[3], bg.red),
                blend(src[1], src[3], bg.green),
                blend(src[2], src[3], bg.blue),
            ]),
            ArgbToRgb => dst.copy_from_slice(&[
                blend(src[1], src[0], bg.red),
                blend(src[2], src[0], bg.green),
                blend(src[3], src[0], bg.blue),
            ]),
            RgbaToGray => {
                dst[0] = average(
                    blend(src[0], src[3], bg.red),
                    blend(src[1], src[3], bg.green),
                    blend(src[2], src[3], bg.blue),
                )
            }
            ArgbToGray => {
                dst[0] = average(
                    blend(src[1], src[0], bg.red),
                    blend(src[2], src[0], bg.green),
                    blend(src[3], src[0], bg.blue),
                )
            }
        }
    }
}

/// Where each component lives inside one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComponentMap {
    Gray { gray: usize },
    Rgb { red: usize, green: usize, blue: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelLayout {
    components: ComponentMap,
    /// Index of the alpha or padding byte.
    alpha: Option<usize>,
    /// Whether the alpha byte carries transparency.
    interprets_alpha: bool,
}

impl PixelLayout {
    fn for_specification(specification: PixelSpecification) -> Option<Self> {
        let has_alpha = specification.has_alpha();
        let leading = specification.is_alpha_leading_component();
        let shift = usize::from(has_alpha && leading);

        let (components, alpha_index) = match specification.color_model {
            ColorModel::Gray => (ComponentMap::Gray { gray: shift }, if leading { 0 } else { 1 }),
            ColorModel::Rgb => {
                let (red, blue) = match specification.components_order {
                    ComponentsOrder::Natural => (0, 2),
                    ComponentsOrder::Reversed => (2, 0),
                };
                (
                    ComponentMap::Rgb {
                        red: red + shift,
                        green: 1 + shift,
                        blue: blue + shift,
                    },
                    if leading { 0 } else { 3 },
                )
            }
            _ => return None,
        };

        let expected = specification.number_of_components();
        if specification.bytes_per_pixel != expected {
            return None;
        }

        Some(Self {
            components,
            alpha: has_alpha.then_some(alpha_index),
            interprets_alpha: has_alpha && specification.alpha_info.should_interpret_alpha(),
        })
    }
}

/// Conversion through component index maps for arbitrary RGB and Gray
/// family layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MappedConversion {
    input: PixelLayout,
    output: PixelLayout,
}

impl MappedConversion {
    fn convert_pixel(&self, src: &[u8], dst: &mut [u8], bg: Color) {
        let alpha = self
            .input
            .alpha
            .filter(|_| self.input.interprets_alpha)
            .map(|index| src[index]);
        let flatten = alpha.filter(|_| !self.output.interprets_alpha);

        let (red, green, blue) = match self.input.components {
            ComponentMap::Gray { gray } => {
                let value = match flatten {
                    Some(a) => blend(src[gray], a, bg.gray()),
                    None => src[gray],
                };
                (value, value, value)
            }
            ComponentMap::Rgb { red, green, blue } => match flatten {
                Some(a) => (
                    blend(src[red], a, bg.red),
                    blend(src[green], a, bg.green),
                    blend(src[blue], a, bg.blue),
                ),
                None => (src[red], src[green], src[blue]),
            },
        };

        match self.output.components {
            ComponentMap::Gray { gray } => dst[gray] = average(red, green, blue),
            ComponentMap::Rgb {
                red: r,
                green: g,
                blue: b,
            } => {
                dst[r] = red;
                dst[g] = green;
                dst[b] = blue;
            }
        }
        if let Some(index) = self.output.alpha {
            dst[index] = alpha.unwrap_or(255);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Identity,
    Direct(DirectConversion),
    Mapped(MappedConversion),
}

/// Converts scanlines from one pixel specification to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanlineConverter {
    input: PixelSpecification,
    output: PixelSpecification,
    background: Color,
    strategy: Strategy,
}

impl ScanlineConverter {
    /// Pick the conversion strategy for `input` to `output`.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::PremultipliedAlpha` when either side uses
    /// premultiplied alpha outside the direct table, and
    /// `BlockError::UnsupportedConversion` when no path exists.
    pub fn new(
        input: PixelSpecification,
        output: PixelSpecification,
        background: Color,
    ) -> Result<Self, BlockError> {
        let strategy = if input == output {
            Strategy::Identity
        } else if let Some(direct) = DirectConversion::find(input, output) {
            Strategy::Direct(direct)
        } else {
            for specification in [input, output] {
                if specification.alpha_info.is_premultiplied() {
                    return Err(BlockError::PremultipliedAlpha {
                        specification: specification.to_string(),
                    });
                }
            }
            let unsupported = || BlockError::UnsupportedConversion {
                input: input.to_string(),
                output: output.to_string(),
            };
            Strategy::Mapped(MappedConversion {
                input: PixelLayout::for_specification(input).ok_or_else(unsupported)?,
                output: PixelLayout::for_specification(output).ok_or_else(unsupported)?,
            })
        };

        debug!(input = %input, output = %output, strategy = strategy.name(), "scanline converter");
        Ok(Self {
            input,
            output,
            background,
            strategy,
        })
    }

    pub fn input_specification(&self) -> PixelSpecification {
        self.input
    }

    pub fn output_specification(&self) -> PixelSpecification {
        self.output
    }

    pub fn is_identity(&self) -> bool {
        self.strategy == Strategy::Identity
    }

    /// Convert one scanline.
    ///
    /// # Panics
    ///
    /// Panics if `scanline` is not in the converter's input specification.
    pub fn convert(&self, scanline: Scanline) -> Scanline {
        assert_eq!(
            scanline.specification(),
            self.input,
            "scanline specification does not match converter input"
        );
        if self.strategy == Strategy::Identity {
            return scanline;
        }

        let src_bpp = scanline.bytes_per_pixel();
        let dst_bpp = self.output.bytes_per_pixel as usize;
        let mut output = Scanline::new(self.output, scanline.width());
        let pixels = scanline
            .data()
            .chunks_exact(src_bpp)
            .zip(output.data_mut().chunks_exact_mut(dst_bpp));

        match &self.strategy {
            Strategy::Identity => {}
            Strategy::Direct(direct) => {
                for (src, dst) in pixels {
                    direct.convert_pixel(src, dst, self.background);
                }
            }
            Strategy::Mapped(mapped) => {
                for (src, dst) in pixels {
                    mapped.convert_pixel(src, dst, self.background);
                }
            }
        }
        output
    }
}

impl Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Identity => "identity",
            Strategy::Direct(_) => "direct",
            Strategy::Mapped(_) => "mapped",
        }
    }
}

/// A [`ScanlineConverter`] wrapped as a streaming block.
#[derive(Debug)]
pub struct ConversionBlock {
    converter: ScanlineConverter,
    size: Size,
    received: u32,
    output: VecDeque<Scanline>,
}

impl ConversionBlock {
    /// # Errors
    ///
    /// Returns `BlockError::EmptyInput` for a zero-area frame and any error
    /// from [`ScanlineConverter::new`].
    pub fn new(
        input: PixelSpecification,
        output: PixelSpecification,
        size: Size,
        background: Color,
    ) -> Result<Self, BlockError> {
        if size.is_empty() {
            return Err(BlockError::EmptyInput { size });
        }
        Ok(Self {
            converter: ScanlineConverter::new(input, output, background)?,
            size,
            received: 0,
            output: VecDeque::with_capacity(1),
        })
    }

    pub fn consume(&mut self, scanline: Scanline) {
        assert_input(&scanline, self.converter.input, self.size.width);
        assert!(
            self.received < self.size.height,
            "conversion block received more than {} rows",
            self.size.height
        );
        self.received += 1;
        self.output.push_back(self.converter.convert(scanline));
    }

    pub fn produce(&mut self) -> Option<Scanline> {
        self.output.pop_front()
    }

    pub fn buffered_rows(&self) -> usize {
        self.output.len()
    }

    pub fn output_specification(&self) -> PixelSpecification {
        self.converter.output
    }

    pub fn output_size(&self) -> Size {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::AlphaInfo;

    fn convert(input: PixelSpecification, output: PixelSpecification, data: Vec<u8>) -> Vec<u8> {
        convert_over(input, output, data, Color::WHITE)
    }

    fn convert_over(
        input: PixelSpecification,
        output: PixelSpecification,
        data: Vec<u8>,
        background: Color,
    ) -> Vec<u8> {
        let width = (data.len() / input.bytes_per_pixel as usize) as u32;
        let converter = ScanlineConverter::new(input, output, background).unwrap();
        converter
            .convert(Scanline::from_bytes(input, width, data).unwrap())
            .into_bytes()
    }

    #[test]
    fn test_identity_moves_without_copy() {
        let converter =
            ScanlineConverter::new(PixelSpecification::RGB, PixelSpecification::RGB, Color::WHITE)
                .unwrap();
        assert!(converter.is_identity());
        let row = Scanline::from_bytes(PixelSpecification::RGB, 1, vec![1, 2, 3]).unwrap();
        let pointer = row.data().as_ptr();
        assert_eq!(converter.convert(row).data().as_ptr(), pointer);
    }

    #[test]
    fn test_direct_conversions() {
        use PixelSpecification as P;
        assert_eq!(convert(P::GRAY, P::RGB, vec![7, 9]), vec![7, 7, 7, 9, 9, 9]);
        assert_eq!(convert(P::GRAY, P::RGBA, vec![7]), vec![7, 7, 7, 255]);
        assert_eq!(convert(P::GRAY, P::ARGB, vec![7]), vec![255, 7, 7, 7]);
        assert_eq!(convert(P::RGB, P::GRAY, vec![10, 20, 31]), vec![20]);
        assert_eq!(convert(P::RGB, P::RGBA, vec![1, 2, 3]), vec![1, 2, 3, 255]);
        assert_eq!(convert(P::RGB, P::ARGB, vec![1, 2, 3]), vec![255, 1, 2, 3]);
        assert_eq!(convert(P::ARGB, P::RGBA, vec![4, 1, 2, 3]), vec![1, 2, 3, 4]);
        assert_eq!(convert(P::RGBA, P::ARGB, vec![1, 2, 3, 4]), vec![4, 1, 2, 3]);
    }

    #[test]
    fn test_removing_alpha_blends_background() {
        use PixelSpecification as P;
        assert_eq!(convert(P::RGBA, P::RGB, vec![10, 20, 30, 255]), vec![10, 20, 30]);
        assert_eq!(convert(P::RGBA, P::RGB, vec![10, 20, 30, 0]), vec![255, 255, 255]);
        assert_eq!(
            convert_over(P::ARGB, P::RGB, vec![0, 10, 20, 30], Color::new(1, 2, 3)),
            vec![1, 2, 3]
        );
        assert_eq!(convert_over(P::RGBA, P::GRAY, vec![90, 90, 90, 0], Color::BLACK), vec![0]);
        assert_eq!(convert(P::ARGB, P::GRAY, vec![255, 30, 60, 90]), vec![60]);
    }

    #[test]
    fn test_half_alpha_blend_truncates() {
        // 200 * (128/255) = 100.39
        assert_eq!(blend(200, 128, 0), 100);
        assert_eq!(blend(100, 51, 0), 20);
    }

    #[test]
    fn test_mapped_reversed_orders() {
        use PixelSpecification as P;
        assert_eq!(convert(P::RGB, P::BGR, vec![1, 2, 3]), vec![3, 2, 1]);
        assert_eq!(convert(P::RGBA, P::BGRA, vec![1, 2, 3, 4]), vec![3, 2, 1, 4]);
        assert_eq!(convert(P::RGBA, P::ABGR, vec![1, 2, 3, 4]), vec![4, 3, 2, 1]);
        assert_eq!(convert(P::BGR, P::RGBA, vec![3, 2, 1]), vec![1, 2, 3, 255]);
    }

    #[test]
    fn test_mapped_padding_bytes() {
        use PixelSpecification as P;
        assert_eq!(convert(P::RGBX, P::RGB, vec![1, 2, 3, 0]), vec![1, 2, 3]);
        assert_eq!(convert(P::RGB, P::XRGB, vec![1, 2, 3]), vec![255, 1, 2, 3]);
        assert_eq!(convert(P::XBGR, P::RGBA, vec![9, 3, 2, 1]), vec![1, 2, 3, 255]);
    }

    #[test]
    fn test_mapped_gray_family() {
        use PixelSpecification as P;
        assert_eq!(convert(P::GRAY_A, P::A_GRAY, vec![5, 6]), vec![6, 5]);
        assert_eq!(convert(P::GRAY_A, P::GRAY, vec![5, 0]), vec![255]);
        assert_eq!(convert(P::GRAY, P::GRAY_A, vec![5]), vec![5, 255]);
        assert_eq!(convert(P::GRAY_A, P::RGBA, vec![5, 6]), vec![5, 5, 5, 6]);
        assert_eq!(convert(P::BGRA, P::GRAY_A, vec![30, 20, 10, 40]), vec![20, 40]);
    }

    #[test]
    fn test_unsupported_pairs() {
        let err = ScanlineConverter::new(
            PixelSpecification::RGB,
            PixelSpecification::YCBCR,
            Color::WHITE,
        )
        .unwrap_err();
        assert_eq!(err.code(), "cannot_convert_scanline_between_specifications");

        let premultiplied = PixelSpecification::new(
            ColorModel::Rgb,
            4,
            AlphaInfo::PremultipliedLast,
            ComponentsOrder::Natural,
        );
        let err = ScanlineConverter::new(premultiplied, PixelSpecification::RGB, Color::WHITE)
            .unwrap_err();
        assert_eq!(err.code(), "scanline_conversion_unsupported_premultiplied_alpha");
    }

    #[test]
    fn test_block_streams_rows() {
        let mut block = ConversionBlock::new(
            PixelSpecification::GRAY,
            PixelSpecification::RGB,
            Size::new(1, 2),
            Color::WHITE,
        )
        .unwrap();
        block.consume(Scanline::from_bytes(PixelSpecification::GRAY, 1, vec![3]).unwrap());
        assert_eq!(block.buffered_rows(), 1);
        assert_eq!(block.produce().unwrap().data(), &[3, 3, 3]);
        assert!(block.produce().is_none());
        assert_eq!(block.output_specification(), PixelSpecification::RGB);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const RGB_FAMILY: [PixelSpecification; 11] = [
        PixelSpecification::RGB,
        PixelSpecification::RGBA,
        PixelSpecification::RGBX,
        PixelSpecification::ARGB,
        PixelSpecification::XRGB,
        PixelSpecification::BGR,
        PixelSpecification::BGRA,
        PixelSpecification::BGRX,
        PixelSpecification::ABGR,
        PixelSpecification::XBGR,
        PixelSpecification::GRAY,
    ];

    fn row(specification: PixelSpecification, pixels: &[u8]) -> Scanline {
        let width = (pixels.len() / specification.bytes_per_pixel as usize) as u32;
        Scanline::from_bytes(specification, width, pixels.to_vec()).unwrap()
    }

    proptest! {
        /// Property: Gray -> RGB -> Gray is lossless.
        #[test]
        fn prop_gray_round_trip(pixels in prop::collection::vec(any::<u8>(), 1..32)) {
            let up = ScanlineConverter::new(PixelSpecification::GRAY, PixelSpecification::RGB, Color::WHITE).unwrap();
            let down = ScanlineConverter::new(PixelSpecification::RGB, PixelSpecification::GRAY, Color::WHITE).unwrap();
            let back = down.convert(up.convert(row(PixelSpecification::GRAY, &pixels)));
            prop_assert_eq!(back.data(), pixels.as_slice());
        }

        /// Property: opaque pixels keep their color through any RGB-family hop.
        #[test]
        fn prop_opaque_color_survives(
            rgb in prop::array::uniform3(any::<u8>()),
            middle in 0usize..10,
        ) {
            let rgba = [rgb[0], rgb[1], rgb[2], 255];
            let there = ScanlineConverter::new(PixelSpecification::RGBA, RGB_FAMILY[middle], Color::BLACK).unwrap();
            let back = ScanlineConverter::new(RGB_FAMILY[middle], PixelSpecification::RGBA, Color::BLACK).unwrap();
            let result = back.convert(there.convert(row(PixelSpecification::RGBA, &rgba)));
            prop_assert_eq!(result.data(), &rgba[..]);
        }

        /// Property: every supported conversion keeps the width.
        #[test]
        fn prop_width_preserved(from in 0usize..11, to in 0usize..11, width in 1u32..16) {
            let converter = ScanlineConverter::new(RGB_FAMILY[from], RGB_FAMILY[to], Color::WHITE).unwrap();
            let output = converter.convert(Scanline::new(RGB_FAMILY[from], width));
            prop_assert_eq!(output.width(), width);
            prop_assert_eq!(output.specification(), RGB_FAMILY[to]);
        }
    }
}
