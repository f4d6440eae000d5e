//! Pixel layout descriptions and the scanline buffer type.
//!
//! A [`PixelSpecification`] describes how the bytes of one pixel are laid
//! out: the color model, how many bytes each pixel occupies, where (and
//! whether) an alpha component lives, and whether color components are
//! stored in natural or reversed order.

mod scanline;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use scanline::{Scanline, ScanlineError};

/// The color model of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
    YCbCr,
    YCbCrK,
    Unknown,
}

impl ColorModel {
    /// Lowercase identifier used in diagnostics.
    pub fn identifier(self) -> &'static str {
        match self {
            ColorModel::Gray => "gray",
            ColorModel::Rgb => "rgb",
            ColorModel::Cmyk => "cmyk",
            ColorModel::YCbCr => "ycbcr",
            ColorModel::YCbCrK => "ycbcrk",
            ColorModel::Unknown => "unknown",
        }
    }

    /// Number of color components, alpha excluded.
    pub fn number_of_color_components(self) -> u8 {
        match self {
            ColorModel::Gray => 1,
            ColorModel::Rgb | ColorModel::YCbCr => 3,
            ColorModel::Cmyk | ColorModel::YCbCrK => 4,
            ColorModel::Unknown => 0,
        }
    }

    /// Whether an extra alpha component may accompany the color components.
    pub fn supports_extra_alpha_channel(self) -> bool {
        matches!(self, ColorModel::Gray | ColorModel::Rgb)
    }
}

/// Position and meaning of the alpha component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlphaInfo {
    #[default]
    None,
    First,
    Last,
    /// Padding byte before the color components, value ignored.
    SkipFirst,
    /// Padding byte after the color components, value ignored.
    SkipLast,
    PremultipliedFirst,
    PremultipliedLast,
}

impl AlphaInfo {
    pub fn is_first(self) -> bool {
        matches!(
            self,
            AlphaInfo::First | AlphaInfo::SkipFirst | AlphaInfo::PremultipliedFirst
        )
    }

    pub fn is_last(self) -> bool {
        matches!(
            self,
            AlphaInfo::Last | AlphaInfo::SkipLast | AlphaInfo::PremultipliedLast
        )
    }

    pub fn is_premultiplied(self) -> bool {
        matches!(self, AlphaInfo::PremultipliedFirst | AlphaInfo::PremultipliedLast)
    }

    /// Whether the alpha byte carries meaningful transparency.
    pub fn should_interpret_alpha(self) -> bool {
        matches!(
            self,
            AlphaInfo::First
                | AlphaInfo::Last
                | AlphaInfo::PremultipliedFirst
                | AlphaInfo::PremultipliedLast
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            AlphaInfo::None => "none",
            AlphaInfo::First => "first",
            AlphaInfo::Last => "last",
            AlphaInfo::SkipFirst => "skipFirst",
            AlphaInfo::SkipLast => "skipLast",
            AlphaInfo::PremultipliedFirst => "premultipliedFirst",
            AlphaInfo::PremultipliedLast => "premultipliedLast",
        }
    }
}

/// Storage order of the color components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentsOrder {
    /// e.g. RGB
    #[default]
    Natural,
    /// e.g. BGR
    Reversed,
}

impl ComponentsOrder {
    pub fn name(self) -> &'static str {
        match self {
            ComponentsOrder::Natural => "natural",
            ComponentsOrder::Reversed => "reversed",
        }
    }
}

/// Byte layout of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSpecification {
    pub color_model: ColorModel,
    pub bytes_per_pixel: u8,
    pub alpha_info: AlphaInfo,
    pub components_order: ComponentsOrder,
}

impl PixelSpecification {
    pub const GRAY: Self = Self::new(ColorModel::Gray, 1, AlphaInfo::None, ComponentsOrder::Natural);
    pub const GRAY_A: Self = Self::new(ColorModel::Gray, 2, AlphaInfo::Last, ComponentsOrder::Natural);
    pub const A_GRAY: Self = Self::new(ColorModel::Gray, 2, AlphaInfo::First, ComponentsOrder::Natural);

    pub const RGB: Self = Self::new(ColorModel::Rgb, 3, AlphaInfo::None, ComponentsOrder::Natural);
    pub const RGBA: Self = Self::new(ColorModel::Rgb, 4, AlphaInfo::Last, ComponentsOrder::Natural);
    pub const RGBX: Self = Self::new(ColorModel::Rgb, 4, AlphaInfo::SkipLast, ComponentsOrder::Natural);
    pub const ARGB: Self = Self::new(ColorModel::Rgb, 4, AlphaInfo::First, ComponentsOrder::Natural);
    pub const XRGB: Self = Self::new(ColorModel::Rgb, 4, AlphaInfo::SkipFirst, ComponentsOrder::Natural);

    pub const BGR: Self = Self::new(ColorModel::Rgb, 3, AlphaInfo::None, ComponentsOrder::Reversed);
    pub const BGRA: Self = Self::new(ColorModel::Rgb, 4, AlphaInfo::First, ComponentsOrder::Reversed);
    pub const BGRX: Self = Self::new(ColorModel::Rgb, 4, AlphaInfo::SkipFirst, ComponentsOrder::Reversed);
    pub const ABGR: Self = Self::new(ColorModel::Rgb, 4, AlphaInfo::Last, ComponentsOrder::Reversed);
    pub const XBGR: Self = Self::new(ColorModel::Rgb, 4, AlphaInfo::SkipLast, ComponentsOrder::Reversed);

    pub const YCBCR: Self = Self::new(ColorModel::YCbCr, 3, AlphaInfo::None, ComponentsOrder::Natural);

    pub const fn new(
        color_model: ColorModel,
        bytes_per_pixel: u8,
        alpha_info: AlphaInfo,
        components_order: ComponentsOrder,
    ) -> Self {
        Self {
            color_model,
            bytes_per_pixel,
            alpha_info,
            components_order,
        }
    }

    /// Whether each pixel carries an alpha (or padding) byte.
    pub fn has_alpha(&self) -> bool {
        self.color_model.supports_extra_alpha_channel() && self.alpha_info != AlphaInfo::None
    }

    /// Color components plus the alpha byte, if any.
    pub fn number_of_components(&self) -> u8 {
        let color = self.color_model.number_of_color_components();
        if self.has_alpha() {
            color + 1
        } else {
            color
        }
    }

    /// Whether the alpha byte is stored before the color components.
    ///
    /// Reversed order moves a trailing alpha to the front: BGRA stores its
    /// alpha first in memory.
    pub fn is_alpha_leading_component(&self) -> bool {
        (self.alpha_info.is_first() && self.components_order == ComponentsOrder::Natural)
            || (self.alpha_info.is_last() && self.components_order == ComponentsOrder::Reversed)
    }
}

impl fmt::Display for PixelSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "colorModel: {}, bytesPerPixel: {}, alphaInfo: {}, componentsOrder: {}",
            self.color_model.identifier(),
            self.bytes_per_pixel,
            self.alpha_info.name(),
            self.components_order.name()
        )
    }
}

/// An opaque RGB color, used as the background for alpha removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Unweighted average of the three components.
    pub fn gray(&self) -> u8 {
        ((self.red as u16 + self.green as u16 + self.blue as u16) / 3) as u8
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_of_components() {
        assert_eq!(PixelSpecification::GRAY.number_of_components(), 1);
        assert_eq!(PixelSpecification::GRAY_A.number_of_components(), 2);
        assert_eq!(PixelSpecification::RGB.number_of_components(), 3);
        assert_eq!(PixelSpecification::RGBA.number_of_components(), 4);
        assert_eq!(PixelSpecification::XBGR.number_of_components(), 4);
        assert_eq!(PixelSpecification::YCBCR.number_of_components(), 3);
    }

    #[test]
    fn test_components_match_bytes_per_pixel() {
        let all = [
            PixelSpecification::GRAY,
            PixelSpecification::GRAY_A,
            PixelSpecification::A_GRAY,
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
            PixelSpecification::YCBCR,
        ];
        for spec in all {
            assert_eq!(spec.number_of_components(), spec.bytes_per_pixel, "{spec}");
        }
    }

    #[test]
    fn test_alpha_leading_component() {
        assert!(PixelSpecification::ARGB.is_alpha_leading_component());
        assert!(PixelSpecification::XRGB.is_alpha_leading_component());
        assert!(PixelSpecification::ABGR.is_alpha_leading_component());
        assert!(PixelSpecification::A_GRAY.is_alpha_leading_component());
        assert!(!PixelSpecification::RGBA.is_alpha_leading_component());
        assert!(!PixelSpecification::BGRA.is_alpha_leading_component());
        assert!(!PixelSpecification::RGB.is_alpha_leading_component());
    }

    #[test]
    fn test_alpha_info_predicates() {
        assert!(AlphaInfo::SkipFirst.is_first());
        assert!(AlphaInfo::PremultipliedLast.is_last());
        assert!(!AlphaInfo::None.is_first() && !AlphaInfo::None.is_last());
        assert!(AlphaInfo::PremultipliedFirst.is_premultiplied());
        assert!(!AlphaInfo::SkipLast.should_interpret_alpha());
        assert!(AlphaInfo::Last.should_interpret_alpha());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            PixelSpecification::RGBA.to_string(),
            "colorModel: rgb, bytesPerPixel: 4, alphaInfo: last, componentsOrder: natural"
        );
        assert_eq!(
            PixelSpecification::BGRX.to_string(),
            "colorModel: rgb, bytesPerPixel: 4, alphaInfo: skipFirst, componentsOrder: reversed"
        );
    }

    #[test]
    fn test_color_gray() {
        assert_eq!(Color::WHITE.gray(), 255);
        assert_eq!(Color::new(10, 20, 31).gray(), 20);
        assert_eq!(Color::default(), Color::WHITE);
    }
}
