//! Geometry primitives: ratios, points, sizes and rectangles.
//!
//! All dimensions are unsigned pixel counts. Scaling goes through `f64` and
//! back with an explicit [`RoundingMode`]; a scaled value that does not fit
//! into a `u32` is reported as a [`GeometryError`] and never truncated.
//!
//! `Size` comparisons are partial: a size is only "larger" than another when
//! both of its dimensions are. Use [`Size::fits_within`], [`Size::covers`],
//! [`Size::is_smaller_than`] and [`Size::is_larger_than`] instead of the
//! comparison operators.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orientation::Orientation;

/// Errors raised by checked geometry arithmetic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A computed value exceeds `u32::MAX`.
    #[error("Numeric conversion overflow: {value} does not fit into u32")]
    Overflow { value: f64 },

    /// A computed value is negative or not a number.
    #[error("Numeric conversion underflow: {value} does not fit into u32")]
    Underflow { value: f64 },

    /// A rotation was requested that is not a multiple of 90 degrees.
    #[error("Rotation of {degrees} degrees is not a multiple of 90")]
    NotMultipleOf90 { degrees: i32 },
}

impl GeometryError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            GeometryError::Overflow { .. } => "numeric_conversion_overflow",
            GeometryError::Underflow { .. } => "numeric_conversion_underflow",
            GeometryError::NotMultipleOf90 { .. } => "rotation_not_multiple_of_90",
        }
    }
}

/// How a fractional value is turned back into whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Towards positive infinity.
    Up,
    /// To the nearest integer, halves away from zero.
    #[default]
    Nearest,
    /// Towards negative infinity.
    Down,
}

impl RoundingMode {
    /// Apply this rounding mode to `value`.
    #[inline]
    pub fn round(self, value: f64) -> f64 {
        match self {
            RoundingMode::Up => value.ceil(),
            RoundingMode::Nearest => value.round(),
            RoundingMode::Down => value.floor(),
        }
    }
}

/// Convert a float to `u32`, truncating the fractional part.
///
/// # Errors
///
/// Returns `GeometryError::Underflow` for negative or NaN input and
/// `GeometryError::Overflow` when the value exceeds `u32::MAX`.
pub fn checked_u32(value: f64) -> Result<u32, GeometryError> {
    if value.is_nan() || value < 0.0 {
        return Err(GeometryError::Underflow { value });
    }
    if value > u32::MAX as f64 {
        return Err(GeometryError::Overflow { value });
    }
    Ok(value as u32)
}

/// Normalize an angle in degrees to `0..360`.
#[inline]
pub fn sanitized_degrees(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

/// Whether `degrees` is a multiple of 90.
#[inline]
pub fn is_multiple_of_90(degrees: i32) -> bool {
    degrees % 90 == 0
}

/// A rational scale factor such as a decoder sampling ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ratio {
    pub numerator: u32,
    pub denominator: u32,
}

impl Ratio {
    pub const ONE: Ratio = Ratio::new(1, 1);
    pub const ZERO: Ratio = Ratio::new(0, 1);

    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// True when the ratio leaves sizes unchanged.
    #[inline]
    pub fn is_one(&self) -> bool {
        self.numerator == self.denominator
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// True when applying the ratio would enlarge a size.
    #[inline]
    pub fn is_upscaling(&self) -> bool {
        self.numerator > self.denominator
    }

    /// The ratio as a float.
    #[inline]
    pub fn value(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Ratio::ONE
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A pixel position, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Scale both coordinates by `ratio`.
    pub fn scaled(&self, ratio: Ratio, mode: RoundingMode) -> Result<Point, GeometryError> {
        Ok(Point {
            x: checked_u32(mode.round(self.x as f64 * ratio.value()))?,
            y: checked_u32(mode.round(self.y as f64 * ratio.value()))?,
        })
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Swap width and height.
    #[inline]
    pub fn transposed(&self) -> Size {
        Size::new(self.height, self.width)
    }

    /// Dimensions after displaying the image with `orientation`.
    pub fn oriented(&self, orientation: Orientation) -> Size {
        if orientation.swaps_dimensions() {
            self.transposed()
        } else {
            *self
        }
    }

    /// Dimensions after a clockwise rotation by `degrees`.
    pub fn rotated(&self, degrees: i32) -> Result<Size, GeometryError> {
        if !is_multiple_of_90(degrees) {
            return Err(GeometryError::NotMultipleOf90 { degrees });
        }
        if sanitized_degrees(degrees) % 180 == 90 {
            Ok(self.transposed())
        } else {
            Ok(*self)
        }
    }

    /// True when `point` lies within the size, edges inclusive.
    ///
    /// Edges are inclusive so that the bottom-right corner of a rectangle
    /// that ends exactly at the border is accepted.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x <= self.width && point.y <= self.height
    }

    /// Both dimensions are less than or equal to `other`'s.
    #[inline]
    pub fn fits_within(&self, other: &Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Both dimensions are greater than or equal to `other`'s.
    #[inline]
    pub fn covers(&self, other: &Size) -> bool {
        self.width >= other.width && self.height >= other.height
    }

    /// Both dimensions are strictly less than `other`'s.
    #[inline]
    pub fn is_smaller_than(&self, other: &Size) -> bool {
        self.width < other.width && self.height < other.height
    }

    /// Both dimensions are strictly greater than `other`'s.
    #[inline]
    pub fn is_larger_than(&self, other: &Size) -> bool {
        self.width > other.width && self.height > other.height
    }

    /// Scale both dimensions by `ratio`.
    pub fn scaled(&self, ratio: Ratio, mode: RoundingMode) -> Result<Size, GeometryError> {
        Ok(Size {
            width: checked_u32(mode.round(self.width as f64 * ratio.value()))?,
            height: checked_u32(mode.round(self.height as f64 * ratio.value()))?,
        })
    }

    /// Shrink to fit inside `bounds` while keeping the aspect ratio.
    ///
    /// Sizes that already fit are returned unchanged; this never upscales.
    pub fn downscaled_to_fit(&self, bounds: &Size, mode: RoundingMode) -> Result<Size, GeometryError> {
        if self.fits_within(bounds) {
            return Ok(*self);
        }

        let factor_w = self.width as f64 / bounds.width as f64;
        let factor_h = self.height as f64 / bounds.height as f64;
        let factor = 1.0 / factor_w.max(factor_h);

        Ok(Size {
            width: checked_u32(mode.round(factor * self.width as f64))?,
            height: checked_u32(mode.round(factor * self.height as f64))?,
        })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top_left: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            top_left: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub const fn from_parts(top_left: Point, size: Size) -> Self {
        Self { top_left, size }
    }

    #[inline]
    pub fn min_x(&self) -> u32 {
        self.top_left.x
    }

    #[inline]
    pub fn mid_x(&self) -> u32 {
        self.top_left.x.saturating_add(self.size.width / 2)
    }

    #[inline]
    pub fn max_x(&self) -> u32 {
        self.top_left.x.saturating_add(self.size.width)
    }

    #[inline]
    pub fn min_y(&self) -> u32 {
        self.top_left.y
    }

    #[inline]
    pub fn mid_y(&self) -> u32 {
        self.top_left.y.saturating_add(self.size.height / 2)
    }

    #[inline]
    pub fn max_y(&self) -> u32 {
        self.top_left.y.saturating_add(self.size.height)
    }

    /// The exclusive bottom-right corner.
    #[inline]
    pub fn bottom_right(&self) -> Point {
        Point::new(self.max_x(), self.max_y())
    }

    /// True when both rectangles are non-empty and share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        let out_of_bounds = self.max_x() <= other.min_x()
            || self.max_y() <= other.min_y()
            || self.min_x() >= other.max_x()
            || self.min_y() >= other.max_y();
        !self.size.is_empty() && !other.size.is_empty() && !out_of_bounds
    }

    /// The shared region, or `None` when the rectangles do not intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let left = self.min_x().max(other.min_x());
        let top = self.min_y().max(other.min_y());
        let right = self.max_x().min(other.max_x());
        let bottom = self.max_y().min(other.max_y());
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Scale origin and size by `ratio`.
    pub fn scaled(&self, ratio: Ratio, mode: RoundingMode) -> Result<Rect, GeometryError> {
        Ok(Rect {
            top_left: self.top_left.scaled(ratio, mode)?,
            size: self.size.scaled(ratio, mode)?,
        })
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.size, self.top_left)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn size_strategy() -> impl Strategy<Value = Size> {
        (1u32..=10_000, 1u32..=10_000).prop_map(|(w, h)| Size::new(w, h))
    }

    proptest! {
        /// Property: downscale-to-fit always fits inside the bounds.
        #[test]
        fn prop_downscaled_fits_within_bounds(size in size_strategy(), bounds in size_strategy()) {
            let fitted = size.downscaled_to_fit(&bounds, RoundingMode::Nearest).unwrap();
            prop_assert!(fitted.fits_within(&bounds) || fitted == size);
            prop_assert!(fitted.fits_within(&size));
        }

        /// Property: downscale-to-fit touches the bounds on at least one axis.
        #[test]
        fn prop_downscaled_touches_bounds(size in size_strategy(), bounds in size_strategy()) {
            prop_assume!(!size.fits_within(&bounds));
            let fitted = size.downscaled_to_fit(&bounds, RoundingMode::Nearest).unwrap();
            prop_assert!(fitted.width == bounds.width || fitted.height == bounds.height);
        }

        /// Property: scaling by one is the identity.
        #[test]
        fn prop_scaled_by_one_is_identity(size in size_strategy()) {
            prop_assert_eq!(size.scaled(Ratio::ONE, RoundingMode::Up).unwrap(), size);
        }

        /// Property: transposing twice is the identity.
        #[test]
        fn prop_transpose_involution(size in size_strategy()) {
            prop_assert_eq!(size.transposed().transposed(), size);
        }

        /// Property: rotation by any multiple of 90 degrees preserves area.
        #[test]
        fn prop_rotation_preserves_area(size in size_strategy(), quarter in -8i32..8) {
            let rotated = size.rotated(quarter * 90).unwrap();
            prop_assert_eq!(
                rotated.width as u64 * rotated.height as u64,
                size.width as u64 * size.height as u64
            );
        }
    }
}
