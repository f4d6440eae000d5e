//! Crop requirements.
//!
//! A crop can be expressed three ways:
//!
//! - **AbsoluteToOrigin**: pixel offsets of each edge from the top-left
//!   corner (`left`/`right` along x, `top`/`bottom` along y)
//! - **RelativeToOrigin**: the same edges as fractions of the image size,
//!   each in `0.0..=1.0`
//! - **Rect**: an explicit pixel rectangle
//!
//! All three share one contract: [`CropRequirement::apply`] resolves the crop
//! against a concrete image size, [`CropRequirement::rotated`] follows a
//! rotation of the image, and [`CropRequirement::scaled`] follows a decoder
//! sampling ratio.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{RequirementError, RotateRequirement};
use crate::geometry::{checked_u32, is_multiple_of_90, Point, Ratio, Rect, RoundingMode, Size};

/// Pixel offsets of each crop edge from the image origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsoluteCrop {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl AbsoluteCrop {
    pub const fn new(top: u32, left: u32, bottom: u32, right: u32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Edges are ordered and the crop is non-empty.
    pub fn is_valid(&self) -> bool {
        self.left < self.right && self.top < self.bottom
    }

    /// Valid and inside an image of `size`.
    pub fn is_valid_with_size(&self, size: &Size) -> bool {
        self.is_valid() && self.right <= size.width && self.bottom <= size.height
    }

    fn apply(&self, size: &Size) -> Result<Rect, RequirementError> {
        if !self.is_valid_with_size(size) {
            return Err(RequirementError::CropOutOfBounds {
                crop: self.to_string(),
                size: *size,
            });
        }
        Ok(Rect::new(
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top,
        ))
    }

    fn rotated(&self, degrees: i32, size: &Size) -> Result<Self, RequirementError> {
        let out_of_bounds = || RequirementError::CropOutOfBounds {
            crop: self.to_string(),
            size: *size,
        };
        let from_width = |v: u32| size.width.checked_sub(v).ok_or_else(out_of_bounds);
        let from_height = |v: u32| size.height.checked_sub(v).ok_or_else(out_of_bounds);

        Ok(match degrees {
            90 => AbsoluteCrop {
                top: self.left,
                left: from_height(self.bottom)?,
                bottom: self.right,
                right: from_height(self.top)?,
            },
            180 => AbsoluteCrop {
                top: from_height(self.bottom)?,
                left: from_width(self.right)?,
                bottom: from_height(self.top)?,
                right: from_width(self.left)?,
            },
            270 => AbsoluteCrop {
                top: from_width(self.right)?,
                left: self.top,
                bottom: from_width(self.left)?,
                right: self.bottom,
            },
            _ => *self,
        })
    }

    fn scaled(&self, ratio: Ratio) -> Result<Self, RequirementError> {
        let scale = |v: u32| checked_u32(v as f64 * ratio.value());
        let scaled = AbsoluteCrop {
            top: scale(self.top)?,
            left: scale(self.left)?,
            bottom: scale(self.bottom)?,
            right: scale(self.right)?,
        };
        if !scaled.is_valid() {
            return Err(RequirementError::InvalidCropValues {
                values: scaled.to_string(),
            });
        }
        Ok(scaled)
    }
}

impl fmt::Display for AbsoluteCrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{top:{},left:{},bottom:{},right:{}}}",
            self.top, self.left, self.bottom, self.right
        )
    }
}

/// Crop edges as fractions of the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeCrop {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl RelativeCrop {
    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn is_valid(&self) -> bool {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        in_unit(self.top)
            && in_unit(self.left)
            && in_unit(self.bottom)
            && in_unit(self.right)
            && self.left < self.right
            && self.top < self.bottom
    }

    fn apply(&self, size: &Size) -> Result<Rect, RequirementError> {
        if !self.is_valid() {
            return Err(RequirementError::InvalidCropValues {
                values: self.to_string(),
            });
        }
        let along = |fraction: f32, extent: u32| (fraction * extent as f32).round() as u32;
        let left = along(self.left, size.width);
        let top = along(self.top, size.height);
        let right = along(self.right, size.width);
        let bottom = along(self.bottom, size.height);
        if right <= left || bottom <= top {
            return Err(RequirementError::EmptyCrop {
                crop: self.to_string(),
                size: *size,
            });
        }
        Ok(Rect::new(left, top, right - left, bottom - top))
    }

    fn rotated(&self, degrees: i32) -> Self {
        match degrees {
            90 => RelativeCrop {
                top: self.left,
                left: 1.0 - self.bottom,
                bottom: self.right,
                right: 1.0 - self.top,
            },
            180 => RelativeCrop {
                top: 1.0 - self.bottom,
                left: 1.0 - self.right,
                bottom: 1.0 - self.top,
                right: 1.0 - self.left,
            },
            270 => RelativeCrop {
                top: 1.0 - self.right,
                left: self.top,
                bottom: 1.0 - self.left,
                right: self.bottom,
            },
            _ => *self,
        }
    }
}

impl fmt::Display for RelativeCrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{top:{},left:{},bottom:{},right:{}}}",
            self.top, self.left, self.bottom, self.right
        )
    }
}

/// The shape of a crop requirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CropRegion {
    AbsoluteToOrigin(AbsoluteCrop),
    RelativeToOrigin(RelativeCrop),
    Rect(Rect),
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropRegion::AbsoluteToOrigin(values) => write!(f, "absoluteToOrigin {values}"),
            CropRegion::RelativeToOrigin(values) => write!(f, "relativeToOrigin {values}"),
            CropRegion::Rect(rect) => write!(f, "rect {rect}"),
        }
    }
}

/// A validated crop requirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRequirement {
    region: CropRegion,
    /// Whether an encoder-level approximation of the crop is unacceptable.
    must_be_exact: bool,
}

impl CropRequirement {
    /// Crop by absolute pixel edges.
    ///
    /// # Errors
    ///
    /// Returns `RequirementError::InvalidCropValues` unless `left < right`
    /// and `top < bottom`.
    pub fn absolute(values: AbsoluteCrop, must_be_exact: bool) -> Result<Self, RequirementError> {
        if !values.is_valid() {
            return Err(RequirementError::InvalidCropValues {
                values: values.to_string(),
            });
        }
        Ok(Self {
            region: CropRegion::AbsoluteToOrigin(values),
            must_be_exact,
        })
    }

    /// Crop by fractional edges.
    ///
    /// # Errors
    ///
    /// Returns `RequirementError::InvalidCropValues` unless every edge is in
    /// `0.0..=1.0`, `left < right` and `top < bottom`.
    pub fn relative(values: RelativeCrop, must_be_exact: bool) -> Result<Self, RequirementError> {
        if !values.is_valid() {
            return Err(RequirementError::InvalidCropValues {
                values: values.to_string(),
            });
        }
        Ok(Self {
            region: CropRegion::RelativeToOrigin(values),
            must_be_exact,
        })
    }

    /// Crop to an explicit rectangle.
    ///
    /// # Errors
    ///
    /// Returns `RequirementError::InvalidCropValues` for an empty rectangle.
    pub fn rect(rect: Rect, must_be_exact: bool) -> Result<Self, RequirementError> {
        if rect.size.is_empty() {
            return Err(RequirementError::InvalidCropValues {
                values: rect.to_string(),
            });
        }
        Ok(Self {
            region: CropRegion::Rect(rect),
            must_be_exact,
        })
    }

    pub fn region(&self) -> &CropRegion {
        &self.region
    }

    pub fn must_be_exact(&self) -> bool {
        self.must_be_exact
    }

    /// Resolve the crop against an image of `size`.
    ///
    /// # Errors
    ///
    /// Returns `RequirementError::CropOutOfBounds` when an absolute or rect
    /// crop extends past `size`, and `RequirementError::EmptyCrop` when a
    /// relative crop rounds to zero pixels on either axis.
    pub fn apply(&self, size: &Size) -> Result<Rect, RequirementError> {
        match &self.region {
            CropRegion::AbsoluteToOrigin(values) => values.apply(size),
            CropRegion::RelativeToOrigin(values) => values.apply(size),
            CropRegion::Rect(rect) => {
                if rect.size.is_empty() || !size.contains(rect.bottom_right()) {
                    return Err(RequirementError::CropOutOfBounds {
                        crop: rect.to_string(),
                        size: *size,
                    });
                }
                Ok(*rect)
            }
        }
    }

    /// The same crop expressed in the coordinates of the image after it has
    /// been rotated by `rotation`. `size` is the size before rotation.
    ///
    /// # Errors
    ///
    /// Returns `RequirementError::CropCannotRotate` when `rotation` flips,
    /// forces an upright orientation, or is not a multiple of 90 degrees.
    pub fn rotated(
        &self,
        rotation: &RotateRequirement,
        size: &Size,
    ) -> Result<Self, RequirementError> {
        if rotation.flips() || rotation.force_up_orientation || !is_multiple_of_90(rotation.degrees)
        {
            return Err(RequirementError::CropCannotRotate {
                rotation: rotation.to_string(),
            });
        }
        let degrees = rotation.sanitised_degrees();
        let region = match &self.region {
            CropRegion::AbsoluteToOrigin(values) => {
                CropRegion::AbsoluteToOrigin(values.rotated(degrees, size)?)
            }
            CropRegion::RelativeToOrigin(values) => {
                CropRegion::RelativeToOrigin(values.rotated(degrees))
            }
            CropRegion::Rect(rect) => CropRegion::Rect(rotate_rect(rect, degrees, size)?),
        };
        Ok(Self {
            region,
            must_be_exact: self.must_be_exact,
        })
    }

    /// The same crop on an image that was scaled by `ratio`.
    ///
    /// Relative crops are unaffected. Absolute edges are truncated.
    pub fn scaled(&self, ratio: Ratio) -> Result<Self, RequirementError> {
        if ratio.is_zero() {
            return Err(RequirementError::InvalidRatio { ratio });
        }
        if ratio.is_one() {
            return Ok(*self);
        }
        let region = match &self.region {
            CropRegion::AbsoluteToOrigin(values) => CropRegion::AbsoluteToOrigin(values.scaled(ratio)?),
            CropRegion::RelativeToOrigin(values) => CropRegion::RelativeToOrigin(*values),
            CropRegion::Rect(rect) => {
                let scaled = rect.scaled(ratio, RoundingMode::Nearest)?;
                if scaled.size.is_empty() {
                    return Err(RequirementError::InvalidCropValues {
                        values: scaled.to_string(),
                    });
                }
                CropRegion::Rect(scaled)
            }
        };
        Ok(Self {
            region,
            must_be_exact: self.must_be_exact,
        })
    }
}

impl fmt::Display for CropRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (exact: {})", self.region, self.must_be_exact)
    }
}

fn rotate_rect(rect: &Rect, degrees: i32, size: &Size) -> Result<Rect, RequirementError> {
    let out_of_bounds = || RequirementError::CropOutOfBounds {
        crop: rect.to_string(),
        size: *size,
    };
    let from_width = || {
        size.width
            .checked_sub(rect.max_x())
            .ok_or_else(out_of_bounds)
    };
    let from_height = || {
        size.height
            .checked_sub(rect.max_y())
            .ok_or_else(out_of_bounds)
    };

    let top_left = match degrees {
        90 => Point::new(from_height()?, rect.top_left.x),
        180 => Point::new(from_width()?, from_height()?),
        270 => Point::new(rect.top_left.y, from_width()?),
        _ => rect.top_left,
    };
    Ok(Rect::from_parts(top_left, rect.size.rotated(degrees)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn absolute(top: u32, left: u32, bottom: u32, right: u32) -> CropRequirement {
        CropRequirement::absolute(AbsoluteCrop::new(top, left, bottom, right), false).unwrap()
    }

    #[test]
    fn test_absolute_apply() {
        let crop = absolute(10, 20, 50, 80);
        let rect = crop.apply(&Size::new(100, 100)).unwrap();
        assert_eq!(rect, Rect::new(20, 10, 60, 40));
    }

    #[test]
    fn test_absolute_apply_out_of_bounds() {
        let crop = absolute(10, 20, 50, 80);
        let err = crop.apply(&Size::new(60, 100)).unwrap_err();
        assert_eq!(err.code(), "crop_requirement_out_of_bounds");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = CropRequirement::absolute(AbsoluteCrop::new(5, 5, 5, 10), true).unwrap_err();
        assert_eq!(err.code(), "crop_requirement_invalid_values");
        assert!(CropRequirement::relative(RelativeCrop::new(0.0, 0.5, 1.0, 0.4), false).is_err());
        assert!(CropRequirement::relative(RelativeCrop::new(-0.1, 0.0, 1.0, 1.0), false).is_err());
        assert!(CropRequirement::rect(Rect::new(0, 0, 0, 4), false).is_err());
    }

    #[test]
    fn test_relative_apply_rounds() {
        let crop =
            CropRequirement::relative(RelativeCrop::new(0.1, 0.1, 0.9, 0.9), false).unwrap();
        let rect = crop.apply(&Size::new(1000, 800)).unwrap();
        assert_eq!(rect, Rect::new(100, 80, 800, 640));
    }

    #[test]
    fn test_relative_apply_rounding_to_empty_fails() {
        let crop =
            CropRequirement::relative(RelativeCrop::new(0.4, 0.4, 0.45, 0.45), false).unwrap();
        let err = crop.apply(&Size::new(2, 2)).unwrap_err();
        assert_eq!(err.code(), "crop_requirement_empty");
        assert_eq!(
            crop.apply(&Size::new(100, 100)).unwrap(),
            Rect::new(40, 40, 5, 5)
        );
    }

    #[test]
    fn test_rect_apply_checks_bounds() {
        let crop = CropRequirement::rect(Rect::new(2, 2, 2, 2), false).unwrap();
        assert_eq!(crop.apply(&Size::new(4, 4)).unwrap(), Rect::new(2, 2, 2, 2));
        assert!(crop.apply(&Size::new(3, 4)).is_err());
    }

    #[test]
    fn test_absolute_rotated_by_quarter_turns() {
        // 100 wide, 50 tall; crop columns 10..30, rows 5..15
        let size = Size::new(100, 50);
        let crop = absolute(5, 10, 15, 30);

        let r90 = crop.rotated(&RotateRequirement::with_degrees(90), &size).unwrap();
        assert_eq!(
            r90.region(),
            &CropRegion::AbsoluteToOrigin(AbsoluteCrop::new(10, 35, 30, 45))
        );

        let r180 = crop.rotated(&RotateRequirement::with_degrees(180), &size).unwrap();
        assert_eq!(
            r180.region(),
            &CropRegion::AbsoluteToOrigin(AbsoluteCrop::new(35, 70, 45, 90))
        );

        let r270 = crop.rotated(&RotateRequirement::with_degrees(270), &size).unwrap();
        assert_eq!(
            r270.region(),
            &CropRegion::AbsoluteToOrigin(AbsoluteCrop::new(70, 5, 90, 15))
        );
    }

    #[test]
    fn test_rotated_crop_keeps_its_area() {
        let size = Size::new(100, 50);
        let crop = absolute(5, 10, 15, 30);
        let rotated = crop.rotated(&RotateRequirement::with_degrees(90), &size).unwrap();
        let rect = rotated.apply(&size.rotated(90).unwrap()).unwrap();
        assert_eq!(rect.size, Size::new(10, 20));
    }

    #[test]
    fn test_rect_rotated_matches_absolute() {
        let size = Size::new(100, 50);
        let by_rect = CropRequirement::rect(Rect::new(10, 5, 20, 10), false).unwrap();
        let by_edges = absolute(5, 10, 15, 30);
        for degrees in [0, 90, 180, 270] {
            let rotation = RotateRequirement::with_degrees(degrees);
            let rotated_size = size.rotated(degrees).unwrap();
            let a = by_rect.rotated(&rotation, &size).unwrap().apply(&rotated_size).unwrap();
            let b = by_edges.rotated(&rotation, &size).unwrap().apply(&rotated_size).unwrap();
            assert_eq!(a, b, "rotation by {degrees}");
        }
    }

    #[test]
    fn test_relative_rotated() {
        let crop =
            CropRequirement::relative(RelativeCrop::new(0.1, 0.2, 0.5, 0.6), false).unwrap();
        let r90 = crop.rotated(&RotateRequirement::with_degrees(90), &Size::new(1, 1)).unwrap();
        match r90.region() {
            CropRegion::RelativeToOrigin(v) => {
                assert!((v.top - 0.2).abs() < 1e-6);
                assert!((v.left - 0.5).abs() < 1e-6);
                assert!((v.bottom - 0.6).abs() < 1e-6);
                assert!((v.right - 0.9).abs() < 1e-6);
            }
            other => panic!("unexpected region {other}"),
        }
    }

    #[test]
    fn test_rotation_with_flip_is_rejected() {
        let crop = absolute(0, 0, 10, 10);
        let rotation = RotateRequirement {
            degrees: 90,
            flip_horizontally: true,
            ..RotateRequirement::default()
        };
        let err = crop.rotated(&rotation, &Size::new(10, 10)).unwrap_err();
        assert_eq!(err.code(), "crop_requirement_cannot_rotate_with_requirement");
        assert!(crop
            .rotated(&RotateRequirement::with_degrees(45), &Size::new(10, 10))
            .is_err());
    }

    #[test]
    fn test_scaled() {
        let crop = absolute(10, 20, 50, 81);
        let scaled = crop.scaled(Ratio::new(1, 2)).unwrap();
        assert_eq!(
            scaled.region(),
            &CropRegion::AbsoluteToOrigin(AbsoluteCrop::new(5, 10, 25, 40))
        );
        assert_eq!(crop.scaled(Ratio::ONE).unwrap(), crop);
        assert!(crop.scaled(Ratio::new(0, 1)).is_err());

        let relative =
            CropRequirement::relative(RelativeCrop::new(0.1, 0.1, 0.9, 0.9), true).unwrap();
        assert_eq!(relative.scaled(Ratio::new(1, 8)).unwrap(), relative);
    }

    #[test]
    fn test_scaled_collapsing_crop_is_invalid() {
        let crop = absolute(0, 0, 1, 1);
        let err = crop.scaled(Ratio::new(1, 8)).unwrap_err();
        assert_eq!(err.code(), "crop_requirement_invalid_values");
    }
}
