//! The eight image orientations and their algebra.
//!
//! Values follow the EXIF numbering (1 through 8). An orientation describes
//! how the stored pixels must be transformed to be displayed upright; the
//! pixel mapping for each value lives in the rotation block.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{is_multiple_of_90, sanitized_degrees, GeometryError};

/// Image orientation (EXIF values 1-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Orientation {
    /// Stored upright.
    #[default]
    Up = 1,
    /// Mirrored along the vertical axis.
    UpMirrored = 2,
    /// Upside down.
    Bottom = 3,
    /// Upside down and mirrored.
    BottomMirrored = 4,
    /// Transposed along the main diagonal.
    LeftMirrored = 5,
    /// Needs a 90 degree clockwise turn.
    Right = 6,
    /// Transposed along the anti-diagonal.
    RightMirrored = 7,
    /// Needs a 90 degree counter-clockwise turn.
    Left = 8,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::Up,
        Orientation::UpMirrored,
        Orientation::Bottom,
        Orientation::BottomMirrored,
        Orientation::LeftMirrored,
        Orientation::Right,
        Orientation::RightMirrored,
        Orientation::Left,
    ];

    /// Look up an orientation by its EXIF value.
    pub fn from_value(value: u16) -> Option<Orientation> {
        Orientation::ALL.into_iter().find(|o| o.value() == value)
    }

    /// The EXIF value of this orientation.
    #[inline]
    pub fn value(self) -> u16 {
        self as u16
    }

    /// Returns true if this orientation swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Left
                | Orientation::LeftMirrored
                | Orientation::Right
                | Orientation::RightMirrored
        )
    }

    fn rotated_clockwise_90(self) -> Orientation {
        match self {
            Orientation::Up => Orientation::Right,
            Orientation::Right => Orientation::Bottom,
            Orientation::Bottom => Orientation::Left,
            Orientation::Left => Orientation::Up,
            Orientation::UpMirrored => Orientation::RightMirrored,
            Orientation::RightMirrored => Orientation::BottomMirrored,
            Orientation::BottomMirrored => Orientation::LeftMirrored,
            Orientation::LeftMirrored => Orientation::UpMirrored,
        }
    }

    /// Compose with an additional clockwise rotation of `degrees`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::NotMultipleOf90` for angles that are not a
    /// multiple of 90 degrees.
    pub fn rotated(self, degrees: i32) -> Result<Orientation, GeometryError> {
        if !is_multiple_of_90(degrees) {
            return Err(GeometryError::NotMultipleOf90 { degrees });
        }
        let quarter_turns = sanitized_degrees(degrees) / 90;
        Ok((0..quarter_turns).fold(self, |o, _| o.rotated_clockwise_90()))
    }

    /// Compose with a mirror along the vertical axis.
    pub fn flipped_horizontally(self) -> Orientation {
        match self {
            Orientation::Up => Orientation::UpMirrored,
            Orientation::Right => Orientation::RightMirrored,
            Orientation::Bottom => Orientation::BottomMirrored,
            Orientation::Left => Orientation::LeftMirrored,
            Orientation::UpMirrored => Orientation::Up,
            Orientation::RightMirrored => Orientation::Right,
            Orientation::BottomMirrored => Orientation::Bottom,
            Orientation::LeftMirrored => Orientation::Left,
        }
    }

    /// Compose with a mirror along the horizontal axis.
    pub fn flipped_vertically(self) -> Orientation {
        match self {
            Orientation::Up => Orientation::BottomMirrored,
            Orientation::Right => Orientation::LeftMirrored,
            Orientation::Bottom => Orientation::UpMirrored,
            Orientation::Left => Orientation::RightMirrored,
            Orientation::UpMirrored => Orientation::Bottom,
            Orientation::RightMirrored => Orientation::Left,
            Orientation::BottomMirrored => Orientation::Up,
            Orientation::LeftMirrored => Orientation::Right,
        }
    }

    /// Rotate first, then apply the requested flips.
    pub fn rotated_and_flipped(
        self,
        degrees: i32,
        flip_horizontally: bool,
        flip_vertically: bool,
    ) -> Result<Orientation, GeometryError> {
        let mut result = self.rotated(degrees)?;
        if flip_horizontally {
            result = result.flipped_horizontally();
        }
        if flip_vertically {
            result = result.flipped_vertically();
        }
        Ok(result)
    }

    /// Lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Orientation::Up => "up",
            Orientation::UpMirrored => "up_mirrored",
            Orientation::Bottom => "bottom",
            Orientation::BottomMirrored => "bottom_mirrored",
            Orientation::LeftMirrored => "left_mirrored",
            Orientation::Right => "right",
            Orientation::RightMirrored => "right_mirrored",
            Orientation::Left => "left",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
