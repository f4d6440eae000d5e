use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::sanitized_degrees;

/// A requested rotation and mirroring of the output.
///
/// Rotation is clockwise. Flips are applied after the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateRequirement {
    pub degrees: i32,
    pub flip_horizontally: bool,
    pub flip_vertically: bool,
    /// Rotate pixels even when the output could carry the orientation as
    /// metadata.
    pub force_up_orientation: bool,
}

impl RotateRequirement {
    pub fn with_degrees(degrees: i32) -> Self {
        Self {
            degrees,
            ..Self::default()
        }
    }

    /// `degrees` normalized to `0..360`.
    pub fn sanitised_degrees(&self) -> i32 {
        sanitized_degrees(self.degrees)
    }

    /// True when the requirement changes nothing.
    pub fn is_noop(&self) -> bool {
        self.sanitised_degrees() == 0
            && !self.flip_horizontally
            && !self.flip_vertically
            && !self.force_up_orientation
    }

    pub fn flips(&self) -> bool {
        self.flip_horizontally || self.flip_vertically
    }
}

impl fmt::Display for RotateRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{degrees:{},flipVertically:{},flipHorizontally:{},forceUpOrientation:{}}}",
            self.degrees, self.flip_vertically, self.flip_horizontally, self.force_up_orientation
        )
    }
}
