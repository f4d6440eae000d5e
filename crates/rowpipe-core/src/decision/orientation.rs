use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Configuration;
use crate::geometry::{GeometryError, Size};
use crate::orientation::Orientation;
use crate::requirements::RotateRequirement;

/// Whether the final orientation is applied to the pixels or recorded as
/// metadata for the viewer to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientationDecision {
    /// Orientation the rotation block must apply to the pixels.
    pub orientation: Orientation,
    /// Orientation written into the output metadata.
    pub metadata_orientation: Orientation,
    /// Pixel size after applying `orientation`.
    pub size: Size,
}

impl OrientationDecision {
    /// Decide how to honor `rotate` for an image stored with `orientation`.
    ///
    /// `size` is the stored pixel size before any rotation. Metadata is used
    /// only when the sink can carry it, the configuration interprets it and
    /// the caller does not force an upright output.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::NotMultipleOf90` when the requested rotation
    /// is not a quarter turn.
    pub fn calculate(
        rotate: Option<&RotateRequirement>,
        orientation: Orientation,
        size: Size,
        configuration: &Configuration,
        sink_supports_metadata: bool,
    ) -> Result<Self, GeometryError> {
        let (final_orientation, force_up) = match rotate {
            Some(rotate) if !rotate.is_noop() => (
                orientation.rotated_and_flipped(
                    rotate.degrees,
                    rotate.flip_horizontally,
                    rotate.flip_vertically,
                )?,
                rotate.force_up_orientation,
            ),
            _ => (orientation, false),
        };

        let store_in_metadata =
            sink_supports_metadata && configuration.interpret_metadata && !force_up;

        let decision = if store_in_metadata {
            OrientationDecision {
                orientation: Orientation::Up,
                metadata_orientation: final_orientation,
                size,
            }
        } else {
            OrientationDecision {
                orientation: final_orientation,
                metadata_orientation: Orientation::Up,
                size: size.oriented(final_orientation),
            }
        };

        debug!(
            stored = %orientation,
            pixels = %decision.orientation,
            metadata = %decision.metadata_orientation,
            size = %decision.size,
            "orientation decision"
        );
        Ok(decision)
    }

    /// True when the pixels themselves must be rotated or mirrored.
    pub fn should_rotate_pixels(&self) -> bool {
        self.orientation != Orientation::Up
    }

    /// Size as displayed once the metadata orientation is honored.
    pub fn metadata_aware_size(&self) -> Size {
        self.size.oriented(self.metadata_orientation)
    }
}
