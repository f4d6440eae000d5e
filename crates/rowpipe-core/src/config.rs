//! Configuration consumed by the planning and processing layers.

use serde::{Deserialize, Serialize};

use crate::pixel::Color;

/// Default threshold below which a size mismatch is accepted without scaling.
pub const DEFAULT_THRESHOLD_FOR_SKIPPING_SCALING: f32 = 0.25;

/// Resampling algorithm used by the scaling block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SamplingMethod {
    /// Row-streaming cubic Hermite interpolation.
    Bicubic,
    /// Whole-frame Magic Kernel resampling with sharpening.
    #[default]
    MagicKernel,
}

/// Settings that apply to every transform operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Resampling algorithm for the scaling stage.
    pub sampling_method: SamplingMethod,
    /// Largest relative size delta accepted without a scaling stage.
    pub threshold_for_skipping_scaling: f32,
    /// Background that transparent pixels are blended onto when alpha is
    /// dropped.
    pub background_color: Color,
    /// Whether the output may carry orientation as metadata instead of
    /// rotated pixels.
    pub interpret_metadata: bool,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            sampling_method: SamplingMethod::default(),
            threshold_for_skipping_scaling: DEFAULT_THRESHOLD_FOR_SKIPPING_SCALING,
            background_color: Color::WHITE,
            interpret_metadata: true,
        }
    }
}
