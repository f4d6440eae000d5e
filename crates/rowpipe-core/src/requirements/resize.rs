use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// How strictly the target size must be met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResizeMode {
    /// Output must match the target size.
    #[default]
    Exact,
    /// Output may be smaller than the target on either axis.
    ExactOrSmaller,
    /// Output may be larger than the target on either axis.
    ExactOrLarger,
}

/// A requested output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResizeRequirement {
    pub mode: ResizeMode,
    pub target_size: Size,
}

impl ResizeRequirement {
    pub const fn new(mode: ResizeMode, target_size: Size) -> Self {
        Self { mode, target_size }
    }

    pub const fn exact(target_size: Size) -> Self {
        Self::new(ResizeMode::Exact, target_size)
    }

    pub const fn exact_or_smaller(target_size: Size) -> Self {
        Self::new(ResizeMode::ExactOrSmaller, target_size)
    }

    pub const fn exact_or_larger(target_size: Size) -> Self {
        Self::new(ResizeMode::ExactOrLarger, target_size)
    }
}
