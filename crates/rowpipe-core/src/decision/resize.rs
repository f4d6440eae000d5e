//! Resize decision engine.
//!
//! Given an input size and the caller's requirements, pick the cheapest
//! combination of decoder sampling, cropping and scaling that satisfies the
//! resize requirement. Every candidate sampling ratio (plus a baseline
//! without sampling) is evaluated in three stages:
//!
//! 1. **Sampling**: the decoder scales the image by the ratio (rounding up)
//! 2. **Cropping**: the crop, scaled by the same ratio, is applied
//! 3. **Scaling**: the cropped size is compared against the target
//!
//! Each candidate is rated and the lowest [`Rating`] wins. A candidate whose
//! arithmetic fails, whose crop resolves outside or to nothing, or whose
//! target is empty is rated [`PrimaryRating::Invalid`] instead of aborting
//! the search. An invalid decision keeps its crop requirement so that
//! planning can report why.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::{Ratio, RoundingMode, Size};
use crate::requirements::{CropRequirement, RequirementError, ResizeMode, ResizeRequirement};

/// Quality category of a resize plan. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PrimaryRating {
    /// The target is met exactly without scaling.
    Optimal = 0,
    /// Close enough to the target that scaling is skipped.
    GoodWithoutScaling = 1,
    /// The target is met by a final scaling stage.
    GoodWithScaling = 2,
    /// The image is smaller than the target and may not grow.
    BadTooSmall = 3,
    /// The plan could not be computed.
    Invalid = 10,
}

/// A `(primary, secondary)` rating compared lexicographically.
///
/// The secondary value is a relative size delta; smaller is better within
/// one primary category.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Rating {
    pub primary: PrimaryRating,
    pub secondary: f32,
}

impl Rating {
    pub const INVALID: Rating = Rating::new(PrimaryRating::Invalid, 0.0);

    pub const fn new(primary: PrimaryRating, secondary: f32) -> Self {
        Self { primary, secondary }
    }

    /// Strictly better (lower) than `other`.
    #[inline]
    pub fn is_better_than(&self, other: &Rating) -> bool {
        self < other
    }
}

/// The plan produced by [`calculate_resize_decision`].
///
/// Each stage size falls back to the previous stage when the stage is not
/// engaged, so `size_after_scaling` is always the final output size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeDecision {
    input_size: Size,
    rating: Rating,
    sampling_ratio: Option<Ratio>,
    size_after_sampling: Option<Size>,
    crop: Option<CropRequirement>,
    size_after_cropping: Option<Size>,
    size_after_scaling: Option<Size>,
}

impl ResizeDecision {
    /// An empty plan for `input_size`, rated invalid until evaluated.
    pub fn new(input_size: Size) -> Self {
        Self {
            input_size,
            rating: Rating::INVALID,
            sampling_ratio: None,
            size_after_sampling: None,
            crop: None,
            size_after_cropping: None,
            size_after_scaling: None,
        }
    }

    pub fn input_size(&self) -> Size {
        self.input_size
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn sampling_ratio(&self) -> Option<Ratio> {
        self.sampling_ratio
    }

    pub fn crop_requirement(&self) -> Option<&CropRequirement> {
        self.crop.as_ref()
    }

    pub fn should_sample(&self) -> bool {
        self.sampling_ratio.is_some()
    }

    pub fn should_crop(&self) -> bool {
        self.crop.is_some()
    }

    pub fn should_scale(&self) -> bool {
        self.size_after_scaling.is_some()
    }

    pub fn size_after_sampling(&self) -> Size {
        self.size_after_sampling.unwrap_or(self.input_size)
    }

    pub fn size_after_cropping(&self) -> Size {
        self.size_after_cropping
            .unwrap_or_else(|| self.size_after_sampling())
    }

    pub fn size_after_scaling(&self) -> Size {
        self.size_after_scaling
            .unwrap_or_else(|| self.size_after_cropping())
    }

    fn with_sampling(mut self, ratio: Ratio, size: Size) -> Self {
        self.sampling_ratio = Some(ratio);
        self.size_after_sampling = Some(size);
        self
    }

    fn with_cropping(mut self, crop: CropRequirement, size: Size) -> Self {
        self.crop = Some(crop);
        self.size_after_cropping = Some(size);
        self
    }

    fn with_scaling(mut self, size: Size) -> Self {
        self.size_after_scaling = Some(size);
        self
    }

    fn rated(mut self, primary: PrimaryRating, secondary: f32) -> Self {
        self.rating = Rating::new(primary, secondary);
        self
    }
}

/// Compute the best resize plan for `input_size`.
///
/// # Arguments
///
/// * `input_size` - Size of the image as stored
/// * `resize` - Optional target size and mode
/// * `sampling_ratios` - Ratios the decoder can downsample by for free
/// * `crop` - Optional crop, expressed against `input_size`
/// * `threshold` - Largest relative delta accepted without scaling
///
/// # Returns
///
/// The best-rated plan. Upscaling ratios are ignored and earlier candidates
/// win ties. Without a resize requirement the plan only crops.
pub fn calculate_resize_decision(
    input_size: Size,
    resize: Option<&ResizeRequirement>,
    sampling_ratios: &[Ratio],
    crop: Option<&CropRequirement>,
    threshold: f32,
) -> ResizeDecision {
    let Some(resize) = resize else {
        return crop_only_decision(input_size, crop);
    };

    let mut best = evaluate_candidate(input_size, resize, None, crop, threshold);
    for ratio in sampling_ratios.iter().filter(|r| !r.is_upscaling()) {
        let candidate = evaluate_candidate(input_size, resize, Some(*ratio), crop, threshold);
        if candidate.rating.is_better_than(&best.rating) {
            best = candidate;
        }
    }

    debug!(
        input = %input_size,
        target = %resize.target_size,
        rating = ?best.rating.primary,
        delta = best.rating.secondary,
        sampling = ?best.sampling_ratio,
        output = %best.size_after_scaling(),
        "resize decision"
    );
    best
}

fn crop_only_decision(input_size: Size, crop: Option<&CropRequirement>) -> ResizeDecision {
    let decision = ResizeDecision::new(input_size);
    let Some(crop) = crop else {
        return decision.rated(PrimaryRating::GoodWithoutScaling, 0.0);
    };
    match crop.apply(&input_size) {
        Ok(rect) => decision
            .with_cropping(*crop, rect.size)
            .rated(PrimaryRating::GoodWithoutScaling, 0.0),
        Err(err) => {
            debug!(input = %input_size, code = err.code(), "crop cannot be applied");
            // Keep the crop so the failure can be reported when planning
            let mut decision = decision;
            decision.crop = Some(*crop);
            decision
        }
    }
}

fn evaluate_candidate(
    input_size: Size,
    resize: &ResizeRequirement,
    ratio: Option<Ratio>,
    crop: Option<&CropRequirement>,
    threshold: f32,
) -> ResizeDecision {
    match try_evaluate_candidate(input_size, resize, ratio, crop, threshold) {
        Ok(decision) => {
            trace!(
                sampling = ?ratio,
                rating = ?decision.rating.primary,
                delta = decision.rating.secondary,
                "candidate rated"
            );
            decision
        }
        Err(err) => {
            trace!(sampling = ?ratio, code = err.code(), "candidate rejected");
            let mut decision = ResizeDecision::new(input_size);
            decision.sampling_ratio = ratio;
            decision.crop = crop.copied();
            decision
        }
    }
}

fn try_evaluate_candidate(
    input_size: Size,
    resize: &ResizeRequirement,
    ratio: Option<Ratio>,
    crop: Option<&CropRequirement>,
    threshold: f32,
) -> Result<ResizeDecision, RequirementError> {
    if resize.target_size.is_empty() {
        return Err(RequirementError::EmptyResizeTarget {
            size: resize.target_size,
        });
    }

    let mut decision = ResizeDecision::new(input_size);
    let mut crop = crop.copied();

    if let Some(ratio) = ratio {
        if ratio.is_zero() {
            return Err(RequirementError::InvalidRatio { ratio });
        }
        let sampled = input_size.scaled(ratio, RoundingMode::Up)?;
        decision = decision.with_sampling(ratio, sampled);
        crop = crop.map(|c| c.scaled(ratio)).transpose()?;
    }

    if let Some(crop) = crop {
        let rect = crop.apply(&decision.size_after_sampling())?;
        decision = decision.with_cropping(crop, rect.size);
    }

    scaling_stage(decision, resize, threshold)
}

/// `|1 - current / target|` along one axis.
#[inline]
fn relative_delta(current: u32, target: u32) -> f32 {
    (1.0 - current as f32 / target as f32).abs()
}

fn scaling_stage(
    decision: ResizeDecision,
    resize: &ResizeRequirement,
    threshold: f32,
) -> Result<ResizeDecision, RequirementError> {
    let current = decision.size_after_cropping();
    let target = resize.target_size;

    if current == target {
        return Ok(decision.rated(PrimaryRating::Optimal, 0.0));
    }

    let fits = current.fits_within(&target);
    let delta_w = relative_delta(current.width, target.width);
    let delta_h = relative_delta(current.height, target.height);
    let min_delta = delta_w.min(delta_h);
    let max_delta = delta_w.max(delta_h);
    let within_threshold = min_delta <= threshold;

    // Close enough in the direction the mode tolerates
    if within_threshold
        && ((fits && resize.mode == ResizeMode::ExactOrSmaller)
            || (!fits && resize.mode == ResizeMode::ExactOrLarger))
    {
        return Ok(decision.rated(PrimaryRating::GoodWithoutScaling, min_delta));
    }

    if !fits {
        let scaled = current.downscaled_to_fit(&target, RoundingMode::Nearest)?;
        return Ok(decision
            .with_scaling(scaled)
            .rated(PrimaryRating::GoodWithScaling, max_delta));
    }

    Ok(decision.rated(PrimaryRating::BadTooSmall, min_delta))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn size_strategy() -> impl Strategy<Value = Size> {
        (1u32..=8000, 1u32..=8000).prop_map(|(w, h)| Size::new(w, h))
    }

    fn ratio_strategy() -> impl Strategy<Value = Ratio> {
        (1u32..=16, 1u32..=16).prop_map(|(n, d)| Ratio::new(n, d))
    }

    proptest! {
        /// Property: without a requirement nothing happens.
        #[test]
        fn prop_no_requirement_is_identity(size in size_strategy()) {
            let decision = calculate_resize_decision(size, None, &[], None, 0.25);
            prop_assert!(!decision.should_sample());
            prop_assert!(!decision.should_crop());
            prop_assert!(!decision.should_scale());
            prop_assert_eq!(decision.size_after_scaling(), size);
        }

        /// Property: an exact target equal to the input is optimal.
        #[test]
        fn prop_exact_match_is_optimal(size in size_strategy()) {
            let decision = calculate_resize_decision(
                size, Some(&ResizeRequirement::exact(size)), &[], None, 0.25,
            );
            prop_assert_eq!(decision.rating().primary, PrimaryRating::Optimal);
            prop_assert!(!decision.should_scale());
        }

        /// Property: larger inputs with no ratios are scaled to fit.
        #[test]
        fn prop_larger_input_scales_to_fit(size in size_strategy(), target in size_strategy()) {
            prop_assume!(!size.fits_within(&target));
            let decision = calculate_resize_decision(
                size, Some(&ResizeRequirement::exact_or_smaller(target)), &[], None, 0.25,
            );
            let expected = size.downscaled_to_fit(&target, RoundingMode::Nearest).unwrap();
            prop_assert_eq!(decision.rating().primary, PrimaryRating::GoodWithScaling);
            prop_assert_eq!(decision.size_after_scaling(), expected);
        }

        /// Property: ExactOrSmaller never produces an output larger than the input.
        #[test]
        fn prop_never_upscales(size in size_strategy(), target in size_strategy()) {
            let decision = calculate_resize_decision(
                size, Some(&ResizeRequirement::exact_or_smaller(target)), &[], None, 0.25,
            );
            prop_assert!(decision.size_after_scaling().fits_within(&size));
        }

        /// Property: adding candidates never makes the result worse.
        #[test]
        fn prop_candidates_never_worsen_rating(
            size in size_strategy(),
            target in size_strategy(),
            ratios in prop::collection::vec(ratio_strategy(), 0..6),
        ) {
            let resize = ResizeRequirement::exact_or_smaller(target);
            let baseline = calculate_resize_decision(size, Some(&resize), &[], None, 0.25);
            let best = calculate_resize_decision(size, Some(&resize), &ratios, None, 0.25);
            prop_assert!(!baseline.rating().is_better_than(&best.rating()));
        }

        /// Property: each stage derives from the one before it.
        #[test]
        fn prop_stage_sizes_chain(
            size in size_strategy(),
            target in size_strategy(),
            ratios in prop::collection::vec(ratio_strategy(), 0..6),
        ) {
            let decision = calculate_resize_decision(
                size, Some(&ResizeRequirement::exact_or_smaller(target)), &ratios, None, 0.25,
            );
            if let Some(ratio) = decision.sampling_ratio() {
                prop_assert!(!ratio.is_upscaling());
                prop_assert_eq!(
                    decision.size_after_sampling(),
                    size.scaled(ratio, RoundingMode::Up).unwrap()
                );
            } else {
                prop_assert_eq!(decision.size_after_sampling(), size);
            }
            prop_assert_eq!(decision.size_after_cropping(), decision.size_after_sampling());
        }

        /// Property: ratings stay finite, and empty targets are invalid.
        #[test]
        fn prop_rating_is_finite(
            size in size_strategy(),
            width in 0u32..=64,
            height in 0u32..=64,
            ratios in prop::collection::vec(ratio_strategy(), 0..4),
        ) {
            let target = Size::new(width, height);
            for resize in [
                ResizeRequirement::exact(target),
                ResizeRequirement::exact_or_smaller(target),
                ResizeRequirement::exact_or_larger(target),
            ] {
                let decision = calculate_resize_decision(size, Some(&resize), &ratios, None, 0.25);
                prop_assert!(decision.rating().secondary.is_finite());
                if target.is_empty() {
                    prop_assert_eq!(decision.rating(), Rating::INVALID);
                }
            }
        }
    }
}
