//! Scaling block and its resampling strategies.
//!
//! The strategy is fixed at construction:
//!
//! - **Pass-through** when input and output sizes match
//! - **Bicubic**: row-streaming cubic Hermite interpolation
//! - **Magic Kernel**: whole-frame resampling followed by a sharpening pass

mod bicubic;
mod magic_kernel;

use std::collections::VecDeque;

use tracing::debug;

use self::bicubic::BicubicSampler;
use self::magic_kernel::MagicKernelSampler;
use super::{assert_input, BlockError};
use crate::config::SamplingMethod;
use crate::geometry::Size;
use crate::pixel::{PixelSpecification, Scanline};

#[derive(Debug)]
enum Sampler {
    PassThrough {
        pending: VecDeque<Scanline>,
        received: u32,
    },
    Bicubic(BicubicSampler),
    MagicKernel(MagicKernelSampler),
}

/// Resizes a frame from `input_size` to `output_size`.
#[derive(Debug)]
pub struct ScalingBlock {
    specification: PixelSpecification,
    input_size: Size,
    output_size: Size,
    sampler: Sampler,
}

impl ScalingBlock {
    /// # Errors
    ///
    /// Returns `BlockError::EmptyInput` or `BlockError::EmptyScalingSize`
    /// when either size has no pixels.
    pub fn new(
        specification: PixelSpecification,
        input_size: Size,
        output_size: Size,
        method: SamplingMethod,
    ) -> Result<Self, BlockError> {
        if input_size.is_empty() {
            return Err(BlockError::EmptyInput { size: input_size });
        }
        if output_size.is_empty() {
            return Err(BlockError::EmptyScalingSize {
                input: input_size,
                output: output_size,
            });
        }

        let bytes_per_pixel = specification.bytes_per_pixel as usize;
        let sampler = if input_size == output_size {
            Sampler::PassThrough {
                pending: VecDeque::with_capacity(1),
                received: 0,
            }
        } else {
            match method {
                SamplingMethod::Bicubic => Sampler::Bicubic(BicubicSampler::new(
                    bytes_per_pixel,
                    input_size,
                    output_size,
                )),
                SamplingMethod::MagicKernel => Sampler::MagicKernel(MagicKernelSampler::new(
                    bytes_per_pixel,
                    input_size,
                    output_size,
                )),
            }
        };

        debug!(
            input = %input_size,
            output = %output_size,
            strategy = sampler.name(),
            "scaling block"
        );
        Ok(Self {
            specification,
            input_size,
            output_size,
            sampler,
        })
    }

    pub fn consume(&mut self, scanline: Scanline) {
        assert_input(&scanline, self.specification, self.input_size.width);
        match &mut self.sampler {
            Sampler::PassThrough { pending, received } => {
                assert!(
                    *received < self.input_size.height,
                    "scaling block received more than {} rows",
                    self.input_size.height
                );
                *received += 1;
                pending.push_back(scanline);
            }
            Sampler::Bicubic(sampler) => sampler.push(scanline),
            Sampler::MagicKernel(sampler) => sampler.push(scanline),
        }
    }

    pub fn produce(&mut self) -> Option<Scanline> {
        match &mut self.sampler {
            Sampler::PassThrough { pending, .. } => pending.pop_front(),
            Sampler::Bicubic(sampler) => sampler.next_row(self.specification),
            Sampler::MagicKernel(sampler) => sampler.next_row(self.specification),
        }
    }

    pub fn buffered_rows(&self) -> usize {
        match &self.sampler {
            Sampler::PassThrough { pending, .. } => pending.len(),
            Sampler::Bicubic(sampler) => sampler.buffered_rows(),
            Sampler::MagicKernel(sampler) => sampler.buffered_rows(),
        }
    }

    /// Largest number of input rows held at once by a resampling strategy.
    pub fn peak_buffered_rows(&self) -> usize {
        match &self.sampler {
            Sampler::PassThrough { .. } => usize::from(self.input_size.height > 0),
            Sampler::Bicubic(sampler) => sampler.peak_buffered_rows(),
            Sampler::MagicKernel(sampler) => sampler.peak_buffered_rows(),
        }
    }

    pub fn specification(&self) -> PixelSpecification {
        self.specification
    }

    pub fn output_size(&self) -> Size {
        self.output_size
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self.sampler, Sampler::PassThrough { .. })
    }
}

impl Sampler {
    fn name(&self) -> &'static str {
        match self {
            Sampler::PassThrough { .. } => "pass_through",
            Sampler::Bicubic(_) => "bicubic",
            Sampler::MagicKernel(_) => "magic_kernel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proc::test_support::{counting_gray_rows, run_block, uniform_rows};
    use crate::proc::Block;

    fn scale(
        method: SamplingMethod,
        specification: PixelSpecification,
        input: Size,
        output: Size,
        rows: Vec<Scanline>,
    ) -> Vec<Scanline> {
        let mut block =
            Block::from(ScalingBlock::new(specification, input, output, method).unwrap());
        run_block(&mut block, rows)
    }

    #[test]
    fn test_same_size_is_lossless() {
        let size = Size::new(3, 3);
        for method in [SamplingMethod::Bicubic, SamplingMethod::MagicKernel] {
            let block = ScalingBlock::new(PixelSpecification::GRAY, size, size, method).unwrap();
            assert!(block.is_pass_through());

            let input = counting_gray_rows(size, 1);
            let output = scale(method, PixelSpecification::GRAY, size, size, input.clone());
            assert_eq!(output, input);
        }
    }

    #[test]
    fn test_pass_through_streams_rows() {
        let size = Size::new(2, 2);
        let mut block = ScalingBlock::new(
            PixelSpecification::GRAY,
            size,
            size,
            SamplingMethod::MagicKernel,
        )
        .unwrap();
        for row in counting_gray_rows(size, 0) {
            block.consume(row);
            assert!(block.produce().is_some());
            assert!(block.produce().is_none());
        }
    }

    #[test]
    fn test_uniform_image_stays_uniform() {
        let input = Size::new(8, 6);
        let output = Size::new(3, 2);
        for method in [SamplingMethod::Bicubic, SamplingMethod::MagicKernel] {
            let rows = uniform_rows(PixelSpecification::RGB, input, &[32, 64, 128]);
            let scaled = scale(method, PixelSpecification::RGB, input, output, rows);
            assert_eq!(scaled.len(), 2, "{method:?}");
            for row in scaled {
                assert_eq!(row.data(), [32, 64, 128].repeat(3).as_slice(), "{method:?}");
            }
        }
    }

    #[test]
    fn test_rejects_empty_output() {
        let err = ScalingBlock::new(
            PixelSpecification::GRAY,
            Size::new(4, 4),
            Size::new(0, 2),
            SamplingMethod::Bicubic,
        )
        .unwrap_err();
        assert_eq!(err.code(), "scaling_block_empty_output_size");
    }

    #[test]
    fn test_upscaling_produces_every_row() {
        let input = Size::new(3, 3);
        let output = Size::new(7, 5);
        for method in [SamplingMethod::Bicubic, SamplingMethod::MagicKernel] {
            let rows = uniform_rows(PixelSpecification::GRAY, input, &[90]);
            let scaled = scale(method, PixelSpecification::GRAY, input, output, rows);
            assert_eq!(scaled.len(), 5);
            assert!(scaled.iter().all(|row| row.width() == 7));
            assert!(scaled.iter().all(|row| row.data().iter().all(|&v| v == 90)));
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::proc::test_support::{run_block, uniform_rows};
    use crate::proc::Block;
    use proptest::prelude::*;

    fn size_strategy() -> impl Strategy<Value = Size> {
        (1u32..=24, 1u32..=24).prop_map(|(w, h)| Size::new(w, h))
    }

    proptest! {
        /// Property: every strategy emits exactly the output height, each row at the output width.
        #[test]
        fn prop_output_shape(
            input in size_strategy(),
            output in size_strategy(),
            bicubic in any::<bool>(),
        ) {
            let method = if bicubic { SamplingMethod::Bicubic } else { SamplingMethod::MagicKernel };
            let mut block = Block::from(
                ScalingBlock::new(PixelSpecification::GRAY, input, output, method).unwrap(),
            );
            let rows = uniform_rows(PixelSpecification::GRAY, input, &[7]);
            let scaled = run_block(&mut block, rows);
            prop_assert_eq!(scaled.len() as u32, output.height);
            prop_assert!(scaled.iter().all(|row| row.width() == output.width));
            prop_assert_eq!(block.buffered_rows(), 0);
        }

        /// Property: a uniform frame stays uniform under either strategy.
        #[test]
        fn prop_uniform_frames_stay_uniform(
            input in size_strategy(),
            output in size_strategy(),
            value in any::<u8>(),
            bicubic in any::<bool>(),
        ) {
            let method = if bicubic { SamplingMethod::Bicubic } else { SamplingMethod::MagicKernel };
            let mut block = Block::from(
                ScalingBlock::new(PixelSpecification::GRAY, input, output, method).unwrap(),
            );
            let scaled = run_block(&mut block, uniform_rows(PixelSpecification::GRAY, input, &[value]));
            for row in scaled {
                prop_assert!(row.data().iter().all(|&v| v == value));
            }
        }
    }
}
