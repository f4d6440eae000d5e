use tracing::debug;

use super::PipelineError;
use crate::config::Configuration;
use crate::decision::{OrientationDecision, PrimaryRating, ResizeDecision};
use crate::geometry::Size;
use crate::pixel::PixelSpecification;
use crate::proc::{Block, CroppingBlock, RotationBlock, ScalingBlock, ScanlineConverter};

/// The blocks and converter that realize a pair of decisions.
///
/// The source is expected to deliver rows at `size_after_sampling`, i.e. any
/// sampling ratio has already been applied by the decoder.
#[derive(Debug)]
pub struct TransformPlan {
    blocks: Vec<Block>,
    converter: ScanlineConverter,
    input_size: Size,
    output_size: Size,
}

impl TransformPlan {
    /// Assemble blocks in the order cropping, scaling, rotation, followed by
    /// conversion from `input_specification` to `output_specification`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Requirement` when the decision's crop cannot
    /// be applied, `PipelineError::InvalidDecision` when the decision is
    /// rated invalid for any other reason, and `PipelineError::Block` when a
    /// block rejects its sizes or the specifications have no conversion path.
    pub fn build(
        resize: &ResizeDecision,
        orientation: &OrientationDecision,
        input_specification: PixelSpecification,
        output_specification: PixelSpecification,
        configuration: &Configuration,
    ) -> Result<Self, PipelineError> {
        if resize.rating().primary == PrimaryRating::Invalid {
            if let Some(crop) = resize.crop_requirement() {
                crop.apply(&resize.input_size())?;
            }
            return Err(PipelineError::InvalidDecision {
                input: resize.input_size(),
            });
        }

        let input_size = resize.size_after_sampling();
        let mut blocks: Vec<Block> = Vec::new();
        let mut size = input_size;

        if let Some(crop) = resize.crop_requirement() {
            let rect = crop.apply(&size)?;
            let block = CroppingBlock::new(input_specification, size, rect)?;
            size = block.output_size();
            blocks.push(block.into());
        }

        if resize.should_scale() {
            let block = ScalingBlock::new(
                input_specification,
                size,
                resize.size_after_scaling(),
                configuration.sampling_method,
            )?;
            size = block.output_size();
            blocks.push(block.into());
        }

        if orientation.should_rotate_pixels() {
            let block = RotationBlock::new(input_specification, size, orientation.orientation)?;
            size = block.output_size();
            blocks.push(block.into());
        }

        let converter = ScanlineConverter::new(
            input_specification,
            output_specification,
            configuration.background_color,
        )?;

        debug!(
            input = %input_size,
            output = %size,
            blocks = ?blocks.iter().map(Block::name).collect::<Vec<_>>(),
            "transform plan"
        );
        Ok(Self {
            blocks,
            converter,
            input_size,
            output_size: size,
        })
    }

    /// Rows the source must deliver.
    pub fn input_size(&self) -> Size {
        self.input_size
    }

    /// Size of the frame handed to the sink.
    pub fn output_size(&self) -> Size {
        self.output_size
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn converter(&self) -> &ScanlineConverter {
        &self.converter
    }

    pub fn into_parts(self) -> (Vec<Block>, ScanlineConverter) {
        (self.blocks, self.converter)
    }
}
