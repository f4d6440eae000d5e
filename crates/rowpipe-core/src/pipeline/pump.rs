use tracing::{debug, trace};

use super::{PipelineError, ScanlineSink, ScanlineSource, TransformPlan};
use crate::proc::{Block, ScanlineConverter};

/// Drives rows from a source through a chain of blocks into a sink.
pub struct ScanlinePump<S, K> {
    source: S,
    blocks: Vec<Block>,
    converter: ScanlineConverter,
    sink: K,
    input_rows: u32,
    peak_buffered_rows: usize,
}

impl<S: ScanlineSource, K: ScanlineSink> ScanlinePump<S, K> {
    pub fn new(
        source: S,
        blocks: Vec<Block>,
        converter: ScanlineConverter,
        sink: K,
        input_rows: u32,
    ) -> Self {
        Self {
            source,
            blocks,
            converter,
            sink,
            input_rows,
            peak_buffered_rows: 0,
        }
    }

    /// Pump that reads `plan.input_size().height` rows.
    pub fn from_plan(source: S, plan: TransformPlan, sink: K) -> Self {
        let input_rows = plan.input_size().height;
        let (blocks, converter) = plan.into_parts();
        Self::new(source, blocks, converter, sink, input_rows)
    }

    /// Pull every input row and push it down the chain.
    ///
    /// After each row, every block is drained in order so that rows reach
    /// the sink as early as each block allows.
    ///
    /// # Returns
    ///
    /// The number of rows written to the sink.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::SourceUnderrun` when the source ends early,
    /// and propagates source and sink errors.
    pub fn pump_all(&mut self) -> Result<u32, PipelineError> {
        let mut written = 0;
        for received in 0..self.input_rows {
            let Some(scanline) = self.source.read_scanline()? else {
                return Err(PipelineError::SourceUnderrun {
                    expected: self.input_rows,
                    received,
                });
            };
            trace!(row = received, "pumping scanline");

            match self.blocks.first_mut() {
                Some(first) => first.consume(scanline),
                None => {
                    self.sink.write_scanline(self.converter.convert(scanline))?;
                    written += 1;
                }
            }
            written += self.drain()?;
        }

        debug!(
            input_rows = self.input_rows,
            written,
            peak_buffered_rows = self.peak_buffered_rows,
            "pump finished"
        );
        Ok(written)
    }

    fn drain(&mut self) -> Result<u32, PipelineError> {
        let buffered: usize = self.blocks.iter().map(Block::buffered_rows).sum();
        self.peak_buffered_rows = self.peak_buffered_rows.max(buffered);

        let mut written = 0;
        for index in 0..self.blocks.len() {
            let (upstream, downstream) = self.blocks.split_at_mut(index + 1);
            let block = &mut upstream[index];
            while let Some(row) = block.produce() {
                match downstream.first_mut() {
                    Some(next) => next.consume(row),
                    None => {
                        self.sink.write_scanline(self.converter.convert(row))?;
                        written += 1;
                    }
                }
            }
        }
        Ok(written)
    }

    /// Largest number of rows held across all blocks between two reads.
    pub fn peak_buffered_rows(&self) -> usize {
        self.peak_buffered_rows
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }
}
