use crate::geometry::Size;
use crate::pixel::{PixelSpecification, Scanline};
use crate::proc::rows::RowStore;

/// The four source indices around one output coordinate and the fractional
/// offset between the middle two.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Taps {
    indices: [u32; 4],
    delta: f32,
}

impl Taps {
    /// Taps for output coordinate `out` along an axis of `extent` source
    /// pixels scaled by `scale`.
    fn new(out: u32, scale: f32, extent: u32) -> Self {
        let last = extent - 1;
        let middle = 0.5 * (2 * out + 1) as f32 / scale;
        let logical = (middle - 0.5).clamp(0.0, extent as f32);

        let i1 = (logical.floor() as u32).min(last);
        let i2 = if i1 < last { i1 + 1 } else { i1 };
        let i0 = i1.saturating_sub(1);
        let i3 = if i2 < last { i2 + 1 } else { i2 };
        let delta = if i1 == i2 { 0.0 } else { logical - i1 as f32 };

        Self {
            indices: [i0, i1, i2, i3],
            delta,
        }
    }
}

/// Cubic Hermite interpolation between `p1` and `p2` at `t`.
#[inline]
fn hermite(t: f32, p0: f32, p1: f32, p2: f32, p3: f32) -> f32 {
    let b = p2 - p0;
    let c = 2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3;
    let d = 3.0 * (p1 - p2) + p3 - p0;
    p1 + 0.5 * t * (b + t * (c + t * d))
}

#[inline]
fn to_byte(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Row-streaming bicubic resampler.
#[derive(Debug)]
pub(super) struct BicubicSampler {
    bytes_per_pixel: usize,
    input_size: Size,
    output_size: Size,
    scale_y: f32,
    columns: Vec<Taps>,
    rows: RowStore,
    next_output_row: u32,
}

impl BicubicSampler {
    pub fn new(bytes_per_pixel: usize, input_size: Size, output_size: Size) -> Self {
        let scale_x = output_size.width as f32 / input_size.width as f32;
        let columns = (0..output_size.width)
            .map(|x| Taps::new(x, scale_x, input_size.width))
            .collect();
        Self {
            bytes_per_pixel,
            input_size,
            output_size,
            scale_y: output_size.height as f32 / input_size.height as f32,
            columns,
            rows: RowStore::with_height(input_size.height),
            next_output_row: 0,
        }
    }

    pub fn push(&mut self, scanline: Scanline) {
        self.rows.push(scanline);
    }

    pub fn next_row(&mut self, specification: PixelSpecification) -> Option<Scanline> {
        if self.next_output_row >= self.output_size.height {
            return None;
        }

        let taps = Taps::new(self.next_output_row, self.scale_y, self.input_size.height);
        let [y0, _, _, y3] = taps.indices;

        // Earlier output rows never look below y0
        self.rows.retire_below(y0);
        if self.rows.received() <= y3 {
            return None;
        }

        let source = taps.indices.map(|y| self.rows.get(y));
        let bpp = self.bytes_per_pixel;
        let mut output = Scanline::new(specification, self.output_size.width);
        let data = output.data_mut();

        for (x, column) in self.columns.iter().enumerate() {
            let [x0, x1, x2, x3] = column.indices;
            for component in 0..bpp {
                let horizontal = source.map(|row| {
                    let at = |i: u32| row.data()[i as usize * bpp + component] as f32;
                    to_byte(hermite(column.delta, at(x0), at(x1), at(x2), at(x3))) as f32
                });
                let [h0, h1, h2, h3] = horizontal;
                data[x * bpp + component] = to_byte(hermite(taps.delta, h0, h1, h2, h3));
            }
        }

        self.next_output_row += 1;
        if self.next_output_row == self.output_size.height {
            self.rows.retire_all();
        }
        Some(output)
    }

    pub fn buffered_rows(&self) -> usize {
        self.rows.buffered()
    }

    pub fn peak_buffered_rows(&self) -> usize {
        self.rows.peak()
    }
}
