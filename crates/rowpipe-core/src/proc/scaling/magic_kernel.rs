//! Magic Kernel resampling with Q11 fixed-point arithmetic.
//!
//! Output is only emitted once the whole frame has arrived. The frame is then
//! streamed through three stages, one row at a time:
//!
//! 1. horizontal resampling of each input row, after which the row is freed
//! 2. vertical resampling over a sliding window of horizontal rows
//! 3. the separable 3-tap sharpener over a window of three rows
//!
//! Intermediate values are Q11: a pixel value `v` is stored as `v * 2048`.

use std::collections::VecDeque;

use tracing::debug;

use crate::geometry::Size;
use crate::pixel::{PixelSpecification, Scanline};
use crate::proc::rows::RowStore;

const Q11_SHIFT: u32 = 11;
const Q11_ONE: i32 = 1 << Q11_SHIFT;
const KERNEL_SUPPORT: f64 = 3.0;
const SHARPEN_Q11: [i32; 3] = [-506, 3060, -506];

/// A source index and its Q11 weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Contribution {
    index: usize,
    weight: i32,
}

/// Magic Kernel weight at distance `z` from the sample center.
fn kernel_weight(z: f64) -> f64 {
    if !(-1.5..=1.5).contains(&z) {
        0.0
    } else if z < -0.5 {
        0.5 * (z + 1.5) * (z + 1.5)
    } else if z < 0.5 {
        0.75 - z * z
    } else {
        0.5 * (z - 1.5) * (z - 1.5)
    }
}

/// Contributions for every output coordinate along one axis.
///
/// Weights are normalized and quantized so that each list sums to exactly
/// `Q11_ONE`; the rounding remainder goes to the heaviest tap. Indices within
/// a list are ascending.
fn contributions(source: u32, destination: u32) -> Vec<Vec<Contribution>> {
    let scale = destination as f64 / source as f64;
    let half_width = KERNEL_SUPPORT * 0.5 / scale;
    let last = source as i64 - 1;

    (0..destination)
        .map(|c| {
            let center = (c as f64 + 0.5) / scale - 0.5;
            let left = (center - half_width).floor() as i64;
            let right = (center + half_width).ceil() as i64;

            let taps: Vec<(usize, f64)> = (left..=right)
                .filter_map(|j| {
                    let weight = kernel_weight((center - j as f64) * scale);
                    (weight > 0.0).then_some((j.clamp(0, last) as usize, weight))
                })
                .collect();

            let total: f64 = taps.iter().map(|(_, w)| w).sum();
            if taps.is_empty() || total <= 0.0 {
                let nearest = center.round().clamp(0.0, last as f64) as usize;
                return vec![Contribution {
                    index: nearest,
                    weight: Q11_ONE,
                }];
            }

            let mut list: Vec<Contribution> = taps
                .iter()
                .map(|&(index, weight)| Contribution {
                    index,
                    weight: (weight / total * Q11_ONE as f64).round() as i32,
                })
                .collect();

            let sum: i32 = list.iter().map(|c| c.weight).sum();
            if let Some(heaviest) = list.iter_mut().max_by_key(|c| c.weight) {
                heaviest.weight += Q11_ONE - sum;
            }
            list
        })
        .collect()
}

/// For each output row, the lowest source row it or any later row reads.
fn first_needed_rows(lists: &[Vec<Contribution>]) -> Vec<usize> {
    let mut lowest = usize::MAX;
    let mut firsts: Vec<usize> = lists
        .iter()
        .rev()
        .map(|list| {
            let first = list.iter().map(|c| c.index).min().unwrap_or(0);
            lowest = lowest.min(first);
            lowest
        })
        .collect();
    firsts.reverse();
    firsts
}

/// `value * weight` in Q11, widened to avoid overflow.
#[inline]
fn q11_mul(value: i32, weight: i32) -> i32 {
    ((value as i64 * weight as i64) >> Q11_SHIFT) as i32
}

/// Resample one row of bytes horizontally into Q11.
fn resample_row(source: &[u8], lists: &[Vec<Contribution>], bpp: usize) -> Vec<i32> {
    let mut row = vec![0i32; lists.len() * bpp];
    for (x, list) in lists.iter().enumerate() {
        let target = &mut row[x * bpp..(x + 1) * bpp];
        for c in list {
            let pixel = &source[c.index * bpp..(c.index + 1) * bpp];
            for (acc, &value) in target.iter_mut().zip(pixel) {
                *acc += value as i32 * c.weight;
            }
        }
    }
    row
}

/// Combine buffered horizontal rows into one vertically resampled row.
fn combine_rows(rows: &RowStore<Vec<i32>>, list: &[Contribution], pitch: usize) -> Vec<i32> {
    let mut row = vec![0i32; pitch];
    for c in list {
        for (acc, &value) in row.iter_mut().zip(rows.get(c.index as u32)) {
            *acc += q11_mul(value, c.weight);
        }
    }
    row
}

/// Separable 3-tap sharpener with edge clamping.
///
/// Rows are sharpened horizontally on arrival; the vertical pass for row `o`
/// runs once row `o + 1` is in, so at most three rows are held.
#[derive(Debug)]
struct Sharpener {
    width: usize,
    bpp: usize,
    window: VecDeque<Vec<i32>>,
    pushed: usize,
    emitted: usize,
    peak: usize,
}

impl Sharpener {
    fn new(width: usize, bpp: usize) -> Self {
        Self {
            width,
            bpp,
            window: VecDeque::with_capacity(3),
            pushed: 0,
            emitted: 0,
            peak: 0,
        }
    }

    fn push(&mut self, row: Vec<i32>) -> Option<Vec<i32>> {
        let sharpened = self.sharpen_horizontally(&row);
        self.window.push_back(sharpened);
        self.pushed += 1;
        self.peak = self.peak.max(self.window.len());
        (self.pushed > self.emitted + 1).then(|| self.emit())
    }

    /// The last row, once every row has been pushed.
    fn finish(&mut self) -> Option<Vec<i32>> {
        (self.emitted < self.pushed).then(|| self.emit())
    }

    fn sharpen_horizontally(&self, row: &[i32]) -> Vec<i32> {
        let (width, bpp) = (self.width, self.bpp);
        let mut out = vec![0i32; row.len()];
        for x in 0..width {
            let left = x.saturating_sub(1);
            let right = (x + 1).min(width - 1);
            for k in 0..bpp {
                out[x * bpp + k] = q11_mul(row[left * bpp + k], SHARPEN_Q11[0])
                    + q11_mul(row[x * bpp + k], SHARPEN_Q11[1])
                    + q11_mul(row[right * bpp + k], SHARPEN_Q11[2]);
            }
        }
        out
    }

    // Window holds rows [o - 1 (unless o is 0), o, o + 1 (if pushed)]
    fn emit(&mut self) -> Vec<i32> {
        let has_above = self.emitted > 0;
        let center = usize::from(has_above);
        let row = &self.window[center];
        let above = &self.window[0];
        let below = self.window.get(center + 1).unwrap_or(row);

        let out = above
            .iter()
            .zip(row)
            .zip(below)
            .map(|((&a, &r), &b)| {
                q11_mul(a, SHARPEN_Q11[0]) + q11_mul(r, SHARPEN_Q11[1]) + q11_mul(b, SHARPEN_Q11[2])
            })
            .collect();

        self.emitted += 1;
        if has_above {
            self.window.pop_front();
        }
        out
    }
}

/// Whole-frame Magic Kernel resampler.
#[derive(Debug)]
pub(super) struct MagicKernelSampler {
    bytes_per_pixel: usize,
    input_size: Size,
    output_size: Size,
    rows: RowStore,
    output: VecDeque<Scanline>,
    done: bool,
    /// Most intermediate Q11 rows held at once while resampling.
    peak_intermediate_rows: usize,
}

impl MagicKernelSampler {
    pub fn new(bytes_per_pixel: usize, input_size: Size, output_size: Size) -> Self {
        Self {
            bytes_per_pixel,
            input_size,
            output_size,
            rows: RowStore::with_height(input_size.height),
            output: VecDeque::new(),
            done: false,
            peak_intermediate_rows: 0,
        }
    }

    pub fn push(&mut self, scanline: Scanline) {
        self.rows.push(scanline);
    }

    pub fn next_row(&mut self, specification: PixelSpecification) -> Option<Scanline> {
        if !self.done && self.rows.is_complete() {
            self.run(specification);
            self.done = true;
        }
        self.output.pop_front()
    }

    fn run(&mut self, specification: PixelSpecification) {
        let bpp = self.bytes_per_pixel;
        let width = self.output_size.width;
        let pitch = width as usize * bpp;

        let x_contributions = contributions(self.input_size.width, self.output_size.width);
        let y_contributions = contributions(self.input_size.height, self.output_size.height);
        let first_needed = first_needed_rows(&y_contributions);

        let mut horizontal: RowStore<Vec<i32>> = RowStore::with_height(self.input_size.height);
        let mut sharpener = Sharpener::new(width as usize, bpp);
        let mut next = 0;

        let to_scanline = |row: Vec<i32>| {
            let mut scanline = Scanline::new(specification, width);
            for (byte, value) in scanline.data_mut().iter_mut().zip(row) {
                *byte = ((value + (Q11_ONE >> 1)) >> Q11_SHIFT).clamp(0, 255) as u8;
            }
            scanline
        };

        for y in 0..self.input_size.height {
            horizontal.push(resample_row(self.rows.get(y).data(), &x_contributions, bpp));
            self.rows.retire_below(y + 1);

            while let Some(list) = y_contributions.get(next) {
                let ready = list.iter().all(|c| c.index <= y as usize);
                if !ready {
                    break;
                }
                let resampled = combine_rows(&horizontal, list, pitch);
                next += 1;
                if let Some(&keep) = first_needed.get(next) {
                    horizontal.retire_below(keep as u32);
                }
                if let Some(row) = sharpener.push(resampled) {
                    self.output.push_back(to_scanline(row));
                }
            }
        }
        horizontal.retire_all();
        if let Some(row) = sharpener.finish() {
            self.output.push_back(to_scanline(row));
        }

        self.peak_intermediate_rows = horizontal.peak() + sharpener.peak;
        debug!(
            input = %self.input_size,
            output = %self.output_size,
            peak_intermediate_rows = self.peak_intermediate_rows,
            "magic kernel resampled"
        );
    }

    pub fn buffered_rows(&self) -> usize {
        self.rows.buffered() + self.output.len()
    }

    pub fn peak_buffered_rows(&self) -> usize {
        self.rows.peak()
    }
}
