// strategy/linear.rs — Single linear scratch buffer, three passes.
//
//   1. Extract:    packed source rows → scratch, channels reordered to RGB.
//   2. Convolve:   in place inside scratch, offsets computed by hand:
//                    offset = y * width * 3 + x * 3 + channel
//   3. Write-back: interior pixels of scratch → source rows, in the
//                  source's channel order. The border is left alone.
//
// IN-PLACE ORDERING
// Output row y reads source rows y-r ..= y+r. If row y were stored into
// scratch right away, the next row would read an already-blurred row y and
// the result would drift from the reference. So finished rows wait in a
// ring of r + 1 pending rows and are committed only once the sweep has
// moved past every row that reads them:
//
//   after computing row y  →  commit row y - r
//
// Writes trail reads by exactly the kernel radius. Channels are swept one
// at a time (channel-major), and a channel's commits never touch the bytes
// another channel reads.
//
// The pass structure is shared with PooledRowStrategy; the two differ only
// in where their row buffers come from (`RowSource`).

use std::collections::VecDeque;

use log::debug;

use super::{check_interior, ConvolutionStrategy};
use crate::error::ConvolveResult;
use crate::kernel::ConvolutionKernel;
use crate::pixel_buffer::{PixelBuffer, BYTES_PER_PIXEL};
use crate::plane::quantize_u8;
use crate::pool::{FreshRows, RowSlot, RowSource};
use crate::result::ConvolutionResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearMemoryStrategy;

impl ConvolutionStrategy for LinearMemoryStrategy {
    fn name(&self) -> &'static str {
        "linear_memory"
    }

    fn convolve(
        &self,
        buffer: &mut PixelBuffer<'_>,
        kernel: &ConvolutionKernel,
    ) -> ConvolveResult<ConvolutionResult> {
        let mut rows = FreshRows::default();
        run_linear(self.name(), buffer, kernel, &mut rows)
    }
}

/// Extract → convolve in place → write back, staging rows through `rows`.
pub(super) fn run_linear<R: RowSource>(
    name: &str,
    buffer: &mut PixelBuffer<'_>,
    kernel: &ConvolutionKernel,
    rows: &mut R,
) -> ConvolveResult<ConvolutionResult> {
    let (w, h, r) = (buffer.width(), buffer.height(), kernel.radius());
    check_interior(w, h, r)?;
    debug!("{name}: {w}x{h}, radius {r}");

    let mut raster = buffer.lock();
    let row_len = w * BYTES_PER_PIXEL;
    let offsets = [
        raster.channel_offset(0),
        raster.channel_offset(1),
        raster.channel_offset(2),
    ];

    // Pass 1: extract.
    let mut scratch = vec![0u8; h * row_len];
    for y in 0..h {
        let staging = rows.take_row(row_len);
        rows.row_mut(staging).copy_from_slice(raster.row(y));
        let src = rows.row(staging);
        let dst = &mut scratch[y * row_len..(y + 1) * row_len];
        for x in 0..w {
            let px = x * BYTES_PER_PIXEL;
            for c in 0..BYTES_PER_PIXEL {
                dst[px + c] = src[px + offsets[c]];
            }
        }
        rows.release_row(staging);
    }

    // Pass 2: convolve in place, channel-major.
    for c in 0..BYTES_PER_PIXEL {
        convolve_channel_in_place(&mut scratch, w, h, c, kernel, rows);
    }

    // Pass 3: write back the interior.
    for y in r..h - r {
        let staging = rows.take_row(row_len);
        let out = rows.row_mut(staging);
        out.copy_from_slice(raster.row(y));
        let src = &scratch[y * row_len..(y + 1) * row_len];
        for x in r..w - r {
            let px = x * BYTES_PER_PIXEL;
            for c in 0..BYTES_PER_PIXEL {
                out[px + offsets[c]] = src[px + c];
            }
        }
        raster.row_mut(y).copy_from_slice(rows.row(staging));
        rows.release_row(staging);
    }
    drop(raster);

    debug!("{name}: done");
    Ok(ConvolutionResult::from_rgb_bytes(w, h, scratch))
}

/// Convolve channel `c` of the RGB `scratch` buffer in place.
fn convolve_channel_in_place<R: RowSource>(
    scratch: &mut [u8],
    w: usize,
    h: usize,
    c: usize,
    kernel: &ConvolutionKernel,
    rows: &mut R,
) {
    let r = kernel.radius();
    let side = kernel.side();
    let weights = kernel.weights();
    let row_len = w * BYTES_PER_PIXEL;
    let mut pending: VecDeque<(usize, RowSlot)> = VecDeque::with_capacity(r + 1);

    for y in r..h - r {
        let slot = rows.take_row(w - 2 * r);
        let out = rows.row_mut(slot);
        for x in r..w - r {
            let mut sum = 0.0f64;
            for ky in 0..side {
                let base = (y + ky - r) * row_len + c;
                for kx in 0..side {
                    let offset = base + (x + kx - r) * BYTES_PER_PIXEL;
                    sum += weights[ky * side + kx] * scratch[offset] as f64;
                }
            }
            out[x - r] = quantize_u8(sum);
        }

        pending.push_back((y, slot));
        if pending.len() > r {
            if let Some((done_y, done)) = pending.pop_front() {
                commit_row(scratch, rows.row(done), done_y, w, r, c);
                rows.release_row(done);
            }
        }
    }

    while let Some((done_y, done)) = pending.pop_front() {
        commit_row(scratch, rows.row(done), done_y, w, r, c);
        rows.release_row(done);
    }
}

/// Store one finished interior row of channel `c` into scratch.
#[inline]
fn commit_row(scratch: &mut [u8], out: &[u8], y: usize, w: usize, r: usize, c: usize) {
    let base = y * w * BYTES_PER_PIXEL + c;
    for (i, &v) in out.iter().enumerate() {
        scratch[base + (r + i) * BYTES_PER_PIXEL] = v;
    }
}
