// strategy/planar.rs — De-interleaved f32 planes, lane-wide accumulation.
//
// Pipeline for one call:
//
//   packed source ──split──▶ R, G, B : Plane<f32>
//                            each plane cloned as its destination
//   per plane, per interior row:
//     vector loop   x = r, r+V, r+2V, ...  while x + V <= w - r
//     scalar tail   remaining columns, one at a time
//   destination planes ──round/clamp──▶ ConvolutionResult
//
// Kernel taps come in two shapes:
//
//   Uniform(f)   every weight equals f: sum the window, multiply once
//   Weighted(w)  acc = acc + splat(w[k]) * window[k]
//
// Both paths use separate multiply and add (no fused multiply-add), so a
// lane of f32x8 computes exactly what the scalar tail computes for the same
// column. The result does not depend on the lane width chosen.
//
// Accumulation is in f32, so a sample may differ from the f64 reference by
// at most 1 after rounding.

use log::debug;
use wide::{f32x4, f32x8};

use super::{check_interior, ConvolutionStrategy};
use crate::error::ConvolveResult;
use crate::kernel::ConvolutionKernel;
use crate::lanes::{LaneWidth, Lanes};
use crate::pixel_buffer::{PixelBuffer, BYTES_PER_PIXEL};
use crate::plane::{Plane, Sample};
use crate::result::ConvolutionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanarVectorStrategy {
    lanes: LaneWidth,
}

impl PlanarVectorStrategy {
    /// Lane width from `LaneWidth::detect()`.
    pub fn new() -> Self {
        Self::with_lanes(LaneWidth::detect())
    }

    pub fn with_lanes(lanes: LaneWidth) -> Self {
        PlanarVectorStrategy { lanes }
    }

    /// No vector loop at all.
    pub fn scalar() -> Self {
        Self::with_lanes(LaneWidth::Scalar)
    }

    pub fn lanes(&self) -> LaneWidth {
        self.lanes
    }
}

impl Default for PlanarVectorStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvolutionStrategy for PlanarVectorStrategy {
    fn name(&self) -> &'static str {
        "planar_vector"
    }

    fn convolve(
        &self,
        buffer: &mut PixelBuffer<'_>,
        kernel: &ConvolutionKernel,
    ) -> ConvolveResult<ConvolutionResult> {
        let (w, h, r) = (buffer.width(), buffer.height(), kernel.radius());
        check_interior(w, h, r)?;
        debug!("planar_vector: {w}x{h}, radius {r}, {:?}", self.lanes);

        let planes = split_planes(&buffer.lock());
        let taps = Taps::from_kernel(kernel);

        let mut result = ConvolutionResult::new(w, h);
        for (c, src) in planes.iter().enumerate() {
            let mut dst = src.clone();
            match self.lanes {
                LaneWidth::Scalar => blur_plane::<f32>(src, &mut dst, kernel.side(), &taps),
                LaneWidth::X4 => blur_plane::<f32x4>(src, &mut dst, kernel.side(), &taps),
                LaneWidth::X8 => blur_plane::<f32x8>(src, &mut dst, kernel.side(), &taps),
            }
            for (x, y, v) in dst.pixels() {
                result[(y, x)][c] = u8::from_f32(v);
            }
        }

        debug!("planar_vector: done");
        Ok(result)
    }
}

/// Kernel weights in the form the inner loop consumes.
enum Taps {
    Uniform(f32),
    Weighted(Vec<f32>),
}

impl Taps {
    fn from_kernel(kernel: &ConvolutionKernel) -> Self {
        match kernel.uniform_weight() {
            Some(weight) => Taps::Uniform(weight as f32),
            None => Taps::Weighted(kernel.weights().iter().map(|&w| w as f32).collect()),
        }
    }
}

/// De-interleave a packed raster into canonical R, G, B planes.
fn split_planes(raster: &PixelBuffer<'_>) -> [Plane<f32>; BYTES_PER_PIXEL] {
    let (w, h) = (raster.width(), raster.height());
    std::array::from_fn(|c| {
        let offset = raster.channel_offset(c);
        let mut plane = Plane::new(w, h);
        for y in 0..h {
            let src = raster.row(y);
            for (x, dst) in plane.row_mut(y).iter_mut().enumerate() {
                *dst = src[x * BYTES_PER_PIXEL + offset].to_f32();
            }
        }
        plane
    })
}

/// Convolve the interior of `src` into `dst`. Border samples of `dst` are
/// not touched.
fn blur_plane<V: Lanes>(src: &Plane<f32>, dst: &mut Plane<f32>, side: usize, taps: &Taps) {
    let r = side / 2;
    let (w, h) = (src.width(), src.height());
    let mut window: Vec<&[f32]> = Vec::with_capacity(side);

    for y in r..h - r {
        window.clear();
        window.extend((y - r..=y + r).map(|sy| src.row(sy)));
        let out = dst.row_mut(y);

        let mut x = r;
        while x + V::WIDTH <= w - r {
            convolve_at::<V>(&window, x - r, side, taps).store(&mut out[x..]);
            x += V::WIDTH;
        }
        while x < w - r {
            out[x] = convolve_at::<f32>(&window, x - r, side, taps);
            x += 1;
        }
    }
}

/// `V::WIDTH` adjacent outputs whose windows start at column `x0`.
#[inline(always)]
fn convolve_at<V: Lanes>(window: &[&[f32]], x0: usize, side: usize, taps: &Taps) -> V {
    let mut acc = V::splat(0.0);
    match taps {
        Taps::Uniform(factor) => {
            for row in window {
                for kx in 0..side {
                    acc = acc + V::load(&row[x0 + kx..]);
                }
            }
            acc * V::splat(*factor)
        }
        Taps::Weighted(weights) => {
            for (ky, row) in window.iter().enumerate() {
                for kx in 0..side {
                    acc = acc + V::splat(weights[ky * side + kx]) * V::load(&row[x0 + kx..]);
                }
            }
            acc
        }
    }
}
