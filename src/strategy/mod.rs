// strategy/mod.rs — The convolution contract and strategy selection.
//
// Four independent implementations of one operation:
//
//   (PixelBuffer, ConvolutionKernel) → ConvolutionResult
//
//   IndexedStrategy       checked per-sample access; the reference output
//   LinearMemoryStrategy  one linear scratch buffer, in-place convolution
//   PooledRowStrategy     same as linear, rows drawn from a RowPool
//   PlanarVectorStrategy  three f32 planes, lane-vector accumulation
//
// Every strategy leaves a border band of width `radius` equal to the
// source samples and convolves only interior pixels, so outputs can be
// compared directly: the first three agree byte for byte, the planar one
// within 1 per sample.

mod indexed;
mod linear;
mod planar;
mod pooled;

pub use indexed::IndexedStrategy;
pub use linear::LinearMemoryStrategy;
pub use planar::PlanarVectorStrategy;
pub use pooled::PooledRowStrategy;

use crate::error::{ConvolveError, ConvolveResult};
use crate::kernel::ConvolutionKernel;
use crate::pixel_buffer::PixelBuffer;
use crate::result::ConvolutionResult;

/// One way of running a convolution.
///
/// Strategies in the linear-memory family write the convolved interior back
/// into `buffer`; the others only read it. Either way the buffer is held
/// exclusively for the whole call.
pub trait ConvolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Convolve every interior pixel of `buffer` with `kernel`.
    ///
    /// # Errors
    /// `BufferTooSmall` if the image has no interior pixel for the kernel's
    /// radius. Nothing is written in that case.
    fn convolve(
        &self,
        buffer: &mut PixelBuffer<'_>,
        kernel: &ConvolutionKernel,
    ) -> ConvolveResult<ConvolutionResult>;
}

/// Strategy selector for callers that pick one at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Indexed,
    LinearMemory,
    PooledRow,
    PlanarVector,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Indexed,
        StrategyKind::LinearMemory,
        StrategyKind::PooledRow,
        StrategyKind::PlanarVector,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Indexed => "indexed",
            StrategyKind::LinearMemory => "linear_memory",
            StrategyKind::PooledRow => "pooled_row",
            StrategyKind::PlanarVector => "planar_vector",
        }
    }

    /// A strategy of this kind with default settings.
    pub fn build(self) -> Box<dyn ConvolutionStrategy> {
        match self {
            StrategyKind::Indexed => Box::new(IndexedStrategy),
            StrategyKind::LinearMemory => Box::new(LinearMemoryStrategy),
            StrategyKind::PooledRow => Box::new(PooledRowStrategy::new()),
            StrategyKind::PlanarVector => Box::new(PlanarVectorStrategy::new()),
        }
    }

    /// Byte-exact agreement with the indexed reference is guaranteed.
    pub fn is_exact(self) -> bool {
        !matches!(self, StrategyKind::PlanarVector)
    }
}

/// Run `kind` once with default settings.
pub fn convolve(
    kind: StrategyKind,
    buffer: &mut PixelBuffer<'_>,
    kernel: &ConvolutionKernel,
) -> ConvolveResult<ConvolutionResult> {
    kind.build().convolve(buffer, kernel)
}

/// Interior pixels exist only when both dimensions exceed `2 * radius`.
pub(crate) fn check_interior(width: usize, height: usize, radius: usize) -> ConvolveResult<()> {
    if width <= 2 * radius || height <= 2 * radius {
        return Err(ConvolveError::BufferTooSmall {
            width,
            height,
            radius,
        });
    }
    Ok(())
}
