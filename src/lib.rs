// rgbconv: square-kernel convolution over packed 24-bit RGB rasters
//
// One operation, four interchangeable strategies with different memory
// disciplines (checked indexing, linear scratch, pooled rows, lane-wide
// planar accumulation). All of them agree on the output.

pub mod error;
pub mod plane;
pub mod pixel_buffer;
pub mod kernel;
pub mod result;
pub mod pool;
pub mod affinity;
pub mod lanes;
pub mod strategy;

pub(crate) mod env_config;

pub use affinity::{AffinityControl, AffinityHint, NoAffinity, SystemAffinity};
pub use error::{ConvolveError, ConvolveResult, ErrorClass};
pub use kernel::ConvolutionKernel;
pub use lanes::LaneWidth;
pub use pixel_buffer::{ChannelOrder, PixelBuffer, RasterLock, BYTES_PER_PIXEL};
pub use plane::{Plane, Sample};
pub use pool::{PoolLease, RowPool, RowSlot, RowSource};
pub use result::ConvolutionResult;
pub use strategy::{
    convolve, ConvolutionStrategy, IndexedStrategy, LinearMemoryStrategy, PlanarVectorStrategy,
    PooledRowStrategy, StrategyKind,
};
