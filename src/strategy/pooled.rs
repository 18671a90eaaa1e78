// strategy/pooled.rs — Linear-memory convolution with pooled row buffers.
//
// Same three passes as LinearMemoryStrategy. The difference is where the
// staging and pending rows live: each call leases them from the strategy's
// own RowPool, so after the first call on a given image size no row is
// allocated again.
//
// Optionally the strategy asks the host to run the calling thread on a set
// of processing units before it starts. The request is advisory: refusal
// is logged and the convolution proceeds.

use log::debug;

use super::linear::run_linear;
use super::ConvolutionStrategy;
use crate::affinity::{AffinityControl, AffinityHint, SystemAffinity};
use crate::error::ConvolveResult;
use crate::kernel::ConvolutionKernel;
use crate::pixel_buffer::PixelBuffer;
use crate::pool::RowPool;
use crate::result::ConvolutionResult;

pub struct PooledRowStrategy {
    pool: RowPool,
    affinity: Option<AffinityHint>,
    control: Box<dyn AffinityControl>,
}

impl PooledRowStrategy {
    /// Empty pool, no affinity request.
    pub fn new() -> Self {
        PooledRowStrategy {
            pool: RowPool::new(),
            affinity: None,
            control: Box::new(SystemAffinity),
        }
    }

    /// Request `hint` before every call.
    pub fn with_affinity(mut self, hint: AffinityHint) -> Self {
        self.affinity = Some(hint);
        self
    }

    /// Request processing units 0 and 1 before every call.
    pub fn with_default_affinity(self) -> Self {
        self.with_affinity(AffinityHint::first_two_units())
    }

    /// Route affinity requests through `control` instead of the OS.
    pub fn with_affinity_control(mut self, control: Box<dyn AffinityControl>) -> Self {
        self.control = control;
        self
    }

    pub fn pool(&self) -> &RowPool {
        &self.pool
    }

    pub fn affinity(&self) -> Option<&AffinityHint> {
        self.affinity.as_ref()
    }
}

impl Default for PooledRowStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PooledRowStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledRowStrategy")
            .field("affinity", &self.affinity)
            .field("pool_allocations", &self.pool.allocations())
            .finish()
    }
}

impl ConvolutionStrategy for PooledRowStrategy {
    fn name(&self) -> &'static str {
        "pooled_row"
    }

    fn convolve(
        &self,
        buffer: &mut PixelBuffer<'_>,
        kernel: &ConvolutionKernel,
    ) -> ConvolveResult<ConvolutionResult> {
        if let Some(hint) = &self.affinity {
            let accepted = self.control.request_affinity(hint);
            debug!("pooled_row: affinity {hint:?} accepted={accepted}");
        }

        let mut lease = self.pool.acquire();
        run_linear(self.name(), buffer, kernel, &mut lease)
    }
}
