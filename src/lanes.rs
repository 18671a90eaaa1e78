// lanes.rs — Lane-width abstraction for the planar blur.
//
// The planar strategy is written once against the `Lanes` trait and
// monomorphized for each vector type we can run:
//
//   LaneWidth::Scalar → plain f32, one column at a time
//   LaneWidth::X4     → wide::f32x4 (SSE2 / NEON / portable fallback)
//   LaneWidth::X8     → wide::f32x8 (AVX when available)
//
// Which one runs is a runtime decision (`LaneWidth::detect`), so the same
// binary behaves identically on every host, only faster or slower.

use std::ops::{Add, Mul};
use std::sync::OnceLock;

use wide::{f32x4, f32x8};

use crate::env_config::{self, define_env_flag};

define_env_flag!(enabled_when(force_scalar, env_config::FORCE_SCALAR_VAR));

/// Number of f32 values processed per vector operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneWidth {
    Scalar,
    X4,
    X8,
}

impl LaneWidth {
    #[inline]
    pub fn lanes(self) -> usize {
        match self {
            LaneWidth::Scalar => 1,
            LaneWidth::X4 => 4,
            LaneWidth::X8 => 8,
        }
    }

    pub fn from_lanes(lanes: usize) -> Option<Self> {
        match lanes {
            1 => Some(LaneWidth::Scalar),
            4 => Some(LaneWidth::X4),
            8 => Some(LaneWidth::X8),
            _ => None,
        }
    }

    /// Lane width for this process: `RGBCONV_FORCE_SCALAR`, then
    /// `RGBCONV_LANES`, then what the host CPU supports. Cached after the
    /// first call.
    pub fn detect() -> Self {
        static DETECTED: OnceLock<LaneWidth> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            if force_scalar() {
                return LaneWidth::Scalar;
            }
            env_config::env_var_positive_u64(env_config::LANES_VAR)
                .and_then(|n| usize::try_from(n).ok())
                .and_then(LaneWidth::from_lanes)
                .unwrap_or_else(host_lane_width)
        })
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn host_lane_width() -> LaneWidth {
    if std::arch::is_x86_feature_detected!("avx") {
        LaneWidth::X8
    } else {
        LaneWidth::X4
    }
}

#[cfg(target_arch = "aarch64")]
fn host_lane_width() -> LaneWidth {
    LaneWidth::X4
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn host_lane_width() -> LaneWidth {
    LaneWidth::Scalar
}

/// A vector of `WIDTH` f32 lanes.
pub(crate) trait Lanes: Copy + Add<Output = Self> + Mul<Output = Self> {
    const WIDTH: usize;

    fn splat(v: f32) -> Self;

    /// Load the first `WIDTH` values of `src`.
    fn load(src: &[f32]) -> Self;

    /// Store all lanes into the first `WIDTH` slots of `dst`.
    fn store(self, dst: &mut [f32]);
}

impl Lanes for f32 {
    const WIDTH: usize = 1;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        v
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        src[0]
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[0] = self;
    }
}

impl Lanes for f32x4 {
    const WIDTH: usize = 4;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        f32x4::splat(v)
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let mut lane = [0.0f32; 4];
        lane.copy_from_slice(&src[..4]);
        f32x4::new(lane)
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[..4].copy_from_slice(&<[f32; 4]>::from(self));
    }
}

impl Lanes for f32x8 {
    const WIDTH: usize = 8;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        f32x8::splat(v)
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let mut lane = [0.0f32; 8];
        lane.copy_from_slice(&src[..8]);
        f32x8::new(lane)
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[..8].copy_from_slice(&<[f32; 8]>::from(self));
    }
}
