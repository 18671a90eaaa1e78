// plane.rs — Single-channel, runtime-sized sample grid.
//
// A Plane<T> is one color channel of a raster, stored row-major with no
// padding (row y starts at y * width). The strategies use it two ways:
//   - IndexedStrategy stores the source image as three Plane<u8> layers and
//     reads neighborhoods through the checked `try_get`.
//   - PlanarVectorStrategy de-interleaves into three Plane<f32> and sweeps
//     rows with lane-wide loads from `row()`.

use crate::error::{ConvolveError, ConvolveResult};

// ---------------------------------------------------------------------------
// Sample Trait
// ---------------------------------------------------------------------------

/// Trait for types that can be stored in a Plane.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    fn to_f32(self) -> f32;

    /// Convert from f32 with the type's clamp/round rules.
    fn from_f32(v: f32) -> Self;
}

impl Sample for u8 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v.clamp(0.0, 255.0).round() as u8
    }
}

impl Sample for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }
}

/// Clamp a weighted sum to [0, 255] and round half away from zero.
#[inline]
pub fn quantize_u8(v: f64) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}

// ---------------------------------------------------------------------------
// Plane<T>
// ---------------------------------------------------------------------------

/// A single-channel 2D sample grid with runtime dimensions.
#[derive(Clone, Debug)]
pub struct Plane<T: Sample> {
    /// Samples in row-major order. Length = width * height.
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Sample> Plane<T> {
    /// Zero-initialized plane.
    pub fn new(width: usize, height: usize) -> Self {
        Plane {
            data: vec![T::default(); width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Checked read that reports `OutOfBounds` instead of panicking.
    /// `channel` only labels the error.
    #[inline]
    pub fn try_get(&self, x: usize, y: usize, channel: usize) -> ConvolveResult<T> {
        if x < self.width && y < self.height {
            Ok(self.data[y * self.width + x])
        } else {
            Err(ConvolveError::OutOfBounds { x, y, channel })
        }
    }

    /// Checked write that reports `OutOfBounds` instead of panicking.
    #[inline]
    pub fn try_set(&mut self, x: usize, y: usize, channel: usize, value: T) -> ConvolveResult<()> {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
            Ok(())
        } else {
            Err(ConvolveError::OutOfBounds { x, y, channel })
        }
    }

    /// Borrow one row.
    ///
    /// # Panics
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    /// Iterate over all samples as `(x, y, value)`.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        let w = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i % w, i / w, v))
    }
}
