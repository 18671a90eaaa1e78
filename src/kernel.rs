// kernel.rs — Square convolution kernel with an explicit radius.
//
// A kernel of radius r has side 2r + 1 and is stored row-major:
//
//   weights[ky * side + kx]   ky, kx in [0, side)
//
// where (ky, kx) = (r, r) is the center tap. Weights are used as given;
// nothing is normalized behind the caller's back, so a kernel summing to 2
// doubles the brightness of the interior.

use crate::error::{ConvolveError, ConvolveResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionKernel {
    radius: usize,
    side: usize,
    weights: Vec<f64>,
}

impl ConvolutionKernel {
    /// Build a kernel from its rows.
    ///
    /// # Errors
    /// `InvalidKernelShape` if the matrix is empty, ragged, not square, or
    /// has an even side.
    pub fn new(rows: Vec<Vec<f64>>) -> ConvolveResult<Self> {
        let side = rows.len();
        if side % 2 == 0 {
            return Err(ConvolveError::InvalidKernelShape {
                rows: side,
                cols: rows.first().map_or(0, Vec::len),
            });
        }
        if let Some(bad) = rows.iter().find(|row| row.len() != side) {
            return Err(ConvolveError::InvalidKernelShape {
                rows: side,
                cols: bad.len(),
            });
        }
        Ok(ConvolutionKernel {
            radius: side / 2,
            side,
            weights: rows.into_iter().flatten().collect(),
        })
    }

    /// Build a kernel from `side * side` row-major weights.
    pub fn from_flat(side: usize, weights: Vec<f64>) -> ConvolveResult<Self> {
        if side % 2 == 0 || weights.len() != side * side {
            return Err(ConvolveError::InvalidKernelShape {
                rows: side,
                cols: if side == 0 { 0 } else { weights.len() / side },
            });
        }
        Ok(ConvolutionKernel {
            radius: side / 2,
            side,
            weights,
        })
    }

    /// 1 at the center, 0 elsewhere.
    pub fn identity(radius: usize) -> Self {
        let side = 2 * radius + 1;
        let mut weights = vec![0.0; side * side];
        weights[radius * side + radius] = 1.0;
        ConvolutionKernel {
            radius,
            side,
            weights,
        }
    }

    /// Uniform mean filter: every weight is 1 / side².
    pub fn box_blur(radius: usize) -> Self {
        let side = 2 * radius + 1;
        let w = 1.0 / (side * side) as f64;
        ConvolutionKernel {
            radius,
            side,
            weights: vec![w; side * side],
        }
    }

    /// Normalized 2D Gaussian, built as the outer product of a 1D Gaussian
    /// with itself.
    ///
    /// # Panics
    /// Panics if `sigma` is not positive.
    pub fn gaussian(radius: usize, sigma: f64) -> Self {
        assert!(sigma > 0.0, "sigma must be positive");
        let side = 2 * radius + 1;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let taps: Vec<f64> = (0..side)
            .map(|i| {
                let x = i as f64 - radius as f64;
                (-x * x / two_sigma_sq).exp()
            })
            .collect();
        let sum: f64 = taps.iter().sum();

        let mut weights = Vec::with_capacity(side * side);
        for &ty in &taps {
            for &tx in &taps {
                weights.push(ty * tx / (sum * sum));
            }
        }
        ConvolutionKernel {
            radius,
            side,
            weights,
        }
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Weight at row `ky`, column `kx` of the matrix.
    #[inline]
    pub fn weight(&self, ky: usize, kx: usize) -> f64 {
        self.weights[ky * self.side + kx]
    }

    /// All weights, row-major.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// The shared weight if every tap has the same value.
    pub fn uniform_weight(&self) -> Option<f64> {
        let first = *self.weights.first()?;
        self.weights
            .iter()
            .all(|&w| w == first)
            .then_some(first)
    }

    /// Weighted sum of a row-major `side × side` neighborhood.
    ///
    /// # Errors
    /// `OutOfBounds` if the neighborhood does not have `side²` samples.
    pub fn apply(&self, neighborhood: &[f64]) -> ConvolveResult<f64> {
        if neighborhood.len() != self.weights.len() {
            return Err(ConvolveError::OutOfBounds {
                x: neighborhood.len() % self.side,
                y: neighborhood.len() / self.side,
                channel: 0,
            });
        }
        Ok(self
            .weights
            .iter()
            .zip(neighborhood)
            .fold(0.0, |acc, (&w, &s)| acc + w * s))
    }
}
