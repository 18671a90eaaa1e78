// error.rs — Error taxonomy for the convolution engine.
//
// Every fallible operation in the crate returns `ConvolveResult<T>`.
// Errors are raised synchronously and never retried: the computation is
// deterministic, so running it again on the same inputs cannot help.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvolveError {
    /// Kernel weight matrix is not square, not odd-sized, or empty.
    /// `cols` is the length of the first row that broke the shape.
    InvalidKernelShape { rows: usize, cols: usize },
    /// The image has no interior pixel for this kernel radius
    /// (`width <= 2 * radius` or `height <= 2 * radius`).
    BufferTooSmall {
        width: usize,
        height: usize,
        radius: usize,
    },
    /// A sample access fell outside the raster. Valid inputs are checked
    /// before the hot loops start, so seeing this means a logic error.
    OutOfBounds { x: usize, y: usize, channel: usize },
    /// The raster layout is not 3 bytes per pixel, or its geometry is
    /// degenerate (zero size, stride shorter than a packed row).
    UnsupportedPixelFormat(String),
    /// Backing slice is shorter than `stride * height`.
    ShortBuffer { len: usize, required: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidInput,
    Fatal,
}

impl ConvolveError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::OutOfBounds { .. } => ErrorClass::Fatal,
            Self::InvalidKernelShape { .. }
            | Self::BufferTooSmall { .. }
            | Self::UnsupportedPixelFormat(_)
            | Self::ShortBuffer { .. } => ErrorClass::InvalidInput,
        }
    }
}

impl fmt::Display for ConvolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKernelShape { rows, cols } => write!(
                f,
                "kernel must be a square matrix with an odd side (got {rows} rows, a row of {cols})"
            ),
            Self::BufferTooSmall {
                width,
                height,
                radius,
            } => write!(
                f,
                "{width}x{height} image has no interior pixels for kernel radius {radius}"
            ),
            Self::OutOfBounds { x, y, channel } => {
                write!(f, "sample ({x},{y}) channel {channel} is out of bounds")
            }
            Self::UnsupportedPixelFormat(message) => {
                write!(f, "unsupported pixel format: {message}")
            }
            Self::ShortBuffer { len, required } => write!(
                f,
                "pixel buffer holds {len} bytes but the layout needs {required}"
            ),
        }
    }
}

impl std::error::Error for ConvolveError {}

pub type ConvolveResult<T> = Result<T, ConvolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_is_fatal() {
        let err = ConvolveError::OutOfBounds { x: 1, y: 2, channel: 0 };
        assert_eq!(err.class(), ErrorClass::Fatal);
        let err = ConvolveError::BufferTooSmall { width: 3, height: 3, radius: 2 };
        assert_eq!(err.class(), ErrorClass::InvalidInput);
    }

    #[test]
    fn display_names_the_geometry() {
        let err = ConvolveError::BufferTooSmall { width: 3, height: 3, radius: 2 };
        assert_eq!(
            err.to_string(),
            "3x3 image has no interior pixels for kernel radius 2"
        );
    }
}
