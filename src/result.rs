// result.rs — Owned RGB output of one strategy invocation.
//
// Samples are stored as `[u8; 3]` triples in canonical R, G, B order,
// whatever the channel order of the source buffer was. Indexing follows the
// row-major convention of the output: `result[(row, col)][channel]`.

use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct ConvolutionResult {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 3]>,
}

impl ConvolutionResult {
    /// All-zero result of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        ConvolutionResult {
            width,
            height,
            pixels: vec![[0; 3]; width * height],
        }
    }

    /// Take ownership of a flat `height * width * 3` byte vector in RGB order.
    ///
    /// # Panics
    /// Panics if the length does not match.
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: Vec<u8>) -> Self {
        assert_eq!(
            bytes.len(),
            width * height * 3,
            "byte length ({}) must equal width * height * 3 ({})",
            bytes.len(),
            width * height * 3,
        );
        let pixels = bytes
            .chunks_exact(3)
            .map(|px| [px[0], px[1], px[2]])
            .collect();
        ConvolutionResult {
            width,
            height,
            pixels,
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

    /// RGB triple at column `x`, row `y`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        self[(y, x)]
    }

    #[inline]
    pub fn sample(&self, x: usize, y: usize, channel: usize) -> u8 {
        self[(y, x)][channel]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        self[(y, x)] = rgb;
    }

    /// One output row.
    pub fn row(&self, y: usize) -> &[[u8; 3]] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Flat `height * width * 3` view, row-major, RGB.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.pixels)
    }

    /// Largest per-sample absolute difference against another result of the
    /// same size. `None` if the sizes differ.
    pub fn max_abs_diff(&self, other: &ConvolutionResult) -> Option<u8> {
        if self.width != other.width || self.height != other.height {
            return None;
        }
        Some(
            self.as_bytes()
                .iter()
                .zip(other.as_bytes())
                .map(|(&a, &b)| a.abs_diff(b))
                .max()
                .unwrap_or(0),
        )
    }

    #[inline]
    fn bounds_check(&self, row: usize, col: usize) {
        assert!(
            row < self.height && col < self.width,
            "pixel (row {row}, col {col}) out of bounds for result {}×{}",
            self.width,
            self.height,
        );
    }
}

impl std::ops::Index<(usize, usize)> for ConvolutionResult {
    type Output = [u8; 3];

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &[u8; 3] {
        self.bounds_check(row, col);
        &self.pixels[row * self.width + col]
    }
}

impl std::ops::IndexMut<(usize, usize)> for ConvolutionResult {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut [u8; 3] {
        self.bounds_check(row, col);
        &mut self.pixels[row * self.width + col]
    }
}

impl fmt::Debug for ConvolutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ConvolutionResult {{ {}×{} }}", self.width, self.height)?;
        for y in 0..self.height.min(8) {
            write!(f, "  row {y}: [")?;
            for x in 0..self.width.min(8) {
                if x > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", self.pixel(x, y))?;
            }
            if self.width > 8 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.height > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}
