// pixel_buffer.rs — Borrowed view over a packed 24-bit raster.
//
// The caller owns the bytes; a PixelBuffer<'a> only describes them:
//
//   byte index:  R G B R G B R G B [pad pad] R G B R G B R G B [pad pad]
//   row:         |------ row 0, stride ------| |------ row 1, stride ------|
//
// The `&'a mut [u8]` borrow is what guarantees the memory stays valid and
// exclusively ours for as long as a strategy runs. On top of that the
// strategies take a RasterLock for the duration of the sweep, so "the
// raster is being worked on" is a scoped state released on every exit path.

use log::trace;

use crate::error::{ConvolveError, ConvolveResult};

/// Bytes per pixel of every layout the engine accepts.
pub const BYTES_PER_PIXEL: usize = 3;

/// Byte order of the three channels inside one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// Byte offset within a pixel of canonical channel `channel`
    /// (0 = red, 1 = green, 2 = blue).
    #[inline]
    pub fn byte_offset(self, channel: usize) -> usize {
        match self {
            ChannelOrder::Rgb => channel,
            ChannelOrder::Bgr => 2 - channel,
        }
    }
}

#[derive(Debug)]
pub struct PixelBuffer<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
    /// Bytes from the start of one row to the next. >= width * 3.
    stride: usize,
    order: ChannelOrder,
    locked: bool,
}

impl<'a> PixelBuffer<'a> {
    /// Describe `data` as a `width`×`height` raster with the given stride.
    ///
    /// # Errors
    /// `UnsupportedPixelFormat` for a zero-sized raster or a stride shorter
    /// than a packed row; `ShortBuffer` if `data` is shorter than
    /// `stride * height`.
    pub fn new(
        data: &'a mut [u8],
        width: usize,
        height: usize,
        stride: usize,
        order: ChannelOrder,
    ) -> ConvolveResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConvolveError::UnsupportedPixelFormat(format!(
                "zero-sized raster {width}x{height}"
            )));
        }
        let row_bytes = width
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or_else(|| ConvolveError::UnsupportedPixelFormat("row size overflow".into()))?;
        if stride < row_bytes {
            return Err(ConvolveError::UnsupportedPixelFormat(format!(
                "stride {stride} is shorter than {width} pixels of {BYTES_PER_PIXEL} bytes"
            )));
        }
        let required = stride
            .checked_mul(height)
            .ok_or_else(|| ConvolveError::UnsupportedPixelFormat("raster size overflow".into()))?;
        if data.len() < required {
            return Err(ConvolveError::ShortBuffer {
                len: data.len(),
                required,
            });
        }
        Ok(PixelBuffer {
            data,
            width,
            height,
            stride,
            order,
            locked: false,
        })
    }

    /// Describe tightly packed rows (stride = width * 3).
    pub fn packed(
        data: &'a mut [u8],
        width: usize,
        height: usize,
        order: ChannelOrder,
    ) -> ConvolveResult<Self> {
        let stride = width.saturating_mul(BYTES_PER_PIXEL);
        Self::new(data, width, height, stride, order)
    }

    /// Like `new`, but for callers that describe their raster by its pixel
    /// size. Anything other than 3 bytes per pixel is rejected.
    pub fn with_layout(
        data: &'a mut [u8],
        width: usize,
        height: usize,
        stride: usize,
        bytes_per_pixel: usize,
        order: ChannelOrder,
    ) -> ConvolveResult<Self> {
        if bytes_per_pixel != BYTES_PER_PIXEL {
            return Err(ConvolveError::UnsupportedPixelFormat(format!(
                "{bytes_per_pixel} bytes per pixel (only 24-bit RGB/BGR is supported)"
            )));
        }
        Self::new(data, width, height, stride, order)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    /// Byte offset of canonical channel `channel` within a pixel.
    #[inline]
    pub fn channel_offset(&self, channel: usize) -> usize {
        self.order.byte_offset(channel)
    }

    /// Read channel `channel` (0 = R, 1 = G, 2 = B) of pixel (x, y).
    #[inline]
    pub fn sample(&self, x: usize, y: usize, channel: usize) -> ConvolveResult<u8> {
        let idx = self.index_of(x, y, channel)?;
        Ok(self.data[idx])
    }

    /// Write channel `channel` of pixel (x, y). Touches exactly one byte.
    #[inline]
    pub fn set_sample(&mut self, x: usize, y: usize, channel: usize, value: u8) -> ConvolveResult<()> {
        let idx = self.index_of(x, y, channel)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Packed pixel bytes of row `y`, without stride padding.
    ///
    /// # Panics
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.stride;
        &self.data[start..start + self.width * BYTES_PER_PIXEL]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.stride;
        &mut self.data[start..start + self.width * BYTES_PER_PIXEL]
    }

    /// Take exclusive hold of the raster until the returned guard drops.
    pub fn lock(&mut self) -> RasterLock<'_, 'a> {
        trace!("raster lock acquired ({}x{})", self.width, self.height);
        self.locked = true;
        RasterLock { buffer: self }
    }

    /// True only while a RasterLock is alive.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[inline]
    fn index_of(&self, x: usize, y: usize, channel: usize) -> ConvolveResult<usize> {
        if x >= self.width || y >= self.height || channel >= BYTES_PER_PIXEL {
            return Err(ConvolveError::OutOfBounds { x, y, channel });
        }
        Ok(y * self.stride + x * BYTES_PER_PIXEL + self.order.byte_offset(channel))
    }
}

/// Scoped exclusive access to a PixelBuffer. Released on drop, so a `?`
/// inside a strategy still unlocks the raster.
pub struct RasterLock<'b, 'a> {
    buffer: &'b mut PixelBuffer<'a>,
}

impl<'b, 'a> std::ops::Deref for RasterLock<'b, 'a> {
    type Target = PixelBuffer<'a>;

    fn deref(&self) -> &PixelBuffer<'a> {
        self.buffer
    }
}

impl<'b, 'a> std::ops::DerefMut for RasterLock<'b, 'a> {
    fn deref_mut(&mut self) -> &mut PixelBuffer<'a> {
        self.buffer
    }
}

impl Drop for RasterLock<'_, '_> {
    fn drop(&mut self) {
        self.buffer.locked = false;
        trace!("raster lock released");
    }
}
