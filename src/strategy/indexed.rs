// strategy/indexed.rs — Bounds-checked reference convolution.
//
// Every read goes through a checked accessor: samples come out of the
// PixelBuffer with `sample()`, land in one Plane<u8> per channel, and each
// neighborhood tap is fetched with `Plane::try_get`. Slow; this is the
// reference the other strategies are compared against.

use log::debug;

use super::{check_interior, ConvolutionStrategy};
use crate::error::ConvolveResult;
use crate::kernel::ConvolutionKernel;
use crate::pixel_buffer::{PixelBuffer, BYTES_PER_PIXEL};
use crate::plane::{quantize_u8, Plane};
use crate::result::ConvolutionResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedStrategy;

impl ConvolutionStrategy for IndexedStrategy {
    fn name(&self) -> &'static str {
        "indexed"
    }

    fn convolve(
        &self,
        buffer: &mut PixelBuffer<'_>,
        kernel: &ConvolutionKernel,
    ) -> ConvolveResult<ConvolutionResult> {
        let (w, h, r) = (buffer.width(), buffer.height(), kernel.radius());
        check_interior(w, h, r)?;
        debug!("indexed: {w}x{h}, radius {r}");

        let raster = buffer.lock();

        // Source → one layer per canonical channel.
        let mut layers: [Plane<u8>; BYTES_PER_PIXEL] = std::array::from_fn(|_| Plane::new(w, h));
        for (c, layer) in layers.iter_mut().enumerate() {
            for y in 0..h {
                for x in 0..w {
                    layer.try_set(x, y, c, raster.sample(x, y, c)?)?;
                }
            }
        }
        drop(raster);

        let side = kernel.side();
        let mut neighborhood = vec![0.0f64; side * side];
        let mut result = ConvolutionResult::new(w, h);

        for (c, layer) in layers.iter().enumerate() {
            for y in 0..h {
                for x in 0..w {
                    let interior = x >= r && x < w - r && y >= r && y < h - r;
                    let value = if interior {
                        for ky in 0..side {
                            for kx in 0..side {
                                neighborhood[ky * side + kx] =
                                    f64::from(layer.try_get(x + kx - r, y + ky - r, c)?);
                            }
                        }
                        quantize_u8(kernel.apply(&neighborhood)?)
                    } else {
                        // Border band keeps the source sample.
                        layer.try_get(x, y, c)?
                    };
                    result[(y, x)][c] = value;
                }
            }
        }

        debug!("indexed: done");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_buffer::ChannelOrder;

    #[test]
    fn test_center_of_linear_ramp() {
        // 5×5 gray ramp v = x + 10y; a 3×3 mean of a linear ramp is its center.
        let mut data = Vec::new();
        for y in 0..5u8 {
            for x in 0..5u8 {
                let v = x + 10 * y;
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let mut buf = PixelBuffer::packed(&mut data, 5, 5, ChannelOrder::Rgb).unwrap();
        let out = IndexedStrategy
            .convolve(&mut buf, &ConvolutionKernel::box_blur(1))
            .unwrap();
        for y in 1..4 {
            for x in 1..4 {
                let v = (x + 10 * y) as u8;
                assert_eq!(out.pixel(x, y), [v, v, v], "at ({x},{y})");
            }
        }
    }

    #[test]
    fn test_does_not_modify_source() {
        let original: Vec<u8> = (0..75).map(|i| (i * 37 % 256) as u8).collect();
        let mut data = original.clone();
        let mut buf = PixelBuffer::packed(&mut data, 5, 5, ChannelOrder::Bgr).unwrap();
        IndexedStrategy
            .convolve(&mut buf, &ConvolutionKernel::box_blur(1))
            .unwrap();
        drop(buf);
        assert_eq!(data, original);
    }

    #[test]
    fn test_clamps_negative_and_large_sums() {
        // Sharpen-style kernel drives sums out of [0, 255].
        let k = ConvolutionKernel::new(vec![
            vec![0.0, -4.0, 0.0],
            vec![-4.0, 17.0, -4.0],
            vec![0.0, -4.0, 0.0],
        ])
        .unwrap();
        let mut data = vec![100u8; 27];
        // Bright center pixel, red channel only.
        data[4 * 3] = 250;
        let mut buf = PixelBuffer::packed(&mut data, 3, 3, ChannelOrder::Rgb).unwrap();
        let out = IndexedStrategy.convolve(&mut buf, &k).unwrap();
        // Red: 17*250 - 16*100 > 255; green: 17*100 - 16*100 = 100.
        assert_eq!(out.pixel(1, 1), [255, 100, 100]);

        let k_neg = ConvolutionKernel::new(vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, -1.0, 0.0],
            vec![0.0, 0.0, 0.0],
        ])
        .unwrap();
        let mut data = vec![100u8; 27];
        let mut buf = PixelBuffer::packed(&mut data, 3, 3, ChannelOrder::Rgb).unwrap();
        assert_eq!(IndexedStrategy.convolve(&mut buf, &k_neg).unwrap().pixel(1, 1), [0, 0, 0]);
    }
}
