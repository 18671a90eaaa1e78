// tests/test_strategies.rs — Behavior shared by every convolution strategy.
//
// These run with `cargo test --test test_strategies`.
// Linear-memory strategies write their output back into the source bytes,
// so every run here starts from its own copy of the input.

use rgbconv::{
    convolve, ChannelOrder, ConvolutionKernel, ConvolutionResult, ConvolutionStrategy,
    ConvolveError, ErrorClass, IndexedStrategy, LaneWidth, PixelBuffer, PlanarVectorStrategy,
    PooledRowStrategy, StrategyKind,
};

// ===== Helpers =====

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Packed RGB scene: gradients per channel plus a few bright blocks.
fn make_scene(w: usize, h: usize) -> Vec<u8> {
    let mut data = vec![0u8; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 3;
            data[i] = (x * 200 / w + y * 55 / h) as u8;
            data[i + 1] = (y * 230 / h) as u8;
            data[i + 2] = ((x * 7 + y * 13) % 256) as u8;
        }
    }
    for rect in 0..3 {
        let rx = (2 + rect * 5) % w;
        let ry = (1 + rect * 4) % h;
        for y in ry..(ry + 3).min(h) {
            for x in rx..(rx + 4).min(w) {
                let i = (y * w + x) * 3;
                data[i..i + 3].copy_from_slice(&[250, 240 - rect as u8 * 40, 15]);
            }
        }
    }
    data
}

fn run(
    kind: StrategyKind,
    data: &[u8],
    w: usize,
    h: usize,
    kernel: &ConvolutionKernel,
) -> ConvolutionResult {
    let mut copy = data.to_vec();
    let mut buf = PixelBuffer::packed(&mut copy, w, h, ChannelOrder::Rgb).unwrap();
    convolve(kind, &mut buf, kernel).unwrap()
}

fn pixel_of(data: &[u8], w: usize, x: usize, y: usize) -> [u8; 3] {
    let i = (y * w + x) * 3;
    [data[i], data[i + 1], data[i + 2]]
}

// ===== Identity =====

#[test]
fn identity_kernels_reproduce_input() {
    init_logger();
    let (w, h) = (11, 8);
    let data = make_scene(w, h);
    for radius in [0, 1, 2] {
        let kernel = ConvolutionKernel::identity(radius);
        for kind in StrategyKind::ALL {
            let out = run(kind, &data, w, h, &kernel);
            assert_eq!(out.as_bytes(), &data[..], "{} radius {radius}", kind.name());
        }
    }
}

// ===== Uniform blur =====

#[test]
fn box_5x5_is_rounded_neighborhood_mean() {
    init_logger();
    let (w, h) = (16, 12);
    let data = make_scene(w, h);
    let kernel = ConvolutionKernel::box_blur(2);
    for kind in StrategyKind::ALL {
        let out = run(kind, &data, w, h, &kernel);
        for y in 2..h - 2 {
            for x in 2..w - 2 {
                for c in 0..3 {
                    let mut sum = 0u32;
                    for ny in y - 2..=y + 2 {
                        for nx in x - 2..=x + 2 {
                            sum += data[(ny * w + nx) * 3 + c] as u32;
                        }
                    }
                    let mean = (sum as f64 / 25.0).round() as i32;
                    let got = out.sample(x, y, c) as i32;
                    assert!(
                        (got - mean).abs() <= 1,
                        "{} at ({x},{y}) c{c}: got {got}, mean {mean}",
                        kind.name()
                    );
                }
            }
        }
    }
}

// ===== Cross-strategy equivalence =====

#[test]
fn exact_strategies_agree_byte_for_byte() {
    init_logger();
    let (w, h) = (23, 17);
    let data = make_scene(w, h);
    let kernels = [
        ConvolutionKernel::box_blur(1),
        ConvolutionKernel::box_blur(2),
        ConvolutionKernel::gaussian(3, 1.7),
        ConvolutionKernel::new(vec![
            vec![-1.0, -1.0, -1.0],
            vec![-1.0, 9.0, -1.0],
            vec![-1.0, -1.0, -1.0],
        ])
        .unwrap(),
    ];
    for kernel in &kernels {
        let reference = run(StrategyKind::Indexed, &data, w, h, kernel);
        for kind in StrategyKind::ALL {
            let out = run(kind, &data, w, h, kernel);
            let diff = out.max_abs_diff(&reference).unwrap();
            if kind.is_exact() {
                assert_eq!(diff, 0, "{} radius {}", kind.name(), kernel.radius());
            } else {
                assert!(diff <= 1, "{} radius {}: diff {diff}", kind.name(), kernel.radius());
            }
        }
    }
}

// ===== Border policy =====

#[test]
fn border_band_keeps_source_values() {
    init_logger();
    let (w, h) = (14, 10);
    let data = make_scene(w, h);
    for radius in [1, 3] {
        let kernel = ConvolutionKernel::box_blur(radius);
        for kind in StrategyKind::ALL {
            let out = run(kind, &data, w, h, &kernel);
            for y in 0..h {
                for x in 0..w {
                    let interior = x >= radius && x < w - radius && y >= radius && y < h - radius;
                    if !interior {
                        assert_eq!(
                            out.pixel(x, y),
                            pixel_of(&data, w, x, y),
                            "{} radius {radius} at ({x},{y})",
                            kind.name()
                        );
                    }
                }
            }
        }
    }
}

// ===== Planar lane widths =====

#[test]
fn planar_result_independent_of_lane_width() {
    init_logger();
    let kernel = ConvolutionKernel::box_blur(2);
    // Interior widths 12 (divisible by 4) and 17 (divisible by neither).
    for w in [16, 21] {
        let data = make_scene(w, 9);
        let outputs: Vec<ConvolutionResult> = [LaneWidth::Scalar, LaneWidth::X4, LaneWidth::X8]
            .into_iter()
            .map(|lanes| {
                let mut copy = data.clone();
                let mut buf = PixelBuffer::packed(&mut copy, w, 9, ChannelOrder::Rgb).unwrap();
                PlanarVectorStrategy::with_lanes(lanes)
                    .convolve(&mut buf, &kernel)
                    .unwrap()
            })
            .collect();
        assert_eq!(outputs[0], outputs[1], "width {w}");
        assert_eq!(outputs[0], outputs[2], "width {w}");
    }
}

// ===== Worked example =====

#[test]
fn ramp_7x7_mean_3x3() {
    init_logger();
    // v(x, y) = x + 10y in every channel.
    let mut data = Vec::new();
    for y in 0..7u8 {
        for x in 0..7u8 {
            let v = x + 10 * y;
            data.extend_from_slice(&[v, v, v]);
        }
    }
    let kernel = ConvolutionKernel::new(vec![vec![1.0 / 9.0; 3]; 3]).unwrap();
    for kind in StrategyKind::ALL {
        let out = run(kind, &data, 7, 7, &kernel);
        assert_eq!(out.pixel(3, 3), [33, 33, 33], "{}", kind.name());
        assert_eq!(out.pixel(0, 0), [0, 0, 0], "{}", kind.name());
        assert_eq!(out[(3, 3)], [33, 33, 33]);
    }
}

// ===== Failure =====

#[test]
fn too_small_image_is_rejected_untouched() {
    init_logger();
    let original: Vec<u8> = (0..27).map(|i| i as u8 * 9).collect();
    let kernel = ConvolutionKernel::box_blur(2);
    for kind in StrategyKind::ALL {
        let mut data = original.clone();
        let mut buf = PixelBuffer::packed(&mut data, 3, 3, ChannelOrder::Rgb).unwrap();
        let err = convolve(kind, &mut buf, &kernel).unwrap_err();
        assert_eq!(
            err,
            ConvolveError::BufferTooSmall {
                width: 3,
                height: 3,
                radius: 2
            }
        );
        assert_eq!(err.class(), ErrorClass::InvalidInput);
        assert!(!buf.is_locked(), "{} left the raster locked", kind.name());
        drop(buf);
        assert_eq!(data, original, "{}", kind.name());
    }
}

// ===== Layouts =====

#[test]
fn bgr_and_padded_stride_match_packed_rgb() {
    init_logger();
    let (w, h) = (9, 7);
    let rgb = make_scene(w, h);
    let kernel = ConvolutionKernel::gaussian(1, 1.0);
    let stride = w * 3 + 5;

    for kind in StrategyKind::ALL {
        let expected = run(kind, &rgb, w, h, &kernel);

        let mut bgr: Vec<u8> = rgb.chunks_exact(3).flat_map(|p| [p[2], p[1], p[0]]).collect();
        let mut buf = PixelBuffer::packed(&mut bgr, w, h, ChannelOrder::Bgr).unwrap();
        assert_eq!(convolve(kind, &mut buf, &kernel).unwrap(), expected, "{} bgr", kind.name());

        let mut padded = vec![0xAB; stride * h];
        for y in 0..h {
            padded[y * stride..y * stride + w * 3].copy_from_slice(&rgb[y * w * 3..(y + 1) * w * 3]);
        }
        let mut buf = PixelBuffer::new(&mut padded, w, h, stride, ChannelOrder::Rgb).unwrap();
        assert_eq!(
            convolve(kind, &mut buf, &kernel).unwrap(),
            expected,
            "{} padded",
            kind.name()
        );
        drop(buf);
        for y in 0..h {
            assert!(padded[y * stride + w * 3..(y + 1) * stride].iter().all(|&b| b == 0xAB));
        }
    }
}

// ===== Source write-back =====

#[test]
fn write_back_only_from_linear_family() {
    init_logger();
    let (w, h) = (10, 8);
    let data = make_scene(w, h);
    let kernel = ConvolutionKernel::box_blur(1);
    for kind in StrategyKind::ALL {
        let mut copy = data.clone();
        let mut buf = PixelBuffer::packed(&mut copy, w, h, ChannelOrder::Rgb).unwrap();
        let out = convolve(kind, &mut buf, &kernel).unwrap();
        drop(buf);
        match kind {
            StrategyKind::LinearMemory | StrategyKind::PooledRow => {
                assert_eq!(&copy[..], out.as_bytes(), "{}", kind.name())
            }
            StrategyKind::Indexed | StrategyKind::PlanarVector => {
                assert_eq!(copy, data, "{}", kind.name())
            }
        }
    }
}

// ===== Reuse =====

#[test]
fn strategies_are_reusable_across_sizes() {
    init_logger();
    let pooled = PooledRowStrategy::new();
    let planar = PlanarVectorStrategy::scalar();
    let strategies: [&dyn ConvolutionStrategy; 3] = [&IndexedStrategy, &pooled, &planar];
    let kernel = ConvolutionKernel::box_blur(1);
    for (w, h) in [(5, 5), (12, 4), (4, 12), (5, 5)] {
        let data = make_scene(w, h);
        let reference = run(StrategyKind::Indexed, &data, w, h, &kernel);
        for strategy in strategies {
            let mut copy = data.clone();
            let mut buf = PixelBuffer::packed(&mut copy, w, h, ChannelOrder::Rgb).unwrap();
            let out = strategy.convolve(&mut buf, &kernel).unwrap();
            assert!(out.max_abs_diff(&reference).unwrap() <= 1, "{} {w}x{h}", strategy.name());
        }
    }
    assert_eq!(pooled.pool().idle(), pooled.pool().allocations());
}
