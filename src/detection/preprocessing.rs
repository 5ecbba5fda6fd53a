//! Luma conversion, 5x5 smoothing and Canny edge extraction.
//!
//! The edge stage works on the already smoothed image: Sobel gradients with
//! an L1 magnitude, non-maximum suppression along the quantized gradient
//! direction, then hysteresis over 8-connected neighbours. No further blur
//! is applied, so the thresholds act on the gradients of the 5x5 output.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::filter::separable_filter_equal;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::map::map_colors;

/// Separable 5-tap Gaussian (binomial) kernel; its outer product is the 5x5 smoothing window
const GAUSSIAN_5: [f32; 5] = [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0];

/// BT.601 luma weights in 14-bit fixed point
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

const TAN_22_5_DEG: f32 = 0.414_213_56;
const TAN_67_5_DEG: f32 = 2.414_213_6;

/// Convert image to grayscale with BT.601 weights
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    map_colors(img, |Rgb([r, g, b])| {
        let y = (r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B
            + (1 << (LUMA_SHIFT - 1)))
            >> LUMA_SHIFT;
        Luma([y.min(255) as u8])
    })
}

/// Smooth with a fixed 5x5 Gaussian window to suppress noise before edge detection
pub fn apply_blur(img: &GrayImage) -> GrayImage {
    separable_filter_equal(img, &GAUSSIAN_5)
}

#[derive(Clone, Copy, PartialEq)]
enum EdgeState {
    None,
    Weak,
    Strong,
}

/// Canny edge map (255 = edge) of an already smoothed image.
///
/// Thresholds are applied in ascending order whichever way round they are
/// given. A pixel survives suppression if its magnitude exceeds `low` and
/// is a local maximum across the edge; it becomes an edge if it exceeds
/// `high` or connects to such a pixel. The one-pixel image frame never
/// carries edges.
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (low, high) = if low_threshold <= high_threshold {
        (low_threshold.floor(), high_threshold.floor())
    } else {
        (high_threshold.floor(), low_threshold.floor())
    };

    let (width, height) = img.dimensions();
    let mut edges = GrayImage::new(width, height);
    if width < 3 || height < 3 {
        return edges;
    }
    let (w, h) = (width as usize, height as usize);

    let gx = horizontal_sobel(img);
    let gy = vertical_sobel(img);
    let (gx, gy) = (gx.as_raw(), gy.as_raw());
    let mag: Vec<f32> = gx
        .iter()
        .zip(gy.iter())
        .map(|(a, b)| ((*a as i32).abs() + (*b as i32).abs()) as f32)
        .collect();

    // Non-maximum suppression; ties along the gradient keep the first pixel
    let mut state = vec![EdgeState::None; w * h];
    let mut stack = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let m = mag[i];
            if m <= low {
                continue;
            }

            let abs_gx = (gx[i] as f32).abs();
            let abs_gy = (gy[i] as f32).abs();
            let is_max = if abs_gy <= abs_gx * TAN_22_5_DEG {
                m > mag[i - 1] && m >= mag[i + 1]
            } else if abs_gy > abs_gx * TAN_67_5_DEG {
                m > mag[i - w] && m >= mag[i + w]
            } else if (gx[i] < 0) == (gy[i] < 0) {
                m > mag[i - w - 1] && m > mag[i + w + 1]
            } else {
                m > mag[i - w + 1] && m > mag[i + w - 1]
            };
            if !is_max {
                continue;
            }

            if m > high {
                state[i] = EdgeState::Strong;
                stack.push(i);
            } else {
                state[i] = EdgeState::Weak;
            }
        }
    }

    // Hysteresis: grow strong edges through weak neighbours
    while let Some(i) = stack.pop() {
        edges.put_pixel((i % w) as u32, (i / w) as u32, Luma([255]));
        for j in [i - w - 1, i - w, i - w + 1, i - 1, i + 1, i + w - 1, i + w, i + w + 1] {
            if state[j] == EdgeState::Weak {
                state[j] = EdgeState::Strong;
                stack.push(j);
            }
        }
    }

    edges
}
