//! Binarization with optional dithering.
//!
//! All three variants take a window of normalized values in [0, 1] and
//! return one bit per pixel. The window is a rectangle cut from the page;
//! `origin` is its top-left corner in page coordinates so that ordered
//! dithering keeps its phase no matter where the window sits.

/// 4x4 Bayer threshold matrix, row-major, values in [0, 1).
const BAYER_4X4: [[f32; 4]; 4] = [
    [0.0 / 16.0, 8.0 / 16.0, 2.0 / 16.0, 10.0 / 16.0],
    [12.0 / 16.0, 4.0 / 16.0, 14.0 / 16.0, 6.0 / 16.0],
    [3.0 / 16.0, 11.0 / 16.0, 1.0 / 16.0, 9.0 / 16.0],
    [15.0 / 16.0, 7.0 / 16.0, 13.0 / 16.0, 5.0 / 16.0],
];

/// Plain thresholding, no dithering.
pub fn threshold_only(window: &[f32], threshold: f32) -> Vec<bool> {
    window.iter().map(|&v| v > threshold).collect()
}

/// Floyd-Steinberg error diffusion over a sequential raster scan.
///
/// Error weights: 7/16 right, 3/16 below-left, 5/16 below, 1/16
/// below-right; spill past the window edge is dropped.
pub fn floyd_steinberg(window: &[f32], width: usize, height: usize, threshold: f32) -> Vec<bool> {
    debug_assert_eq!(window.len(), width * height);
    let mut working = window.to_vec();
    let mut out = vec![false; window.len()];

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = working[idx];
            let on = old > threshold;
            out[idx] = on;
            let error = old - if on { 1.0 } else { 0.0 };

            if x + 1 < width {
                working[idx + 1] += error * 7.0 / 16.0;
            }
            if y + 1 < height {
                let below = idx + width;
                if x > 0 {
                    working[below - 1] += error * 3.0 / 16.0;
                }
                working[below] += error * 5.0 / 16.0;
                if x + 1 < width {
                    working[below + 1] += error * 1.0 / 16.0;
                }
            }
        }
    }
    out
}

/// Ordered dithering against the Bayer matrix.
///
/// The matrix is indexed by absolute page coordinates, so the pattern of
/// two adjacent windows lines up seamlessly.
pub fn ordered(
    window: &[f32],
    width: usize,
    height: usize,
    origin: (usize, usize),
    threshold: f32,
) -> Vec<bool> {
    debug_assert_eq!(window.len(), width * height);
    let (x0, y0) = origin;
    let mut out = vec![false; window.len()];
    for y in 0..height {
        let bayer_row = &BAYER_4X4[(y0 + y) % 4];
        for x in 0..width {
            let idx = y * width + x;
            out[idx] = window[idx] > threshold - 0.5 + bayer_row[(x0 + x) % 4];
        }
    }
    out
}
