//! Small dense-image filters: separable Gaussian blur and Sobel gradient
//! magnitude. Both operate on row-major f32 buffers in [0, 1].

/// Gaussian blur with the given sigma. Sigma <= 0 returns the input
/// unchanged. Borders are handled by clamping (edge replication).
pub fn gaussian_blur(src: &[f32], width: usize, height: usize, sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 || src.is_empty() {
        return src.to_vec();
    }
    let kernel = gaussian_kernel(sigma);
    let half = kernel.len() / 2;

    // Horizontal pass.
    let mut tmp = vec![0.0f32; src.len()];
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sx = (x + k).saturating_sub(half).min(width - 1);
                acc += row[sx] * w;
            }
            tmp[y * width + x] = acc;
        }
    }

    // Vertical pass.
    let mut dst = vec![0.0f32; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = (y + k).saturating_sub(half).min(height - 1);
                acc += tmp[sy * width + x] * w;
            }
            dst[y * width + x] = acc;
        }
    }
    dst
}

/// Normalized 1-D Gaussian kernel with radius ceil(3 sigma).
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil().max(1.0) as usize;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-d * d / denom).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Sobel gradient magnitude of an 8-bit grayscale image, scaled so a unit
/// step edge maps near 1.0 (kernels normalized by 4, magnitude by sqrt 2).
/// Border pixels replicate their nearest interior neighbor.
pub fn sobel_magnitude(gray: &[u8], width: usize, height: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; width * height];
    if width < 3 || height < 3 {
        return out;
    }

    let at = |x: usize, y: usize| gray[y * width + x] as f32 / 255.0;
    let inv_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2.0 * at(x - 1, y)
                - at(x - 1, y + 1))
                / 4.0;
            let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2.0 * at(x, y - 1)
                - at(x + 1, y - 1))
                / 4.0;
            out[y * width + x] = (gx * gx + gy * gy).sqrt() * inv_sqrt2;
        }
    }

    // Replicate the one-pixel frame from the interior.
    for x in 0..width {
        out[x] = out[width + x.clamp(1, width - 2)];
        out[(height - 1) * width + x] = out[(height - 2) * width + x.clamp(1, width - 2)];
    }
    for y in 0..height {
        out[y * width] = out[y.clamp(1, height - 2) * width + 1];
        out[y * width + width - 1] = out[y.clamp(1, height - 2) * width + width - 2];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_preserves_constant_images() {
        let src = vec![0.25f32; 10 * 10];
        let out = gaussian_blur(&src, 10, 10, 1.5);
        assert!(out.iter().all(|&v| (v - 0.25).abs() < 1e-5));
    }

    #[test]
    fn blur_with_zero_sigma_is_identity() {
        let src: Vec<f32> = (0..12).map(|i| i as f32 / 12.0).collect();
        assert_eq!(gaussian_blur(&src, 4, 3, 0.0), src);
    }

    #[test]
    fn blur_smooths_an_impulse() {
        let mut src = vec![0.0f32; 9 * 9];
        src[4 * 9 + 4] = 1.0;
        let out = gaussian_blur(&src, 9, 9, 1.0);
        let center = out[4 * 9 + 4];
        assert!(center < 1.0 && center > 0.0);
        let total: f32 = out.iter().sum();
        assert!((total - 1.0).abs() < 1e-3, "blur should conserve mass, got {total}");
    }

    #[test]
    fn sobel_flat_image_has_no_edges() {
        let gray = vec![128u8; 8 * 8];
        let mag = sobel_magnitude(&gray, 8, 8);
        // The kernel sums cancel only up to f32 rounding.
        assert!(mag.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn sobel_detects_a_vertical_step() {
        let mut gray = vec![0u8; 8 * 8];
        for y in 0..8 {
            for x in 4..8 {
                gray[y * 8 + x] = 255;
            }
        }
        let mag = sobel_magnitude(&gray, 8, 8);
        // Strong response along the step columns, none far away.
        assert!(mag[3 * 8 + 3] > 0.5);
        assert!(mag[3 * 8 + 1] == 0.0);
    }

    #[test]
    fn sobel_tiny_image_is_defined() {
        let gray = vec![10u8, 200];
        let mag = sobel_magnitude(&gray, 2, 1);
        assert!(mag.iter().all(|v| v.is_finite()));
    }
}
