//! Texture-entropy detection strategy.
//!
//! Photographic areas show rich micro-texture: their local binary pattern
//! histograms have high entropy and their intensity variance is large.
//! Text and line art concentrate on a few uniform patterns.

use crate::config::TextureConfig;
use crate::detection::{DetectionStrategy, WindowPlan};
use crate::models::ProbabilityMap;

/// Intensity variance that maps to a fully saturated variance term.
const VARIANCE_NORM: f32 = 2500.0;

/// Sliding-window LBP entropy + variance analysis.
pub struct TextureEntropy {
    config: TextureConfig,
}

impl TextureEntropy {
    /// Build the strategy from its configuration.
    pub fn new(config: TextureConfig) -> Self {
        Self { config }
    }
}

impl DetectionStrategy for TextureEntropy {
    fn name(&self) -> &'static str {
        "texture"
    }

    fn analyze(&self, gray: &[u8], width: usize, height: usize) -> ProbabilityMap {
        let lbp = uniform_lbp(
            gray,
            width,
            height,
            self.config.lbp_points,
            self.config.lbp_radius as f32,
        );
        let bins = self.config.lbp_points + 2;
        let threshold = self.config.texture_threshold;

        let plan = WindowPlan::new(width, height, self.config.window_size, self.config.stride);
        let window = plan.window;
        plan.accumulate(width, height, |x0, y0| {
            let measure = texture_measure(gray, &lbp, width, height, x0, y0, window, bins);
            (measure / threshold).min(1.0)
        })
    }
}

/// Combined texture measure of one window:
/// 0.5 * normalized LBP-histogram entropy + 0.5 * normalized variance.
fn texture_measure(
    gray: &[u8],
    lbp: &[u8],
    width: usize,
    height: usize,
    x0: usize,
    y0: usize,
    window: usize,
    bins: usize,
) -> f32 {
    let mut histogram = vec![0u32; bins];
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut total = 0u32;

    for y in y0..(y0 + window).min(height) {
        let row = y * width;
        for x in x0..(x0 + window).min(width) {
            histogram[lbp[row + x] as usize] += 1;
            let v = gray[row + x] as f64;
            sum += v;
            sum_sq += v * v;
            total += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }

    let inv_total = 1.0 / total as f64;
    let mut entropy = 0.0f64;
    for &count in &histogram {
        if count > 0 {
            let p = count as f64 * inv_total;
            entropy -= p * p.log2();
        }
    }
    let norm_entropy = (entropy / (bins as f64).log2()) as f32;

    let mean = sum * inv_total;
    let variance = (sum_sq * inv_total - mean * mean).max(0.0) as f32;
    let norm_variance = (variance / VARIANCE_NORM).min(1.0);

    0.5 * norm_entropy + 0.5 * norm_variance
}

/// Uniform local binary pattern image.
///
/// Each pixel compares `points` bilinear samples on a circle of `radius`
/// against the center. Patterns with at most two 0/1 transitions map to
/// their set-bit count; all others collapse into the bin `points + 1`.
/// Sample coordinates are clamped at the image border.
fn uniform_lbp(gray: &[u8], width: usize, height: usize, points: usize, radius: f32) -> Vec<u8> {
    let offsets: Vec<(f32, f32)> = (0..points)
        .map(|p| {
            let angle = 2.0 * std::f32::consts::PI * p as f32 / points as f32;
            // skimage convention: first sample straight down the rows.
            (radius * angle.sin(), radius * angle.cos())
        })
        .collect();

    let sample = |fx: f32, fy: f32| -> f32 {
        let fx = fx.clamp(0.0, (width - 1) as f32);
        let fy = fy.clamp(0.0, (height - 1) as f32);
        let x0 = fx as usize;
        let y0 = fy as usize;
        let x1 = (x0 + 1).min(width - 1);
        let y1 = (y0 + 1).min(height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;
        let top = gray[y0 * width + x0] as f32 * (1.0 - tx) + gray[y0 * width + x1] as f32 * tx;
        let bottom = gray[y1 * width + x0] as f32 * (1.0 - tx) + gray[y1 * width + x1] as f32 * tx;
        top * (1.0 - ty) + bottom * ty
    };

    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let center = gray[y * width + x] as f32;
            let mut bits = vec![false; points];
            for (p, &(dx, dy)) in offsets.iter().enumerate() {
                bits[p] = sample(x as f32 + dx, y as f32 + dy) >= center;
            }

            let mut transitions = 0usize;
            let mut ones = 0usize;
            for p in 0..points {
                if bits[p] {
                    ones += 1;
                }
                if bits[p] != bits[(p + 1) % points] {
                    transitions += 1;
                }
            }
            out[y * width + x] = if transitions <= 2 {
                ones as u8
            } else {
                (points + 1) as u8
            };
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise_image(width: usize, height: usize, seed: u64) -> Vec<u8> {
        let mut state = seed | 1;
        (0..width * height)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state % 256) as u8
            })
            .collect()
    }

    #[test]
    fn map_is_full_resolution_and_in_domain() {
        let strategy = TextureEntropy::new(TextureConfig::default());
        let gray = noise_image(70, 50, 3);
        let map = strategy.analyze(&gray, 70, 50);
        assert_eq!((map.width(), map.height()), (70, 50));
        assert!(map.in_domain());
    }

    #[test]
    fn flat_image_has_zero_texture() {
        let strategy = TextureEntropy::new(TextureConfig::default());
        let gray = vec![128u8; 48 * 48];
        let map = strategy.analyze(&gray, 48, 48);
        // Entropy of a single-bin histogram and variance are both zero.
        assert!(map.max() < 1e-6);
    }

    #[test]
    fn noise_scores_higher_than_flat() {
        let strategy = TextureEntropy::new(TextureConfig::default());
        let noise = noise_image(48, 48, 11);
        let map = strategy.analyze(&noise, 48, 48);
        assert!(map.mean() > 0.5, "noise should read textured, got {}", map.mean());
    }

    #[test]
    fn uniform_lbp_flat_region_is_uniform_pattern() {
        let gray = vec![100u8; 10 * 10];
        let lbp = uniform_lbp(&gray, 10, 10, 8, 1.0);
        // All samples equal the center, so every bit is set: label = points.
        assert!(lbp.iter().all(|&v| v == 8));
    }

    #[test]
    fn uniform_lbp_labels_stay_in_range() {
        let gray = noise_image(20, 20, 19);
        let points = 24;
        let lbp = uniform_lbp(&gray, 20, 20, points, 3.0);
        assert!(lbp.iter().all(|&v| (v as usize) <= points + 1));
    }

    #[test]
    fn one_pixel_wide_image_is_defined() {
        let strategy = TextureEntropy::new(TextureConfig::default());
        let gray: Vec<u8> = (0..40).map(|i| (i * 6) as u8).collect();
        let map = strategy.analyze(&gray, 1, 40);
        assert!(map.values().iter().all(|v| v.is_finite()));
    }
}
