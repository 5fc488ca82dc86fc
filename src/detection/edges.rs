//! Edge-density detection strategy.
//!
//! Photographs carry a moderate density of soft edges; text is either
//! nearly edge-free (margins) or saturated with sharp strokes. Windowed
//! Sobel edge density is therefore banded: the mid band votes strongly
//! for grayscale, both extremes vote weakly.

use crate::config::EdgeConfig;
use crate::detection::{DetectionStrategy, WindowPlan};
use crate::models::ProbabilityMap;
use crate::utils::filters::{gaussian_blur, sobel_magnitude};
use crate::utils::resize::{resize_f32, resize_u8};

/// Sliding-window edge density analysis at multiple scales.
pub struct EdgeDensity {
    config: EdgeConfig,
}

impl EdgeDensity {
    /// Build the strategy from its configuration.
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }

    fn analyze_scale(&self, gray: &[u8], width: usize, height: usize) -> ProbabilityMap {
        let magnitude = sobel_magnitude(gray, width, height);
        let threshold = self.config.edge_threshold;
        let edges: Vec<bool> = magnitude.iter().map(|&m| m > threshold).collect();

        let min_density = self.config.min_edge_density;
        let max_density = self.config.max_edge_density;
        let plan = WindowPlan::new(width, height, self.config.window_size, self.config.stride);
        let window = plan.window;
        let map = plan.accumulate(width, height, |x0, y0| {
            let density = edge_density(&edges, width, height, x0, y0, window);
            band_probability(density, min_density, max_density)
        });

        if self.config.smooth_radius > 0.0 {
            let sigma = self.config.smooth_radius / 2.0;
            let smoothed = gaussian_blur(map.values(), width, height, sigma);
            ProbabilityMap::from_vec(smoothed, width, height)
        } else {
            map
        }
    }
}

impl DetectionStrategy for EdgeDensity {
    fn name(&self) -> &'static str {
        "edges"
    }

    fn analyze(&self, gray: &[u8], width: usize, height: usize) -> ProbabilityMap {
        let mut combined = ProbabilityMap::zeros(width, height);
        let share = 1.0 / self.config.scales.len() as f32;

        for &scale in &self.config.scales {
            let map = if (scale - 1.0).abs() < f32::EPSILON {
                self.analyze_scale(gray, width, height)
            } else {
                let sw = ((width as f32 * scale) as usize).max(1);
                let sh = ((height as f32 * scale) as usize).max(1);
                let scaled = resize_u8(gray, width, height, sw, sh);
                let small = self.analyze_scale(&scaled, sw, sh);
                let full = resize_f32(small.values(), sw, sh, width, height);
                ProbabilityMap::from_vec(full, width, height)
            };
            combined.accumulate(&map, share);
        }
        combined
    }
}

fn edge_density(
    edges: &[bool],
    width: usize,
    height: usize,
    x0: usize,
    y0: usize,
    window: usize,
) -> f32 {
    let mut set = 0u32;
    let mut total = 0u32;
    for y in y0..(y0 + window).min(height) {
        let row = y * width;
        for x in x0..(x0 + window).min(width) {
            set += edges[row + x] as u32;
            total += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    set as f32 / total as f32
}

/// Map a window's edge density into a grayscale probability.
///
/// Below the band: smooth area, weak vote (0.2). Above it: dense strokes,
/// weak-to-medium vote (0.3). Inside: ramp from 0.7 up to 1.0.
fn band_probability(density: f32, min_density: f32, max_density: f32) -> f32 {
    if density < min_density {
        0.2
    } else if density > max_density {
        0.3
    } else {
        let span = max_density - min_density;
        0.7 + 0.3 * ((density - min_density) / span)
    }
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
        let strategy = EdgeDensity::new(EdgeConfig::default());
        let gray = noise_image(90, 60, 5);
        let map = strategy.analyze(&gray, 90, 60);
        assert_eq!((map.width(), map.height()), (90, 60));
        assert!(map.in_domain());
    }

    #[test]
    fn band_mapping_boundaries() {
        assert_eq!(band_probability(0.01, 0.05, 0.3), 0.2);
        assert_eq!(band_probability(0.5, 0.05, 0.3), 0.3);
        assert!((band_probability(0.05, 0.05, 0.3) - 0.7).abs() < 1e-6);
        assert!((band_probability(0.3, 0.05, 0.3) - 1.0).abs() < 1e-6);
        let mid = band_probability(0.175, 0.05, 0.3);
        assert!((mid - 0.85).abs() < 1e-6);
    }

    #[test]
    fn flat_image_sits_at_the_low_band() {
        let config = EdgeConfig {
            scales: vec![1.0],
            smooth_radius: 0.0,
            ..EdgeConfig::default()
        };
        let strategy = EdgeDensity::new(config);
        let gray = vec![180u8; 64 * 64];
        let map = strategy.analyze(&gray, 64, 64);
        // No edges anywhere: every window gets the smooth-area vote.
        assert!(map.values().iter().all(|&v| (v - 0.2).abs() < 1e-6));
    }

    #[test]
    fn gradient_patch_scores_above_flat() {
        let config = EdgeConfig {
            scales: vec![1.0],
            smooth_radius: 0.0,
            ..EdgeConfig::default()
        };
        let strategy = EdgeDensity::new(config);

        // Sparse vertical lines: a handful of strong edges per window.
        let width = 64;
        let gray: Vec<u8> = (0..width * 64)
            .map(|i| if (i % width) % 16 == 0 { 0 } else { 255 })
            .collect();
        let lined = strategy.analyze(&gray, width, 64);

        let flat = strategy.analyze(&vec![255u8; width * 64], width, 64);
        assert!(lined.mean() > flat.mean());
    }

    #[test]
    fn smoothing_keeps_the_domain() {
        let strategy = EdgeDensity::new(EdgeConfig::default());
        let gray = noise_image(48, 48, 23);
        let map = strategy.analyze(&gray, 48, 48);
        assert!(map.in_domain());
    }
}
