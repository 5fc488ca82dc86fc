//! Histogram-bimodality detection strategy.
//!
//! Binary material (text, engravings) produces strongly bimodal local
//! histograms; continuous-tone material spreads its mass. The bimodality
//! coefficient (skewness^2 + 1) / kurtosis separates the two: high for
//! two-spike distributions, low for broad ones.

use crate::config::HistogramConfig;
use crate::detection::{DetectionStrategy, WindowPlan};
use crate::models::ProbabilityMap;
use crate::utils::resize::{resize_f32, resize_u8};

const BINS: usize = 64;
const BIN_WIDTH: f32 = 256.0 / BINS as f32;

/// Sliding-window bimodality analysis at multiple scales.
pub struct HistogramBimodality {
    config: HistogramConfig,
}

impl HistogramBimodality {
    /// Build the strategy from its configuration.
    pub fn new(config: HistogramConfig) -> Self {
        Self { config }
    }

    fn analyze_scale(&self, gray: &[u8], width: usize, height: usize) -> ProbabilityMap {
        let plan = WindowPlan::new(width, height, self.config.window_size, self.config.stride);
        let window = plan.window;
        let threshold = self.config.bimodality_threshold;
        plan.accumulate(width, height, |x0, y0| {
            window_probability(gray, width, height, x0, y0, window, threshold)
        })
    }
}

impl DetectionStrategy for HistogramBimodality {
    fn name(&self) -> &'static str {
        "histogram"
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

/// Grayscale probability of one window.
///
/// A zero-variance window carries no tonal information and reads as binary
/// (probability 0). Otherwise the bimodality coefficient is mapped through
/// max(0.2, 1 - min(0.8, bimodality / threshold)).
fn window_probability(
    gray: &[u8],
    width: usize,
    height: usize,
    x0: usize,
    y0: usize,
    window: usize,
    threshold: f32,
) -> f32 {
    let mut histogram = [0u32; BINS];
    let mut total = 0u32;
    for y in y0..(y0 + window).min(height) {
        let row = y * width;
        for x in x0..(x0 + window).min(width) {
            histogram[(gray[row + x] as f32 / BIN_WIDTH) as usize] += 1;
            total += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }

    match bimodality_coefficient(&histogram, total) {
        None => 0.0, // flat window
        Some(bimodality) => (1.0 - (bimodality / threshold).min(0.8)).max(0.2),
    }
}

/// Bimodality coefficient (skewness^2 + 1) / kurtosis of a 64-bin
/// histogram, computed over bin centers. `None` for degenerate (zero
/// variance) distributions; 0 when kurtosis is non-positive.
fn bimodality_coefficient(histogram: &[u32; BINS], total: u32) -> Option<f32> {
    let inv_total = 1.0 / total as f64;
    let center = |i: usize| (i as f64 + 0.5) * BIN_WIDTH as f64;

    let mean: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| center(i) * c as f64 * inv_total)
        .sum();

    let mut variance = 0.0f64;
    let mut m3 = 0.0f64;
    let mut m4 = 0.0f64;
    for (i, &c) in histogram.iter().enumerate() {
        let p = c as f64 * inv_total;
        let d = center(i) - mean;
        variance += d * d * p;
        m3 += d * d * d * p;
        m4 += d * d * d * d * p;
    }
    if variance <= f64::EPSILON {
        return None;
    }

    let skewness = m3 / variance.powf(1.5);
    let kurtosis = m4 / (variance * variance);
    if kurtosis <= 0.0 {
        return Some(0.0);
    }
    Some(((skewness * skewness + 1.0) / kurtosis) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise_image(width: usize, height: usize, seed: u64) -> Vec<u8> {
        // Small xorshift so tests stay dependency-free and deterministic.
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
        let strategy = HistogramBimodality::new(HistogramConfig::default());
        let gray = noise_image(80, 60, 42);
        let map = strategy.analyze(&gray, 80, 60);
        assert_eq!((map.width(), map.height()), (80, 60));
        assert!(map.in_domain());
    }

    #[test]
    fn flat_image_reads_as_binary() {
        let strategy = HistogramBimodality::new(HistogramConfig::default());
        let gray = vec![200u8; 64 * 64];
        let map = strategy.analyze(&gray, 64, 64);
        assert!(map.max() < 1e-6, "flat image should have ~0 probability, got {}", map.max());
    }

    #[test]
    fn two_tone_window_scores_below_a_peaked_window() {
        // Checkerboard of 0/255: sharply bimodal, clamps to the 0.2 floor.
        let two_tone: Vec<u8> = (0..32 * 32)
            .map(|i| if (i / 32 + i % 32) % 2 == 0 { 0 } else { 255 })
            .collect();
        let bimodal = window_probability(&two_tone, 32, 32, 0, 0, 32, 0.5);
        assert_eq!(bimodal, 0.2, "checkerboard should floor at 0.2, got {bimodal}");

        // Mostly mid-gray with sparse extremes: heavy tails push kurtosis
        // up and the bimodality coefficient well below the clamp.
        let peaked: Vec<u8> = (0..32 * 32)
            .map(|i| match i % 85 {
                0 => 0,
                42 => 255,
                _ => 128,
            })
            .collect();
        let peak = window_probability(&peaked, 32, 32, 0, 0, 32, 0.5);
        assert!(peak > 0.5, "peaked window should read as grayscale, got {peak}");
        assert!(bimodal < peak);
    }

    #[test]
    fn one_pixel_image_is_defined() {
        let strategy = HistogramBimodality::new(HistogramConfig::default());
        let map = strategy.analyze(&[128], 1, 1);
        assert_eq!((map.width(), map.height()), (1, 1));
        assert!(map.get(0, 0).is_finite());
    }

    #[test]
    fn bimodality_of_two_spikes_is_high() {
        let mut histogram = [0u32; BINS];
        histogram[0] = 500;
        histogram[BINS - 1] = 500;
        let two_spike = bimodality_coefficient(&histogram, 1000).unwrap();

        let mut broad = [0u32; BINS];
        for (i, c) in broad.iter_mut().enumerate() {
            // Triangular bump centered mid-range.
            let d = (i as i64 - 32).unsigned_abs() as u32;
            *c = 32u32.saturating_sub(d);
        }
        let total: u32 = broad.iter().sum();
        let broad_value = bimodality_coefficient(&broad, total).unwrap();

        assert!(two_spike > broad_value);
        assert!(two_spike > 0.9, "two spikes should approach 1, got {two_spike}");
    }
}
