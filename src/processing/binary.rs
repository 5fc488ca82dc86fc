//! Binary region rendering: plain thresholding, no dithering.

use crate::config::BinaryProcessingConfig;
use crate::models::BitMask;
use crate::processing::ProcessingStrategy;
use crate::utils::stats::otsu_u8;

/// Fallback threshold when Otsu is undefined for the masked population.
const FALLBACK_THRESHOLD: u8 = 128;

/// Renders binary regions to pure black and white.
pub struct BinaryProcessing {
    config: BinaryProcessingConfig,
}

impl BinaryProcessing {
    /// Build the strategy from its configuration.
    pub fn new(config: BinaryProcessingConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for BinaryProcessing {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn process(&self, gray: &[u8], width: usize, height: usize, mask: &BitMask) -> Vec<u8> {
        let mut result = vec![0u8; width * height];
        if mask.is_empty() {
            return result;
        }

        let threshold = match self.config.threshold {
            Some(t) => t,
            None => {
                let population = (0..height).flat_map(|y| {
                    (0..width)
                        .filter(move |&x| mask.get(x, y))
                        .map(move |x| gray[y * width + x])
                });
                otsu_u8(population).unwrap_or(FALLBACK_THRESHOLD)
            }
        };

        for y in 0..height {
            let row = y * width;
            for x in 0..width {
                if !mask.get(x, y) {
                    continue;
                }
                let mut on = gray[row + x] > threshold;
                if self.config.invert {
                    on = !on;
                }
                result[row + x] = if on { 255 } else { 0 };
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otsu_separates_text_from_paper() {
        let width = 10;
        let height = 10;
        // Dark strokes on light paper.
        let gray: Vec<u8> = (0..width * height)
            .map(|i| if i % 7 == 0 { 30 } else { 220 })
            .collect();
        let strategy = BinaryProcessing::new(BinaryProcessingConfig::default());
        let out = strategy.process(&gray, width, height, &BitMask::full(width, height));
        for (i, &v) in out.iter().enumerate() {
            let expected = if i % 7 == 0 { 0 } else { 255 };
            assert_eq!(v, expected, "pixel {i}");
        }
    }

    #[test]
    fn rendering_is_idempotent() {
        let width = 8;
        let height = 8;
        let gray: Vec<u8> = (0..width * height)
            .map(|i| if i % 3 == 0 { 0 } else { 255 })
            .collect();
        let strategy = BinaryProcessing::new(BinaryProcessingConfig::default());
        let mask = BitMask::full(width, height);
        let once = strategy.process(&gray, width, height, &mask);
        let twice = strategy.process(&once, width, height, &mask);
        assert_eq!(once, twice);
    }

    #[test]
    fn invert_flips_polarity() {
        let gray = vec![0u8, 255, 0, 255];
        let config = BinaryProcessingConfig {
            invert: true,
            ..BinaryProcessingConfig::default()
        };
        let strategy = BinaryProcessing::new(config);
        let out = strategy.process(&gray, 2, 2, &BitMask::full(2, 2));
        assert_eq!(out, vec![255, 0, 255, 0]);
    }

    #[test]
    fn flat_region_falls_back_to_mid_threshold() {
        let gray = vec![200u8; 16];
        let strategy = BinaryProcessing::new(BinaryProcessingConfig::default());
        let out = strategy.process(&gray, 4, 4, &BitMask::full(4, 4));
        // 200 > 128, so the flat region renders white.
        assert!(out.iter().all(|&v| v == 255));
    }

    #[test]
    fn pixels_outside_the_mask_stay_black() {
        let gray = vec![255u8; 16];
        let mut mask = BitMask::new(4, 4);
        mask.set(1, 1, true);
        let strategy = BinaryProcessing::new(BinaryProcessingConfig::default());
        let out = strategy.process(&gray, 4, 4, &mask);
        assert_eq!(out.iter().filter(|&&v| v == 255).count(), 1);
        assert_eq!(out[5], 255);
    }
}
