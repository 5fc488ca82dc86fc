//! Grayscale region rendering.
//!
//! Pixels are normalized, pushed through a sigmoid brightness/contrast
//! curve, then either kept as continuous tone (with unsharp enhancement)
//! or binarized with the configured dithering. All 2-D work happens on the
//! region's bounding-box window; only masked pixels land in the output.

use crate::config::{DitherType, GrayscaleProcessingConfig};
use crate::models::BitMask;
use crate::processing::{ProcessingStrategy, dither};
use crate::utils::filters::gaussian_blur;
use crate::utils::stats::otsu_normalized;

/// Region size above which the working mask is eroded by one pixel to
/// avoid halo artifacts at the boundary.
const ERODE_AREA: usize = 1000;

/// Region size below which unsharp enhancement is skipped.
const ENHANCE_MIN_AREA: usize = 100;

/// Renders grayscale regions with tone adjustment and optional dithering.
pub struct GrayscaleProcessing {
    config: GrayscaleProcessingConfig,
}

impl GrayscaleProcessing {
    /// Build the strategy from its configuration.
    pub fn new(config: GrayscaleProcessingConfig) -> Self {
        Self { config }
    }

    /// Sigmoid tone curve: cutoff from brightness, gain from contrast.
    fn adjust(&self, value: f32) -> f32 {
        let cutoff = 0.5 - self.config.brightness / 2.0;
        let gain = self.config.contrast * 5.0;
        let adjusted = 1.0 / (1.0 + (gain * (cutoff - value)).exp());
        adjusted.clamp(0.0, 1.0)
    }
}

impl ProcessingStrategy for GrayscaleProcessing {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn process(&self, gray: &[u8], width: usize, height: usize, mask: &BitMask) -> Vec<u8> {
        let mut result = vec![0u8; width * height];

        let area = mask.count_ones();
        if area == 0 {
            return result;
        }
        // Pull in one pixel on large regions so boundary pixels are not
        // reprocessed against the neighboring region's tone.
        let working = if area > ERODE_AREA {
            mask.erode_disk(1)
        } else {
            mask.clone()
        };
        let Some((by0, bx0, by1, bx1)) = working.bounding_box() else {
            return result;
        };
        let win_w = bx1 - bx0 + 1;
        let win_h = by1 - by0 + 1;

        // Tone-adjusted bounding-box window; unmasked pixels inside it
        // still participate in blurring and error diffusion but are never
        // written out.
        let mut window = vec![0.0f32; win_w * win_h];
        for wy in 0..win_h {
            for wx in 0..win_w {
                let value = gray[(by0 + wy) * width + bx0 + wx] as f32 / 255.0;
                window[wy * win_w + wx] = self.adjust(value);
            }
        }

        if self.config.preserve_grayscale {
            let enhanced = if working.count_ones() > ENHANCE_MIN_AREA {
                unsharp_blend(&window, win_w, win_h)
            } else {
                window
            };
            for wy in 0..win_h {
                for wx in 0..win_w {
                    if working.get(bx0 + wx, by0 + wy) {
                        let v = enhanced[wy * win_w + wx];
                        result[(by0 + wy) * width + bx0 + wx] = (v * 255.0).round() as u8;
                    }
                }
            }
            return result;
        }

        let threshold = match self.config.threshold {
            Some(t) => t as f32 / 255.0,
            None => {
                let masked: Vec<f32> = window
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| working.get(bx0 + i % win_w, by0 + i / win_w))
                    .map(|(_, &v)| v)
                    .collect();
                otsu_normalized(&masked).unwrap_or(0.5)
            }
        };

        let bits = match self.config.dither_type {
            DitherType::None => dither::threshold_only(&window, threshold),
            DitherType::FloydSteinberg => {
                dither::floyd_steinberg(&window, win_w, win_h, threshold)
            }
            DitherType::Ordered => dither::ordered(&window, win_w, win_h, (bx0, by0), threshold),
        };

        for wy in 0..win_h {
            for wx in 0..win_w {
                if working.get(bx0 + wx, by0 + wy) {
                    result[(by0 + wy) * width + bx0 + wx] =
                        if bits[wy * win_w + wx] { 255 } else { 0 };
                }
            }
        }
        result
    }
}

/// Unsharp masking blended 70/30 with the plain adjusted values.
fn unsharp_blend(window: &[f32], width: usize, height: usize) -> Vec<f32> {
    let blurred = gaussian_blur(window, width, height, 1.0);
    window
        .iter()
        .zip(&blurred)
        .map(|(&v, &b)| {
            let enhanced = (v + 0.5 * (v - b)).clamp(0.0, 1.0);
            (0.7 * enhanced + 0.3 * v).clamp(0.0, 1.0)
        })
        .collect()
}
