//! Region detection: per-pixel grayscale-likelihood estimation.
//!
//! Three fixed strategies each turn the grayscale page into a
//! [`ProbabilityMap`]; the engine runs every enabled strategy (weight > 0)
//! and combines the maps as a weighted average. The strategy set is closed
//! and selected through [`StrategyWeights`](crate::config::StrategyWeights)
//! rather than a runtime registry, so combination order is fixed and the
//! result is independent of execution order.

pub mod edges;
pub mod histogram;
pub mod texture;

use rayon::prelude::*;
use tracing::debug;

use crate::config::DetectionConfig;
use crate::error::StageError;
use crate::models::ProbabilityMap;

pub use edges::EdgeDensity;
pub use histogram::HistogramBimodality;
pub use texture::TextureEntropy;

/// A detection strategy: grayscale image in, full-resolution likelihood
/// map out. Strategies are configured at construction and hold no mutable
/// state, so they are freely shared across threads.
pub trait DetectionStrategy: Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Produce a probability map with the source dimensions, values in
    /// [0, 1].
    fn analyze(&self, gray: &[u8], width: usize, height: usize) -> ProbabilityMap;
}

/// Sliding-window placement over one scale of the image.
///
/// Windows start at stride steps; a final clamped window at `dim - window`
/// guarantees every pixel is covered, and overlapping contributions are
/// resolved by count-weighted averaging.
pub(crate) struct WindowPlan {
    /// Effective window side after the small-image shrink rule.
    pub window: usize,
    xs: Vec<usize>,
    ys: Vec<usize>,
}

impl WindowPlan {
    /// Plan windows for an image, shrinking the window for images smaller
    /// than the configured size (stride becomes half the shrunk window).
    pub fn new(width: usize, height: usize, window_size: usize, stride: usize) -> Self {
        let (window, stride) = if height < window_size || width < window_size {
            let w = height.min(width).min(window_size).max(1);
            (w, (w / 2).max(1))
        } else {
            (window_size, stride)
        };
        Self {
            window,
            xs: Self::starts(width, window, stride),
            ys: Self::starts(height, window, stride),
        }
    }

    fn starts(dim: usize, window: usize, stride: usize) -> Vec<usize> {
        let last = dim.saturating_sub(window);
        let mut starts: Vec<usize> = (0..=last).step_by(stride).collect();
        if *starts.last().unwrap_or(&0) != last {
            starts.push(last);
        }
        starts
    }

    /// Evaluate `f` for every window in parallel and average the
    /// per-window values into a full-resolution map, weighting each pixel
    /// by how many windows covered it.
    pub fn accumulate(
        &self,
        width: usize,
        height: usize,
        f: impl Fn(usize, usize) -> f32 + Sync,
    ) -> ProbabilityMap {
        let window = self.window;
        let cells: Vec<(usize, usize)> = self
            .ys
            .iter()
            .flat_map(|&y| self.xs.iter().map(move |&x| (x, y)))
            .collect();

        let probs: Vec<f32> = cells.par_iter().map(|&(x, y)| f(x, y)).collect();

        let mut result = vec![0.0f32; width * height];
        let mut count = vec![0.0f32; width * height];
        for (&(x0, y0), &p) in cells.iter().zip(&probs) {
            for y in y0..(y0 + window).min(height) {
                let row = y * width;
                for x in x0..(x0 + window).min(width) {
                    result[row + x] += p;
                    count[row + x] += 1.0;
                }
            }
        }
        for (r, c) in result.iter_mut().zip(&count) {
            if *c > 0.0 {
                *r /= c;
            }
        }
        ProbabilityMap::from_vec(result, width, height)
    }
}

/// Elementwise weighted average of probability maps. Weights are
/// normalized to sum to one; a zero total weight yields an all-zero map.
pub fn combine_maps(maps: &[ProbabilityMap], weights: &[f32]) -> ProbabilityMap {
    debug_assert_eq!(maps.len(), weights.len());
    let (width, height) = match maps.first() {
        Some(m) => (m.width(), m.height()),
        None => return ProbabilityMap::zeros(0, 0),
    };

    let total: f32 = weights.iter().sum();
    let mut combined = ProbabilityMap::zeros(width, height);
    if total <= 0.0 {
        return combined;
    }
    for (map, &weight) in maps.iter().zip(weights) {
        combined.accumulate(map, weight / total);
    }
    combined
}

/// Runs the enabled strategies and fuses their maps.
pub struct DetectionEngine {
    histogram: HistogramBimodality,
    texture: TextureEntropy,
    edges: EdgeDensity,
    weights: [f32; 3],
}

impl DetectionEngine {
    /// Build the engine from a validated detection configuration.
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            histogram: HistogramBimodality::new(config.histogram.clone()),
            texture: TextureEntropy::new(config.texture.clone()),
            edges: EdgeDensity::new(config.edge.clone()),
            weights: [
                config.strategy_weights.histogram,
                config.strategy_weights.texture,
                config.strategy_weights.edge,
            ],
        }
    }

    /// Run every enabled strategy and combine the maps by weight.
    ///
    /// Returns an all-zero map when no strategy is enabled.
    pub fn detect(
        &self,
        gray: &[u8],
        width: usize,
        height: usize,
    ) -> Result<ProbabilityMap, StageError> {
        let strategies: [(&dyn DetectionStrategy, f32); 3] = [
            (&self.histogram, self.weights[0]),
            (&self.texture, self.weights[1]),
            (&self.edges, self.weights[2]),
        ];
        let enabled: Vec<(&dyn DetectionStrategy, f32)> = strategies
            .into_iter()
            .filter(|&(_, w)| w > 0.0)
            .collect();

        if enabled.is_empty() {
            debug!("no detection strategy enabled, returning zero map");
            return Ok(ProbabilityMap::zeros(width, height));
        }

        let maps: Vec<ProbabilityMap> = enabled
            .par_iter()
            .map(|(strategy, _)| strategy.analyze(gray, width, height))
            .collect();

        for ((strategy, _), map) in enabled.iter().zip(&maps) {
            if map.width() != width || map.height() != height {
                return Err(StageError::DimensionMismatch {
                    got_w: map.width(),
                    got_h: map.height(),
                    want_w: width,
                    want_h: height,
                });
            }
            if let Some(bad) = map.domain_violation() {
                return Err(StageError::ProbabilityOutOfDomain(bad));
            }
            debug!(
                strategy = strategy.name(),
                max = map.max(),
                mean = map.mean(),
                "strategy map computed"
            );
        }

        let weights: Vec<f32> = enabled.iter().map(|&(_, w)| w).collect();
        let combined = combine_maps(&maps, &weights);
        debug!(max = combined.max(), mean = combined.mean(), "combined probability map");
        Ok(combined)
    }
}
