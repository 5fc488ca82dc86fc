//! Configuration for the separation pipeline.
//!
//! All tunables are immutable, caller-supplied values grouped per stage.
//! Defaults reproduce the tuning the pipeline ships with; `validate` fails
//! fast on contradictory values instead of clamping them silently. The only
//! silent recoveries in the crate are the documented Otsu fallbacks in the
//! processing strategies.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Weights for combining the detection strategies.
///
/// A weight of zero (or less) disables the strategy. Weights are normalized
/// to sum to one before combination.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyWeights {
    /// Histogram-bimodality strategy weight.
    pub histogram: f32,
    /// Texture-entropy strategy weight.
    pub texture: f32,
    /// Edge-density strategy weight.
    pub edge: f32,
}

impl Default for StrategyWeights {
    fn default() -> Self {
        Self {
            histogram: 0.4,
            texture: 0.4,
            edge: 0.2,
        }
    }
}

/// Histogram-bimodality strategy tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    /// Sliding window side in pixels.
    pub window_size: usize,
    /// Window stride in pixels.
    pub stride: usize,
    /// Bimodality coefficient above which a window reads as binary.
    pub bimodality_threshold: f32,
    /// Analysis scales; results are resized back and averaged.
    pub scales: Vec<f32>,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            window_size: 32,
            stride: 16,
            bimodality_threshold: 0.5,
            scales: vec![1.0, 0.5, 0.25],
        }
    }
}

/// Texture-entropy strategy tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Sliding window side in pixels.
    pub window_size: usize,
    /// Window stride in pixels.
    pub stride: usize,
    /// Radius of the LBP sampling circle.
    pub lbp_radius: usize,
    /// Number of LBP sampling points (4..=32).
    pub lbp_points: usize,
    /// Texture measure above which a window reads as fully grayscale.
    pub texture_threshold: f32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            window_size: 32,
            stride: 16,
            lbp_radius: 3,
            lbp_points: 24,
            texture_threshold: 0.3,
        }
    }
}

/// Edge-density strategy tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Sliding window side in pixels.
    pub window_size: usize,
    /// Window stride in pixels.
    pub stride: usize,
    /// Sobel magnitude above which a pixel counts as an edge.
    pub edge_threshold: f32,
    /// Edge density below this reads as smooth (low probability).
    pub min_edge_density: f32,
    /// Edge density above this reads as dense text (low-medium probability).
    pub max_edge_density: f32,
    /// Radius of the final Gaussian smoothing (sigma = radius / 2).
    pub smooth_radius: f32,
    /// Analysis scales; results are resized back and averaged.
    pub scales: Vec<f32>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            window_size: 32,
            stride: 16,
            edge_threshold: 0.1,
            min_edge_density: 0.05,
            max_edge_density: 0.3,
            smooth_radius: 5.0,
            scales: vec![1.0, 0.5],
        }
    }
}

/// Detection stage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Per-strategy combination weights.
    pub strategy_weights: StrategyWeights,
    /// Histogram-bimodality strategy tunables.
    pub histogram: HistogramConfig,
    /// Texture-entropy strategy tunables.
    pub texture: TextureConfig,
    /// Edge-density strategy tunables.
    pub edge: EdgeConfig,
}

/// Region extraction configuration.
///
/// The area-tier multipliers are empirically tuned constants carried over
/// from the original tuning; treat them as calibration values, not derived
/// ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Probability threshold for the initial binary mask.
    pub threshold: f32,
    /// Dilation radius applied to accepted regions (captures anti-aliased
    /// edges). Zero disables expansion.
    pub expand_pixels: usize,
    /// Fill enclosed holes in the thresholded mask before labeling.
    pub fill_holes: bool,
    /// Base perimeter/area ratio above which a component is line-like.
    pub max_perimeter_area_ratio: f32,
    /// Minimum component area for the "large" tier.
    pub min_blob_area: usize,
    /// Base circularity a photographic blob is expected to reach.
    pub blob_circularity: f32,
    /// Perimeter/area ratio above which a component looks like text.
    pub text_perimeter_area_threshold: f32,
    /// Circularity below which a text-like component is rejected even when
    /// very large.
    pub min_text_circularity: f32,
    /// Area multiplier for the "very large" tier.
    pub very_large_region_multiplier: usize,
    /// Ratio slack for the "large" tier.
    pub large_region_ratio_multiplier: f32,
    /// Circularity slack for the "large" tier.
    pub large_region_circularity_multiplier: f32,
    /// Divider producing the "medium" tier floor from `min_blob_area`.
    pub medium_region_divider: usize,
    /// Ratio slack for the "medium" tier.
    pub medium_region_ratio_multiplier: f32,
    /// Circularity slack for the "medium" tier.
    pub medium_region_circularity_multiplier: f32,
    /// Ratio slack for the "small" tier.
    pub small_region_ratio_multiplier: f32,
    /// Circularity slack for the "small" tier.
    pub small_region_circularity_multiplier: f32,
    /// Absolute area floor for the "small" tier.
    pub small_region_min_area: usize,
    /// Region count above which nearby regions are merged.
    pub merge_region_limit: usize,
    /// Bounding-box distance below which two regions merge.
    pub distance_threshold: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            expand_pixels: 5,
            fill_holes: true,
            max_perimeter_area_ratio: 0.1,
            min_blob_area: 1000,
            blob_circularity: 0.2,
            text_perimeter_area_threshold: 0.08,
            min_text_circularity: 0.1,
            very_large_region_multiplier: 10,
            large_region_ratio_multiplier: 1.2,
            large_region_circularity_multiplier: 0.6,
            medium_region_divider: 4,
            medium_region_ratio_multiplier: 0.9,
            medium_region_circularity_multiplier: 0.8,
            small_region_ratio_multiplier: 0.5,
            small_region_circularity_multiplier: 2.0,
            small_region_min_area: 2000,
            merge_region_limit: 20,
            distance_threshold: 30,
        }
    }
}

/// Dithering algorithm for grayscale regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DitherType {
    /// Plain thresholding, no dithering.
    None,
    /// Error-diffusion dithering, sequential raster scan.
    #[default]
    FloydSteinberg,
    /// Ordered dithering with a 4x4 Bayer matrix.
    Ordered,
}

/// Binary region rendering tunables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryProcessingConfig {
    /// Fixed threshold; `None` selects Otsu over the masked population.
    pub threshold: Option<u8>,
    /// Flip polarity of the rendered region.
    pub invert: bool,
}

/// Grayscale region rendering tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrayscaleProcessingConfig {
    /// Brightness offset in [-1, 1].
    pub brightness: f32,
    /// Contrast gain in [0, 2].
    pub contrast: f32,
    /// Dithering algorithm.
    pub dither_type: DitherType,
    /// Keep continuous tone (unsharp-enhanced) instead of thresholding.
    pub preserve_grayscale: bool,
    /// Fixed threshold in 0..=255; `None` selects Otsu on adjusted values.
    pub threshold: Option<u8>,
}

impl Default for GrayscaleProcessingConfig {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            dither_type: DitherType::FloydSteinberg,
            preserve_grayscale: false,
            threshold: None,
        }
    }
}

/// Processing stage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Binary region rendering tunables.
    pub binary: BinaryProcessingConfig,
    /// Grayscale region rendering tunables.
    pub grayscale: GrayscaleProcessingConfig,
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparatorConfig {
    /// Detection stage configuration.
    pub detection: DetectionConfig,
    /// Region extraction configuration.
    pub extraction: ExtractionConfig,
    /// Processing stage configuration.
    pub processing: ProcessingConfig,
}

fn check_window(window_size: usize, stride: usize) -> Result<(), ConfigError> {
    if window_size < 2 {
        return Err(ConfigError::WindowTooSmall(window_size));
    }
    if stride == 0 {
        return Err(ConfigError::ZeroStride);
    }
    Ok(())
}

fn check_scales(scales: &[f32]) -> Result<(), ConfigError> {
    if scales.is_empty() {
        return Err(ConfigError::BadScale(f32::NAN));
    }
    for &s in scales {
        if !(s > 0.0 && s <= 1.0) {
            return Err(ConfigError::BadScale(s));
        }
    }
    Ok(())
}

fn check_weight(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::BadWeight { name, value });
    }
    Ok(())
}

fn check_unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ThresholdOutOfRange { name, value });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfigError::NotPositive { name, value });
    }
    Ok(())
}

impl SeparatorConfig {
    /// Validate every tunable, failing fast on the first contradiction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detection;
        check_weight("histogram", d.strategy_weights.histogram)?;
        check_weight("texture", d.strategy_weights.texture)?;
        check_weight("edge", d.strategy_weights.edge)?;

        check_window(d.histogram.window_size, d.histogram.stride)?;
        check_scales(&d.histogram.scales)?;
        check_positive("bimodality_threshold", d.histogram.bimodality_threshold as f64)?;

        check_window(d.texture.window_size, d.texture.stride)?;
        if !(4..=32).contains(&d.texture.lbp_points) {
            return Err(ConfigError::BadLbpPoints(d.texture.lbp_points));
        }
        check_positive("lbp_radius", d.texture.lbp_radius as f64)?;
        check_positive("texture_threshold", d.texture.texture_threshold as f64)?;

        check_window(d.edge.window_size, d.edge.stride)?;
        check_scales(&d.edge.scales)?;
        check_unit("edge_threshold", d.edge.edge_threshold)?;
        check_unit("min_edge_density", d.edge.min_edge_density)?;
        check_unit("max_edge_density", d.edge.max_edge_density)?;
        if d.edge.min_edge_density >= d.edge.max_edge_density {
            return Err(ConfigError::EdgeDensityBand {
                min: d.edge.min_edge_density,
                max: d.edge.max_edge_density,
            });
        }
        if d.edge.smooth_radius < 0.0 || !d.edge.smooth_radius.is_finite() {
            return Err(ConfigError::NotPositive {
                name: "smooth_radius",
                value: d.edge.smooth_radius as f64,
            });
        }

        let e = &self.extraction;
        check_unit("extraction threshold", e.threshold)?;
        check_positive("max_perimeter_area_ratio", e.max_perimeter_area_ratio as f64)?;
        check_positive("min_blob_area", e.min_blob_area as f64)?;
        check_positive("blob_circularity", e.blob_circularity as f64)?;
        check_positive(
            "text_perimeter_area_threshold",
            e.text_perimeter_area_threshold as f64,
        )?;
        check_unit("min_text_circularity", e.min_text_circularity)?;
        check_positive(
            "very_large_region_multiplier",
            e.very_large_region_multiplier as f64,
        )?;
        check_positive(
            "large_region_ratio_multiplier",
            e.large_region_ratio_multiplier as f64,
        )?;
        check_positive(
            "large_region_circularity_multiplier",
            e.large_region_circularity_multiplier as f64,
        )?;
        check_positive("medium_region_divider", e.medium_region_divider as f64)?;
        check_positive(
            "medium_region_ratio_multiplier",
            e.medium_region_ratio_multiplier as f64,
        )?;
        check_positive(
            "medium_region_circularity_multiplier",
            e.medium_region_circularity_multiplier as f64,
        )?;
        check_positive(
            "small_region_ratio_multiplier",
            e.small_region_ratio_multiplier as f64,
        )?;
        check_positive(
            "small_region_circularity_multiplier",
            e.small_region_circularity_multiplier as f64,
        )?;

        let g = &self.processing.grayscale;
        if !(-1.0..=1.0).contains(&g.brightness) {
            return Err(ConfigError::BrightnessOutOfRange(g.brightness));
        }
        if !(0.0..=2.0).contains(&g.contrast) {
            return Err(ConfigError::ContrastOutOfRange(g.contrast));
        }

        Ok(())
    }
}
