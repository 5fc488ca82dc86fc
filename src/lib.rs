//! graysep - region-aware grayscale/binary separation for scanned pages
//!
//! Scanned documents mix continuous-tone material (photographs,
//! illustrations) with bilevel material (text, line art). Rendering the
//! whole page one way ruins the other half, so this crate detects the
//! photographic regions, renders them with tone adjustment and dithering,
//! renders everything else with plain thresholding, and composites the
//! results back into a single page.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Pipeline configuration and validation
pub mod config;
/// Detection strategies (histogram bimodality, texture entropy, edge density)
pub mod detection;
/// Error types
pub mod error;
/// Region extraction from probability maps
pub mod extraction;
/// Core data structures (BitMask, ProbabilityMap, Region)
pub mod models;
/// Region rendering and compositing
pub mod processing;
/// Utility functions (grayscale, resize, filters, Otsu)
pub mod utils;

use serde::Serialize;
use tracing::info;

pub use config::{DitherType, SeparatorConfig};
pub use error::{ConfigError, InputError, SeparatorError, StageError};
pub use models::{BitMask, ProbabilityMap, Region, RegionKind};

use detection::DetectionEngine;
use extraction::RegionExtractor;
use processing::ProcessingEngine;
use utils::grayscale::to_grayscale;

/// Summary of one separation run.
#[derive(Debug, Clone, Serialize)]
pub struct SeparationReport {
    /// Number of grayscale regions in the partition.
    pub grayscale_regions: usize,
    /// Number of binary regions in the partition.
    pub binary_regions: usize,
    /// Pixels rendered by the grayscale strategy.
    pub grayscale_pixels: usize,
    /// Pixels rendered by the binary strategy.
    pub binary_pixels: usize,
    /// Mean of the combined probability map.
    pub mean_probability: f32,
}

/// The separation pipeline: detection, extraction, processing.
///
/// Construction validates the configuration once; a `Separator` is
/// immutable afterwards and can be shared across threads.
pub struct Separator {
    detection: DetectionEngine,
    extractor: RegionExtractor,
    processing: ProcessingEngine,
}

impl Separator {
    /// Build a pipeline from a configuration, validating every tunable.
    pub fn new(config: SeparatorConfig) -> Result<Self, SeparatorError> {
        config.validate()?;
        Ok(Self {
            detection: DetectionEngine::new(&config.detection),
            extractor: RegionExtractor::new(config.extraction.clone()),
            processing: ProcessingEngine::new(&config.processing),
        })
    }

    /// Separate an interleaved image buffer into a single-channel page.
    ///
    /// `image` holds `channels` interleaved 8-bit samples per pixel
    /// (1 = gray, 2 = gray+alpha, 3 = RGB, 4 = RGBA); alpha and color are
    /// reduced by channel averaging. The output is one byte per pixel.
    pub fn separate(
        &self,
        image: &[u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Vec<u8>, SeparatorError> {
        self.separate_with_report(image, width, height, channels)
            .map(|(output, _)| output)
    }

    /// Like [`separate`](Self::separate), also returning run statistics.
    pub fn separate_with_report(
        &self,
        image: &[u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<(Vec<u8>, SeparationReport), SeparatorError> {
        validate_input(image, width, height, channels)?;
        let gray = to_grayscale(image, width, height, channels);

        let map = self
            .detection
            .detect(&gray, width, height)
            .map_err(SeparatorError::Detection)?;

        let regions = self.extractor.extract(&map);

        let mut report = SeparationReport {
            grayscale_regions: 0,
            binary_regions: 0,
            grayscale_pixels: 0,
            binary_pixels: 0,
            mean_probability: map.mean(),
        };
        for region in &regions {
            match region.kind() {
                RegionKind::Grayscale => {
                    report.grayscale_regions += 1;
                    report.grayscale_pixels += region.area();
                }
                RegionKind::Binary => {
                    report.binary_regions += 1;
                    report.binary_pixels += region.area();
                }
            }
        }
        info!(
            width,
            height,
            grayscale_regions = report.grayscale_regions,
            grayscale_pixels = report.grayscale_pixels,
            mean_probability = report.mean_probability,
            "regions extracted"
        );

        let output = self
            .processing
            .process_regions(&gray, width, height, &regions)
            .map_err(SeparatorError::Processing)?;
        Ok((output, report))
    }
}

/// Separate a page with a one-off pipeline.
///
/// Convenience wrapper over [`Separator`] for single images; reuse a
/// `Separator` when processing a batch.
pub fn separate(
    image: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    config: &SeparatorConfig,
) -> Result<Vec<u8>, SeparatorError> {
    Separator::new(config.clone())?.separate(image, width, height, channels)
}

fn validate_input(
    image: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<(), InputError> {
    if width == 0 || height == 0 {
        return Err(InputError::EmptyImage { width, height });
    }
    if !(1..=4).contains(&channels) {
        return Err(InputError::BadChannelCount(channels));
    }
    if image.len() != width * height * channels {
        return Err(InputError::LengthMismatch {
            len: image.len(),
            width,
            height,
            channels,
        });
    }
    Ok(())
}
