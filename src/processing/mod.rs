//! Region processing: render each region and composite the output page.
//!
//! Each region kind has a rendering strategy. Regions are rendered in
//! parallel and composited into a single page buffer; because the regions
//! partition the image, every output pixel is written by exactly one
//! region.

pub mod binary;
pub mod dither;
pub mod grayscale;

use rayon::prelude::*;
use tracing::debug;

use crate::config::ProcessingConfig;
use crate::error::StageError;
use crate::models::{BitMask, Region, RegionKind};

pub use binary::BinaryProcessing;
pub use grayscale::GrayscaleProcessing;

/// A rendering strategy for one region kind.
///
/// `process` returns a full-page buffer where only the masked pixels are
/// meaningful; the rest stays zero.
pub trait ProcessingStrategy: Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Render the masked part of the page.
    fn process(&self, gray: &[u8], width: usize, height: usize, mask: &BitMask) -> Vec<u8>;
}

/// Dispatches regions to their strategies and composites the page.
pub struct ProcessingEngine {
    binary: BinaryProcessing,
    grayscale: GrayscaleProcessing,
}

impl ProcessingEngine {
    /// Build the engine from a validated processing configuration.
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            binary: BinaryProcessing::new(config.binary.clone()),
            grayscale: GrayscaleProcessing::new(config.grayscale.clone()),
        }
    }

    fn strategy_for(&self, kind: RegionKind) -> &dyn ProcessingStrategy {
        match kind {
            RegionKind::Binary => &self.binary,
            RegionKind::Grayscale => &self.grayscale,
        }
    }

    /// Render every region and composite the results.
    pub fn process_regions(
        &self,
        gray: &[u8],
        width: usize,
        height: usize,
        regions: &[Region],
    ) -> Result<Vec<u8>, StageError> {
        for region in regions {
            let mask = region.mask();
            if mask.width() != width || mask.height() != height {
                return Err(StageError::DimensionMismatch {
                    got_w: mask.width(),
                    got_h: mask.height(),
                    want_w: width,
                    want_h: height,
                });
            }
        }

        let rendered: Vec<Vec<u8>> = regions
            .par_iter()
            .map(|region| {
                let strategy = self.strategy_for(region.kind());
                debug!(
                    strategy = strategy.name(),
                    area = region.area(),
                    confidence = region.confidence(),
                    "rendering region"
                );
                strategy.process(gray, width, height, region.mask())
            })
            .collect();

        let mut output = vec![0u8; width * height];
        for (region, buffer) in regions.iter().zip(&rendered) {
            let mask = region.mask();
            for y in 0..height {
                let row = y * width;
                for x in 0..width {
                    if mask.get(x, y) {
                        output[row + x] = buffer[row + x];
                    }
                }
            }
        }
        Ok(output)
    }
}
