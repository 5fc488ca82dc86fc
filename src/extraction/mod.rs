//! Region extraction: probability map in, disjoint region partition out.
//!
//! The thresholded map is cleaned up morphologically, labeled, and each
//! component is accepted or rejected by area-dependent shape rules (large
//! photographic blobs are round and compact; text and rules are thin and
//! ragged). Accepted components become grayscale regions; everything else
//! falls into one catch-all binary region, so the output always covers the
//! page exactly once.

pub mod components;

use tracing::debug;

use crate::config::ExtractionConfig;
use crate::models::{BitMask, ProbabilityMap, Region, RegionKind};

pub use components::{Component, UnionFind, label_components};

/// Extracts a disjoint set of regions from a probability map.
pub struct RegionExtractor {
    config: ExtractionConfig,
}

impl RegionExtractor {
    /// Build the extractor from a validated extraction configuration.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Partition the image into grayscale regions plus one binary region.
    ///
    /// The returned masks are pairwise disjoint and their union is the full
    /// image. The binary region is always last.
    pub fn extract(&self, map: &ProbabilityMap) -> Vec<Region> {
        let width = map.width();
        let height = map.height();

        // Weak maps get a non-linear boost so moderate evidence still
        // clears the threshold.
        let boosted;
        let map = if map.max() < 0.5 {
            debug!(max = map.max(), "boosting weak probability map");
            let mut enhanced = map.clone();
            enhanced.boost();
            boosted = enhanced;
            &boosted
        } else {
            map
        };

        let mut mask = map.threshold(self.config.threshold);
        if self.config.fill_holes {
            mask = mask.fill_holes();
        }
        mask = mask.close_disk(3).open_disk(2);

        let found = label_components(&mask);
        debug!(candidates = found.len(), "labeled connected components");

        let mut regions: Vec<Region> = Vec::new();
        for component in found {
            if component.area < (self.config.min_blob_area / 4).max(25) {
                continue;
            }
            if !self.accepts(&component) {
                continue;
            }
            // Confidence reflects the evidence inside the original
            // component, not the expanded halo.
            let confidence = map.mean_where(&component.mask);
            let mut region = Region::new(component.mask, RegionKind::Grayscale, confidence);
            region.expand(self.config.expand_pixels);
            regions.push(region);
        }

        if regions.len() > self.config.merge_region_limit {
            debug!(count = regions.len(), "merging nearby regions");
            self.merge_nearby(&mut regions);
        }

        // Expansion can make neighbors overlap; earlier regions keep the
        // contested pixels so the partition stays disjoint.
        let mut claimed = BitMask::new(width, height);
        let mut disjoint: Vec<Region> = Vec::new();
        for mut region in regions {
            region.subtract(&claimed);
            if region.mask().is_empty() {
                continue;
            }
            claimed.union_with(region.mask());
            disjoint.push(region);
        }

        let remainder = claimed.inverted();
        if !remainder.is_empty() || disjoint.is_empty() {
            let binary_mask = if disjoint.is_empty() {
                BitMask::full(width, height)
            } else {
                remainder
            };
            disjoint.push(Region::new(binary_mask, RegionKind::Binary, 1.0));
        }

        debug!(regions = disjoint.len(), "extraction complete");
        disjoint
    }

    /// Area-tiered shape acceptance. Bigger components get looser shape
    /// requirements, but clearly text-like shapes are rejected at any size.
    fn accepts(&self, component: &Component) -> bool {
        let c = &self.config;
        let area = component.area;
        let ratio = component.ratio;
        let circularity = component.circularity;
        let looks_like_text = ratio > c.text_perimeter_area_threshold;

        let very_large_area = c.min_blob_area * c.very_large_region_multiplier;
        if area > very_large_area {
            !(looks_like_text && circularity < c.min_text_circularity)
        } else if area > c.min_blob_area {
            ratio <= c.max_perimeter_area_ratio * c.large_region_ratio_multiplier
                && circularity >= c.blob_circularity * c.large_region_circularity_multiplier
                && !looks_like_text
        } else if area > c.min_blob_area / c.medium_region_divider {
            ratio <= c.max_perimeter_area_ratio * c.medium_region_ratio_multiplier
                && circularity >= c.blob_circularity * c.medium_region_circularity_multiplier
                && !looks_like_text
        } else {
            ratio <= c.max_perimeter_area_ratio * c.small_region_ratio_multiplier
                && circularity >= c.blob_circularity * c.small_region_circularity_multiplier
                && area >= c.small_region_min_area
        }
    }

    /// Repeatedly merge the first pair of regions whose bounding boxes are
    /// closer than the distance threshold, until no pair qualifies. Merging
    /// grows the bounding box, which can pull further regions in. Member
    /// counts are carried along so the merged confidence is the mean over
    /// all absorbed regions, independent of merge order.
    fn merge_nearby(&self, regions: &mut Vec<Region>) {
        let threshold = self.config.distance_threshold;
        let mut members = vec![1usize; regions.len()];
        'restart: loop {
            for i in 0..regions.len() {
                for j in (i + 1)..regions.len() {
                    let (Some(a), Some(b)) = (regions[i].bounding_box(), regions[j].bounding_box())
                    else {
                        continue;
                    };
                    if bbox_distance(a, b) < threshold {
                        let other = regions.remove(j);
                        let other_members = members.remove(j);
                        regions[i].absorb(&other, members[i], other_members);
                        members[i] += other_members;
                        continue 'restart;
                    }
                }
            }
            break;
        }
    }
}

/// Distance between two bounding boxes (y_min, x_min, y_max, x_max).
///
/// Overlap on one axis measures the gap on the other; with no overlap on
/// either axis the distance is the Manhattan distance between the nearest
/// edges.
fn bbox_distance(
    a: (usize, usize, usize, usize),
    b: (usize, usize, usize, usize),
) -> usize {
    let (ay0, ax0, ay1, ax1) = a;
    let (by0, bx0, by1, bx1) = b;

    let x_overlap = ax1.min(bx1) >= ax0.max(bx0);
    let y_overlap = ay1.min(by1) >= ay0.max(by0);

    let y_gap = if by0 > ay1 {
        by0 - ay1
    } else if ay0 > by1 {
        ay0 - by1
    } else {
        0
    };
    let x_gap = if bx0 > ax1 {
        bx0 - ax1
    } else if ax0 > bx1 {
        ax0 - bx1
    } else {
        0
    };

    if x_overlap {
        y_gap
    } else if y_overlap {
        x_gap
    } else {
        let dx = (ax0.abs_diff(bx1)).min(bx0.abs_diff(ax1));
        let dy = (ay0.abs_diff(by1)).min(by0.abs_diff(ay1));
        dx + dy
    }
}
