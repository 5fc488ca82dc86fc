use crate::models::BitMask;

/// Classification of a detected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Photographic / continuous-tone area, rendered with contrast
    /// adjustment and dithering.
    Grayscale,
    /// Line-art / text area, rendered with plain thresholding.
    Binary,
}

/// A detected region: boolean mask, classification, confidence, and an
/// eagerly maintained bounding box.
///
/// The bounding box is recomputed whenever the mask changes (construction,
/// `expand`, `subtract`), never lazily behind the caller's back.
#[derive(Debug, Clone)]
pub struct Region {
    mask: BitMask,
    kind: RegionKind,
    confidence: f32,
    bounding_box: Option<(usize, usize, usize, usize)>,
}

impl Region {
    /// Create a region from a mask. Confidence is clamped to [0, 1].
    pub fn new(mask: BitMask, kind: RegionKind, confidence: f32) -> Self {
        let bounding_box = mask.bounding_box();
        Self {
            mask,
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            bounding_box,
        }
    }

    /// The region's mask.
    pub fn mask(&self) -> &BitMask {
        &self.mask
    }

    /// Region classification.
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Detection confidence in [0, 1].
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Pixel count of the mask.
    pub fn area(&self) -> usize {
        self.mask.count_ones()
    }

    /// Bounding box (y_min, x_min, y_max, x_max), inclusive. `None` only
    /// for an empty mask.
    pub fn bounding_box(&self) -> Option<(usize, usize, usize, usize)> {
        self.bounding_box
    }

    /// Dilate the mask by a disk of radius `pixels`. A radius of zero is a
    /// no-op; larger radii strictly grow the mask (monotonic).
    pub fn expand(&mut self, pixels: usize) {
        if pixels == 0 {
            return;
        }
        self.mask = self.mask.dilate_disk(pixels);
        self.bounding_box = self.mask.bounding_box();
    }

    /// Remove pixels claimed by `other` from this region's mask.
    pub fn subtract(&mut self, other: &BitMask) {
        self.mask.subtract(other);
        self.bounding_box = self.mask.bounding_box();
    }

    /// Merge `other` into this region: mask union, confidence averaged over
    /// the merged member count.
    pub fn absorb(&mut self, other: &Region, self_members: usize, other_members: usize) {
        self.mask.union_with(&other.mask);
        let total = (self_members + other_members) as f32;
        self.confidence = (self.confidence * self_members as f32
            + other.confidence * other_members as f32)
            / total;
        self.bounding_box = self.mask.bounding_box();
    }
}
