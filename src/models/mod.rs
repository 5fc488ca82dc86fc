//! Core data structures shared across the pipeline stages.

/// Bit-packed boolean mask with morphological operations
pub mod mask;
/// Dense per-pixel probability map
pub mod probability;
/// Detected region (mask, kind, confidence)
pub mod region;

pub use mask::BitMask;
pub use probability::ProbabilityMap;
pub use region::{Region, RegionKind};
