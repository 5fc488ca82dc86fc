//! Utility functions for image processing
//!
//! This module provides the shared numeric plumbing the pipeline stages
//! build on:
//! - Grayscale conversion (channel-average reduction of multi-channel input)
//! - Bilinear resizing (multi-scale analysis)
//! - Dense filters (separable Gaussian blur, Sobel magnitude)
//! - Otsu threshold estimation over masked populations

pub mod filters;
pub mod grayscale;
pub mod resize;
pub mod stats;
