//! Error types for the separation pipeline.

use thiserror::Error;

/// Configuration validation failures, raised before any pixel is touched.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Sliding window smaller than 2 pixels cannot hold a histogram.
    #[error("window size must be at least 2, got {0}")]
    WindowTooSmall(usize),

    /// Stride of zero would loop forever.
    #[error("stride must be at least 1")]
    ZeroStride,

    /// Multi-scale analysis needs at least one scale in (0, 1].
    #[error("scales must be non-empty with every value in (0, 1], got {0}")]
    BadScale(f32),

    /// Strategy weights must be finite and non-negative.
    #[error("strategy weight for {name} must be finite and >= 0, got {value}")]
    BadWeight {
        /// Strategy the weight belongs to.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// A probability-domain threshold left [0, 1].
    #[error("{name} must be in [0, 1], got {value}")]
    ThresholdOutOfRange {
        /// Which threshold.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// A strictly-positive tunable was zero or negative.
    #[error("{name} must be > 0, got {value}")]
    NotPositive {
        /// Which tunable.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Brightness is an offset in [-1, 1].
    #[error("brightness must be in [-1, 1], got {0}")]
    BrightnessOutOfRange(f32),

    /// Contrast is a gain factor in [0, 2].
    #[error("contrast must be in [0, 2], got {0}")]
    ContrastOutOfRange(f32),

    /// Edge density band must satisfy min < max.
    #[error("edge density band is contradictory: min {min} >= max {max}")]
    EdgeDensityBand {
        /// Lower bound of the band.
        min: f32,
        /// Upper bound of the band.
        max: f32,
    },

    /// LBP sampling outside the supported range.
    #[error("lbp_points must be in [4, 32], got {0}")]
    BadLbpPoints(usize),
}

/// Rejected input buffers.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    /// Zero-sized images are not processable.
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage {
        /// Width passed by the caller.
        width: usize,
        /// Height passed by the caller.
        height: usize,
    },

    /// Channel count outside 1..=4.
    #[error("channel count must be between 1 and 4, got {0}")]
    BadChannelCount(usize),

    /// Buffer length does not match width * height * channels.
    #[error("buffer length {len} does not match {width}x{height}x{channels}")]
    LengthMismatch {
        /// Actual buffer length.
        len: usize,
        /// Width passed by the caller.
        width: usize,
        /// Height passed by the caller.
        height: usize,
        /// Channels passed by the caller.
        channels: usize,
    },
}

/// Failure inside one pipeline stage.
#[derive(Debug, Error, PartialEq)]
pub enum StageError {
    /// A produced map did not match the source dimensions.
    #[error("map dimensions {got_w}x{got_h} do not match image {want_w}x{want_h}")]
    DimensionMismatch {
        /// Produced width.
        got_w: usize,
        /// Produced height.
        got_h: usize,
        /// Expected width.
        want_w: usize,
        /// Expected height.
        want_h: usize,
    },

    /// A probability left the [0, 1] domain (NaN or out of range).
    #[error("probability value {0} outside [0, 1]")]
    ProbabilityOutOfDomain(f32),
}

/// Domain error for the whole separation pipeline.
///
/// Stage failures carry the original cause; the caller never receives a
/// partial or corrupted output buffer alongside one of these.
#[derive(Debug, Error)]
pub enum SeparatorError {
    /// Configuration rejected at construction.
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    /// Input buffer rejected before processing.
    #[error("invalid input image")]
    Input(#[from] InputError),

    /// Region detection failed.
    #[error("region detection failed")]
    Detection(#[source] StageError),

    /// Region processing / compositing failed.
    #[error("region processing failed")]
    Processing(#[source] StageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::ThresholdOutOfRange {
            name: "region threshold",
            value: 1.5,
        };
        assert_eq!(err.to_string(), "region threshold must be in [0, 1], got 1.5");
    }

    #[test]
    fn stage_error_is_attached_as_source() {
        use std::error::Error;

        let err = SeparatorError::Detection(StageError::ProbabilityOutOfDomain(f32::NAN));
        assert!(err.source().is_some());
    }
}
