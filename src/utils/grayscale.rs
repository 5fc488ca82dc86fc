//! Channel-average grayscale conversion.
//!
//! Document scans are classified on tonal spread, not perceived luminance,
//! so multi-channel input is reduced by a plain channel average rather than
//! a luma weighting. Single-channel input is copied through unchanged.

use rayon::prelude::*;

/// Pixel count above which conversion runs on the rayon pool.
const PARALLEL_THRESHOLD: usize = 1 << 20;

/// Convert an interleaved 8-bit image to grayscale by channel averaging.
///
/// `channels` of 1 copies the buffer; 2..=4 averages all channels per pixel
/// (an alpha channel, when present, participates in the average).
pub fn to_grayscale(image: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    debug_assert_eq!(image.len(), width * height * channels);

    if channels == 1 {
        return image.to_vec();
    }

    let pixel_count = width * height;
    if pixel_count >= PARALLEL_THRESHOLD {
        return image
            .par_chunks_exact(channels)
            .map(|px| average(px, channels))
            .collect();
    }

    image
        .chunks_exact(channels)
        .map(|px| average(px, channels))
        .collect()
}

#[inline]
fn average(px: &[u8], channels: usize) -> u8 {
    let sum: u32 = px.iter().map(|&c| c as u32).sum();
    (sum / channels as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_channel_is_copied() {
        let image = vec![7u8, 9, 11, 13];
        assert_eq!(to_grayscale(&image, 2, 2, 1), image);
    }

    #[test]
    fn rgb_is_channel_averaged() {
        // Integer division truncates: (10+10+11)/3 = 10.
        let image = vec![30u8, 60, 90, 10, 10, 11];
        assert_eq!(to_grayscale(&image, 2, 1, 3), vec![60, 10]);
    }

    #[test]
    fn rgba_alpha_participates_in_the_average() {
        let image = vec![100u8, 100, 100, 0];
        assert_eq!(to_grayscale(&image, 1, 1, 4), vec![75]);
    }
}
