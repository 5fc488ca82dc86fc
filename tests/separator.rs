//! End-to-end tests for the separation pipeline.

use graysep::config::BinaryProcessingConfig;
use graysep::models::BitMask;
use graysep::processing::{BinaryProcessing, ProcessingStrategy};
use graysep::{RegionKind, Separator, SeparatorConfig};

/// Deterministic uniform noise in [58, 197] (std about 40).
fn noise(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            58 + (state % 140) as u8
        })
        .collect()
}

#[test]
fn flat_page_is_a_single_binary_region() {
    let separator = Separator::new(SeparatorConfig::default()).unwrap();
    let image = vec![200u8; 64 * 64];
    let (output, report) = separator.separate_with_report(&image, 64, 64, 1).unwrap();

    assert_eq!(report.grayscale_regions, 0);
    assert_eq!(report.binary_regions, 1);
    assert_eq!(report.binary_pixels, 64 * 64);
    // Flat 200 thresholds against the 128 fallback: all white.
    assert!(output.iter().all(|&v| v == 255));
}

#[test]
fn noise_patch_on_white_becomes_a_grayscale_region() {
    let width = 128;
    let height = 128;
    let mut image = vec![255u8; width * height];
    let patch = noise(9, 64 * 64);
    for y in 0..64 {
        for x in 0..64 {
            image[(32 + y) * width + 32 + x] = patch[y * 64 + x];
        }
    }

    let separator = Separator::new(SeparatorConfig::default()).unwrap();
    let (output, report) = separator
        .separate_with_report(&image, width, height, 1)
        .unwrap();

    assert_eq!(report.grayscale_regions, 1, "report: {report:?}");
    assert!(report.grayscale_pixels > 0);
    assert_eq!(
        report.grayscale_pixels + report.binary_pixels,
        width * height
    );
    // Default rendering is bilevel for both kinds.
    assert!(output.iter().all(|&v| v == 0 || v == 255));
}

#[test]
fn noise_patch_region_is_confident_and_well_placed() {
    let width = 128;
    let height = 128;
    let mut image = vec![255u8; width * height];
    let patch = noise(41, 64 * 64);
    for y in 0..64 {
        for x in 0..64 {
            image[(32 + y) * width + 32 + x] = patch[y * 64 + x];
        }
    }

    // Reproduce the pipeline's region view through the library surface.
    let config = SeparatorConfig::default();
    let engine = graysep::detection::DetectionEngine::new(&config.detection);
    let map = engine.detect(&image, width, height).unwrap();
    let extractor = graysep::extraction::RegionExtractor::new(config.extraction.clone());
    let regions = extractor.extract(&map);

    let region = regions
        .iter()
        .find(|r| r.kind() == RegionKind::Grayscale)
        .expect("patch should be detected");
    assert!(region.confidence() > 0.5, "confidence {}", region.confidence());

    let (y0, x0, y1, x1) = region.bounding_box().unwrap();
    // The detected box tracks the 64x64 patch at (32, 32), loosened by the
    // analysis window and the expansion radius.
    assert!(x0 <= 44 && y0 <= 44, "box starts at ({y0}, {x0})");
    assert!(x1 >= 83 && y1 >= 83, "box ends at ({y1}, {x1})");
    assert!(x0 >= 12 && y0 >= 12 && x1 <= 115 && y1 <= 115, "box ({y0},{x0})-({y1},{x1})");
}

#[test]
fn binary_rendering_of_bilevel_input_is_identity() {
    let width = 24;
    let height = 24;
    let image: Vec<u8> = (0..width * height)
        .map(|i| if (i / 5) % 3 == 0 { 0 } else { 255 })
        .collect();

    let strategy = BinaryProcessing::new(BinaryProcessingConfig::default());
    let out = strategy.process(&image, width, height, &BitMask::full(width, height));
    assert_eq!(out, image);
}

#[test]
fn one_pixel_wide_page_produces_defined_output() {
    let separator = Separator::new(SeparatorConfig::default()).unwrap();
    let image: Vec<u8> = (0..96).map(|i| (i * 2) as u8).collect();
    let (output, report) = separator.separate_with_report(&image, 1, 96, 1).unwrap();
    assert_eq!(output.len(), 96);
    assert_eq!(report.grayscale_pixels + report.binary_pixels, 96);
    assert!(output.iter().all(|&v| v == 0 || v == 255));
}

#[test]
fn regions_partition_the_page_for_mixed_content() {
    let width = 256;
    let height = 192;
    let mut image = vec![255u8; width * height];
    // Photo block on the left.
    let patch = noise(77, 96 * 96);
    for y in 0..96 {
        for x in 0..96 {
            image[(40 + y) * width + 24 + x] = patch[y * 96 + x];
        }
    }
    // Text-like strokes on the right.
    for y in (30..160).step_by(10) {
        for x in 150..240 {
            image[y * width + x] = 0;
        }
    }

    let separator = Separator::new(SeparatorConfig::default()).unwrap();
    let (output, report) = separator
        .separate_with_report(&image, width, height, 1)
        .unwrap();
    assert_eq!(
        report.grayscale_pixels + report.binary_pixels,
        width * height,
        "partition must cover every pixel exactly once: {report:?}"
    );
    assert_eq!(output.len(), width * height);
}

#[test]
fn rgb_and_grayscale_inputs_agree() {
    let width = 64;
    let height = 64;
    let gray = noise(3, width * height);
    let rgb: Vec<u8> = gray.iter().flat_map(|&v| [v, v, v]).collect();

    let separator = Separator::new(SeparatorConfig::default()).unwrap();
    let from_gray = separator.separate(&gray, width, height, 1).unwrap();
    let from_rgb = separator.separate(&rgb, width, height, 3).unwrap();
    assert_eq!(from_gray, from_rgb);
}

#[test]
fn preserve_grayscale_keeps_continuous_tone() {
    let width = 128;
    let height = 128;
    let mut image = vec![255u8; width * height];
    let patch = noise(15, 64 * 64);
    for y in 0..64 {
        for x in 0..64 {
            image[(32 + y) * width + 32 + x] = patch[y * 64 + x];
        }
    }

    let mut config = SeparatorConfig::default();
    config.processing.grayscale.preserve_grayscale = true;
    let separator = Separator::new(config).unwrap();
    let output = separator.separate(&image, width, height, 1).unwrap();

    // Continuous tone survives somewhere in the photo region.
    let mid_tones = output.iter().filter(|&&v| v > 16 && v < 240).count();
    assert!(mid_tones > 100, "expected mid tones, found {mid_tones}");
}
