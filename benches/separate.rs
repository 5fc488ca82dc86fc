use criterion::{Criterion, black_box, criterion_group, criterion_main};
use graysep::{Separator, SeparatorConfig, separate};

/// Synthetic page: noise photo block in the upper left, text-like strokes
/// over the rest.
fn synthetic_page(width: usize, height: usize) -> Vec<u8> {
    let mut image = vec![255u8; width * height];
    let mut state = 0x2545F4914F6CDD1Du64;
    for y in 0..height / 2 {
        for x in 0..width / 2 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            image[y * width + x] = 58 + (state % 140) as u8;
        }
    }
    for y in (height / 2..height).step_by(12) {
        for x in 0..width {
            image[y * width + x] = 0;
        }
    }
    image
}

fn bench_separate_small(c: &mut Criterion) {
    let image = synthetic_page(256, 256);
    let separator = Separator::new(SeparatorConfig::default()).unwrap();
    c.bench_function("separate_256x256", |b| {
        b.iter(|| separator.separate(black_box(&image), black_box(256), black_box(256), 1))
    });
}

fn bench_separate_medium(c: &mut Criterion) {
    let image = synthetic_page(1024, 768);
    let separator = Separator::new(SeparatorConfig::default()).unwrap();
    c.bench_function("separate_1024x768", |b| {
        b.iter(|| separator.separate(black_box(&image), black_box(1024), black_box(768), 1))
    });
}

fn bench_separate_one_off(c: &mut Criterion) {
    let image = synthetic_page(256, 256);
    let config = SeparatorConfig::default();
    c.bench_function("separate_one_off_256x256", |b| {
        b.iter(|| separate(black_box(&image), 256, 256, 1, black_box(&config)))
    });
}

fn bench_detection_only(c: &mut Criterion) {
    use graysep::detection::DetectionEngine;

    let image = synthetic_page(512, 512);
    let config = SeparatorConfig::default();
    let engine = DetectionEngine::new(&config.detection);
    c.bench_function("detect_512x512", |b| {
        b.iter(|| engine.detect(black_box(&image), 512, 512))
    });
}

criterion_group!(
    benches,
    bench_separate_small,
    bench_separate_medium,
    bench_separate_one_off,
    bench_detection_only
);
criterion_main!(benches);
