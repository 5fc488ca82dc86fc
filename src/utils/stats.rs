//! Otsu threshold estimation over arbitrary pixel populations.
//!
//! Both variants return `None` when the threshold is undefined (fewer than
//! two occupied classes, e.g. a constant region); callers recover with the
//! documented fixed fallbacks instead of propagating an error.

/// Otsu's optimal threshold over an 8-bit population.
///
/// Returns the threshold t maximizing between-class variance for the split
/// `[0, t)` / `[t, 255]`, or `None` when every split leaves a class empty.
pub fn otsu_u8(population: impl Iterator<Item = u8>) -> Option<u8> {
    let mut histogram = [0u64; 256];
    let mut total = 0u64;
    for value in population {
        histogram[value as usize] += 1;
        total += 1;
    }
    if total == 0 {
        return None;
    }

    let total_sum: u64 = histogram
        .iter()
        .enumerate()
        .map(|(v, &count)| v as u64 * count)
        .sum();

    let mut best: Option<(f64, u8)> = None;
    let mut class1_pixels = 0u64;
    let mut class1_sum = 0u64;

    for threshold in 1..=255u16 {
        let v = (threshold - 1) as usize;
        class1_pixels += histogram[v];
        class1_sum += v as u64 * histogram[v];

        let class2_pixels = total - class1_pixels;
        if class1_pixels == 0 || class2_pixels == 0 {
            continue;
        }

        let class1_mean = class1_sum as f64 / class1_pixels as f64;
        let class2_mean = (total_sum - class1_sum) as f64 / class2_pixels as f64;
        let weight1 = class1_pixels as f64 / total as f64;
        let weight2 = class2_pixels as f64 / total as f64;
        let variance = weight1 * weight2 * (class1_mean - class2_mean).powi(2);

        match best {
            Some((best_var, _)) if variance <= best_var => {}
            _ => best = Some((variance, threshold as u8)),
        }
    }

    best.map(|(_, t)| t)
}

/// Otsu's threshold over normalized values in [0, 1], computed on a 256-bin
/// histogram. Returns a threshold in (0, 1), or `None` when undefined.
pub fn otsu_normalized(values: &[f32]) -> Option<f32> {
    let quantized = values
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
    otsu_u8(quantized).map(|t| t as f32 / 255.0)
}
