use crate::models::BitMask;

/// Dense per-pixel map of grayscale likelihood in [0, 1], row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ProbabilityMap {
    /// Create an all-zero map.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Wrap an existing row-major buffer. Panics if the length disagrees
    /// with the dimensions; internal callers always size correctly.
    pub fn from_vec(data: Vec<f32>, width: usize, height: usize) -> Self {
        assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    /// Map width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at (x, y).
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Set value at (x, y).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// Raw row-major values.
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw row-major values.
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Largest value, or 0 for an empty map.
    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(0.0f32, f32::max)
    }

    /// Mean over the whole map.
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f32>() / self.data.len() as f32
    }

    /// Mean over the pixels selected by `mask`; 0 for an empty selection.
    pub fn mean_where(&self, mask: &BitMask) -> f32 {
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                if mask.get(x, y) {
                    sum += self.get(x, y) as f64;
                    count += 1;
                }
            }
        }
        if count == 0 { 0.0 } else { (sum / count as f64) as f32 }
    }

    /// Accumulate `weight * other` into `self`, elementwise.
    pub fn accumulate(&mut self, other: &ProbabilityMap, weight: f32) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += weight * b;
        }
    }

    /// Threshold into a mask: bit set where value > `threshold`.
    pub fn threshold(&self, threshold: f32) -> BitMask {
        let mut mask = BitMask::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) > threshold {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Non-linear confidence boost for weak maps: p' = clamp(sqrt(2p), 0, 1).
    pub fn boost(&mut self) {
        for v in &mut self.data {
            *v = (*v * 2.0).sqrt().clamp(0.0, 1.0);
        }
    }

    /// True when every value is finite and inside [0, 1].
    pub fn in_domain(&self) -> bool {
        self.data.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }

    /// First value outside [0, 1] (or NaN), if any.
    pub fn domain_violation(&self) -> Option<f32> {
        self.data
            .iter()
            .copied()
            .find(|v| !v.is_finite() || !(0.0..=1.0).contains(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_on_simple_map() {
        let map = ProbabilityMap::from_vec(vec![0.0, 0.5, 1.0, 0.5], 2, 2);
        assert_eq!(map.max(), 1.0);
        assert!((map.mean() - 0.5).abs() < 1e-6);
        assert!(map.in_domain());
    }

    #[test]
    fn mean_where_respects_mask() {
        let map = ProbabilityMap::from_vec(vec![0.0, 1.0, 1.0, 1.0], 2, 2);
        let mut mask = BitMask::new(2, 2);
        mask.set(0, 0, true);
        assert_eq!(map.mean_where(&mask), 0.0);
        mask.set(1, 0, true);
        assert!((map.mean_where(&mask) - 0.5).abs() < 1e-6);
        assert_eq!(map.mean_where(&BitMask::new(2, 2)), 0.0);
    }

    #[test]
    fn boost_is_sqrt_of_doubled() {
        let mut map = ProbabilityMap::from_vec(vec![0.0, 0.125, 0.5, 0.9], 2, 2);
        map.boost();
        assert_eq!(map.get(0, 0), 0.0);
        assert!((map.get(1, 0) - 0.5).abs() < 1e-6);
        assert!((map.get(0, 1) - 1.0).abs() < 1e-6);
        assert_eq!(map.get(1, 1), 1.0); // clamped
    }

    #[test]
    fn threshold_produces_strict_mask() {
        let map = ProbabilityMap::from_vec(vec![0.5, 0.51, 0.49, 1.0], 2, 2);
        let mask = map.threshold(0.5);
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(!mask.get(0, 1));
        assert!(mask.get(1, 1));
    }

    #[test]
    fn domain_violation_detects_nan() {
        let map = ProbabilityMap::from_vec(vec![0.5, f32::NAN], 2, 1);
        assert!(!map.in_domain());
        assert!(map.domain_violation().unwrap().is_nan());
    }
}
