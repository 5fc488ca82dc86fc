//! Connected-component labeling and shape measurement.

use std::collections::HashMap;

use crate::models::BitMask;

/// Union-Find over provisional labels.
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// Create a forest of `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Representative of `x`'s set, with path compression.
    pub fn find(&mut self, x: u32) -> u32 {
        if self.parent[x as usize] != x {
            self.parent[x as usize] = self.find(self.parent[x as usize]);
        }
        self.parent[x as usize]
    }

    /// Merge the sets containing `x` and `y`.
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            self.parent[root_x as usize] = root_y;
        }
    }
}

/// One connected component with its shape descriptors.
#[derive(Debug, Clone)]
pub struct Component {
    /// Pixels belonging to the component.
    pub mask: BitMask,
    /// Pixel count.
    pub area: usize,
    /// Count of component pixels with at least one 4-neighbor outside the
    /// component (image borders count as outside).
    pub perimeter: usize,
    /// perimeter / area.
    pub ratio: f32,
    /// 4 * pi * area / perimeter^2, 1.0 for an ideal disk.
    pub circularity: f32,
}

impl Component {
    fn from_mask(mask: BitMask, area: usize) -> Self {
        let perimeter = boundary_pixels(&mask);
        let ratio = perimeter as f32 / area as f32;
        let circularity = if perimeter > 0 {
            4.0 * std::f32::consts::PI * area as f32 / (perimeter * perimeter) as f32
        } else {
            0.0
        };
        Self {
            mask,
            area,
            perimeter,
            ratio,
            circularity,
        }
    }
}

/// Label the 8-connected components of a mask.
///
/// Two passes: provisional labels with union-find merging, then a resolve
/// pass that splits the mask per root label.
pub fn label_components(mask: &BitMask) -> Vec<Component> {
    let width = mask.width();
    let height = mask.height();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut labels = vec![0u32; width * height];
    let mut next_label = 1u32;
    let mut uf = UnionFind::new(width * height + 1);

    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) {
                continue;
            }

            let mut neighbor_labels: [u32; 4] = [0; 4];
            let mut n = 0;
            if x > 0 && mask.get(x - 1, y) {
                neighbor_labels[n] = labels[y * width + x - 1];
                n += 1;
            }
            if y > 0 {
                let above = (y - 1) * width;
                if mask.get(x, y - 1) {
                    neighbor_labels[n] = labels[above + x];
                    n += 1;
                }
                if x > 0 && mask.get(x - 1, y - 1) {
                    neighbor_labels[n] = labels[above + x - 1];
                    n += 1;
                }
                if x + 1 < width && mask.get(x + 1, y - 1) {
                    neighbor_labels[n] = labels[above + x + 1];
                    n += 1;
                }
            }

            let idx = y * width + x;
            if n == 0 {
                labels[idx] = next_label;
                next_label += 1;
            } else {
                let min_label = neighbor_labels[..n].iter().copied().min().unwrap_or(0);
                labels[idx] = min_label;
                for &l in &neighbor_labels[..n] {
                    if l != min_label {
                        uf.union(min_label, l);
                    }
                }
            }
        }
    }

    let mut by_root: HashMap<u32, (BitMask, usize)> = HashMap::new();
    for y in 0..height {
        for x in 0..width {
            let label = labels[y * width + x];
            if label == 0 {
                continue;
            }
            let root = uf.find(label);
            let entry = by_root
                .entry(root)
                .or_insert_with(|| (BitMask::new(width, height), 0));
            entry.0.set(x, y, true);
            entry.1 += 1;
        }
    }

    by_root
        .into_values()
        .map(|(mask, area)| Component::from_mask(mask, area))
        .collect()
}

fn boundary_pixels(mask: &BitMask) -> usize {
    let width = mask.width();
    let height = mask.height();
    let mut count = 0;
    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) {
                continue;
            }
            let interior = x > 0
                && x + 1 < width
                && y > 0
                && y + 1 < height
                && mask.get(x - 1, y)
                && mask.get(x + 1, y)
                && mask.get(x, y - 1)
                && mask.get(x, y + 1);
            if !interior {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(w: usize, h: usize, x0: usize, y0: usize, side: usize) -> BitMask {
        let mut mask = BitMask::new(w, h);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn single_square_is_one_component() {
        let mask = square(10, 10, 2, 2, 3);
        let components = label_components(&mask);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].area, 9);
        // 3x3 has no interior beyond the center pixel.
        assert_eq!(components[0].perimeter, 8);
    }

    #[test]
    fn separated_squares_are_two_components() {
        let mut mask = square(20, 20, 1, 1, 3);
        mask.union_with(&square(20, 20, 10, 10, 4));
        let mut components = label_components(&mask);
        components.sort_by_key(|c| c.area);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].area, 9);
        assert_eq!(components[1].area, 16);
    }

    #[test]
    fn diagonal_touch_joins_components() {
        let mut mask = BitMask::new(6, 6);
        mask.set(1, 1, true);
        mask.set(2, 2, true);
        let components = label_components(&mask);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].area, 2);
    }

    #[test]
    fn large_square_is_rounder_than_thin_line() {
        let blob = label_components(&square(40, 40, 5, 5, 20)).remove(0);

        let mut line = BitMask::new(40, 40);
        for x in 0..40 {
            line.set(x, 20, true);
        }
        let stroke = label_components(&line).remove(0);

        assert!(blob.circularity > stroke.circularity);
        assert!(stroke.ratio > blob.ratio);
    }

    #[test]
    fn empty_mask_has_no_components() {
        assert!(label_components(&BitMask::new(12, 12)).is_empty());
    }
}
