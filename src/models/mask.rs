/// Compact bit-packed boolean mask over an image plane.
///
/// Out-of-range reads return `false`; out-of-range writes are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BitMask {
    /// Create an all-false mask with the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Create an all-true mask with the given dimensions.
    pub fn full(width: usize, height: usize) -> Self {
        let mut mask = Self::new(width, height);
        mask.data.fill(0xFF);
        // Bits past width*height in the last byte stay set but are never
        // addressable through get/count paths that mask them off.
        mask.clear_tail();
        mask
    }

    fn clear_tail(&mut self) {
        let bits = self.width * self.height;
        let rem = bits % 8;
        if rem != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= (1u8 << rem) - 1;
            }
        }
    }

    /// Mask width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Mask height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y).
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Set bit at (x, y).
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        if value {
            self.data[index / 8] |= 1 << (index % 8);
        } else {
            self.data[index / 8] &= !(1 << (index % 8));
        }
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// True when no bit is set.
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Set every bit present in `other`.
    pub fn union_with(&mut self, other: &BitMask) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a |= b;
        }
    }

    /// Clear every bit present in `other`.
    pub fn subtract(&mut self, other: &BitMask) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a &= !b;
        }
    }

    /// True when `self` and `other` share at least one set bit.
    pub fn intersects(&self, other: &BitMask) -> bool {
        self.data.iter().zip(&other.data).any(|(a, b)| a & b != 0)
    }

    /// Complement of the mask.
    pub fn inverted(&self) -> BitMask {
        let mut out = self.clone();
        for b in &mut out.data {
            *b = !*b;
        }
        out.clear_tail();
        out
    }

    /// Bounding box (y_min, x_min, y_max, x_max) of the set bits, inclusive.
    pub fn bounding_box(&self) -> Option<(usize, usize, usize, usize)> {
        let mut bbox: Option<(usize, usize, usize, usize)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.get(x, y) {
                    continue;
                }
                bbox = Some(match bbox {
                    None => (y, x, y, x),
                    Some((y0, x0, y1, x1)) => (y0.min(y), x0.min(x), y1.max(y), x1.max(x)),
                });
            }
        }
        bbox
    }

    /// Morphological dilation with a disk structuring element of radius `r`.
    pub fn dilate_disk(&self, r: usize) -> BitMask {
        if r == 0 || self.is_empty() {
            return self.clone();
        }
        let offsets = disk_offsets(r);
        let mut out = BitMask::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.get(x, y) {
                    continue;
                }
                for &(dy, dx) in &offsets {
                    let ny = y as isize + dy;
                    let nx = x as isize + dx;
                    if ny >= 0 && nx >= 0 {
                        out.set(nx as usize, ny as usize, true);
                    }
                }
            }
        }
        out
    }

    /// Morphological erosion with a disk structuring element of radius `r`.
    ///
    /// Pixels outside the image count as unset, so the frame border erodes.
    pub fn erode_disk(&self, r: usize) -> BitMask {
        if r == 0 {
            return self.clone();
        }
        let offsets = disk_offsets(r);
        let mut out = BitMask::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.get(x, y) {
                    continue;
                }
                let keep = offsets.iter().all(|&(dy, dx)| {
                    let ny = y as isize + dy;
                    let nx = x as isize + dx;
                    ny >= 0
                        && nx >= 0
                        && (ny as usize) < self.height
                        && (nx as usize) < self.width
                        && self.get(nx as usize, ny as usize)
                });
                if keep {
                    out.set(x, y, true);
                }
            }
        }
        out
    }

    /// Morphological closing (dilate then erode) with a disk of radius `r`.
    pub fn close_disk(&self, r: usize) -> BitMask {
        self.dilate_disk(r).erode_disk(r)
    }

    /// Morphological opening (erode then dilate) with a disk of radius `r`.
    pub fn open_disk(&self, r: usize) -> BitMask {
        self.erode_disk(r).dilate_disk(r)
    }

    /// Fill holes: any unset area not reachable from the image border
    /// through unset pixels becomes set.
    pub fn fill_holes(&self) -> BitMask {
        if self.width == 0 || self.height == 0 {
            return self.clone();
        }
        // Flood-fill the background from the border, 4-connectivity.
        let mut background = BitMask::new(self.width, self.height);
        let mut stack: Vec<(usize, usize)> = Vec::new();
        for x in 0..self.width {
            for y in [0, self.height - 1] {
                if !self.get(x, y) && !background.get(x, y) {
                    background.set(x, y, true);
                    stack.push((x, y));
                }
            }
        }
        for y in 0..self.height {
            for x in [0, self.width - 1] {
                if !self.get(x, y) && !background.get(x, y) {
                    background.set(x, y, true);
                    stack.push((x, y));
                }
            }
        }
        while let Some((x, y)) = stack.pop() {
            let neighbors = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbors {
                if nx < self.width && ny < self.height && !self.get(nx, ny) && !background.get(nx, ny)
                {
                    background.set(nx, ny, true);
                    stack.push((nx, ny));
                }
            }
        }
        background.inverted()
    }
}

/// Offsets (dy, dx) covered by a disk of radius `r`.
fn disk_offsets(r: usize) -> Vec<(isize, isize)> {
    let r = r as isize;
    let r2 = r * r;
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dy * dy + dx * dx <= r2 {
                offsets.push((dy, dx));
            }
        }
    }
    offsets
}
