//! Bilinear resizing for multi-scale analysis.
//!
//! Strategies analyze downscaled copies of the page and stretch their
//! probability maps back to full resolution; bilinear interpolation is
//! plenty for maps that get averaged across scales afterwards.

/// Resize an 8-bit grayscale image to `(dst_w, dst_h)` with bilinear
/// interpolation. Degenerate targets collapse to a 1-pixel dimension.
pub fn resize_u8(src: &[u8], src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Vec<u8> {
    let dst_w = dst_w.max(1);
    let dst_h = dst_h.max(1);
    let mut dst = vec![0u8; dst_w * dst_h];
    resize_into(
        |x, y| src[y * src_w + x] as f32,
        src_w,
        src_h,
        dst_w,
        dst_h,
        |x, y, v| dst[y * dst_w + x] = v.round().clamp(0.0, 255.0) as u8,
    );
    dst
}

/// Resize a float map to `(dst_w, dst_h)` with bilinear interpolation.
pub fn resize_f32(src: &[f32], src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Vec<f32> {
    let dst_w = dst_w.max(1);
    let dst_h = dst_h.max(1);
    let mut dst = vec![0.0f32; dst_w * dst_h];
    resize_into(
        |x, y| src[y * src_w + x],
        src_w,
        src_h,
        dst_w,
        dst_h,
        |x, y, v| dst[y * dst_w + x] = v,
    );
    dst
}

fn resize_into(
    sample: impl Fn(usize, usize) -> f32,
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
    mut write: impl FnMut(usize, usize, f32),
) {
    debug_assert!(src_w > 0 && src_h > 0);
    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;

    for dy in 0..dst_h {
        // Center-aligned sampling, clamped to the source grid.
        let sy = ((dy as f32 + 0.5) * y_ratio - 0.5).max(0.0);
        let y0 = (sy as usize).min(src_h - 1);
        let y1 = (y0 + 1).min(src_h - 1);
        let fy = sy - y0 as f32;

        for dx in 0..dst_w {
            let sx = ((dx as f32 + 0.5) * x_ratio - 0.5).max(0.0);
            let x0 = (sx as usize).min(src_w - 1);
            let x1 = (x0 + 1).min(src_w - 1);
            let fx = sx - x0 as f32;

            let top = sample(x0, y0) * (1.0 - fx) + sample(x1, y0) * fx;
            let bottom = sample(x0, y1) * (1.0 - fx) + sample(x1, y1) * fx;
            write(dx, dy, top * (1.0 - fy) + bottom * fy);
        }
    }
}
