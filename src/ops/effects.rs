// ============================================================================
// PIXEL TRANSFORMS — rayon-parallelized filter cores
// ============================================================================
//
// Each core maps a full RGBA8 image to a new image of the same dimensions.
// All cores are deterministic: crystallize derives its cell jitter from a
// hash of the grid coordinates and a caller-supplied seed, never from an RNG,
// so re-running an identical chain is bit-identical.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// Per-pixel transform: `transform` receives (x, y, r, g, b, a) as f32 and
/// returns the output channels. Parallel by row.
pub(crate) fn apply_per_pixel<F>(src: &RgbaImage, transform: F) -> RgbaImage
where
    F: Fn(u32, u32, f32, f32, f32, f32) -> (f32, f32, f32, f32) + Sync,
{
    let w = src.width() as usize;
    let h = src.height() as usize;
    if w == 0 || h == 0 {
        return src.clone();
    }

    let src_raw = src.as_raw();
    let mut dst_raw = vec![0u8; w * h * 4];
    let stride = w * 4;

    dst_raw
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &src_raw[y * stride..(y + 1) * stride];
            for x in 0..w {
                let pi = x * 4;
                let r = row_in[pi] as f32;
                let g = row_in[pi + 1] as f32;
                let b = row_in[pi + 2] as f32;
                let a = row_in[pi + 3] as f32;
                let (nr, ng, nb, na) = transform(x as u32, y as u32, r, g, b, a);
                row_out[pi] = nr.round().clamp(0.0, 255.0) as u8;
                row_out[pi + 1] = ng.round().clamp(0.0, 255.0) as u8;
                row_out[pi + 2] = nb.round().clamp(0.0, 255.0) as u8;
                row_out[pi + 3] = na.round().clamp(0.0, 255.0) as u8;
            }
        });

    RgbaImage::from_raw(w as u32, h as u32, dst_raw).unwrap()
}

/// Clamp-sample a pixel (edge pixels repeat outside the image).
#[inline]
fn sample_clamped(img: &RgbaImage, x: i32, y: i32) -> [f32; 4] {
    let cx = x.clamp(0, img.width() as i32 - 1) as u32;
    let cy = y.clamp(0, img.height() as i32 - 1) as u32;
    let p = img.get_pixel(cx, cy);
    [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
}

/// Bilinear-sample at fractional coordinates.
#[inline]
fn sample_bilinear(img: &RgbaImage, fx: f32, fy: f32) -> [f32; 4] {
    let x0 = fx.floor() as i32;
    let y0 = fy.floor() as i32;
    let dx = fx - x0 as f32;
    let dy = fy - y0 as f32;

    let p00 = sample_clamped(img, x0, y0);
    let p10 = sample_clamped(img, x0 + 1, y0);
    let p01 = sample_clamped(img, x0, y0 + 1);
    let p11 = sample_clamped(img, x0 + 1, y0 + 1);

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - dx) + p10[c] * dx;
        let bot = p01[c] * (1.0 - dx) + p11[c] * dx;
        out[c] = top * (1.0 - dy) + bot * dy;
    }
    out
}

/// Integer hash (xorshift-multiply mix).
fn hash_u32(mut x: u32) -> u32 {
    x = x.wrapping_mul(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EBCA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2AE35);
    x ^= x >> 16;
    x
}

/// Hash to f32 in [0, 1).
fn hash_f32(x: u32, y: u32, seed: u32) -> f32 {
    let h = hash_u32(
        x.wrapping_mul(374761393)
            .wrapping_add(y.wrapping_mul(668265263))
            .wrapping_add(seed),
    );
    (h & 0x00FFFFFF) as f32 / 16777216.0
}

// ============================================================================
// SEPIA TONE
// ============================================================================

/// Blend toward the classic sepia matrix by `intensity` in [0, 1].
/// Intensity 0 is identity, 1 is the full sepia look. Alpha is preserved.
pub fn sepia_core(src: &RgbaImage, intensity: f32) -> RgbaImage {
    let t = intensity.clamp(0.0, 1.0);
    if t == 0.0 {
        return src.clone();
    }
    apply_per_pixel(src, |_x, _y, r, g, b, a| {
        let sr = (0.393 * r + 0.769 * g + 0.189 * b).min(255.0);
        let sg = (0.349 * r + 0.686 * g + 0.168 * b).min(255.0);
        let sb = (0.272 * r + 0.534 * g + 0.131 * b).min(255.0);
        (r + (sr - r) * t, g + (sg - g) * t, b + (sb - b) * t, a)
    })
}

// ============================================================================
// PIXELLATE
// ============================================================================

/// Flatten square blocks of side `scale` pixels to the block average.
pub fn pixellate_core(src: &RgbaImage, scale: f32) -> RgbaImage {
    let bs = (scale.round() as u32).max(1);
    let w = src.width();
    let h = src.height();
    if w == 0 || h == 0 || bs <= 1 {
        return src.clone();
    }

    let src_raw = src.as_raw();
    let stride = w as usize * 4;

    // Average each block in one sequential pass.
    let blocks_x = w.div_ceil(bs) as usize;
    let blocks_y = h.div_ceil(bs) as usize;
    let mut sums: Vec<[f64; 4]> = vec![[0.0; 4]; blocks_x * blocks_y];
    let mut counts: Vec<u32> = vec![0; blocks_x * blocks_y];

    for y in 0..h {
        let by = (y / bs) as usize;
        for x in 0..w {
            let bi = by * blocks_x + (x / bs) as usize;
            let si = y as usize * stride + x as usize * 4;
            sums[bi][0] += src_raw[si] as f64;
            sums[bi][1] += src_raw[si + 1] as f64;
            sums[bi][2] += src_raw[si + 2] as f64;
            sums[bi][3] += src_raw[si + 3] as f64;
            counts[bi] += 1;
        }
    }

    let averages = cell_averages(&sums, &counts);

    // Paint every pixel with its block's average (parallel by row).
    let mut dst_raw = vec![0u8; src_raw.len()];
    dst_raw
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let by = (y as u32 / bs) as usize;
            for x in 0..w as usize {
                let bx = x / bs as usize;
                let avg = averages[by * blocks_x + bx];
                let pi = x * 4;
                row_out[pi..pi + 4].copy_from_slice(&avg);
            }
        });

    RgbaImage::from_raw(w, h, dst_raw).unwrap()
}

// ============================================================================
// CRYSTALLIZE (jittered-grid Voronoi)
// ============================================================================

/// Partition the image into Voronoi cells of characteristic size `radius`
/// and flatten each cell to its average color. Cell seed points come from
/// a hash of (grid cell, `seed`), so output depends only on the inputs.
pub fn crystallize_core(src: &RgbaImage, radius: f32, seed: u32) -> RgbaImage {
    let cs = radius.max(2.0);
    let w = src.width();
    let h = src.height();
    if w == 0 || h == 0 {
        return src.clone();
    }

    let src_raw = src.as_raw();
    let stride = w as usize * 4;

    let cells_x = ((w as f32 / cs).ceil() as i32).max(1);
    let cells_y = ((h as f32 / cs).ceil() as i32).max(1);
    let num_cells = (cells_x * cells_y) as usize;

    // One jittered seed point per grid cell.
    let mut seed_points: Vec<(f32, f32)> = Vec::with_capacity(num_cells);
    for cy in 0..cells_y {
        for cx in 0..cells_x {
            let jx = hash_f32(cx as u32, cy as u32, seed);
            let jy = hash_f32(cx as u32, cy as u32, seed.wrapping_add(77));
            seed_points.push((cx as f32 * cs + jx * cs, cy as f32 * cs + jy * cs));
        }
    }

    // Nearest seed point, searching the 3×3 grid neighbourhood.
    let nearest = |x: usize, y: usize| -> usize {
        let gcx = (x as f32 / cs) as i32;
        let gcy = (y as f32 / cs) as i32;
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;
        let mut best_dist = f32::MAX;
        let mut best_idx = 0usize;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let nx = gcx + dx;
                let ny = gcy + dy;
                if nx < 0 || ny < 0 || nx >= cells_x || ny >= cells_y {
                    continue;
                }
                let idx = (ny * cells_x + nx) as usize;
                let (sx, sy) = seed_points[idx];
                let d = (px - sx) * (px - sx) + (py - sy) * (py - sy);
                if d < best_dist {
                    best_dist = d;
                    best_idx = idx;
                }
            }
        }
        best_idx
    };

    // Average color per Voronoi cell.
    let mut sums: Vec<[f64; 4]> = vec![[0.0; 4]; num_cells];
    let mut counts: Vec<u32> = vec![0; num_cells];
    for y in 0..h as usize {
        for x in 0..w as usize {
            let ci = nearest(x, y);
            let si = y * stride + x * 4;
            sums[ci][0] += src_raw[si] as f64;
            sums[ci][1] += src_raw[si + 1] as f64;
            sums[ci][2] += src_raw[si + 2] as f64;
            sums[ci][3] += src_raw[si + 3] as f64;
            counts[ci] += 1;
        }
    }

    let averages = cell_averages(&sums, &counts);

    // Fill each pixel with its cell average (parallel by row).
    let mut dst_raw = vec![0u8; src_raw.len()];
    dst_raw
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            for x in 0..w as usize {
                let avg = averages[nearest(x, y)];
                let pi = x * 4;
                row_out[pi..pi + 4].copy_from_slice(&avg);
            }
        });

    RgbaImage::from_raw(w, h, dst_raw).unwrap()
}

/// Per-cell sums/counts to rounded u8 averages.
fn cell_averages(sums: &[[f64; 4]], counts: &[u32]) -> Vec<[u8; 4]> {
    sums.iter()
        .zip(counts)
        .map(|(sum, &count)| {
            if count == 0 {
                return [0; 4];
            }
            let inv = 1.0 / count as f64;
            [
                (sum[0] * inv).round().clamp(0.0, 255.0) as u8,
                (sum[1] * inv).round().clamp(0.0, 255.0) as u8,
                (sum[2] * inv).round().clamp(0.0, 255.0) as u8,
                (sum[3] * inv).round().clamp(0.0, 255.0) as u8,
            ]
        })
        .collect()
}

// ============================================================================
// TWIRL DISTORTION
// ============================================================================

/// Rotation at the very center of the twirl; falls off linearly to zero at
/// the circle's rim.
const TWIRL_MAX_ANGLE: f32 = std::f32::consts::PI;

/// Rotational warp inside a circle of `radius` around (`cx`, `cy`).
/// Pixels outside the circle pass through unchanged.
pub fn twirl_core(src: &RgbaImage, radius: f32, cx: f32, cy: f32) -> RgbaImage {
    let r_max = radius.max(1.0);
    apply_per_pixel(src, |x, y, r, g, b, a| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist >= r_max {
            return (r, g, b, a);
        }
        let rotation = TWIRL_MAX_ANGLE * (1.0 - dist / r_max);
        let cos_r = rotation.cos();
        let sin_r = rotation.sin();
        let src_x = cx + dx * cos_r - dy * sin_r;
        let src_y = cy + dx * sin_r + dy * cos_r;
        let p = sample_bilinear(src, src_x, src_y);
        (p[0], p[1], p[2], p[3])
    })
}

/// Composite `src` over an opaque `background` color, alpha-weighted.
/// Used when exporting to formats without an alpha channel.
pub fn flatten_onto(src: &RgbaImage, background: Rgba<u8>) -> RgbaImage {
    apply_per_pixel(src, |_x, _y, r, g, b, a| {
        let t = a / 255.0;
        (
            background[0] as f32 + (r - background[0] as f32) * t,
            background[1] as f32 + (g - background[1] as f32) * t,
            background[2] as f32 + (b - background[2] as f32) * t,
            255.0,
        )
    })
}
