//! Smooth-gradient region detection.
//!
//! Regions are only reported; flat-colored paths cannot express them and
//! callers decide what to do with the flag.

use crate::analysis::{Connectivity, FLAT_THRESHOLD, Gradients, label_components};
use crate::core::BBox;

pub const BLOCK_SIZE: u32 = 16;

/// Magnitudes at or above this are edges, not shading.
const SHADING_LIMIT: f32 = 48.0;

/// Share of a block's pixels that must be shading.
const SHADING_SHARE: f64 = 0.9;

/// Connected smooth blocks needed to report a region.
const MIN_BLOCKS: usize = 4;

/// Bounding boxes (pixel coordinates) of smoothly shaded areas.
pub fn detect_gradient_regions(gradients: &Gradients) -> Vec<BBox> {
    let (w, h) = (gradients.width, gradients.height);
    let bw = w.div_ceil(BLOCK_SIZE);
    let bh = h.div_ceil(BLOCK_SIZE);
    if bw == 0 || bh == 0 {
        return Vec::new();
    }

    let mut smooth = vec![false; bw as usize * bh as usize];
    for by in 0..bh {
        for bx in 0..bw {
            smooth[(by * bw + bx) as usize] = is_smooth_block(gradients, bx, by);
        }
    }

    label_components(&smooth, bw, bh, Connectivity::Four)
        .components
        .into_iter()
        .filter(|c| c.pixel_count >= MIN_BLOCKS)
        .map(|c| BBox {
            min_x: f64::from(c.min_x * BLOCK_SIZE),
            min_y: f64::from(c.min_y * BLOCK_SIZE),
            max_x: f64::from(((c.max_x + 1) * BLOCK_SIZE).min(w)),
            max_y: f64::from(((c.max_y + 1) * BLOCK_SIZE).min(h)),
        })
        .collect()
}

fn is_smooth_block(gradients: &Gradients, bx: u32, by: u32) -> bool {
    let w = gradients.width as usize;
    let x0 = (bx * BLOCK_SIZE) as usize;
    let y0 = (by * BLOCK_SIZE) as usize;
    let x1 = (x0 + BLOCK_SIZE as usize).min(w);
    let y1 = (y0 + BLOCK_SIZE as usize).min(gradients.height as usize);

    let mut count = 0usize;
    let mut shading = 0usize;
    let mut sum = 0.0_f64;
    for y in y0..y1 {
        for &m in &gradients.magnitude[y * w + x0..y * w + x1] {
            count += 1;
            sum += f64::from(m);
            if m < SHADING_LIMIT {
                shading += 1;
            }
        }
    }
    if count == 0 {
        return false;
    }
    shading as f64 >= SHADING_SHARE * count as f64 && sum / count as f64 >= f64::from(FLAT_THRESHOLD)
}
