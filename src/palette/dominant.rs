//! Frequency-counted dominant colors.
//!
//! No clustering: exact colors are ranked by how many pixels carry them
//! and near-identical shades (below the LAB just-noticeable difference)
//! collapse into the more frequent one.

use crate::core::{PixelImage, Rgb};
use lab::Lab;
use rustc_hash::FxHashMap;

/// ΔE76 below which two colors are indistinguishable.
const JUST_NOTICEABLE_DIFFERENCE: f32 = 2.3;

pub fn dominant_colors(image: &PixelImage, max_colors: usize) -> Vec<Rgb> {
    if max_colors == 0 {
        return Vec::new();
    }

    let mut counts: FxHashMap<u32, u32> = FxHashMap::default();
    for c in image.pixels() {
        *counts.entry(c.packed()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(u32, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let jnd_sq = JUST_NOTICEABLE_DIFFERENCE * JUST_NOTICEABLE_DIFFERENCE;
    let mut kept: Vec<(Rgb, Lab)> = Vec::with_capacity(max_colors);
    for (packed, _) in ranked {
        let color = Rgb::from_packed(packed);
        let lab = color.to_lab();
        if kept.iter().any(|(_, k)| lab_distance_sq(k, &lab) < jnd_sq) {
            continue;
        }
        kept.push((color, lab));
        if kept.len() == max_colors {
            break;
        }
    }
    kept.into_iter().map(|(c, _)| c).collect()
}

#[inline]
fn lab_distance_sq(a: &Lab, b: &Lab) -> f32 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    dl * dl + da * da + db * db
}
