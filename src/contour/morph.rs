//! Binary morphology with square structuring elements.
//!
//! Each operation is separable: a horizontal then a vertical window pass,
//! both O(pixels) regardless of radius thanks to running counts.
//!
//! Pixels outside the canvas read as unset for dilation and as set for
//! erosion, so regions touching the border are not eaten away.

use crate::analysis::{Connectivity, label_components};
use crate::core::Mask;

#[derive(Clone, Copy)]
enum Op {
    Dilate,
    Erode,
}

pub fn dilate(mask: &Mask, radius: u32) -> Mask {
    apply(mask, radius, Op::Dilate)
}

pub fn erode(mask: &Mask, radius: u32) -> Mask {
    apply(mask, radius, Op::Erode)
}

/// Dilation then erosion: bridges gaps narrower than the element.
pub fn close(mask: &Mask, radius: u32) -> Mask {
    erode(&dilate(mask, radius), radius)
}

/// Erosion then dilation: drops features thinner than the element.
pub fn open(mask: &Mask, radius: u32) -> Mask {
    dilate(&erode(mask, radius), radius)
}

/// Clear 8-connected components smaller than `min_pixels`.
pub fn remove_small_components(mask: &mut Mask, min_pixels: usize) {
    if min_pixels <= 1 {
        return;
    }
    let labeling = label_components(
        mask.as_slice(),
        mask.width(),
        mask.height(),
        Connectivity::Eight,
    );
    let small: Vec<bool> = labeling
        .components
        .iter()
        .map(|c| c.pixel_count < min_pixels)
        .collect();
    if !small.iter().any(|&s| s) {
        return;
    }
    for (px, &label) in mask.as_mut_slice().iter_mut().zip(&labeling.labels) {
        if label != 0 && small[label as usize - 1] {
            *px = false;
        }
    }
}

fn apply(mask: &Mask, radius: u32, op: Op) -> Mask {
    if radius == 0 {
        return mask.clone();
    }
    let w = mask.width() as usize;
    let h = mask.height() as usize;
    let r = radius as usize;
    let src = mask.as_slice();

    let mut horizontal = vec![false; w * h];
    let mut line = vec![false; w.max(h)];
    let mut out_line = vec![false; w.max(h)];

    for y in 0..h {
        line[..w].copy_from_slice(&src[y * w..(y + 1) * w]);
        window_pass(&line[..w], &mut out_line[..w], r, op);
        horizontal[y * w..(y + 1) * w].copy_from_slice(&out_line[..w]);
    }

    let mut result = vec![false; w * h];
    for x in 0..w {
        for y in 0..h {
            line[y] = horizontal[y * w + x];
        }
        window_pass(&line[..h], &mut out_line[..h], r, op);
        for y in 0..h {
            result[y * w + x] = out_line[y];
        }
    }

    Mask::from_vec(mask.width(), mask.height(), result).unwrap_or_else(|| mask.clone())
}

/// One-dimensional running-count window of half-width `r`.
fn window_pass(input: &[bool], output: &mut [bool], r: usize, op: Op) {
    let n = input.len();
    // prefix[i] = number of set pixels in input[..i]
    let mut prefix = vec![0u32; n + 1];
    for (i, &v) in input.iter().enumerate() {
        prefix[i + 1] = prefix[i] + u32::from(v);
    }
    for (i, out) in output.iter_mut().enumerate() {
        let lo = i.saturating_sub(r);
        let hi = (i + r).min(n - 1);
        let set = prefix[hi + 1] - prefix[lo];
        *out = match op {
            Op::Dilate => set > 0,
            Op::Erode => set as usize == hi - lo + 1,
        };
    }
}
