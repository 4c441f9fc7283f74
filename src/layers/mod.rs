//! Color-separated layers.
//!
//! Every pixel goes to its nearest palette color (squared RGB distance,
//! first palette entry wins ties). Coverage is therefore complete and the
//! masks are pairwise disjoint, which a per-color distance threshold
//! cannot guarantee.
//!
//! Assignment runs row-parallel on the rayon pool for large images, with
//! the palette held in a flat array so the inner loop stays branch-light.

use crate::core::{Mask, PixelImage, Rgb};
use crate::palette::Palette;
use rayon::prelude::*;

const PARALLEL_PIXEL_THRESHOLD: usize = 32 * 1024;

/// Pixels assigned to one palette entry.
#[derive(Debug, Clone)]
pub struct ColorLayer {
    pub color: Rgb,
    pub mask: Mask,
    pub pixel_count: usize,
}

/// All layers of one image, in palette order.
#[derive(Debug, Clone)]
pub struct LayerSet {
    labels: Vec<u16>,
    layers: Vec<ColorLayer>,
}

impl LayerSet {
    /// Layers in palette order, including empty ones.
    pub fn layers(&self) -> &[ColorLayer] {
        &self.layers
    }

    /// Palette index of every pixel.
    pub fn labels(&self) -> &[u16] {
        &self.labels
    }

    /// First layer carrying `color`.
    pub fn get(&self, color: Rgb) -> Option<&ColorLayer> {
        self.layers.iter().find(|l| l.color == color)
    }

    /// Non-empty layers, largest first (ties keep palette order).
    ///
    /// Enclosed regions are cut out of their surroundings as holes; painting
    /// small layers last covers the seams smoothing leaves along them.
    pub fn by_coverage(&self) -> Vec<&ColorLayer> {
        let mut out: Vec<&ColorLayer> = self.layers.iter().filter(|l| l.pixel_count > 0).collect();
        out.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));
        out
    }
}

/// Index of the nearest palette color for every pixel.
///
/// Returns an empty vector when the palette is empty.
pub fn assign_labels(image: &PixelImage, palette: &Palette) -> Vec<u16> {
    if palette.is_empty() {
        return Vec::new();
    }
    let colors: Vec<[i32; 3]> = palette
        .iter()
        .map(|c| [i32::from(c.r()), i32::from(c.g()), i32::from(c.b())])
        .collect();

    let nearest = |px: &[u8]| -> u16 {
        let (r, g, b) = (i32::from(px[0]), i32::from(px[1]), i32::from(px[2]));
        let mut best = 0u16;
        let mut best_d = i32::MAX;
        for (i, c) in colors.iter().enumerate() {
            let dr = r - c[0];
            let dg = g - c[1];
            let db = b - c[2];
            let d = dr * dr + dg * dg + db * db;
            // strict comparison keeps the earliest entry on ties
            if d < best_d {
                best_d = d;
                best = i as u16;
            }
        }
        best
    };

    let raw = image.as_raw();
    let row = image.width() as usize;
    let mut labels = vec![0u16; image.pixel_count()];

    if labels.len() >= PARALLEL_PIXEL_THRESHOLD {
        labels
            .par_chunks_mut(row)
            .zip(raw.par_chunks_exact(row * 3))
            .for_each(|(out, px_row)| {
                for (slot, px) in out.iter_mut().zip(px_row.chunks_exact(3)) {
                    *slot = nearest(px);
                }
            });
    } else {
        for (slot, px) in labels.iter_mut().zip(raw.chunks_exact(3)) {
            *slot = nearest(px);
        }
    }
    labels
}

/// Split the image into one layer per palette entry.
pub fn build_layers(image: &PixelImage, palette: &Palette) -> LayerSet {
    let (w, h) = (image.width(), image.height());
    let labels = assign_labels(image, palette);

    let mut masks: Vec<Mask> = palette.iter().map(|_| Mask::new(w, h)).collect();
    let mut counts = vec![0usize; palette.len()];
    for (i, &label) in labels.iter().enumerate() {
        let label = usize::from(label);
        masks[label].as_mut_slice()[i] = true;
        counts[label] += 1;
    }

    let layers = palette
        .iter()
        .zip(masks)
        .zip(counts)
        .map(|((&color, mask), pixel_count)| ColorLayer {
            color,
            mask,
            pixel_count,
        })
        .collect();

    crate::debug!(
        "layers";
        "{} layers over {}x{} ({} non-empty)",
        palette.len(),
        w,
        h,
        labels.iter().copied().collect::<rustc_hash::FxHashSet<_>>().len()
    );

    LayerSet { labels, layers }
}

/// Copy of `image` with every pixel replaced by its nearest palette color.
pub fn quantize(image: &PixelImage, palette: &Palette) -> crate::error::Result<PixelImage> {
    if palette.is_empty() {
        return Ok(image.clone());
    }
    let labels = assign_labels(image, palette);
    let colors = palette.colors();
    let mut raw = Vec::with_capacity(labels.len() * 3);
    for &label in &labels {
        raw.extend_from_slice(&colors[usize::from(label)].0);
    }
    PixelImage::from_raw(image.width(), image.height(), 3, raw)
}
