//! Content analysis.
//!
//! Computes the per-conversion [`ImageMetadata`] once and keeps the
//! intermediate gradient field around for post-processing refinement.
//!
//! ```text
//! PixelImage ──► luma ──► Sobel ──┬──► edge map ──► edge_density
//!                                 │              ├─► text_probability
//!                                 │              └─► geometric_probability
//!                                 └──► magnitude ──► gradient_probability
//!           └──► color histogram ──► ColorStats
//! ```

pub mod components;
mod edges;
mod heuristics;

pub use components::{Component, Connectivity, Labeling, label_components};
pub use edges::{EDGE_THRESHOLD, FLAT_THRESHOLD, Gradients};

use crate::core::PixelImage;
use crate::error::Result;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Heuristic scores in `[0, 1]` plus image dimensions. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub edge_density: f64,
    pub text_probability: f64,
    pub geometric_probability: f64,
    pub gradient_probability: f64,
}

impl ImageMetadata {
    pub fn megapixels(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height) / 1_000_000.0
    }
}

/// Color statistics consumed by parameter derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStats {
    /// Exact number of distinct RGB values.
    pub unique_colors: usize,
    /// 5-bit-per-channel bins holding at least 0.1% of the pixels.
    pub significant_colors: usize,
    /// Mean luma in `[0, 1]`.
    pub brightness: f64,
    /// Luma standard deviation normalized to `[0, 1]`.
    pub contrast: f64,
}

/// Everything the analyzer produces for one image.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub metadata: ImageMetadata,
    pub stats: ColorStats,
    pub gradients: Gradients,
    pub edges: Vec<bool>,
}

/// Analyze an image. Only fails for zero-size input.
pub fn analyze(image: &PixelImage) -> Result<Analysis> {
    if image.pixel_count() == 0 {
        return Err(crate::error::VectorizeError::invalid_image("empty image"));
    }
    let (width, height) = (image.width(), image.height());
    let luma = image.luma();
    let gradients = Gradients::compute(&luma, width, height);
    let edges = gradients.edge_map();

    let metadata = ImageMetadata {
        width,
        height,
        edge_density: heuristics::edge_density(&edges),
        text_probability: heuristics::text_probability(&edges, &gradients),
        geometric_probability: heuristics::geometric_probability(&edges, &gradients),
        gradient_probability: heuristics::gradient_probability(&gradients),
    };
    let stats = color_stats(image, &luma);

    crate::debug!(
        "analyze";
        "{}x{} edges={:.3} text={:.3} geometric={:.3} gradient={:.3} colors={}/{}",
        width,
        height,
        metadata.edge_density,
        metadata.text_probability,
        metadata.geometric_probability,
        metadata.gradient_probability,
        stats.significant_colors,
        stats.unique_colors
    );

    Ok(Analysis {
        metadata,
        stats,
        gradients,
        edges,
    })
}

/// Histogram-based color statistics.
pub fn color_stats(image: &PixelImage, luma: &[f32]) -> ColorStats {
    let mut unique = FxHashSet::default();
    let mut bins = vec![0u32; 1 << 15];
    for c in image.pixels() {
        unique.insert(c.packed());
        let bin = (usize::from(c.r() >> 3) << 10) | (usize::from(c.g() >> 3) << 5) | usize::from(c.b() >> 3);
        bins[bin] += 1;
    }

    let min_share = (image.pixel_count() as f64 * 0.001).ceil().max(1.0) as u32;
    let significant_colors = bins.iter().filter(|&&n| n >= min_share).count();

    let n = luma.len() as f64;
    let mean = luma.iter().map(|&l| f64::from(l)).sum::<f64>() / n;
    let variance = luma
        .iter()
        .map(|&l| {
            let d = f64::from(l) - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    ColorStats {
        unique_colors: unique.len(),
        significant_colors,
        brightness: (mean / 255.0).clamp(0.0, 1.0),
        contrast: (variance.sqrt() / 127.5).clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Lcg, Rgb};

    #[test]
    fn test_solid_image() {
        let img = PixelImage::filled(100, 100, Rgb::new(200, 30, 30)).unwrap();
        let analysis = analyze(&img).unwrap();
        let m = analysis.metadata;
        assert_eq!((m.width, m.height), (100, 100));
        assert_eq!(m.edge_density, 0.0);
        assert_eq!(m.text_probability, 0.0);
        assert_eq!(m.gradient_probability, 0.0);
        assert_eq!(analysis.stats.unique_colors, 1);
        assert_eq!(analysis.stats.significant_colors, 1);
        assert_eq!(analysis.stats.contrast, 0.0);
    }

    #[test]
    fn test_scores_stay_in_unit_range() {
        let mut rng = Lcg::new(3);
        let ramp = PixelImage::from_fn(64, 48, |x, y| Rgb::new((x * 4) as u8, (y * 5) as u8, 90))
            .unwrap();
        let mut px = Vec::with_capacity(64 * 48 * 3);
        for _ in 0..64 * 48 * 3 {
            px.push((rng.next_u32() & 0xFF) as u8);
        }
        let noise = PixelImage::from_raw(64, 48, 3, px).unwrap();

        for image in [ramp, noise] {
            let m = analyze(&image).unwrap().metadata;
            for score in [
                m.edge_density,
                m.text_probability,
                m.geometric_probability,
                m.gradient_probability,
            ] {
                assert!((0.0..=1.0).contains(&score));
            }
        }
    }

    #[test]
    fn test_more_stripes_more_edges() {
        let stripes = |period: u32| {
            PixelImage::from_fn(80, 80, move |x, _| {
                if (x / period) % 2 == 0 { Rgb::BLACK } else { Rgb::WHITE }
            })
            .unwrap()
        };
        let coarse = analyze(&stripes(40)).unwrap().metadata.edge_density;
        let fine = analyze(&stripes(8)).unwrap().metadata.edge_density;
        assert!(fine > coarse);
    }

    #[test]
    fn test_brightness_and_contrast() {
        let white = PixelImage::filled(10, 10, Rgb::WHITE).unwrap();
        let stats = analyze(&white).unwrap().stats;
        assert!(stats.brightness > 0.99);

        let checker = PixelImage::from_fn(10, 10, |x, y| {
            if (x + y) % 2 == 0 { Rgb::BLACK } else { Rgb::WHITE }
        })
        .unwrap();
        let stats = analyze(&checker).unwrap().stats;
        assert!(stats.contrast > 0.99);
        assert_eq!(stats.unique_colors, 2);
    }
}
