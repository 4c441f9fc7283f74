//! Mask smoothing and contour simplification.
//!
//! ```text
//! Mask ─► close(r_close) ─► open(r_open) ─► drop specks < speckle_area
//!      ─► gaussian(sigma) ─► threshold(cut)
//!      ─► outer rings + holes ≥ min_area
//!      ─► Douglas-Peucker (epsilon = ratio × perimeter), every ring
//!      ─► neighbor-weighted smoothing × passes ─► contours
//! ```
//!
//! Every knob derives from one `intensity` in `[0, 1]`: `0.0` keeps the
//! mask geometry almost verbatim, [`MODERATE`] suits ordinary layers and
//! [`ULTRA`] trades fidelity for visibly smooth outlines.

pub mod blur;
pub mod morph;
pub mod simplify;
pub mod smooth;
pub mod trace;

use crate::core::{Mask, Point, Shape, polygon_area, polygon_perimeter};
pub use trace::Contour;
use crate::layers::ColorLayer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const MODERATE: f64 = 0.5;
pub const ULTRA: f64 = 1.0;

/// Concrete stage settings derived from an intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingProfile {
    pub intensity: f64,
    pub close_radius: u32,
    pub open_radius: u32,
    /// Connected regions below this many pixels are dropped after opening.
    pub speckle_area: usize,
    pub blur_sigma: f64,
    pub threshold: u8,
    pub min_area: f64,
    /// Douglas-Peucker tolerance as a fraction of the ring perimeter.
    pub epsilon_ratio: f64,
    pub smooth_passes: usize,
    pub neighbor_weight: f64,
    /// Segments longer than this are split before each smoothing pass.
    pub max_segment: f64,
}

impl SmoothingProfile {
    /// Interpolate all stage settings from `intensity` (clamped to `[0, 1]`).
    ///
    /// `filter_speckle` is the tracing parameter of the same name: regions
    /// narrower than it in both directions count as noise.
    pub fn from_intensity(intensity: f64, filter_speckle: u32) -> Self {
        let t = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let speckle = filter_speckle.max(1) as usize;
        Self {
            intensity: t,
            close_radius: (3.0 * t).round() as u32,
            open_radius: (1.5 * t).round() as u32,
            speckle_area: speckle * speckle,
            blur_sigma: 2.5 * t,
            threshold: (128.0 - 40.0 * t).round() as u8,
            min_area: (speckle * speckle).max(4) as f64,
            epsilon_ratio: 0.002 + 0.006 * t,
            smooth_passes: (4.0 * t).round() as usize,
            neighbor_weight: 0.15 + 0.15 * t,
            max_segment: 6.0,
        }
    }

    pub fn moderate(filter_speckle: u32) -> Self {
        Self::from_intensity(MODERATE, filter_speckle)
    }

    pub fn ultra(filter_speckle: u32) -> Self {
        Self::from_intensity(ULTRA, filter_speckle)
    }
}

/// Run the full pipeline on one mask and return simplified contours.
///
/// A non-empty mask always yields at least one contour: if cleaning or the
/// area filter would erase everything, the raw mask geometry is used.
pub fn extract_contours(mask: &Mask, profile: &SmoothingProfile) -> Vec<Contour> {
    if mask.is_empty() {
        return Vec::new();
    }
    let canvas = (f64::from(mask.width()), f64::from(mask.height()));
    if mask.is_full() {
        return vec![Contour {
            outer: canvas_rect(canvas),
            holes: Vec::new(),
        }];
    }

    let cleaned = clean_mask(mask, profile);
    let source = if cleaned.is_empty() { mask } else { &cleaned };

    let mut groups = trace::contours(source, profile.min_area);
    if groups.is_empty() {
        // everything was below min_area: keep the largest region
        groups = trace::contours(mask, 0.0)
            .into_iter()
            .max_by(|a, b| polygon_area(&a.outer).total_cmp(&polygon_area(&b.outer)))
            .into_iter()
            .collect();
    }

    groups
        .into_iter()
        .filter_map(|contour| {
            let outer = refine_ring(&contour.outer, profile, canvas)?;
            let holes = contour
                .holes
                .iter()
                .filter_map(|hole| refine_ring(hole, profile, canvas))
                .collect();
            Some(Contour { outer, holes })
        })
        .collect()
}

/// Stages 4 and 5 on one ring. `None` when it degenerates.
fn refine_ring(ring: &[Point], profile: &SmoothingProfile, canvas: (f64, f64)) -> Option<Vec<Point>> {
    let epsilon = profile.epsilon_ratio * polygon_perimeter(ring);
    let simplified = simplify::simplify_closed(ring, epsilon);
    if simplified.len() < 3 {
        return None;
    }
    let smoothed = smooth::smooth_closed(
        &simplified,
        profile.smooth_passes,
        profile.neighbor_weight,
        profile.max_segment,
        canvas,
    );
    (polygon_area(&smoothed) > 0.0).then_some(smoothed)
}

/// Stages 1 and 2: morphology, speck removal, blur and re-threshold.
pub fn clean_mask(mask: &Mask, profile: &SmoothingProfile) -> Mask {
    let mut m = morph::close(mask, profile.close_radius);
    m = morph::open(&m, profile.open_radius);
    morph::remove_small_components(&mut m, profile.speckle_area);
    blur::smooth_mask(&m, profile.blur_sigma, profile.threshold)
}

/// Colored shapes for one layer.
pub fn layer_shapes(layer: &ColorLayer, profile: &SmoothingProfile) -> Vec<Shape> {
    extract_contours(&layer.mask, profile)
        .into_iter()
        .map(|contour| Shape::with_holes(contour.outer, contour.holes, layer.color))
        .collect()
}

/// Shapes for several layers, processed in parallel.
///
/// Output keeps the layer order given, so painting order is stable.
pub fn shapes_for_layers(layers: &[&ColorLayer], profile: &SmoothingProfile) -> Vec<Shape> {
    layers
        .par_iter()
        .map(|layer| layer_shapes(layer, profile))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

fn canvas_rect((w, h): (f64, f64)) -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}
