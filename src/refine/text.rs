//! Text-region enhancement.
//!
//! Edge pixels are closed into blobs; blobs shaped like a line of text
//! are compared against the current rendering and, when the rendering
//! loses them, re-extracted at full detail and layered on top.

use crate::analysis::{Component, Connectivity, label_components};
use crate::contour::{SmoothingProfile, morph, shapes_for_layers};
use crate::core::{BBox, Mask, PixelImage, Point};
use crate::layers::build_layers;
use crate::palette::PaletteExtractor;
use crate::svg::SvgDocument;
use crate::svg::raster::{Canvas, rasterize};

/// Regions rendered at least this faithfully are left alone.
pub const MIN_REGION_FIDELITY: f64 = 0.9;

/// Colors used when re-extracting a region.
const REGION_COLORS: usize = 3;

const CLOSE_RADIUS: u32 = 2;
const PADDING: u32 = 2;

const MIN_WIDTH: u32 = 8;
const MIN_HEIGHT: u32 = 6;
const MIN_ASPECT: f64 = 1.5;
const MAX_ASPECT: f64 = 20.0;
const MIN_FILL: f64 = 0.25;

/// Outcome of [`enhance_text`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextReport {
    pub regions: Vec<BBox>,
    pub enhanced: usize,
}

/// Line-of-text shaped blobs in the edge map.
pub fn find_text_regions(edges: &[bool], width: u32, height: u32) -> Vec<Component> {
    let Some(mask) = Mask::from_vec(width, height, edges.to_vec()) else {
        return Vec::new();
    };
    let closed = morph::close(&mask, CLOSE_RADIUS);
    let max_height = (height / 4).max(24);
    let max_area = width as usize * height as usize / 4;

    label_components(closed.as_slice(), width, height, Connectivity::Eight)
        .components
        .into_iter()
        .filter(|c| {
            c.width() >= MIN_WIDTH
                && (MIN_HEIGHT..=max_height).contains(&c.height())
                && (MIN_ASPECT..=MAX_ASPECT).contains(&c.aspect())
                && c.fill_ratio() >= MIN_FILL
                && (c.width() as usize * c.height() as usize) <= max_area
        })
        .collect()
}

/// Re-extract poorly rendered text regions into `document`.
pub fn enhance_text(
    document: &mut SvgDocument,
    image: &PixelImage,
    edges: &[bool],
    extractor: &PaletteExtractor,
) -> TextReport {
    let regions = find_text_regions(edges, image.width(), image.height());
    if regions.is_empty() {
        return TextReport::default();
    }

    let canvas = rasterize(document, 1.0);
    let mut report = TextReport::default();
    for region in &regions {
        report.regions.push(BBox {
            min_x: f64::from(region.min_x),
            min_y: f64::from(region.min_y),
            max_x: f64::from(region.max_x + 1),
            max_y: f64::from(region.max_y + 1),
        });

        let fidelity = region_fidelity(&canvas, image, region);
        if fidelity >= MIN_REGION_FIDELITY {
            continue;
        }
        crate::debug!(
            "refine";
            "text region {}x{} at ({}, {}) fidelity {:.3}",
            region.width(),
            region.height(),
            region.min_x,
            region.min_y,
            fidelity
        );
        if reextract(document, image, region, extractor) {
            report.enhanced += 1;
        }
    }
    report
}

/// `1 - mean absolute channel error / 255` over the region bounds.
fn region_fidelity(canvas: &Canvas, image: &PixelImage, region: &Component) -> f64 {
    let mut total = 0u64;
    let mut samples = 0u64;
    for y in region.min_y..=region.max_y {
        for x in region.min_x..=region.max_x {
            let a = canvas.pixel(x, y);
            let b = image.pixel(x, y);
            total += a.0.iter().zip(b.0).map(|(&p, q)| u64::from(p.abs_diff(q))).sum::<u64>();
            samples += 3;
        }
    }
    if samples == 0 {
        return 1.0;
    }
    1.0 - total as f64 / samples as f64 / 255.0
}

fn reextract(
    document: &mut SvgDocument,
    image: &PixelImage,
    region: &Component,
    extractor: &PaletteExtractor,
) -> bool {
    let x = region.min_x.saturating_sub(PADDING);
    let y = region.min_y.saturating_sub(PADDING);
    let Ok(crop) = image.crop(x, y, region.width() + 2 * PADDING, region.height() + 2 * PADDING)
    else {
        return false;
    };

    let palette = extractor.cluster(&crop, REGION_COLORS);
    let layers = build_layers(&crop, &palette);
    let profile = SmoothingProfile::from_intensity(0.0, 1);
    let origin = Point::new(f64::from(x), f64::from(y));

    let before = document.element_count();
    for mut shape in shapes_for_layers(&layers.by_coverage(), &profile) {
        shape.translate(origin);
        document.add_shape(shape);
    }
    document.element_count() > before
}
