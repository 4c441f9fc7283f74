//! Basic fallback: contour tracing without the external engine.
//!
//! The image is quantized to a small clustered palette, split into one
//! layer per color and every layer goes through the contour pipeline.
//! This always yields at least one primitive for a non-empty image.

use crate::contour::{SmoothingProfile, shapes_for_layers};
use crate::core::PixelImage;
use crate::error::Result;
use crate::layers::{build_layers, quantize};
use crate::palette::{Palette, PaletteExtractor};
use crate::svg::SvgDocument;

/// Colors used by the fallback palette.
pub const FALLBACK_COLORS: usize = 8;

/// Trace `image` in-process at the given smoothing intensity.
pub fn basic_fallback(
    image: &PixelImage,
    extractor: &PaletteExtractor,
    intensity: f64,
    filter_speckle: u32,
) -> Result<SvgDocument> {
    let palette = fallback_palette(image, extractor);
    let quantized = quantize(image, &palette)?;
    let layers = build_layers(&quantized, &palette);
    let profile = SmoothingProfile::from_intensity(intensity, filter_speckle);

    let mut document = SvgDocument::new(image.width(), image.height());
    for shape in shapes_for_layers(&layers.by_coverage(), &profile) {
        document.add_shape(shape);
    }

    if document.element_count() == 0 {
        // every contour collapsed: paint the dominant color
        if let Some(color) = palette.first() {
            document.add_rect(
                0.0,
                0.0,
                f64::from(image.width()),
                f64::from(image.height()),
                color,
            );
        }
    }

    crate::debug!(
        "fallback";
        "{} colors, {} shapes",
        palette.len(),
        document.element_count()
    );
    Ok(document)
}

/// Exact colors when the image already has few, k-means otherwise.
fn fallback_palette(image: &PixelImage, extractor: &PaletteExtractor) -> Palette {
    let dominant = extractor.dominant(image);
    if !dominant.is_empty() && dominant.len() < extractor.options().dominant_count {
        // frequency counting found every color the image has
        return dominant;
    }
    extractor.cluster(image, FALLBACK_COLORS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rgb, polygon_area};
    use crate::svg::Primitive;

    #[test]
    fn test_solid_image_single_canvas_shape() {
        let image = PixelImage::filled(100, 100, Rgb::new(30, 60, 90)).unwrap();
        let doc = basic_fallback(&image, &PaletteExtractor::default(), 0.25, 4).unwrap();
        assert_eq!(doc.element_count(), 1);
        match &doc.primitives()[0] {
            Primitive::Path { subpaths, color, filled, .. } => {
                assert!(*filled);
                assert_eq!(*color, Rgb::new(30, 60, 90));
                assert_eq!(polygon_area(&subpaths[0]), 10_000.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_two_color_image() {
        let image = PixelImage::from_fn(60, 40, |x, _| {
            if x < 30 { Rgb::BLACK } else { Rgb::WHITE }
        })
        .unwrap();
        let doc = basic_fallback(&image, &PaletteExtractor::default(), 0.25, 2).unwrap();
        assert_eq!(doc.element_count(), 2);
        let colors: Vec<Rgb> = doc.primitives().iter().map(Primitive::color).collect();
        assert!(colors.contains(&Rgb::BLACK) && colors.contains(&Rgb::WHITE));
    }

    #[test]
    fn test_noisy_image_produces_output() {
        let mut rng = crate::core::Lcg::new(9);
        let noise: Vec<u8> = (0..48 * 48 * 3).map(|_| rng.next_u32() as u8).collect();
        let image = PixelImage::from_raw(48, 48, 3, noise).unwrap();
        let doc = basic_fallback(&image, &PaletteExtractor::default(), 0.25, 4).unwrap();
        assert!(doc.element_count() >= 1);
    }
}
