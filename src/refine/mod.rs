//! Post-processing refinement of traced documents.
//!
//! # Module Structure
//!
//! ```text
//! refine/
//! ├── edges.rs     # moving-average pass over filled outlines
//! ├── text.rs      # text-like regions re-extracted when rendered poorly
//! ├── details.rs   # Harris corners missing from the output become markers
//! └── gradient.rs  # smooth shading regions, reported only
//! ```
//!
//! Steps run in the order above and each can be switched off. Nothing here
//! fails: a step that finds nothing to do leaves the document unchanged.

mod details;
mod edges;
mod gradient;
mod text;

pub use details::{detect_corners, preserve_details};
pub use edges::refine_edges;
pub use gradient::detect_gradient_regions;
pub use text::{TextReport, enhance_text, find_text_regions};

use crate::analysis::Analysis;
use crate::core::{BBox, PixelImage};
use crate::palette::PaletteExtractor;
use crate::svg::SvgDocument;
use serde::{Deserialize, Serialize};

/// Which refinement steps to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineOptions {
    pub preserve_details: bool,
    pub enhance_text: bool,
    pub refine_edges: bool,
    pub detect_gradients: bool,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            preserve_details: true,
            enhance_text: true,
            refine_edges: true,
            detect_gradients: true,
        }
    }
}

/// What refinement changed or found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefineReport {
    pub paths_smoothed: usize,
    pub text_regions: usize,
    pub text_regions_enhanced: usize,
    pub markers_added: usize,
    pub gradient_regions: Vec<BBox>,
}

/// Refine `document` against its source image.
pub fn refine(
    document: &mut SvgDocument,
    image: &PixelImage,
    analysis: &Analysis,
    options: &RefineOptions,
    extractor: &PaletteExtractor,
) -> RefineReport {
    let mut report = RefineReport::default();

    if options.refine_edges {
        report.paths_smoothed = refine_edges(document);
    }
    if options.enhance_text {
        let text = enhance_text(document, image, &analysis.edges, extractor);
        report.text_regions = text.regions.len();
        report.text_regions_enhanced = text.enhanced;
    }
    if options.preserve_details {
        report.markers_added = preserve_details(document, image, &analysis.gradients);
    }
    if options.detect_gradients {
        report.gradient_regions = detect_gradient_regions(&analysis.gradients);
    }

    crate::debug!(
        "refine";
        "smoothed={} text={}/{} markers={} gradients={}",
        report.paths_smoothed,
        report.text_regions_enhanced,
        report.text_regions,
        report.markers_added,
        report.gradient_regions.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::core::{Point, Rgb};

    fn square() -> PixelImage {
        PixelImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Rgb::BLACK
            } else {
                Rgb::WHITE
            }
        })
        .unwrap()
    }

    #[test]
    fn test_all_disabled_is_noop() {
        let image = square();
        let analysis = analyze(&image).unwrap();
        let mut doc = SvgDocument::new(40, 40);
        doc.add_rect(0.0, 0.0, 40.0, 40.0, Rgb::WHITE);
        let options = RefineOptions {
            preserve_details: false,
            enhance_text: false,
            refine_edges: false,
            detect_gradients: false,
        };
        let report = refine(&mut doc, &image, &analysis, &options, &PaletteExtractor::default());
        assert_eq!(report, RefineReport::default());
        assert_eq!(doc.element_count(), 1);
    }

    #[test]
    fn test_missing_corners_marked() {
        let image = square();
        let analysis = analyze(&image).unwrap();
        let mut doc = SvgDocument::new(40, 40);
        doc.add_rect(0.0, 0.0, 40.0, 40.0, Rgb::WHITE);

        let report = refine(
            &mut doc,
            &image,
            &analysis,
            &RefineOptions::default(),
            &PaletteExtractor::default(),
        );
        assert!(report.markers_added >= 4);
        assert_eq!(doc.element_count(), 1 + report.markers_added);
    }

    #[test]
    fn test_faithful_square_keeps_shape() {
        let image = square();
        let analysis = analyze(&image).unwrap();
        let mut doc = SvgDocument::new(40, 40);
        doc.add_rect(0.0, 0.0, 40.0, 40.0, Rgb::WHITE);
        doc.add_path(
            vec![
                Point::new(10.0, 10.0),
                Point::new(30.0, 10.0),
                Point::new(30.0, 30.0),
                Point::new(10.0, 30.0),
            ],
            Rgb::BLACK,
            true,
            0.0,
        );
        let options = RefineOptions {
            refine_edges: false,
            ..RefineOptions::default()
        };
        let report = refine(&mut doc, &image, &analysis, &options, &PaletteExtractor::default());
        assert_eq!(report.markers_added, 0);
        assert_eq!(report.text_regions_enhanced, 0);
        assert_eq!(doc.element_count(), 2);
    }

    #[test]
    fn test_options_partial_toml() {
        let options: RefineOptions = toml::from_str("enhance_text = false").unwrap();
        assert!(!options.enhance_text);
        assert!(options.preserve_details);
    }
}
