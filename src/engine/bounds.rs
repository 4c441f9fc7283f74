//! Engine output validation with usvg.
//!
//! An engine can exit successfully and still hand back a document with
//! nothing visible in it. usvg resolves styles, transforms and invisible
//! elements for us, so the node tree it builds is the honest measure of
//! what would actually render.

use usvg::{Node, Rect, Tree};

/// Visible content must cover at least this share of the canvas.
pub const MIN_COVERAGE: f64 = 0.001;

/// What usvg sees in a document.
#[derive(Debug, Clone, Copy)]
pub struct Inspection {
    /// Rendered leaf nodes (paths, images, text).
    pub nodes: usize,
    /// Union of stroke-inclusive bounds of all visible nodes.
    pub bounds: Option<Rect>,
}

impl Inspection {
    /// No visible nodes, or visible content covering almost nothing.
    pub fn is_degenerate(&self, canvas_width: u32, canvas_height: u32) -> bool {
        let Some(bounds) = self.bounds else {
            return true;
        };
        if self.nodes == 0 {
            return true;
        }
        let canvas = f64::from(canvas_width) * f64::from(canvas_height);
        let covered = f64::from(bounds.width()) * f64::from(bounds.height());
        covered < canvas * MIN_COVERAGE
    }
}

/// Parse `svg` and measure its visible content.
pub fn inspect(svg: &str) -> Result<Inspection, usvg::Error> {
    let tree = Tree::from_str(svg, &usvg::Options::default())?;
    let mut inspection = Inspection {
        nodes: 0,
        bounds: None,
    };
    traverse_group(tree.root(), &mut inspection);
    Ok(inspection)
}

/// Recursively traverse a group and its children, accumulating bounds
fn traverse_group(group: &usvg::Group, inspection: &mut Inspection) {
    for node in group.children() {
        match node {
            Node::Group(nested) => traverse_group(nested, inspection),
            _ => {
                inspection.nodes += 1;
                inspection.bounds = merge_bounds(inspection.bounds, node.stroke_bounding_box());
            }
        }
    }
}

/// Merge two optional bounding boxes into one
fn merge_bounds(a: Option<Rect>, b: Rect) -> Option<Rect> {
    match a {
        Some(existing) => {
            let min_x = existing.x().min(b.x());
            let min_y = existing.y().min(b.y());
            let max_x = existing.right().max(b.right());
            let max_y = existing.bottom().max(b.bottom());

            Rect::from_xywh(min_x, min_y, max_x - min_x, max_y - min_y)
        }
        None => Some(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_document() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
            <path d="M10 10 L90 10 L90 90 Z" fill="#ff0000"/>
            <g transform="translate(5,5)"><circle cx="20" cy="20" r="5" fill="#000"/></g>
        </svg>"##;
        let inspection = inspect(svg).unwrap();
        assert_eq!(inspection.nodes, 2);
        assert!(!inspection.is_degenerate(100, 100));
    }

    #[test]
    fn test_empty_document_is_degenerate() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"></svg>"#;
        let inspection = inspect(svg).unwrap();
        assert_eq!(inspection.nodes, 0);
        assert!(inspection.is_degenerate(100, 100));
    }

    #[test]
    fn test_speck_is_degenerate() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="1000" height="1000">
            <rect x="1" y="1" width="2" height="2" fill="#000"/>
        </svg>"##;
        assert!(inspect(svg).unwrap().is_degenerate(1000, 1000));
    }

    #[test]
    fn test_unparseable() {
        assert!(inspect("not svg at all").is_err());
    }

    #[test]
    fn test_merge_bounds() {
        let a = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let b = Rect::from_xywh(-10.0, -10.0, 50.0, 50.0).unwrap();

        let m = merge_bounds(a, b).unwrap();
        assert_eq!(m.x(), -10.0);
        assert_eq!(m.y(), -10.0);
        assert_eq!(m.right(), 100.0);
        assert_eq!(m.bottom(), 100.0);
    }
}
