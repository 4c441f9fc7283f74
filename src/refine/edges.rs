//! Edge refinement: one light moving-average pass over filled outlines.

use crate::contour::smooth::moving_average;
use crate::svg::{Primitive, SvgDocument};

/// Neighbors averaged on each side of a vertex.
const WINDOW_HALF: usize = 1;

/// Sparser rings are already clean polygons; averaging would cut their corners.
const MIN_RING_POINTS: usize = 8;

/// Smooth every filled path in place. Returns the number of paths touched.
///
/// Sparse rings, stroked paths, rects and circles are left untouched.
pub fn refine_edges(document: &mut SvgDocument) -> usize {
    let canvas = (f64::from(document.width()), f64::from(document.height()));
    let mut touched = 0;
    for primitive in document.primitives_mut() {
        let Primitive::Path {
            subpaths,
            filled: true,
            ..
        } = primitive
        else {
            continue;
        };
        let mut changed = false;
        for ring in subpaths.iter_mut() {
            if ring.len() < MIN_RING_POINTS {
                continue;
            }
            let smoothed = moving_average(ring, WINDOW_HALF, canvas);
            changed |= smoothed != *ring;
            *ring = smoothed;
        }
        if changed {
            touched += 1;
        }
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Point, Rgb, polygon_area};

    #[test]
    fn test_jagged_ring_smoothed() {
        let mut doc = SvgDocument::new(100, 100);
        let zigzag: Vec<Point> = (0..24)
            .map(|i| {
                let t = f64::from(i) / 24.0 * std::f64::consts::TAU;
                let r = if i % 2 == 0 { 30.0 } else { 26.0 };
                Point::new(50.0 + r * t.cos(), 50.0 + r * t.sin())
            })
            .collect();
        let before = polygon_area(&zigzag);
        doc.add_path(zigzag.clone(), Rgb::BLACK, true, 0.0);

        assert_eq!(refine_edges(&mut doc), 1);
        let Primitive::Path { subpaths, .. } = &doc.primitives()[0] else {
            panic!("expected path");
        };
        assert_ne!(subpaths[0], zigzag);
        // smoothing shrinks slightly but keeps the shape
        let after = polygon_area(&subpaths[0]);
        assert!(after < before && after > before * 0.8);
    }

    #[test]
    fn test_sparse_polygon_keeps_corners() {
        let mut doc = SvgDocument::new(40, 40);
        let square = vec![
            Point::new(10.0, 10.0),
            Point::new(30.0, 10.0),
            Point::new(30.0, 30.0),
            Point::new(10.0, 30.0),
        ];
        doc.add_path(square, Rgb::BLACK, true, 0.0);
        assert_eq!(refine_edges(&mut doc), 0);
    }

    #[test]
    fn test_other_primitives_untouched() {
        let mut doc = SvgDocument::new(10, 10);
        doc.add_rect(1.0, 1.0, 3.0, 3.0, Rgb::BLACK);
        doc.add_circle(Point::new(5.0, 5.0), 2.0, Rgb::BLACK);
        doc.add_path(
            vec![Point::new(1.0, 1.0), Point::new(8.0, 2.0), Point::new(3.0, 7.0)],
            Rgb::BLACK,
            false,
            1.0,
        );
        let snapshot = doc.primitives().to_vec();
        assert_eq!(refine_edges(&mut doc), 0);
        assert_eq!(doc.primitives(), snapshot.as_slice());
    }
}
