//! Iterative neighbor-weighted vertex smoothing for closed rings.

use crate::core::Point;

/// Vertices closer than this to the canvas border are pinned.
const BORDER_SNAP: f64 = 0.5;

/// Smooth a closed ring in place over `passes` iterations.
///
/// Each pass first splits segments longer than `max_segment` at their
/// midpoint, then replaces every vertex by
/// `(1 - 2w) * p + w * prev + w * next`. Subdividing first keeps corners
/// from collapsing toward the centroid on sparse rings. Vertices lying on
/// the canvas border (`0..=width`, `0..=height`) do not move, so regions
/// that fill an edge of the image keep touching it.
pub fn smooth_closed(
    points: &[Point],
    passes: usize,
    weight: f64,
    max_segment: f64,
    canvas: (f64, f64),
) -> Vec<Point> {
    if passes == 0 || points.len() < 3 || weight <= 0.0 {
        return points.to_vec();
    }
    let w = weight.clamp(0.0, 0.45);
    let mut ring = points.to_vec();

    for _ in 0..passes {
        ring = subdivide(&ring, max_segment);
        let n = ring.len();
        let next: Vec<Point> = (0..n)
            .map(|i| {
                let p = ring[i];
                if on_border(p, canvas) {
                    return p;
                }
                let prev = ring[(i + n - 1) % n];
                let succ = ring[(i + 1) % n];
                p * (1.0 - 2.0 * w) + prev * w + succ * w
            })
            .collect();
        ring = next;
    }
    ring
}

/// Moving average over a window of `2 * half + 1` vertices (closed ring).
pub fn moving_average(points: &[Point], half: usize, canvas: (f64, f64)) -> Vec<Point> {
    let n = points.len();
    if half == 0 || n < 2 * half + 1 {
        return points.to_vec();
    }
    let span = (2 * half + 1) as f64;
    (0..n)
        .map(|i| {
            let p = points[i];
            if on_border(p, canvas) {
                return p;
            }
            let mut acc = Point::default();
            for k in 0..=2 * half {
                acc = acc + points[(i + n + k - half) % n];
            }
            acc * (1.0 / span)
        })
        .collect()
}

fn subdivide(ring: &[Point], max_segment: f64) -> Vec<Point> {
    if max_segment <= 0.0 {
        return ring.to_vec();
    }
    let n = ring.len();
    let limit_sq = max_segment * max_segment;
    let mut out = Vec::with_capacity(n * 2);
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        out.push(a);
        if a.distance_sq(b) > limit_sq {
            out.push((a + b) * 0.5);
        }
    }
    out
}

#[inline]
fn on_border(p: Point, (w, h): (f64, f64)) -> bool {
    p.x <= BORDER_SNAP || p.y <= BORDER_SNAP || p.x >= w - BORDER_SNAP || p.y >= h - BORDER_SNAP
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::polygon_area;

    fn square(lo: f64, hi: f64) -> Vec<Point> {
        vec![
            Point::new(lo, lo),
            Point::new(hi, lo),
            Point::new(hi, hi),
            Point::new(lo, hi),
        ]
    }

    #[test]
    fn test_canvas_square_is_pinned() {
        let ring = square(0.0, 100.0);
        let out = smooth_closed(&ring, 4, 0.3, 8.0, (100.0, 100.0));
        assert_eq!(polygon_area(&out), 10_000.0);
    }

    #[test]
    fn test_interior_square_rounds() {
        let ring = square(20.0, 80.0);
        let out = smooth_closed(&ring, 3, 0.25, 10.0, (100.0, 100.0));
        assert!(out.len() > ring.len());
        let area = polygon_area(&out);
        // corners cut, but the shape does not collapse
        assert!(area < 3600.0 && area > 2000.0, "area {area}");
    }

    #[test]
    fn test_zero_passes_identity() {
        let ring = square(10.0, 20.0);
        assert_eq!(smooth_closed(&ring, 0, 0.3, 5.0, (100.0, 100.0)), ring);
    }

    #[test]
    fn test_moving_average_reduces_zigzag() {
        let zigzag: Vec<Point> = (0..40)
            .map(|i| {
                let t = i as f64 / 40.0 * std::f64::consts::TAU;
                let r = if i % 2 == 0 { 30.0 } else { 26.0 };
                Point::new(50.0 + r * t.cos(), 50.0 + r * t.sin())
            })
            .collect();
        let smoothed = moving_average(&zigzag, 1, (100.0, 100.0));
        let spread = |pts: &[Point]| {
            let radii: Vec<f64> = pts.iter().map(|p| p.distance(Point::new(50.0, 50.0))).collect();
            radii.iter().cloned().fold(f64::MIN, f64::max) - radii.iter().cloned().fold(f64::MAX, f64::min)
        };
        assert!(spread(&smoothed) < spread(&zigzag));
        assert_eq!(smoothed.len(), zigzag.len());
    }
}
