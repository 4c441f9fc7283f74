//! Contour extraction by pixel-edge boundary tracing.
//!
//! Every set pixel contributes a directed unit segment for each side that
//! faces an unset neighbor. Segments run with the interior on their right
//! (clockwise on screen), so chaining them gives closed loops whose signed
//! area is positive for outer boundaries and negative for holes. Vertices
//! sit on pixel corners: a full `w x h` mask traces to the rectangle
//! `(0,0)-(w,h)`.

use crate::core::{BBox, Mask, Point, polygon_area, signed_area};
use rustc_hash::FxHashMap;

type Vertex = (i32, i32);

#[derive(Clone, Copy)]
struct Segment {
    from: Vertex,
    to: Vertex,
}

impl Segment {
    #[inline]
    fn dir(&self) -> (i32, i32) {
        (self.to.0 - self.from.0, self.to.1 - self.from.1)
    }
}

/// One region boundary: an outer ring and the holes cut out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub outer: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

/// Outer rings of area at least `min_area`, each with its holes of area
/// at least `min_area`.
///
/// A hole belongs to the smallest outer ring containing a pixel of the
/// region it bounds, so regions nested inside holes keep their own rings.
pub fn contours(mask: &Mask, min_area: f64) -> Vec<Contour> {
    let (outers, holes): (Vec<_>, Vec<_>) = all_loops(mask)
        .into_iter()
        .partition(|ring| signed_area(ring) > 0.0);

    let mut groups: Vec<(BBox, f64, Contour)> = outers
        .into_iter()
        .filter_map(|outer| {
            let bbox = BBox::from_points(&outer)?;
            let area = polygon_area(&outer);
            Some((bbox, area, Contour { outer, holes: Vec::new() }))
        })
        .collect();

    for hole in holes {
        if polygon_area(&hole) < min_area {
            continue;
        }
        let Some(inside) = region_pixel_center(&hole) else {
            continue;
        };
        let owner = groups
            .iter_mut()
            .filter(|(bbox, _, c)| bbox.contains(inside) && point_in_ring(inside, &c.outer))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((_, _, contour)) = owner {
            contour.holes.push(hole);
        }
    }

    groups
        .into_iter()
        .filter(|(_, area, _)| *area >= min_area)
        .map(|(_, _, contour)| contour)
        .collect()
}

/// Outer boundaries of all regions with area at least `min_area`.
///
/// Holes are dropped; use [`contours`] to keep them.
pub fn external_contours(mask: &Mask, min_area: f64) -> Vec<Vec<Point>> {
    all_loops(mask)
        .into_iter()
        .filter(|ring| {
            let area = signed_area(ring);
            area > 0.0 && area >= min_area
        })
        .collect()
}

/// Every boundary loop (outer and holes), collinear runs collapsed.
pub fn all_loops(mask: &Mask) -> Vec<Vec<Point>> {
    let segments = boundary_segments(mask);
    let mut outgoing: FxHashMap<Vertex, Vec<usize>> = FxHashMap::default();
    for (i, s) in segments.iter().enumerate() {
        outgoing.entry(s.from).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut loops = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        let mut vertices: Vec<Vertex> = Vec::new();
        let mut current = start;
        // Each segment is visited once, so this bounds the walk
        for _ in 0..segments.len() {
            used[current] = true;
            vertices.push(segments[current].from);
            match next_segment(&segments, &outgoing, &used, current) {
                Some(next) => current = next,
                None => break,
            }
        }
        let ring = collapse_collinear(&vertices);
        if ring.len() >= 3 {
            loops.push(ring);
        }
    }
    loops
}

fn boundary_segments(mask: &Mask) -> Vec<Segment> {
    let mut segments = Vec::new();
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if !mask.get(x, y) {
                continue;
            }
            let (xi, yi) = (x as i64, y as i64);
            let (x0, y0) = (x as i32, y as i32);
            let (x1, y1) = (x0 + 1, y0 + 1);
            if !mask.get_signed(xi, yi - 1) {
                segments.push(Segment { from: (x0, y0), to: (x1, y0) });
            }
            if !mask.get_signed(xi + 1, yi) {
                segments.push(Segment { from: (x1, y0), to: (x1, y1) });
            }
            if !mask.get_signed(xi, yi + 1) {
                segments.push(Segment { from: (x1, y1), to: (x0, y1) });
            }
            if !mask.get_signed(xi - 1, yi) {
                segments.push(Segment { from: (x0, y1), to: (x0, y0) });
            }
        }
    }
    segments
}

/// Successor of `current` under the right-turn-first rule.
///
/// The rule ignores usage, so it is a bijection on segments and every loop
/// is a cycle of it: reaching a used segment means the loop is closed. At
/// pinch vertices (regions touching diagonally) turning right keeps the
/// diagonal neighbors in separate loops.
fn next_segment(
    segments: &[Segment],
    outgoing: &FxHashMap<Vertex, Vec<usize>>,
    used: &[bool],
    current: usize,
) -> Option<usize> {
    let seg = segments[current];
    let (dx, dy) = seg.dir();
    let candidates = outgoing.get(&seg.to)?;
    let right = (-dy, dx);
    let straight = (dx, dy);
    let left = (dy, -dx);
    let next = [right, straight, left]
        .into_iter()
        .find_map(|want| candidates.iter().copied().find(|&i| segments[i].dir() == want))?;
    (!used[next]).then_some(next)
}

/// Center of the set pixel right of the ring's first unit step.
///
/// Loops run with the region on their right, and after collapsing the
/// first two vertices still span a straight run of boundary segments.
fn region_pixel_center(ring: &[Point]) -> Option<Point> {
    let (a, b) = (*ring.first()?, *ring.get(1)?);
    let dx = (b.x - a.x).signum();
    let dy = (b.y - a.y).signum();
    Some(Point::new(a.x + 0.5 * dx - 0.5 * dy, a.y + 0.5 * dy + 0.5 * dx))
}

/// Even-odd ray crossing test.
fn point_in_ring(p: Point, ring: &[Point]) -> bool {
    let n = ring.len();
    let mut inside = false;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + n - 1) % n];
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Keep only the vertices where the direction changes.
fn collapse_collinear(vertices: &[Vertex]) -> Vec<Point> {
    let n = vertices.len();
    if n < 3 {
        return vertices
            .iter()
            .map(|&(x, y)| Point::new(f64::from(x), f64::from(y)))
            .collect();
    }
    let mut out = Vec::with_capacity(n / 2);
    for i in 0..n {
        let prev = vertices[(i + n - 1) % n];
        let cur = vertices[i];
        let next = vertices[(i + 1) % n];
        let d1 = (cur.0 - prev.0, cur.1 - prev.1);
        let d2 = (next.0 - cur.0, next.1 - cur.1);
        // unit steps: collinear iff the directions match
        if d1 != d2 {
            out.push(Point::new(f64::from(cur.0), f64::from(cur.1)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::polygon_area;

    fn parse(rows: &[&str]) -> Mask {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        Mask::from_fn(w, h, |x, y| rows[y as usize].as_bytes()[x as usize] == b'#')
    }

    #[test]
    fn test_full_mask_is_canvas_rectangle() {
        let loops = external_contours(&Mask::full(100, 100), 0.0);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
        assert_eq!(polygon_area(&loops[0]), 10_000.0);
        assert!(loops[0].contains(&Point::new(100.0, 100.0)));
    }

    #[test]
    fn test_hole_is_not_external() {
        let m = parse(&["#####", "#...#", "#...#", "#####"]);
        let all = all_loops(&m);
        assert_eq!(all.len(), 2);
        let external = external_contours(&m, 0.0);
        assert_eq!(external.len(), 1);
        assert_eq!(polygon_area(&external[0]), 20.0);
    }

    #[test]
    fn test_frame_keeps_its_hole() {
        let m = parse(&["#####", "#...#", "#...#", "#####"]);
        let groups = contours(&m, 0.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(polygon_area(&groups[0].outer), 20.0);
        assert_eq!(groups[0].holes.len(), 1);
        assert_eq!(polygon_area(&groups[0].holes[0]), 6.0);
    }

    #[test]
    fn test_nested_region_owns_its_hole() {
        // a frame with an island that has its own hole
        let m = parse(&[
            "#########",
            "#.......#",
            "#.#####.#",
            "#.#...#.#",
            "#.#####.#",
            "#.......#",
            "#########",
        ]);
        let mut groups = contours(&m, 0.0);
        assert_eq!(groups.len(), 2);
        groups.sort_by(|a, b| polygon_area(&b.outer).total_cmp(&polygon_area(&a.outer)));
        assert_eq!(polygon_area(&groups[0].outer), 63.0);
        assert_eq!(polygon_area(&groups[0].holes[0]), 35.0);
        assert_eq!(polygon_area(&groups[1].outer), 15.0);
        assert_eq!(polygon_area(&groups[1].holes[0]), 3.0);
        assert!(groups.iter().all(|g| g.holes.len() == 1));
    }

    #[test]
    fn test_small_holes_dropped() {
        let m = parse(&["###", "#.#", "###"]);
        assert_eq!(contours(&m, 0.0)[0].holes.len(), 1);
        assert!(contours(&m, 2.0)[0].holes.is_empty());
    }

    #[test]
    fn test_diagonal_pixels_split() {
        let m = parse(&["#.", ".#"]);
        let external = external_contours(&m, 0.0);
        assert_eq!(external.len(), 2);
        for ring in &external {
            assert_eq!(polygon_area(ring), 1.0);
        }
    }

    #[test]
    fn test_min_area_filter() {
        let m = parse(&["##....", "##....", "......", ".....#"]);
        assert_eq!(external_contours(&m, 0.0).len(), 2);
        assert_eq!(external_contours(&m, 2.0).len(), 1);
    }

    #[test]
    fn test_l_shape_vertices() {
        let m = parse(&["#..", "#..", "###"]);
        let external = external_contours(&m, 0.0);
        assert_eq!(external.len(), 1);
        assert_eq!(external[0].len(), 6);
        assert_eq!(polygon_area(&external[0]), 5.0);
    }
}
