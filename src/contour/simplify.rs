//! Douglas-Peucker simplification of closed rings.

use crate::core::Point;

/// Simplify a closed ring with absolute tolerance `epsilon`.
///
/// The ring is split at its first vertex and the vertex farthest from it,
/// and each half is simplified as an open chain. Both anchors always
/// survive, which makes re-simplifying with the same tolerance stable.
pub fn simplify_closed(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 3 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let origin = points[0];
    let far = (1..n)
        .max_by(|&a, &b| {
            origin
                .distance_sq(points[a])
                .total_cmp(&origin.distance_sq(points[b]))
        })
        .unwrap_or(n / 2);

    let mut first: Vec<Point> = points[..=far].to_vec();
    let mut second: Vec<Point> = points[far..].to_vec();
    second.push(origin);

    first = simplify_open(&first, epsilon);
    second = simplify_open(&second, epsilon);

    // drop the duplicated anchors where the halves meet
    first.pop();
    second.pop();
    first.extend(second);
    first
}

/// Classic Douglas-Peucker on an open polyline, endpoints kept.
pub fn simplify_open(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }
    let eps_sq = epsilon * epsilon;
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let (a, b) = (points[lo], points[hi]);
        let mut worst = lo;
        let mut worst_d = -1.0;
        for (i, p) in points.iter().enumerate().take(hi).skip(lo + 1) {
            let d = p.segment_distance_sq(a, b);
            if d > worst_d {
                worst_d = d;
                worst = i;
            }
        }
        if worst_d > eps_sq {
            keep[worst] = true;
            stack.push((lo, worst));
            stack.push((worst, hi));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}
