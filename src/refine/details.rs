//! Small-detail preservation via Harris corners.

use crate::analysis::Gradients;
use crate::core::{PixelImage, Point};
use crate::svg::SvgDocument;

/// Harris sensitivity constant.
const HARRIS_K: f32 = 0.04;

/// Responses below this fraction of the strongest one are ignored.
const RELATIVE_RESPONSE: f32 = 0.05;

/// Absolute floor so flat noise never qualifies.
const MIN_RESPONSE: f32 = 1.0e8;

/// Accepted corners are at least this far apart.
const MIN_SEPARATION: f64 = 4.0;

/// Corners closer than this to an existing vertex are already represented.
pub const DETAIL_DISTANCE: f64 = 3.0;

pub const MARKER_RADIUS: f64 = 1.0;

pub const MAX_CORNERS: usize = 256;

/// Corner locations (pixel centers), strongest first.
pub fn detect_corners(gradients: &Gradients) -> Vec<Point> {
    let w = gradients.width as usize;
    let h = gradients.height as usize;
    if w < 3 || h < 3 {
        return Vec::new();
    }

    // structure tensor summed over a 3x3 window
    let mut response = vec![0.0_f32; w * h];
    let mut strongest = 0.0_f32;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let (mut sxx, mut syy, mut sxy) = (0.0_f32, 0.0_f32, 0.0_f32);
            for dy in 0..3 {
                for dx in 0..3 {
                    let i = (y + dy - 1) * w + (x + dx - 1);
                    let (gx, gy) = (gradients.gx[i], gradients.gy[i]);
                    sxx += gx * gx;
                    syy += gy * gy;
                    sxy += gx * gy;
                }
            }
            let trace = sxx + syy;
            let r = sxx * syy - sxy * sxy - HARRIS_K * trace * trace;
            response[y * w + x] = r;
            strongest = strongest.max(r);
        }
    }

    let threshold = (strongest * RELATIVE_RESPONSE).max(MIN_RESPONSE);
    let mut candidates: Vec<(f32, usize)> = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let r = response[y * w + x];
            if r < threshold {
                continue;
            }
            // local maximum (plateaus allowed, separation resolves them)
            let is_peak = (0..3).all(|dy| {
                (0..3).all(|dx| response[(y + dy - 1) * w + (x + dx - 1)] <= r)
            });
            if is_peak {
                candidates.push((r, y * w + x));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut corners: Vec<Point> = Vec::new();
    let min_sq = MIN_SEPARATION * MIN_SEPARATION;
    for (_, i) in candidates {
        let p = Point::new((i % w) as f64 + 0.5, (i / w) as f64 + 0.5);
        if corners.iter().all(|c| c.distance_sq(p) >= min_sq) {
            corners.push(p);
            if corners.len() == MAX_CORNERS {
                break;
            }
        }
    }
    corners
}

/// Add a marker for every corner no existing vertex is near.
///
/// Markers take the source color under the corner. Returns the number added.
pub fn preserve_details(
    document: &mut SvgDocument,
    image: &PixelImage,
    gradients: &Gradients,
) -> usize {
    let corners = detect_corners(gradients);
    if corners.is_empty() {
        return 0;
    }
    let existing: Vec<Point> = document
        .primitives()
        .iter()
        .flat_map(|p| p.points())
        .collect();

    let limit_sq = DETAIL_DISTANCE * DETAIL_DISTANCE;
    let mut added = 0;
    for corner in corners {
        if existing.iter().any(|p| p.distance_sq(corner) <= limit_sq) {
            continue;
        }
        let color = image.pixel(corner.x as u32, corner.y as u32);
        document.add_circle(corner, MARKER_RADIUS, color);
        added += 1;
    }
    added
}
