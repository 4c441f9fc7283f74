//! Content-category scores.
//!
//! The formulas are heuristics. What callers rely on is their direction:
//! more edges raise `edge_density`, more straight edge runs raise the
//! geometric score, more gently varying luminance raises the gradient score.

use super::components::{Connectivity, label_components};
use super::edges::{EDGE_THRESHOLD, FLAT_THRESHOLD, Gradients};

/// Orientation tolerance for two edge pixels to continue the same straight run.
const STRAIGHT_TOLERANCE: f32 = 6.0 * std::f32::consts::PI / 180.0;
/// Distance along the tangent at which the run is sampled.
const TANGENT_STEP: f32 = 4.0;

/// Text-like components: glyph sized, not too elongated, partially filled.
const GLYPH_MIN_HEIGHT: u32 = 4;
const GLYPH_MAX_ASPECT: f64 = 2.5;
const GLYPH_MIN_ASPECT: f64 = 0.08;
const GLYPH_FILL_RANGE: (f64, f64) = (0.08, 0.9);
/// Number of glyph candidates at which the density term saturates.
const GLYPH_SATURATION: f64 = 12.0;

/// Fraction of pixels whose gradient magnitude reaches [`EDGE_THRESHOLD`].
pub fn edge_density(edges: &[bool]) -> f64 {
    if edges.is_empty() {
        return 0.0;
    }
    edges.iter().filter(|&&e| e).count() as f64 / edges.len() as f64
}

/// Score small, high-contrast edge components that look like glyphs.
pub fn text_probability(edges: &[bool], gradients: &Gradients) -> f64 {
    let (w, h) = (gradients.width, gradients.height);
    let labeling = label_components(edges, w, h, Connectivity::Eight);
    if labeling.components.is_empty() {
        return 0.0;
    }

    let max_glyph_height = (h / 3).max(24);
    let max_glyph_area = ((w as usize * h as usize) / 20).max(64);

    // Sum of magnitudes per component for the contrast filter
    let mut strength = vec![0.0_f64; labeling.components.len()];
    for (i, &label) in labeling.labels.iter().enumerate() {
        if label != 0 {
            strength[label as usize - 1] += f64::from(gradients.magnitude[i]);
        }
    }

    let glyphs = labeling
        .components
        .iter()
        .zip(&strength)
        .filter(|(c, s)| {
            let mean = *s / c.pixel_count as f64;
            c.height() >= GLYPH_MIN_HEIGHT
                && c.height() <= max_glyph_height
                && (c.width() as usize * c.height() as usize) <= max_glyph_area
                && (GLYPH_MIN_ASPECT..=GLYPH_MAX_ASPECT).contains(&c.aspect())
                && (GLYPH_FILL_RANGE.0..=GLYPH_FILL_RANGE.1).contains(&c.fill_ratio())
                && mean >= f64::from(EDGE_THRESHOLD) * 1.5
        })
        .count();

    let ratio = glyphs as f64 / labeling.components.len() as f64;
    let density = (glyphs as f64 / GLYPH_SATURATION).min(1.0);
    (ratio * (0.4 + 0.6 * density)).clamp(0.0, 1.0)
}

/// Ratio of edge pixels that continue a straight run along the edge tangent.
pub fn geometric_probability(edges: &[bool], gradients: &Gradients) -> f64 {
    let w = gradients.width as isize;
    let h = gradients.height as isize;
    let mut straight = 0usize;
    let mut curved = 0usize;

    for (i, &is_edge) in edges.iter().enumerate() {
        if !is_edge {
            continue;
        }
        let mag = gradients.magnitude[i];
        if mag <= f32::EPSILON {
            continue;
        }
        // Tangent is perpendicular to the gradient
        let tx = (-gradients.gy[i] / mag * TANGENT_STEP).round() as isize;
        let ty = (gradients.gx[i] / mag * TANGENT_STEP).round() as isize;
        let x = i as isize % w;
        let y = i as isize / w;
        let theta = gradients.orientation(i);

        let mut continued = 0;
        let mut bent = 0;
        for (nx, ny) in [(x + tx, y + ty), (x - tx, y - ty)] {
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                continue;
            }
            let n = (ny * w + nx) as usize;
            if !edges[n] {
                continue;
            }
            if angle_between(theta, gradients.orientation(n)) <= STRAIGHT_TOLERANCE {
                continued += 1;
            } else {
                bent += 1;
            }
        }
        if continued == 0 && bent == 0 {
            continue;
        }
        if bent == 0 {
            straight += 1;
        } else {
            curved += 1;
        }
    }

    let total = straight + curved;
    if total == 0 {
        0.0
    } else {
        straight as f64 / total as f64
    }
}

/// Share of gently varying pixels among all non-trivial ones.
///
/// Flat pixels count a quarter so a uniform canvas scores 0 and a
/// smooth ramp scores close to 1.
pub fn gradient_probability(gradients: &Gradients) -> f64 {
    let gentle_max = EDGE_THRESHOLD / 2.0;
    let (mut flat, mut gentle, mut steep) = (0usize, 0usize, 0usize);
    for &m in &gradients.magnitude {
        if m < FLAT_THRESHOLD {
            flat += 1;
        } else if m < gentle_max {
            gentle += 1;
        } else {
            steep += 1;
        }
    }
    let denom = gentle as f64 + steep as f64 + 0.25 * flat as f64;
    if denom <= 0.0 {
        0.0
    } else {
        (gentle as f64 / denom).clamp(0.0, 1.0)
    }
}

/// Smallest angle between two undirected orientations in `[0, PI)`.
#[inline]
fn angle_between(a: f32, b: f32) -> f32 {
    let d = (a - b).abs();
    d.min(std::f32::consts::PI - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradients_of(w: u32, h: u32, f: impl Fn(u32, u32) -> f32) -> Gradients {
        let mut luma = Vec::with_capacity((w * h) as usize);
        for y in 0..h {
            for x in 0..w {
                luma.push(f(x, y));
            }
        }
        Gradients::compute(&luma, w, h)
    }

    #[test]
    fn test_edge_density_monotonic() {
        let one = gradients_of(40, 40, |x, _| if x < 20 { 0.0 } else { 255.0 });
        let many = gradients_of(40, 40, |x, _| if (x / 5) % 2 == 0 { 0.0 } else { 255.0 });
        assert!(edge_density(&many.edge_map()) > edge_density(&one.edge_map()));
        assert_eq!(edge_density(&[]), 0.0);
    }

    #[test]
    fn test_gradient_probability_prefers_ramps() {
        let flat = gradients_of(32, 32, |_, _| 100.0);
        let ramp = gradients_of(32, 32, |x, _| x as f32 * 3.0);
        let step = gradients_of(32, 32, |x, _| if x < 16 { 0.0 } else { 255.0 });
        assert_eq!(gradient_probability(&flat), 0.0);
        assert!(gradient_probability(&ramp) > 0.9);
        assert!(gradient_probability(&ramp) > gradient_probability(&step));
    }

    #[test]
    fn test_rectangle_is_more_geometric_than_circle() {
        let rect = gradients_of(64, 64, |x, y| {
            if (12..52).contains(&x) && (12..52).contains(&y) {
                0.0
            } else {
                255.0
            }
        });
        let circle = gradients_of(64, 64, |x, y| {
            let dx = x as f32 - 32.0;
            let dy = y as f32 - 32.0;
            if dx * dx + dy * dy < 20.0 * 20.0 { 0.0 } else { 255.0 }
        });
        let g_rect = geometric_probability(&rect.edge_map(), &rect);
        let g_circle = geometric_probability(&circle.edge_map(), &circle);
        assert!(g_rect > g_circle, "rect {g_rect} circle {g_circle}");
    }

    #[test]
    fn test_text_probability_for_glyph_row() {
        // Row of small dark "letters" on white
        let glyphs = gradients_of(120, 40, |x, y| {
            let in_row = (14..26).contains(&y);
            let in_glyph = (x % 12) >= 2 && (x % 12) < 8;
            if in_row && in_glyph { 0.0 } else { 255.0 }
        });
        let blank = gradients_of(120, 40, |_, _| 255.0);
        assert!(text_probability(&glyphs.edge_map(), &glyphs) > 0.3);
        assert_eq!(text_probability(&blank.edge_map(), &blank), 0.0);
    }

    #[test]
    fn test_angle_between_wraps() {
        let pi = std::f32::consts::PI;
        assert!(angle_between(0.01, pi - 0.01) < 0.03);
    }
}
