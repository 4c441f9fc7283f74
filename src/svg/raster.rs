//! Minimal rasterizer for scoring documents against their source image.
//!
//! Painting is nearest-pixel with no anti-aliasing: a pixel is covered
//! when its center is inside the primitive. Paths fill with the even-odd
//! rule; stroked paths are stamped along their segments.

use super::{Primitive, SvgDocument};
use crate::core::{PixelImage, Point, Rgb};
use image::imageops::{self, FilterType};

/// Longest side of the scoring raster.
pub const SCORE_SIZE: u32 = 128;

/// RGB canvas painted over white.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![255; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Rgb([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    #[inline]
    fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.data[i..i + 3].copy_from_slice(&color.0);
    }

    /// Paint one primitive, coordinates multiplied by `scale`.
    pub fn paint(&mut self, primitive: &Primitive, scale: f64) {
        match primitive {
            Primitive::Path {
                subpaths,
                color,
                filled: true,
                ..
            } => {
                let rings: Vec<Vec<Point>> = subpaths
                    .iter()
                    .map(|ring| ring.iter().map(|&p| p * scale).collect())
                    .collect();
                self.fill_even_odd(&rings, *color);
            }
            Primitive::Path {
                subpaths,
                color,
                filled: false,
                stroke_width,
            } => {
                let radius = (stroke_width * scale * 0.5).max(0.5);
                for ring in subpaths {
                    for pair in ring.windows(2) {
                        self.stroke_segment(pair[0] * scale, pair[1] * scale, radius, *color);
                    }
                }
            }
            Primitive::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                let (x0, y0) = (x * scale, y * scale);
                let (x1, y1) = ((x + width) * scale, (y + height) * scale);
                for py in first_center(y0)..first_center(y1) {
                    for px in first_center(x0)..first_center(x1) {
                        self.put(px, py, *color);
                    }
                }
            }
            Primitive::Circle {
                center,
                radius,
                color,
            } => self.fill_disc(*center * scale, radius * scale, *color),
        }
    }

    fn fill_even_odd(&mut self, rings: &[Vec<Point>], color: Rgb) {
        let Some((min_y, max_y)) = rings
            .iter()
            .flatten()
            .fold(None, |acc: Option<(f64, f64)>, p| match acc {
                Some((lo, hi)) => Some((lo.min(p.y), hi.max(p.y))),
                None => Some((p.y, p.y)),
            })
        else {
            return;
        };

        let mut crossings: Vec<f64> = Vec::new();
        let y_start = first_center(min_y).max(0);
        let y_end = first_center(max_y).min(i64::from(self.height));
        for py in y_start..y_end {
            let sy = py as f64 + 0.5;
            crossings.clear();
            for ring in rings {
                let n = ring.len();
                if n < 3 {
                    continue;
                }
                for i in 0..n {
                    let a = ring[i];
                    let b = ring[(i + 1) % n];
                    // half-open rule so shared vertices count once
                    if (a.y <= sy) != (b.y <= sy) {
                        crossings.push(a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x));
                    }
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                for px in first_center(span[0])..first_center(span[1]) {
                    self.put(px, py, color);
                }
            }
        }
    }

    fn fill_disc(&mut self, center: Point, radius: f64, color: Rgb) {
        let r_sq = radius * radius;
        for py in first_center(center.y - radius)..first_center(center.y + radius) {
            for px in first_center(center.x - radius)..first_center(center.x + radius) {
                let d = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                if d.distance_sq(center) <= r_sq {
                    self.put(px, py, color);
                }
            }
        }
    }

    fn stroke_segment(&mut self, a: Point, b: Point, radius: f64, color: Rgb) {
        let steps = (a.distance(b) / 0.5).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.fill_disc(a + (b - a) * t, radius, color);
        }
        if radius <= 0.5 {
            // thin strokes: make sure the endpoints land somewhere
            self.put(a.x.floor() as i64, a.y.floor() as i64, color);
            self.put(b.x.floor() as i64, b.y.floor() as i64, color);
        }
    }
}

/// Index of the first pixel whose center is at or after `v`.
#[inline]
fn first_center(v: f64) -> i64 {
    (v - 0.5).ceil() as i64
}

/// Paint the document at `scale` onto a fresh white canvas.
pub fn rasterize(document: &SvgDocument, scale: f64) -> Canvas {
    let width = ((f64::from(document.width()) * scale).round() as u32).max(1);
    let height = ((f64::from(document.height()) * scale).round() as u32).max(1);
    let mut canvas = Canvas::new(width, height);
    for primitive in document.primitives() {
        canvas.paint(primitive, scale);
    }
    canvas
}

/// Fidelity of `document` to `source` in `[0, 1]`.
///
/// Both sides are compared at a reduced size (longest side at most
/// [`SCORE_SIZE`]): `1 - mean absolute channel error / 255`.
pub fn quality_score(document: &SvgDocument, source: &PixelImage) -> f64 {
    let longest = source.width().max(source.height());
    let scale = (f64::from(SCORE_SIZE) / f64::from(longest)).min(1.0);
    let canvas = rasterize(document, scale);

    let reference = if scale < 1.0 {
        imageops::resize(
            source.as_rgb_image(),
            canvas.width(),
            canvas.height(),
            FilterType::Triangle,
        )
    } else if (canvas.width(), canvas.height()) == (source.width(), source.height()) {
        source.as_rgb_image().clone()
    } else {
        imageops::resize(
            source.as_rgb_image(),
            canvas.width(),
            canvas.height(),
            FilterType::Nearest,
        )
    };

    let total: u64 = reference
        .as_raw()
        .iter()
        .zip(canvas.as_raw())
        .map(|(&a, &b)| u64::from(a.abs_diff(b)))
        .sum();
    let samples = canvas.as_raw().len().max(1) as f64;
    (1.0 - total as f64 / samples / 255.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_rect_covers_canvas() {
        let mut doc = SvgDocument::new(10, 6);
        doc.add_rect(0.0, 0.0, 10.0, 6.0, Rgb::BLACK);
        let canvas = rasterize(&doc, 1.0);
        assert!(canvas.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_polygon_fill_area() {
        let mut doc = SvgDocument::new(20, 20);
        doc.add_path(
            vec![
                Point::new(5.0, 5.0),
                Point::new(15.0, 5.0),
                Point::new(15.0, 15.0),
                Point::new(5.0, 15.0),
            ],
            Rgb::BLACK,
            true,
            0.0,
        );
        let canvas = rasterize(&doc, 1.0);
        let black = canvas.as_raw().chunks_exact(3).filter(|p| p[0] == 0).count();
        assert_eq!(black, 100);
        assert_eq!(canvas.pixel(5, 5), Rgb::BLACK);
        assert_eq!(canvas.pixel(15, 15), Rgb::WHITE);
    }

    #[test]
    fn test_even_odd_hole() {
        let outer = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let inner = vec![
            Point::new(3.0, 3.0),
            Point::new(7.0, 3.0),
            Point::new(7.0, 7.0),
            Point::new(3.0, 7.0),
        ];
        let mut doc = SvgDocument::new(10, 10);
        doc.push(Primitive::Path {
            subpaths: vec![outer, inner],
            color: Rgb::BLACK,
            filled: true,
            stroke_width: 0.0,
        });
        let canvas = rasterize(&doc, 1.0);
        assert_eq!(canvas.pixel(5, 5), Rgb::WHITE);
        assert_eq!(canvas.pixel(1, 1), Rgb::BLACK);
    }

    #[test]
    fn test_paint_order() {
        let mut doc = SvgDocument::new(4, 4);
        doc.add_rect(0.0, 0.0, 4.0, 4.0, Rgb::BLACK);
        doc.add_circle(Point::new(2.0, 2.0), 1.0, Rgb::new(255, 0, 0));
        let canvas = rasterize(&doc, 1.0);
        assert_eq!(canvas.pixel(1, 1), Rgb::new(255, 0, 0));
        assert_eq!(canvas.pixel(0, 0), Rgb::BLACK);
    }

    #[test]
    fn test_quality_score_bounds() {
        let image = PixelImage::filled(200, 100, Rgb::new(10, 200, 30)).unwrap();
        let mut exact = SvgDocument::new(200, 100);
        exact.add_rect(0.0, 0.0, 200.0, 100.0, Rgb::new(10, 200, 30));
        assert!(quality_score(&exact, &image) > 0.99);

        let empty = SvgDocument::new(200, 100);
        let score = quality_score(&empty, &image);
        assert!(score > 0.0 && score < 1.0);

        let black = PixelImage::filled(8, 8, Rgb::BLACK).unwrap();
        assert_eq!(quality_score(&SvgDocument::new(8, 8), &black), 0.0);
    }
}
