//! Primitive accumulation and serialization.

use super::fmt_num;
use crate::core::{BBox, Point, Rgb, Shape};
use crate::error::{Result, VectorizeError};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Decimals written for coordinates.
const PRECISION: usize = 2;

/// One drawable element. Paths may carry several closed subpaths, which
/// are filled with the even-odd rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Path {
        subpaths: Vec<Vec<Point>>,
        color: Rgb,
        filled: bool,
        stroke_width: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgb,
    },
}

impl Primitive {
    pub fn color(&self) -> Rgb {
        match self {
            Self::Path { color, .. } | Self::Rect { color, .. } | Self::Circle { color, .. } => {
                *color
            }
        }
    }

    /// Axis-aligned bounds, `None` for a path without points.
    pub fn bbox(&self) -> Option<BBox> {
        match self {
            Self::Path { subpaths, .. } => {
                let points: Vec<Point> = subpaths.iter().flatten().copied().collect();
                BBox::from_points(&points)
            }
            Self::Rect {
                x,
                y,
                width,
                height,
                ..
            } => Some(BBox {
                min_x: *x,
                min_y: *y,
                max_x: x + width,
                max_y: y + height,
            }),
            Self::Circle { center, radius, .. } => Some(BBox {
                min_x: center.x - radius,
                min_y: center.y - radius,
                max_x: center.x + radius,
                max_y: center.y + radius,
            }),
        }
    }

    /// Every vertex of the primitive (rect corners, circle center).
    pub fn points(&self) -> Vec<Point> {
        match self {
            Self::Path { subpaths, .. } => subpaths.iter().flatten().copied().collect(),
            Self::Rect {
                x,
                y,
                width,
                height,
                ..
            } => vec![
                Point::new(*x, *y),
                Point::new(x + width, *y),
                Point::new(x + width, y + height),
                Point::new(*x, y + height),
            ],
            Self::Circle { center, .. } => vec![*center],
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Self::Path {
                subpaths,
                color,
                filled,
                stroke_width,
            } => {
                let d = path_data(subpaths, *filled);
                if *filled {
                    let rule = if subpaths.len() > 1 {
                        r#" fill-rule="evenodd""#
                    } else {
                        ""
                    };
                    let _ = writeln!(out, r#"<path d="{d}" fill="{color}"{rule}/>"#);
                } else {
                    let _ = writeln!(
                        out,
                        r#"<path d="{d}" fill="none" stroke="{color}" stroke-width="{}"/>"#,
                        fmt_num(*stroke_width, PRECISION)
                    );
                }
            }
            Self::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                let _ = writeln!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{color}"/>"#,
                    fmt_num(*x, PRECISION),
                    fmt_num(*y, PRECISION),
                    fmt_num(*width, PRECISION),
                    fmt_num(*height, PRECISION),
                );
            }
            Self::Circle {
                center,
                radius,
                color,
            } => {
                let _ = writeln!(
                    out,
                    r#"<circle cx="{}" cy="{}" r="{}" fill="{color}"/>"#,
                    fmt_num(center.x, PRECISION),
                    fmt_num(center.y, PRECISION),
                    fmt_num(*radius, PRECISION),
                );
            }
        }
    }
}

fn path_data(subpaths: &[Vec<Point>], closed: bool) -> String {
    let mut d = String::new();
    for points in subpaths.iter().filter(|p| !p.is_empty()) {
        if !d.is_empty() {
            d.push(' ');
        }
        for (i, p) in points.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                d.push(' ');
            }
            let _ = write!(
                d,
                "{cmd}{} {}",
                fmt_num(p.x, PRECISION),
                fmt_num(p.y, PRECISION)
            );
        }
        if closed {
            d.push_str(" Z");
        }
    }
    d
}

/// Ordered primitives for one canvas. Insertion order is paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    width: u32,
    height: u32,
    primitives: Vec<Primitive>,
}

impl SvgDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Append a single polygon or polyline. Fewer than two points is a no-op.
    pub fn add_path(&mut self, points: Vec<Point>, color: Rgb, filled: bool, stroke_width: f64) {
        if points.len() < 2 {
            return;
        }
        self.primitives.push(Primitive::Path {
            subpaths: vec![points],
            color,
            filled,
            stroke_width,
        });
    }

    /// Append a filled shape. Holes become extra even-odd subpaths.
    pub fn add_shape(&mut self, shape: Shape) {
        let Shape {
            points,
            holes,
            color,
        } = shape;
        if points.len() < 2 {
            return;
        }
        let mut subpaths = vec![points];
        subpaths.extend(holes.into_iter().filter(|h| h.len() >= 3));
        self.primitives.push(Primitive::Path {
            subpaths,
            color,
            filled: true,
            stroke_width: 0.0,
        });
    }

    pub fn add_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        self.primitives.push(Primitive::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    pub fn add_circle(&mut self, center: Point, radius: f64, color: Rgb) {
        self.primitives.push(Primitive::Circle {
            center,
            radius,
            color,
        });
    }

    /// Append an already-built primitive (parsed engine output).
    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn primitives_mut(&mut self) -> &mut Vec<Primitive> {
        &mut self.primitives
    }

    pub fn element_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn to_svg_string(&self) -> String {
        let mut out = String::with_capacity(128 + self.primitives.len() * 96);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        for primitive in &self.primitives {
            primitive.write_to(&mut out);
        }
        out.push_str("</svg>\n");
        out
    }

    /// Write the serialized document, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_file(path, &self.to_svg_string())
    }
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| VectorizeError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| VectorizeError::io(path, e))
}
