//! Engine SVG to primitive model.
//!
//! Supports the subset tracing engines emit: `path`, `rect`, `circle`,
//! `ellipse` and `polygon`, filled via a `fill` attribute or a `style`
//! declaration, optionally offset by `translate(...)` on the element or an
//! enclosing group. Unpaintable elements (gradient fills, `fill="none"`
//! without stroke) are skipped.

use super::pathdata::{parse_path_data, parse_translate};
use crate::core::{Point, Rgb};
use crate::svg::{Primitive, SvgDocument};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use rustc_hash::FxHashMap;

/// Vertices used to approximate an ellipse.
const ELLIPSE_SEGMENTS: usize = 32;

/// Parse engine output into a document of the given canvas size.
pub fn parse_svg(svg: &str, width: u32, height: u32) -> Result<SvgDocument, quick_xml::Error> {
    let mut reader = Reader::from_str(svg);
    let mut document = SvgDocument::new(width, height);
    // offset of each open group; the element's own translate stacks on top
    let mut offsets: Vec<Point> = vec![Point::default()];

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let attrs = attributes(&e);
                let offset = current(&offsets) + own_offset(&attrs);
                if let Some(primitive) = element(e.local_name().as_ref(), &attrs, offset) {
                    document.push(primitive);
                }
                offsets.push(offset);
            }
            Event::Empty(e) => {
                let attrs = attributes(&e);
                let offset = current(&offsets) + own_offset(&attrs);
                if let Some(primitive) = element(e.local_name().as_ref(), &attrs, offset) {
                    document.push(primitive);
                }
            }
            Event::End(_) => {
                if offsets.len() > 1 {
                    offsets.pop();
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(document)
}

type Attrs = FxHashMap<String, String>;

fn attributes(e: &BytesStart<'_>) -> Attrs {
    e.attributes()
        .filter_map(Result::ok)
        .map(|a| {
            (
                String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned(),
                String::from_utf8_lossy(&a.value).into_owned(),
            )
        })
        .collect()
}

fn current(offsets: &[Point]) -> Point {
    offsets.last().copied().unwrap_or_default()
}

fn own_offset(attrs: &Attrs) -> Point {
    attrs
        .get("transform")
        .and_then(|t| parse_translate(t))
        .unwrap_or_default()
}

fn number(attrs: &Attrs, key: &str) -> Option<f64> {
    attrs.get(key)?.trim().trim_end_matches("px").parse().ok()
}

/// `style="fill:#abc; stroke:none"` lookup.
fn style_value<'a>(attrs: &'a Attrs, key: &str) -> Option<&'a str> {
    attrs.get("style")?.split(';').find_map(|decl| {
        let (k, v) = decl.split_once(':')?;
        (k.trim() == key).then(|| v.trim())
    })
}

fn paint<'a>(attrs: &'a Attrs, key: &str) -> Option<&'a str> {
    style_value(attrs, key).or_else(|| attrs.get(key).map(String::as_str))
}

enum Paint {
    Fill(Rgb),
    Stroke(Rgb, f64),
}

fn resolve_paint(attrs: &Attrs) -> Option<Paint> {
    match paint(attrs, "fill") {
        // SVG default fill is black
        None => Some(Paint::Fill(Rgb::BLACK)),
        Some(value) if value.trim() != "none" => Rgb::parse_paint(value).map(Paint::Fill),
        Some(_) => {
            let stroke = Rgb::parse_paint(paint(attrs, "stroke")?)?;
            let width = paint(attrs, "stroke-width")
                .and_then(|w| w.trim().trim_end_matches("px").parse().ok())
                .unwrap_or(1.0);
            Some(Paint::Stroke(stroke, width))
        }
    }
}

fn element(name: &[u8], attrs: &Attrs, offset: Point) -> Option<Primitive> {
    let shift = |rings: Vec<Vec<Point>>| -> Vec<Vec<Point>> {
        rings
            .into_iter()
            .map(|ring| ring.into_iter().map(|p| p + offset).collect())
            .collect()
    };

    let geometry = match name {
        b"path" => Geometry::Rings(shift(parse_path_data(attrs.get("d")?))),
        b"polygon" | b"polyline" => Geometry::Rings(shift(vec![polygon_points(attrs.get("points")?)])),
        b"rect" => Geometry::Rect {
            x: number(attrs, "x").unwrap_or(0.0) + offset.x,
            y: number(attrs, "y").unwrap_or(0.0) + offset.y,
            width: number(attrs, "width")?,
            height: number(attrs, "height")?,
        },
        b"circle" => Geometry::Circle {
            center: Point::new(
                number(attrs, "cx").unwrap_or(0.0),
                number(attrs, "cy").unwrap_or(0.0),
            ) + offset,
            radius: number(attrs, "r")?,
        },
        b"ellipse" => {
            let center = Point::new(
                number(attrs, "cx").unwrap_or(0.0),
                number(attrs, "cy").unwrap_or(0.0),
            ) + offset;
            let (rx, ry) = (number(attrs, "rx")?, number(attrs, "ry")?);
            if (rx - ry).abs() <= 0.01 * rx.max(ry) {
                Geometry::Circle { center, radius: rx }
            } else {
                Geometry::Rings(vec![ellipse_ring(center, rx, ry)])
            }
        }
        _ => return None,
    };

    let paint = resolve_paint(attrs)?;
    let primitive = match (geometry, paint) {
        (Geometry::Rings(rings), paint) => {
            let subpaths: Vec<Vec<Point>> = rings.into_iter().filter(|r| r.len() >= 2).collect();
            if subpaths.is_empty() {
                return None;
            }
            match paint {
                Paint::Fill(color) => Primitive::Path {
                    subpaths,
                    color,
                    filled: true,
                    stroke_width: 0.0,
                },
                Paint::Stroke(color, stroke_width) => Primitive::Path {
                    subpaths,
                    color,
                    filled: false,
                    stroke_width,
                },
            }
        }
        (Geometry::Rect { x, y, width, height }, Paint::Fill(color)) => {
            if width <= 0.0 || height <= 0.0 {
                return None;
            }
            Primitive::Rect {
                x,
                y,
                width,
                height,
                color,
            }
        }
        (Geometry::Circle { center, radius }, Paint::Fill(color)) => {
            if radius <= 0.0 {
                return None;
            }
            Primitive::Circle {
                center,
                radius,
                color,
            }
        }
        // stroked rect/circle: keep the outline as a path
        (Geometry::Rect { x, y, width, height }, Paint::Stroke(color, stroke_width)) => {
            Primitive::Path {
                subpaths: vec![vec![
                    Point::new(x, y),
                    Point::new(x + width, y),
                    Point::new(x + width, y + height),
                    Point::new(x, y + height),
                    Point::new(x, y),
                ]],
                color,
                filled: false,
                stroke_width,
            }
        }
        (Geometry::Circle { center, radius }, Paint::Stroke(color, stroke_width)) => {
            let mut ring = ellipse_ring(center, radius, radius);
            ring.push(ring[0]);
            Primitive::Path {
                subpaths: vec![ring],
                color,
                filled: false,
                stroke_width,
            }
        }
    };
    Some(primitive)
}

enum Geometry {
    Rings(Vec<Vec<Point>>),
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Circle { center: Point, radius: f64 },
}

fn polygon_points(points: &str) -> Vec<Point> {
    let values: Vec<f64> = points
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    values
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

fn ellipse_ring(center: Point, rx: f64, ry: f64) -> Vec<Point> {
    (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            let t = i as f64 / ELLIPSE_SEGMENTS as f64 * std::f64::consts::TAU;
            Point::new(center.x + rx * t.cos(), center.y + ry * t.sin())
        })
        .collect()
}
