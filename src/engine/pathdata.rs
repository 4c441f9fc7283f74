//! SVG path data flattening.
//!
//! Turns a `d` attribute into polylines: straight commands map to
//! vertices, Bézier curves are sampled at [`CURVE_STEPS`] points and
//! elliptical arcs collapse to their endpoint chord.

use crate::core::Point;
use regex::Regex;
use std::sync::OnceLock;

/// Samples per curve segment.
pub const CURVE_STEPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Cmd(char),
    Num(f64),
}

fn tokenize(d: &str) -> Vec<Token> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"[MmLlHhVvCcSsQqTtAaZz]|[-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?").unwrap()
    });
    re.find_iter(d)
        .filter_map(|m| {
            let s = m.as_str();
            match s.chars().next() {
                Some(c) if c.is_ascii_alphabetic() && s.len() == 1 => Some(Token::Cmd(c)),
                _ => s.parse().ok().map(Token::Num),
            }
        })
        .collect()
}

struct Builder {
    subpaths: Vec<Vec<Point>>,
    current: Vec<Point>,
    pos: Point,
    start: Point,
    /// Reflection source for `S`/`T`.
    last_ctrl: Option<Point>,
}

impl Builder {
    fn new() -> Self {
        Self {
            subpaths: Vec::new(),
            current: Vec::new(),
            pos: Point::default(),
            start: Point::default(),
            last_ctrl: None,
        }
    }

    fn flush(&mut self) {
        if self.current.len() >= 2 {
            self.subpaths.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
    }

    fn move_to(&mut self, p: Point) {
        self.flush();
        self.current.push(p);
        self.pos = p;
        self.start = p;
    }

    fn line_to(&mut self, p: Point) {
        if self.current.is_empty() {
            self.current.push(self.pos);
        }
        self.current.push(p);
        self.pos = p;
    }

    fn cubic_to(&mut self, c1: Point, c2: Point, end: Point) {
        let p0 = self.pos;
        for i in 1..=CURVE_STEPS {
            let t = i as f64 / CURVE_STEPS as f64;
            let mt = 1.0 - t;
            let p = p0 * (mt * mt * mt)
                + c1 * (3.0 * mt * mt * t)
                + c2 * (3.0 * mt * t * t)
                + end * (t * t * t);
            self.line_to(p);
        }
        self.pos = end;
    }

    fn quad_to(&mut self, c: Point, end: Point) {
        let p0 = self.pos;
        for i in 1..=CURVE_STEPS {
            let t = i as f64 / CURVE_STEPS as f64;
            let mt = 1.0 - t;
            let p = p0 * (mt * mt) + c * (2.0 * mt * t) + end * (t * t);
            self.line_to(p);
        }
        self.pos = end;
    }

    fn close(&mut self) {
        self.flush();
        self.pos = self.start;
    }

    fn finish(mut self) -> Vec<Vec<Point>> {
        self.flush();
        self.subpaths
    }
}

/// Number of numeric arguments each command consumes per repetition.
fn arity(cmd: char) -> usize {
    match cmd.to_ascii_uppercase() {
        'M' | 'L' | 'T' => 2,
        'H' | 'V' => 1,
        'C' => 6,
        'S' | 'Q' => 4,
        'A' => 7,
        _ => 0,
    }
}

/// Flatten path data into subpaths (each with at least two points).
///
/// Malformed trailing data is ignored; whatever parsed before it is kept.
pub fn parse_path_data(d: &str) -> Vec<Vec<Point>> {
    let tokens = tokenize(d);
    let mut b = Builder::new();
    let mut i = 0;
    let mut cmd: Option<char> = None;

    while i < tokens.len() {
        let c = match tokens[i] {
            Token::Cmd(c) => {
                i += 1;
                c
            }
            // implicit repetition of the previous command
            Token::Num(_) => match cmd {
                Some(prev) => match prev {
                    'M' => 'L',
                    'm' => 'l',
                    other => other,
                },
                None => break,
            },
        };
        cmd = Some(c);

        if c == 'Z' || c == 'z' {
            b.close();
            b.last_ctrl = None;
            continue;
        }

        let n = arity(c);
        let args: Vec<f64> = tokens[i..]
            .iter()
            .take(n)
            .map_while(|t| match t {
                Token::Num(v) => Some(*v),
                Token::Cmd(_) => None,
            })
            .collect();
        if n == 0 || args.len() < n {
            break;
        }
        i += n;

        let rel = c.is_ascii_lowercase();
        let base = if rel { b.pos } else { Point::default() };
        let pt = |x: f64, y: f64| Point::new(base.x + x, base.y + y);

        match c.to_ascii_uppercase() {
            'M' => {
                b.move_to(pt(args[0], args[1]));
                b.last_ctrl = None;
            }
            'L' => {
                b.line_to(pt(args[0], args[1]));
                b.last_ctrl = None;
            }
            'H' => {
                let x = if rel { b.pos.x + args[0] } else { args[0] };
                b.line_to(Point::new(x, b.pos.y));
                b.last_ctrl = None;
            }
            'V' => {
                let y = if rel { b.pos.y + args[0] } else { args[0] };
                b.line_to(Point::new(b.pos.x, y));
                b.last_ctrl = None;
            }
            'C' => {
                let c2 = pt(args[2], args[3]);
                b.cubic_to(pt(args[0], args[1]), c2, pt(args[4], args[5]));
                b.last_ctrl = Some(c2);
            }
            'S' => {
                let c1 = reflect(b.last_ctrl, b.pos);
                let c2 = pt(args[0], args[1]);
                b.cubic_to(c1, c2, pt(args[2], args[3]));
                b.last_ctrl = Some(c2);
            }
            'Q' => {
                let ctrl = pt(args[0], args[1]);
                b.quad_to(ctrl, pt(args[2], args[3]));
                b.last_ctrl = Some(ctrl);
            }
            'T' => {
                let ctrl = reflect(b.last_ctrl, b.pos);
                b.quad_to(ctrl, pt(args[0], args[1]));
                b.last_ctrl = Some(ctrl);
            }
            'A' => {
                b.line_to(pt(args[5], args[6]));
                b.last_ctrl = None;
            }
            _ => break,
        }
    }
    b.finish()
}

fn reflect(ctrl: Option<Point>, about: Point) -> Point {
    match ctrl {
        Some(c) => about * 2.0 - c,
        None => about,
    }
}

/// Parse `translate(x, y)` / `translate(x y)` / `translate(x)`.
///
/// Other transform functions are not supported and yield `None`.
pub fn parse_translate(transform: &str) -> Option<Point> {
    let inner = transform
        .trim()
        .strip_prefix("translate(")?
        .strip_suffix(')')?;
    let mut parts = inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>);
    let x = parts.next()?.ok()?;
    let y = match parts.next() {
        Some(v) => v.ok()?,
        None => 0.0,
    };
    Some(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_numbers_and_commands() {
        // the pattern must build with only the std/perf regex features
        assert_eq!(tokenize("M0 0"), vec![Token::Cmd('M'), Token::Num(0.0), Token::Num(0.0)]);
        assert_eq!(
            tokenize("l-1.5.25e1 3E-1z"),
            vec![
                Token::Cmd('l'),
                Token::Num(-1.5),
                Token::Num(2.5),
                Token::Num(0.3),
                Token::Cmd('z'),
            ]
        );
    }

    #[test]
    fn test_absolute_polygon() {
        let paths = parse_path_data("M0 0 L10 0 L10 10 Z");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0], vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]);
    }

    #[test]
    fn test_relative_and_implicit() {
        // implicit lineto after moveto, compact numbers
        let paths = parse_path_data("m1,1 4,0 0,4h-4v-4z");
        assert_eq!(
            paths[0],
            vec![
                Point::new(1.0, 1.0),
                Point::new(5.0, 1.0),
                Point::new(5.0, 5.0),
                Point::new(1.0, 5.0),
                Point::new(1.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_multiple_subpaths() {
        let paths = parse_path_data("M0 0 L4 0 L4 4 Z M10 10 L12 10 L12 12 Z");
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1][0], Point::new(10.0, 10.0));
    }

    #[test]
    fn test_cubic_flattened() {
        let paths = parse_path_data("M0 0 C0 10 10 10 10 0");
        assert_eq!(paths[0].len(), 1 + CURVE_STEPS);
        let last = *paths[0].last().unwrap();
        assert!((last.x - 10.0).abs() < 1e-9 && last.y.abs() < 1e-9);
        // the curve bulges toward +y
        assert!(paths[0].iter().any(|p| p.y > 5.0));
    }

    #[test]
    fn test_smooth_curves_reflect() {
        let paths = parse_path_data("M0 0 Q5 10 10 0 T20 0");
        let pts = &paths[0];
        assert_eq!(pts.len(), 1 + 2 * CURVE_STEPS);
        // second half mirrors below the axis
        assert!(pts[CURVE_STEPS + CURVE_STEPS / 2].y < 0.0);
    }

    #[test]
    fn test_arc_chord_and_exponents() {
        let paths = parse_path_data("M0 0 A5 5 0 0 1 1e1 0");
        assert_eq!(paths[0], vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    }

    #[test]
    fn test_garbage_tolerated() {
        assert!(parse_path_data("").is_empty());
        assert!(parse_path_data("L").is_empty());
        let paths = parse_path_data("M0 0 L5 5 L");
        assert_eq!(paths[0].len(), 2);
    }

    #[test]
    fn test_parse_translate() {
        assert_eq!(parse_translate("translate(3,4)"), Some(Point::new(3.0, 4.0)));
        assert_eq!(parse_translate(" translate(3 -4.5) "), Some(Point::new(3.0, -4.5)));
        assert_eq!(parse_translate("translate(7)"), Some(Point::new(7.0, 0.0)));
        assert_eq!(parse_translate("scale(2)"), None);
    }
}
