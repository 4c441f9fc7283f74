//! SVG document model, serialization and scoring.
//!
//! # Module Structure
//!
//! ```text
//! svg/
//! ├── document.rs   # Primitive + SvgDocument builder, persist
//! ├── count.rs      # element counting on serialized SVG (quick-xml)
//! └── raster.rs     # scanline rasterizer, quality score
//! ```
//!
//! Colors are [`Rgb`](crate::core::Rgb) everywhere and serialize as
//! `#rrggbb`; there is no float color path.

mod count;
mod document;
pub mod raster;

pub use count::count_elements;
pub use document::{Primitive, SvgDocument};
pub(crate) use document::write_file;
pub use raster::quality_score;

/// Format a coordinate with at most `precision` decimals, trailing zeros trimmed.
pub(crate) fn fmt_num(value: f64, precision: usize) -> String {
    let mut s = format!("{value:.precision$}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" { "0".to_string() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(1.0, 2), "1");
        assert_eq!(fmt_num(1.25, 2), "1.25");
        assert_eq!(fmt_num(1.2, 2), "1.2");
        assert_eq!(fmt_num(-0.001, 2), "0");
        assert_eq!(fmt_num(100.0, 0), "100");
        assert_eq!(fmt_num(3.14159, 3), "3.142");
    }
}
