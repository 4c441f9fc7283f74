//! Shared data model: pixels, colors, geometry and binary masks.
//!
//! ```text
//! core/
//! ├── color   # Rgb (the only color representation, 0-255 per channel)
//! ├── image   # PixelImage (immutable, alpha composited over white)
//! ├── geom    # Point, Shape, polygon measures
//! ├── mask    # Mask (boolean H x W)
//! └── rng     # seeded Lcg for reproducible sampling
//! ```

mod color;
mod geom;
mod image;
mod mask;
mod rng;

pub use color::Rgb;
pub use geom::{BBox, Point, Shape, polygon_area, polygon_perimeter, signed_area};
pub use image::PixelImage;
pub use mask::Mask;
pub use rng::Lcg;
