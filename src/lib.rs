//! vecto - adaptive raster-to-vector conversion.
//!
//! ```text
//! PixelImage ─► analysis ─► Strategy ─┬─► palette ─► layers ─► contour ──┐
//!                                     ├─► params ─► engine ─► refine ────┼─► svg ─► ConversionResult
//!                                     └─► layers ─► contour ─────────────┘
//! ```
//!
//! The entry point is [`Vectorizer::vectorize`]. Everything else is public
//! so the building blocks can be used on their own.

pub mod logger;

pub mod analysis;
pub mod cli;
pub mod config;
pub mod contour;
pub mod core;
pub mod engine;
pub mod error;
pub mod layers;
pub mod palette;
pub mod params;
pub mod refine;
pub mod svg;
pub mod vectorizer;

pub use crate::config::VectoConfig;
pub use crate::core::{PixelImage, Rgb};
pub use crate::error::{Result, VectorizeError};
pub use crate::vectorizer::{ConversionOptions, ConversionResult, Strategy, Vectorizer};
