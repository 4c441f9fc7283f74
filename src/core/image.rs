//! Immutable decoded pixel buffer.
//!
//! Input may have 3 or 4 channels; alpha is composited over white once at
//! construction so every later stage sees opaque RGB.

use crate::core::Rgb;
use crate::error::{Result, VectorizeError};
use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PixelImage {
    rgb: RgbImage,
}

impl PixelImage {
    /// Build from a raw interleaved buffer with 3 (RGB) or 4 (RGBA) channels.
    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(VectorizeError::invalid_image(format!(
                "buffer length {} does not match {width}x{height}x{channels}",
                data.len()
            )));
        }
        match channels {
            3 => {
                let rgb = RgbImage::from_raw(width, height, data)
                    .ok_or_else(|| VectorizeError::invalid_image("RGB buffer rejected"))?;
                Ok(Self { rgb })
            }
            4 => {
                let rgba = RgbaImage::from_raw(width, height, data)
                    .ok_or_else(|| VectorizeError::invalid_image("RGBA buffer rejected"))?;
                Ok(Self {
                    rgb: composite_over_white(&rgba),
                })
            }
            n => Err(VectorizeError::invalid_image(format!(
                "unsupported channel count {n}, expected 3 or 4"
            ))),
        }
    }

    /// Wrap an opaque RGB image.
    pub fn from_rgb(rgb: RgbImage) -> Result<Self> {
        check_dimensions(rgb.width(), rgb.height())?;
        Ok(Self { rgb })
    }

    /// Convert any decoded image, compositing alpha over white when present.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self> {
        check_dimensions(img.width(), img.height())?;
        let rgb = if img.color().has_alpha() {
            composite_over_white(&img.to_rgba8())
        } else {
            img.to_rgb8()
        };
        Ok(Self { rgb })
    }

    /// Decode an encoded image (PNG, JPEG, WebP) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| VectorizeError::invalid_image(e.to_string()))?;
        Self::from_dynamic(img)
    }

    /// Read and decode an image file.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| VectorizeError::io(path, e))?;
        Self::decode(&bytes).map_err(|e| match e {
            VectorizeError::InvalidImage(msg) => {
                VectorizeError::InvalidImage(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Image of a single color.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            rgb: RgbImage::from_pixel(width, height, image::Rgb(color.0)),
        })
    }

    /// Build pixel by pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Rgb) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            rgb: RgbImage::from_fn(width, height, |x, y| image::Rgb(f(x, y).0)),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Packed RGB bytes, row-major.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        self.rgb.as_raw()
    }

    pub fn as_rgb_image(&self) -> &RgbImage {
        &self.rgb
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        Rgb(self.rgb.get_pixel(x, y).0)
    }

    /// Color at a linear pixel index.
    #[inline]
    pub fn pixel_at(&self, index: usize) -> Rgb {
        let raw = self.as_raw();
        Rgb([raw[index * 3], raw[index * 3 + 1], raw[index * 3 + 2]])
    }

    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.as_raw().chunks_exact(3).map(|p| Rgb([p[0], p[1], p[2]]))
    }

    /// Grayscale luminance, one `f32` in `[0, 255]` per pixel.
    pub fn luma(&self) -> Vec<f32> {
        self.pixels().map(Rgb::luma).collect()
    }

    /// Copy of a sub-rectangle, clipped to the image bounds.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);
        check_dimensions(width, height)?;
        let view = image::imageops::crop_imm(&self.rgb, x, y, width, height);
        Ok(Self {
            rgb: view.to_image(),
        })
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(VectorizeError::invalid_image(format!(
            "zero-size image ({width}x{height})"
        )));
    }
    Ok(())
}

fn composite_over_white(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
