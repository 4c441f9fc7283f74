//! Palette command: print suggested palettes for one image.

use std::io::Write;
use std::path::Path;

use anyhow::{Result, bail};
use serde_json::{Map, Value as JsonValue};

use crate::config::VectoConfig;
use crate::core::PixelImage;
use crate::palette::{PALETTE_SIZES, PaletteExtractor, PaletteSet};

/// Extract palettes for `sizes` (all supported sizes when empty).
pub fn suggest_palettes(input: &Path, sizes: &[usize], config: &VectoConfig) -> Result<PaletteSet> {
    if let Some(bad) = sizes.iter().find(|&&k| k == 0) {
        bail!("palette size must be at least 1, got {bad}");
    }
    let sizes = if sizes.is_empty() { &PALETTE_SIZES[..] } else { sizes };
    let image = PixelImage::open(input)?;
    let extractor = PaletteExtractor::new(config.palette.options());
    Ok(extractor.extract(&image, sizes))
}

/// Execute palette command
pub fn run_palette(input: &Path, sizes: &[usize], json: bool, config: &VectoConfig) -> Result<()> {
    let set = suggest_palettes(input, sizes, config)?;
    let mut out = std::io::stdout().lock();

    if json {
        let map: Map<String, JsonValue> = set
            .iter()
            .map(|(label, palette)| {
                let colors = palette.iter().map(|c| JsonValue::String(c.to_hex())).collect();
                (label.to_string(), JsonValue::Array(colors))
            })
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&map)?)?;
        return Ok(());
    }

    for (label, palette) in &set {
        let colors: Vec<String> = palette.iter().map(|c| c.to_hex()).collect();
        writeln!(out, "{label:>8}: {}", colors.join(" "))?;
    }
    Ok(())
}
