//! Strategy identifiers and the selection heuristic.

use crate::analysis::{ColorStats, ImageMetadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One complete path from image to SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Palette extraction, color layers and ultra-smoothed contours.
    PaletteGuided,
    /// External tracing engine plus refinement.
    HighFidelity,
    /// In-process contours at moderate smoothing. Cheapest.
    Classical,
}

impl Strategy {
    pub const ALL: [Self; 3] = [Self::PaletteGuided, Self::HighFidelity, Self::Classical];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PaletteGuided => "palette_guided",
            Self::HighFidelity => "high_fidelity",
            Self::Classical => "classical",
        }
    }

    /// Advisory cost in seconds per megapixel.
    pub fn cost_per_megapixel(self) -> f64 {
        match self {
            Self::PaletteGuided => 1.5,
            Self::HighFidelity => 1.0,
            Self::Classical => 0.3,
        }
    }

    pub fn estimate(self, megapixels: f64) -> f64 {
        self.cost_per_megapixel() * megapixels
    }

    /// Next cheaper strategy, if any.
    fn cheaper(self) -> Option<Self> {
        match self {
            Self::PaletteGuided => Some(Self::HighFidelity),
            Self::HighFidelity => Some(Self::Classical),
            Self::Classical => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "palette_guided" | "palette" => Ok(Self::PaletteGuided),
            "high_fidelity" | "trace" => Ok(Self::HighFidelity),
            "classical" | "contour" => Ok(Self::Classical),
            other => Err(format!(
                "unknown strategy `{other}` (expected palette_guided, high_fidelity or classical)"
            )),
        }
    }
}

/// Images with at most this many significant colors suit the palette path.
pub const PALETTE_MAX_COLORS: usize = 12;

/// Above this, flat palette layers would band visibly.
pub const PALETTE_MAX_GRADIENT: f64 = 0.5;

/// Pick a strategy from content and the remaining time budget.
///
/// Pure: the same inputs always give the same answer.
pub fn select_strategy(
    metadata: &ImageMetadata,
    stats: &ColorStats,
    remaining: f64,
    fast_budget: f64,
) -> Strategy {
    if stats.unique_colors <= 1 || remaining < fast_budget {
        return Strategy::Classical;
    }

    let mut strategy = if stats.significant_colors <= PALETTE_MAX_COLORS
        && metadata.gradient_probability < PALETTE_MAX_GRADIENT
    {
        Strategy::PaletteGuided
    } else {
        Strategy::HighFidelity
    };

    let megapixels = metadata.megapixels();
    while strategy.estimate(megapixels) > remaining {
        match strategy.cheaper() {
            Some(next) => strategy = next,
            None => break,
        }
    }
    strategy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(width: u32, height: u32, gradient: f64) -> ImageMetadata {
        ImageMetadata {
            width,
            height,
            edge_density: 0.1,
            text_probability: 0.1,
            geometric_probability: 0.5,
            gradient_probability: gradient,
        }
    }

    fn stats(unique: usize, significant: usize) -> ColorStats {
        ColorStats {
            unique_colors: unique,
            significant_colors: significant,
            brightness: 0.5,
            contrast: 0.3,
        }
    }

    #[test]
    fn test_parse_and_display() {
        for s in Strategy::ALL {
            assert_eq!(s.as_str().parse::<Strategy>().unwrap(), s);
            assert_eq!(s.to_string(), s.as_str());
        }
        assert_eq!("High-Fidelity".parse::<Strategy>().unwrap(), Strategy::HighFidelity);
        assert!("magic".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_uniform_image_is_classical() {
        let s = select_strategy(&metadata(100, 100, 0.0), &stats(1, 1), 30.0, 0.5);
        assert_eq!(s, Strategy::Classical);
    }

    #[test]
    fn test_few_colors_prefer_palette() {
        let s = select_strategy(&metadata(200, 200, 0.1), &stats(40, 4), 30.0, 0.5);
        assert_eq!(s, Strategy::PaletteGuided);
    }

    #[test]
    fn test_photo_prefers_tracing() {
        let s = select_strategy(&metadata(200, 200, 0.8), &stats(5000, 300), 30.0, 0.5);
        assert_eq!(s, Strategy::HighFidelity);
    }

    #[test]
    fn test_budget_downgrades() {
        // 4 MP: palette needs 6 s, tracing 4 s, classical 1.2 s
        let meta = metadata(2000, 2000, 0.1);
        let few = stats(40, 4);
        assert_eq!(select_strategy(&meta, &few, 10.0, 0.5), Strategy::PaletteGuided);
        assert_eq!(select_strategy(&meta, &few, 5.0, 0.5), Strategy::HighFidelity);
        assert_eq!(select_strategy(&meta, &few, 2.0, 0.5), Strategy::Classical);
        // nothing fits: still classical
        assert_eq!(select_strategy(&meta, &few, 0.6, 0.5), Strategy::Classical);
        // below the fast budget regardless of size
        let small = metadata(10, 10, 0.1);
        assert_eq!(select_strategy(&small, &few, 0.1, 0.5), Strategy::Classical);
    }
}
