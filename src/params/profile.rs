//! Content profiles and their fixed parameter bundles.

use super::{ColorMode, Hierarchy, PathMode, TracingParameters};
use crate::analysis::{ColorStats, ImageMetadata};
use serde::{Deserialize, Serialize};

/// At most this many significant colors reads as a logo or flat artwork.
pub const LOGO_MAX_COLORS: usize = 16;

/// Edge density at or above which an image reads as text or line art.
pub const TEXT_MIN_EDGE_DENSITY: f64 = 0.12;

/// Normalized luma deviation below which the image counts as low contrast.
const LOW_CONTRAST: f64 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Few flat colors: tight corners, high precision.
    Logo,
    /// Dense edges: fine speckle filter, short segments.
    Text,
    /// Everything else: loose thresholds, fewer iterations.
    Simple,
}

impl Profile {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Text => "text",
            Self::Simple => "simple",
        }
    }

    /// Classify by significant color count first, then edge density.
    pub fn classify(stats: &ColorStats, metadata: &ImageMetadata) -> Self {
        if stats.significant_colors <= LOGO_MAX_COLORS {
            Self::Logo
        } else if metadata.edge_density >= TEXT_MIN_EDGE_DENSITY {
            Self::Text
        } else {
            Self::Simple
        }
    }

    pub fn bundle(self) -> TracingParameters {
        let (filter_speckle, color_precision, layer_difference, corner_threshold) = match self {
            Self::Logo => (4, 8, 16, 45),
            Self::Text => (2, 7, 24, 50),
            Self::Simple => (6, 5, 32, 90),
        };
        let (length_threshold, max_iterations, splice_threshold) = match self {
            Self::Logo => (4.0, 10, 45),
            Self::Text => (3.5, 10, 30),
            Self::Simple => (6.0, 6, 60),
        };
        TracingParameters {
            filter_speckle,
            color_precision,
            layer_difference,
            corner_threshold,
            length_threshold,
            max_iterations,
            splice_threshold,
            mode: PathMode::Spline,
            hierarchical: Hierarchy::Stacked,
            colormode: ColorMode::Color,
        }
    }
}

/// Heuristic parameters for an image without caller overrides.
///
/// Low-contrast images get finer layer separation and one more bit of
/// color precision, otherwise neighboring tones merge into one layer.
pub fn derive(stats: &ColorStats, metadata: &ImageMetadata) -> (TracingParameters, Profile) {
    let profile = Profile::classify(stats, metadata);
    let mut params = profile.bundle();
    if stats.contrast < LOW_CONTRAST {
        params.layer_difference = (params.layer_difference / 2).max(8);
        params.color_precision = (params.color_precision + 1).min(8);
    }
    crate::debug!(
        "params";
        "profile={} colors={} edges={:.3} contrast={:.3}",
        profile.as_str(),
        stats.significant_colors,
        metadata.edge_density,
        stats.contrast
    );
    (params, profile)
}
