//! Tracing parameters for the external engine.
//!
//! # Precedence
//!
//! ```text
//! explicit TracingParameters ──────────────────────────► used verbatim
//!            (none)
//!              └─► ColorStats + ImageMetadata ─► Profile ─► fixed bundle
//!                                                          └─► contrast tweak
//! ```
//!
//! Caller parameters are never merged with derived values: when present,
//! derivation does not run at all for that conversion.

mod profile;

pub use profile::{Profile, derive};

use crate::analysis::{ColorStats, ImageMetadata};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Curve fitting mode of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMode {
    #[default]
    Spline,
    Polygon,
    /// Pixel-exact staircase outlines.
    None,
}

/// Layering of traced clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hierarchy {
    #[default]
    Stacked,
    Cutout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Color,
    Binary,
}

impl PathMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spline => "spline",
            Self::Polygon => "polygon",
            Self::None => "none",
        }
    }
}

impl Hierarchy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stacked => "stacked",
            Self::Cutout => "cutout",
        }
    }
}

impl ColorMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Binary => "bw",
        }
    }
}

/// Engine parameter bundle.
///
/// Field names follow the engine's vocabulary so a parameter file can be
/// shared with the engine's own CLI documentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracingParameters {
    /// Discard patches smaller than `filter_speckle²` pixels.
    pub filter_speckle: u32,
    /// Significant bits per RGB channel, 1..=8.
    pub color_precision: u32,
    /// Color difference between gradient layers.
    pub layer_difference: u32,
    /// Minimum momentary angle (degrees) to count as a corner.
    pub corner_threshold: u32,
    /// Segment length for curve subdivision, 3.5..=10.
    pub length_threshold: f64,
    pub max_iterations: u32,
    /// Minimum angle displacement (degrees) to splice a spline.
    pub splice_threshold: u32,
    pub mode: PathMode,
    pub hierarchical: Hierarchy,
    pub colormode: ColorMode,
}

impl Default for TracingParameters {
    fn default() -> Self {
        Profile::Simple.bundle()
    }
}

impl TracingParameters {
    /// A safer bundle for a retry after the engine failed.
    ///
    /// Lowers color precision, doubles the speckle filter and falls back to
    /// polygon fitting, which the engine handles on inputs where spline
    /// fitting chokes.
    pub fn conservative(&self) -> Self {
        Self {
            filter_speckle: (self.filter_speckle.max(1) * 2).min(16),
            color_precision: self.color_precision.saturating_sub(2).max(1),
            layer_difference: (self.layer_difference + 16).min(255),
            corner_threshold: self.corner_threshold.max(60),
            length_threshold: self.length_threshold.max(6.0),
            max_iterations: self.max_iterations.min(6),
            splice_threshold: self.splice_threshold,
            mode: PathMode::Polygon,
            hierarchical: self.hierarchical,
            colormode: self.colormode,
        }
    }

    /// Command-line flags for the engine, values clamped to its accepted ranges.
    ///
    /// `max_iterations` has no CLI counterpart and is not passed.
    pub fn to_args(&self, path_precision: u32) -> Vec<String> {
        vec![
            "--colormode".into(),
            self.colormode.as_str().into(),
            "--hierarchical".into(),
            self.hierarchical.as_str().into(),
            "--mode".into(),
            self.mode.as_str().into(),
            "--filter_speckle".into(),
            self.filter_speckle.min(16).to_string(),
            "--color_precision".into(),
            self.color_precision.clamp(1, 8).to_string(),
            "--gradient_step".into(),
            self.layer_difference.min(255).to_string(),
            "--corner_threshold".into(),
            self.corner_threshold.min(180).to_string(),
            "--segment_length".into(),
            format!("{:.1}", self.length_threshold.clamp(3.5, 10.0)),
            "--splice_threshold".into(),
            self.splice_threshold.min(180).to_string(),
            "--path_precision".into(),
            path_precision.to_string(),
        ]
    }

    /// Parse a parameter file body: JSON when `json` is set, TOML otherwise.
    pub fn from_file_contents(contents: &str, json: bool) -> anyhow::Result<Self> {
        if json {
            Ok(serde_json::from_str(contents)?)
        } else {
            Ok(toml::from_str(contents)?)
        }
    }
}

/// Where the parameters of a conversion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "profile", rename_all = "snake_case")]
pub enum ParameterSource {
    Explicit,
    Derived(Profile),
}

impl fmt::Display for ParameterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Derived(profile) => write!(f, "derived:{}", profile.as_str()),
        }
    }
}

/// Pick the parameters for one conversion.
pub fn resolve(
    explicit: Option<&TracingParameters>,
    stats: &ColorStats,
    metadata: &ImageMetadata,
) -> (TracingParameters, ParameterSource) {
    match explicit {
        Some(params) => (*params, ParameterSource::Explicit),
        None => {
            let (params, profile) = derive(stats, metadata);
            (params, ParameterSource::Derived(profile))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(significant: usize, contrast: f64) -> ColorStats {
        ColorStats {
            unique_colors: significant * 3,
            significant_colors: significant,
            brightness: 0.5,
            contrast,
        }
    }

    fn metadata(edge_density: f64) -> ImageMetadata {
        ImageMetadata {
            width: 100,
            height: 100,
            edge_density,
            text_probability: 0.0,
            geometric_probability: 0.0,
            gradient_probability: 0.0,
        }
    }

    #[test]
    fn test_explicit_wins_outright() {
        let explicit = TracingParameters {
            filter_speckle: 13,
            color_precision: 1,
            layer_difference: 200,
            corner_threshold: 170,
            length_threshold: 9.5,
            max_iterations: 1,
            splice_threshold: 5,
            mode: PathMode::None,
            hierarchical: Hierarchy::Cutout,
            colormode: ColorMode::Binary,
        };
        let (params, source) = resolve(Some(&explicit), &stats(4, 0.5), &metadata(0.3));
        assert_eq!(params, explicit);
        assert_eq!(source, ParameterSource::Explicit);

        let (derived, source) = resolve(None, &stats(4, 0.5), &metadata(0.3));
        assert_ne!(derived, explicit);
        assert_eq!(source, ParameterSource::Derived(Profile::Logo));
    }

    #[test]
    fn test_conservative_is_coarser() {
        let base = Profile::Logo.bundle();
        let safe = base.conservative();
        assert!(safe.color_precision < base.color_precision);
        assert!(safe.filter_speckle > base.filter_speckle);
        assert!(safe.layer_difference > base.layer_difference);
        assert_eq!(safe.mode, PathMode::Polygon);
        // repeated application stays in range
        let floor = (0..10).fold(base, |p, _| p.conservative());
        assert_eq!(floor.color_precision, 1);
        assert!(floor.filter_speckle <= 16);
    }

    #[test]
    fn test_args_clamped() {
        let params = TracingParameters {
            color_precision: 12,
            length_threshold: 1.0,
            corner_threshold: 400,
            ..TracingParameters::default()
        };
        let args = params.to_args(3);
        let value = |flag: &str| {
            let i = args.iter().position(|a| a == flag).unwrap();
            args[i + 1].clone()
        };
        assert_eq!(value("--color_precision"), "8");
        assert_eq!(value("--segment_length"), "3.5");
        assert_eq!(value("--corner_threshold"), "180");
        assert_eq!(value("--path_precision"), "3");
        assert!(!args.iter().any(|a| a.contains("iterations")));
    }

    #[test]
    fn test_parameter_file_formats() {
        let toml = "filter_speckle = 9\nmode = \"polygon\"\n";
        let params = TracingParameters::from_file_contents(toml, false).unwrap();
        assert_eq!(params.filter_speckle, 9);
        assert_eq!(params.mode, PathMode::Polygon);
        // omitted fields keep defaults
        assert_eq!(params.color_precision, TracingParameters::default().color_precision);

        let json = r#"{"color_precision": 3, "colormode": "binary"}"#;
        let params = TracingParameters::from_file_contents(json, true).unwrap();
        assert_eq!(params.color_precision, 3);
        assert_eq!(params.colormode, ColorMode::Binary);

        assert!(TracingParameters::from_file_contents("bogus = 1", false).is_err());
    }

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&ParameterSource::Derived(Profile::Text)).unwrap();
        assert_eq!(json, r#"{"source":"derived","profile":"text"}"#);
        assert_eq!(ParameterSource::Explicit.to_string(), "explicit");
    }
}
