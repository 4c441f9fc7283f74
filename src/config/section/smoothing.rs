//! `[smoothing]` section configuration.
//!
//! Intensities in `[0, 1]` fed to the contour pipeline.
//!
//! # Example
//!
//! ```toml
//! [smoothing]
//! palette_intensity = 1.0     # Palette-guided layers
//! layer_intensity = 0.5       # Classical contour path
//! fallback_intensity = 0.25   # Basic fallback when the engine fails
//! ```

use crate::contour::{MODERATE, ULTRA};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub palette_intensity: f64,
    pub layer_intensity: f64,
    pub fallback_intensity: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            palette_intensity: ULTRA,
            layer_intensity: MODERATE,
            fallback_intensity: 0.25,
        }
    }
}

impl SmoothingConfig {
    /// `(field, value)` pairs, for validation.
    pub(crate) fn intensities(&self) -> [(&'static str, f64); 3] {
        [
            ("palette_intensity", self.palette_intensity),
            ("layer_intensity", self.layer_intensity),
            ("fallback_intensity", self.fallback_intensity),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_smoothing_config() {
        let config = test_parse_config("[smoothing]\nlayer_intensity = 0.75");
        assert_eq!(config.smoothing.layer_intensity, 0.75);
        assert_eq!(config.smoothing.palette_intensity, 1.0);
        assert_eq!(config.smoothing.fallback_intensity, 0.25);
    }
}
