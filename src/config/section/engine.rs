//! `[engine]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [engine]
//! command = "vtracer"         # Executable, looked up on PATH
//! timeout = 30.0              # Seconds before a run counts as failed
//! enabled = true              # false: always use the basic fallback
//! raw_output = false          # Pass engine SVG through, skip refinement
//! path_precision = 3          # Decimals in engine path data
//! min_elements = 1            # Fewer parsed primitives = degenerate
//! ```

use crate::engine::AdapterOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// External tracing engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub command: String,

    /// Wall-clock limit per engine run, in seconds.
    pub timeout: f64,

    pub enabled: bool,

    /// Return engine output unmodified instead of parsing and refining it.
    pub raw_output: bool,

    pub path_precision: u32,

    pub min_elements: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: "vtracer".to_string(),
            timeout: 30.0,
            enabled: true,
            raw_output: false,
            path_precision: 3,
            min_elements: 1,
        }
    }
}

impl EngineConfig {
    pub fn timeout_duration(&self) -> Duration {
        // NaN clamps to zero; inf and overflow saturate
        Duration::try_from_secs_f64(self.timeout.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            min_elements: self.min_elements,
            ..AdapterOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::time::Duration;

    #[test]
    fn test_engine_config() {
        let config = test_parse_config(
            "[engine]\ncommand = \"/opt/bin/vtracer\"\ntimeout = 2.5\nraw_output = true\nmin_elements = 3",
        );
        assert_eq!(config.engine.command, "/opt/bin/vtracer");
        assert_eq!(config.engine.timeout_duration(), Duration::from_millis(2500));
        assert!(config.engine.raw_output);
        assert!(config.engine.enabled);
        assert_eq!(config.engine.adapter_options().min_elements, 3);
        assert_eq!(config.engine.adapter_options().max_attempts, 2);
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.engine.command, "vtracer");
        assert_eq!(config.engine.timeout, 30.0);
        assert_eq!(config.engine.path_precision, 3);
        assert!(!config.engine.raw_output);
    }

    #[test]
    fn test_engine_timeout_out_of_range() {
        let config = test_parse_config("[engine]\ntimeout = inf");
        assert_eq!(config.engine.timeout_duration(), Duration::MAX);
        let config = test_parse_config("[engine]\ntimeout = 1e300");
        assert_eq!(config.engine.timeout_duration(), Duration::MAX);
        let config = test_parse_config("[engine]\ntimeout = -5.0");
        assert_eq!(config.engine.timeout_duration(), Duration::ZERO);
        let config = test_parse_config("[engine]\ntimeout = nan");
        assert_eq!(config.engine.timeout_duration(), Duration::ZERO);
    }
}
