//! Configuration management for `vecto.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── engine     # [engine]
//! │   ├── palette    # [palette]
//! │   ├── smoothing  # [smoothing]
//! │   └── strategy   # [strategy]
//! ├── error          # ConfigError
//! └── mod.rs         # VectoConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section        | Purpose                                            |
//! |----------------|----------------------------------------------------|
//! | `[engine]`     | Tracing engine command, timeout, output handling   |
//! | `[palette]`    | Sampling, clustering and palette cache             |
//! | `[smoothing]`  | Contour smoothing intensities                      |
//! | `[refine]`     | Post-processing steps toggles                      |
//! | `[strategy]`   | Strategy selection thresholds                      |
//!
//! The file is optional: a missing default `vecto.toml` means defaults.
//! Unknown fields are reported as a warning and ignored.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{EngineConfig, PaletteConfig, SmoothingConfig, StrategyConfig};

use crate::log;
use crate::refine::RefineOptions;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "vecto.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing vecto.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectoConfig {
    /// Tracing engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Palette extraction settings
    #[serde(default)]
    pub palette: PaletteConfig,

    /// Contour smoothing intensities
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    /// Post-processing toggles
    #[serde(default)]
    pub refine: RefineOptions,

    /// Strategy selection settings
    #[serde(default)]
    pub strategy: StrategyConfig,
}

impl VectoConfig {
    /// Load the config file at `path`.
    ///
    /// A missing file yields defaults unless `required` is set (the user
    /// named the file explicitly).
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                bail!(ConfigError::Io(
                    path.to_path_buf(),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                ));
            }
            crate::debug!("config"; "{} not found, using defaults", path.display());
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let config = Self::from_path(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Reject values no conversion could run with.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if !(self.engine.timeout.is_finite() && self.engine.timeout > 0.0) {
            problems.push(format!("engine.timeout must be positive, got {}", self.engine.timeout));
        }
        if self.engine.enabled && self.engine.command.trim().is_empty() {
            problems.push("engine.command is empty".to_string());
        }
        if self.palette.sample_cap == 0 {
            problems.push("palette.sample_cap must be at least 1".to_string());
        }
        if self.palette.dominant_count == 0 {
            problems.push("palette.dominant_count must be at least 1".to_string());
        }
        for (field, value) in self.smoothing.intensities() {
            if !(0.0..=1.0).contains(&value) {
                problems.push(format!("smoothing.{field} must be within [0, 1], got {value}"));
            }
        }
        if !(self.strategy.fast_budget.is_finite() && self.strategy.fast_budget >= 0.0) {
            problems.push(format!(
                "strategy.fast_budget must be non-negative, got {}",
                self.strategy.fast_budget
            ));
        }

        if !problems.is_empty() {
            bail!(ConfigError::Validation(problems.join("; ")));
        }

        if self.engine.enabled && which::which(&self.engine.command).is_err() {
            crate::debug!(
                "config";
                "engine `{}` not found on PATH, conversions will use the basic fallback",
                self.engine.command
            );
        }
        Ok(())
    }
}

// ============================================================================
// test helpers
// ============================================================================

/// Parse config and panic on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> VectoConfig {
    let (parsed, ignored) = VectoConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
