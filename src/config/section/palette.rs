//! `[palette]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [palette]
//! sample_cap = 10000          # Pixels sampled for clustering
//! seed = 42                   # Sampling and k-means seed
//! max_iterations = 24
//! dominant_count = 8          # Size of the frequency-counted palette
//! cache = true                # Memoize palettes by image content hash
//! ```

use crate::palette::PaletteOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub sample_cap: usize,
    pub seed: u64,
    pub max_iterations: usize,
    pub dominant_count: usize,
    pub cache: bool,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let options = PaletteOptions::default();
        Self {
            sample_cap: options.sample_cap,
            seed: options.seed,
            max_iterations: options.max_iterations,
            dominant_count: options.dominant_count,
            cache: true,
        }
    }
}

impl PaletteConfig {
    pub fn options(&self) -> PaletteOptions {
        PaletteOptions {
            sample_cap: self.sample_cap,
            seed: self.seed,
            max_iterations: self.max_iterations,
            dominant_count: self.dominant_count,
        }
    }
}
