//! `[strategy]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [strategy]
//! fast_budget = 0.5           # Seconds; below this, go straight to classical
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub fast_budget: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self { fast_budget: 0.5 }
    }
}
