//! Configuration section definitions.
//!
//! Each module corresponds to a section in `vecto.toml`:
//!
//! | Module      | TOML Section   | Purpose                                  |
//! |-------------|----------------|------------------------------------------|
//! | `engine`    | `[engine]`     | External tracing engine invocation       |
//! | `palette`   | `[palette]`    | Palette extraction and memoization       |
//! | `smoothing` | `[smoothing]`  | Contour smoothing intensity per path     |
//! | `strategy`  | `[strategy]`   | Strategy selection thresholds            |
//!
//! `[refine]` deserializes straight into [`RefineOptions`](crate::refine::RefineOptions).

mod engine;
mod palette;
mod smoothing;
mod strategy;

pub use engine::EngineConfig;
pub use palette::PaletteConfig;
pub use smoothing::SmoothingConfig;
pub use strategy::StrategyConfig;
