//! Command-line interface module.

pub mod analyze;
mod args;
pub mod convert;
pub mod palette;

pub use args::{Cli, Commands, ConvertArgs, PaletteArg};

/// Format count with noun, handling pluralization
///
/// - `plural_count(1, "file")` -> `"1 file"`
/// - `plural_count(5, "file")` -> `"5 files"`
pub(crate) fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
