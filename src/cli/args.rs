//! Command-line interface definitions.

use crate::params::TracingParameters;
use crate::vectorizer::{DEFAULT_TARGET_TIME, Strategy};
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// vecto adaptive raster-to-vector converter CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: vecto.toml, optional)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Convert raster images to SVG
    #[command(visible_alias = "c")]
    Convert {
        #[command(flatten)]
        args: ConvertArgs,
    },

    /// Print content metrics and color statistics as JSON
    #[command(visible_alias = "a")]
    Analyze {
        /// Image to analyze
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print suggested palettes as hex colors
    #[command(visible_alias = "p")]
    Palette {
        /// Image to extract palettes from
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,

        /// Palette sizes to cluster (default: all supported sizes)
        #[arg(short, long, value_delimiter = ',')]
        sizes: Vec<usize>,

        /// Print JSON instead of one palette per line
        #[arg(short, long)]
        json: bool,
    },
}

/// Convert command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Images to convert (PNG, JPEG, WebP)
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    pub inputs: Vec<PathBuf>,

    /// Output file (single input), directory, or `-` for stdout.
    /// Defaults to the input path with an `.svg` extension.
    #[arg(short, long, value_hint = clap::ValueHint::AnyPath)]
    pub output: Option<PathBuf>,

    /// Force a strategy: palette_guided, high_fidelity or classical
    #[arg(short, long)]
    pub strategy: Option<Strategy>,

    /// Advisory time budget per image, in seconds
    #[arg(short, long, default_value_t = DEFAULT_TARGET_TIME)]
    pub target_time: f64,

    /// Caller palette as comma-separated hex colors ("#ff0000,#00f")
    #[arg(long, value_parser = parse_palette)]
    pub palette: Option<PaletteArg>,

    /// Require palette-guided conversions to use --palette
    #[arg(long)]
    pub use_palette: bool,

    /// Tracing parameters file (TOML, or JSON by `.json` extension)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub params: Option<PathBuf>,

    /// Print a JSON summary of every conversion to stdout
    #[arg(short, long)]
    pub json: bool,
}

/// Parsed `--palette` value.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteArg(pub Vec<crate::core::Rgb>);

fn parse_palette(value: &str) -> Result<PaletteArg, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| crate::core::Rgb::from_hex(s).ok_or_else(|| format!("invalid hex color `{s}`")))
        .collect::<Result<Vec<_>, _>>()
        .map(PaletteArg)
}

impl ConvertArgs {
    /// Load `--params`, if given.
    pub fn tracing_parameters(&self) -> anyhow::Result<Option<TracingParameters>> {
        use anyhow::Context;

        let Some(path) = &self.params else {
            return Ok(None);
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameters file {}", path.display()))?;
        let json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let params = TracingParameters::from_file_contents(&contents, json)
            .with_context(|| format!("Invalid parameters file {}", path.display()))?;
        Ok(Some(params))
    }
}
