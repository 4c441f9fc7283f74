//! vecto - adaptive raster-to-vector converter.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use std::path::Path;
use vecto::cli::{self, Cli, Commands};
use vecto::config::{CONFIG_FILE, VectoConfig};
use vecto::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    // An explicit --config must exist; the default file is optional
    let config = match &cli.config {
        Some(path) => VectoConfig::load(path, true)?,
        None => VectoConfig::load(Path::new(CONFIG_FILE), false)?,
    };

    match &cli.command {
        Commands::Convert { args } => cli::convert::run_convert(args, &config),
        Commands::Analyze { input, pretty } => {
            cli::analyze::run_analyze(input, *pretty, config.strategy.fast_budget)
        }
        Commands::Palette { input, sizes, json } => {
            cli::palette::run_palette(input, sizes, *json, &config)
        }
    }
}
