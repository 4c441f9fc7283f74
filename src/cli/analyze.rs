//! Analyze command: print what the analyzer sees in one image.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::analysis::{ColorStats, ImageMetadata, analyze};
use crate::core::PixelImage;
use crate::params::{ParameterSource, TracingParameters, resolve};
use crate::vectorizer::{Strategy, select_strategy};

#[derive(Debug, Serialize)]
pub struct AnalyzeReport {
    pub metadata: ImageMetadata,
    pub stats: ColorStats,
    /// Strategy auto-selection would pick with the given budget.
    pub strategy: Strategy,
    /// Parameters the high-fidelity path would derive.
    pub parameters: TracingParameters,
    pub parameter_source: ParameterSource,
}

/// Build the report for `input`.
pub fn analyze_file(input: &Path, target_time: f64, fast_budget: f64) -> Result<AnalyzeReport> {
    let image = PixelImage::open(input)?;
    let analysis = analyze(&image)?;
    let strategy = select_strategy(&analysis.metadata, &analysis.stats, target_time, fast_budget);
    let (parameters, parameter_source) = resolve(None, &analysis.stats, &analysis.metadata);
    Ok(AnalyzeReport {
        metadata: analysis.metadata,
        stats: analysis.stats,
        strategy,
        parameters,
        parameter_source,
    })
}

/// Execute analyze command
pub fn run_analyze(input: &Path, pretty: bool, fast_budget: f64) -> Result<()> {
    let report = analyze_file(input, crate::vectorizer::DEFAULT_TARGET_TIME, fast_budget)?;
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    let mut out = std::io::stdout().lock();
    writeln!(out, "{json}")?;
    Ok(())
}
