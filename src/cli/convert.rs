//! Convert command implementation.
//!
//! Converts a batch of images in parallel through one shared [`Vectorizer`].
//! Each file succeeds or fails on its own; the command fails if any did.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::{ConvertArgs, plural_count};
use crate::config::VectoConfig;
use crate::core::PixelImage;
use crate::log;
use crate::logger::ProgressLine;
use crate::vectorizer::{ConversionOptions, ConversionResult, Vectorizer};

/// Where one converted SVG goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Summary entry printed by `--json`.
#[derive(Debug, Serialize)]
struct FileReport {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(flatten)]
    result: Option<ConversionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute convert command
pub fn run_convert(args: &ConvertArgs, config: &VectoConfig) -> Result<()> {
    let options = ConversionOptions {
        target_time: args.target_time,
        strategy: args.strategy,
        tracing_parameters: args.tracing_parameters()?,
        palette: args.palette.clone().map(|p| p.0),
        use_palette: args.use_palette,
    };

    // resolve every destination before doing any work
    let targets = resolve_targets(&args.inputs, args.output.as_deref())?;

    let count = args.inputs.len();
    log!("convert"; "converting {}", plural_count(count, "image"));

    let vectorizer = Vectorizer::new(config.clone());
    let progress = ProgressLine::new("convert", count);
    let stdout = Mutex::new(std::io::stdout());

    let reports: Vec<FileReport> = args
        .inputs
        .par_iter()
        .zip(targets.par_iter())
        .map(|(input, target)| {
            let outcome = convert_one(&vectorizer, input, target, &options, &stdout);
            progress.inc();
            report(input, target, outcome)
        })
        .collect();
    progress.finish();

    let failed = reports.iter().filter(|r| r.error.is_some()).count();

    if args.json {
        let json = serde_json::to_string_pretty(&reports)?;
        let mut out = stdout.lock();
        writeln!(out, "{json}")?;
    }

    if failed > 0 {
        bail!("{} of {} failed", plural_count(failed, "conversion"), count);
    }
    log!("convert"; "done, {} written", plural_count(count, "file"));
    Ok(())
}

fn convert_one(
    vectorizer: &Vectorizer,
    input: &Path,
    target: &OutputTarget,
    options: &ConversionOptions,
    stdout: &Mutex<std::io::Stdout>,
) -> Result<ConversionResult> {
    let image = PixelImage::open(input)?;
    let result = vectorizer.vectorize(&image, options)?;
    match target {
        OutputTarget::Stdout => {
            let mut out = stdout.lock();
            out.write_all(result.svg.as_bytes())?;
            writeln!(out)?;
        }
        OutputTarget::File(path) => result.save(path)?,
    }
    Ok(result)
}

fn report(input: &Path, target: &OutputTarget, outcome: Result<ConversionResult>) -> FileReport {
    let output = match target {
        OutputTarget::Stdout => None,
        OutputTarget::File(path) => Some(path.display().to_string()),
    };
    match outcome {
        Ok(result) => {
            log!(
                "convert";
                "{} -> {} ({}, {} elements, quality {:.3}, {:.2}s)",
                input.display(),
                output.as_deref().unwrap_or("stdout"),
                result.strategy_used,
                result.element_count(),
                result.quality_score,
                result.processing_time
            );
            FileReport {
                input: input.display().to_string(),
                output,
                result: Some(result),
                error: None,
            }
        }
        Err(e) => {
            log!("error"; "{}: {:#}", input.display(), e);
            FileReport {
                input: input.display().to_string(),
                output: None,
                result: None,
                error: Some(format!("{e:#}")),
            }
        }
    }
}

/// Destinations for every input, failing if two inputs would write the same file.
pub fn resolve_targets(inputs: &[PathBuf], output: Option<&Path>) -> Result<Vec<OutputTarget>> {
    let targets = inputs
        .iter()
        .map(|input| output_target(input, output, inputs.len()))
        .collect::<Result<Vec<_>>>()?;

    let mut claimed: FxHashMap<&Path, &Path> = FxHashMap::default();
    for (input, target) in inputs.iter().zip(&targets) {
        let OutputTarget::File(path) = target else {
            continue;
        };
        if let Some(first) = claimed.insert(path.as_path(), input.as_path()) {
            bail!(
                "{} and {} both write {}",
                first.display(),
                input.display(),
                path.display()
            );
        }
    }
    Ok(targets)
}

/// Resolve the destination for `input`.
///
/// - `-` writes to stdout (single input only)
/// - a path ending in `.svg` is the output file (single input only)
/// - any other path is a directory receiving `<stem>.svg`
/// - no output writes next to the input
pub fn output_target(input: &Path, output: Option<&Path>, inputs: usize) -> Result<OutputTarget> {
    let Some(output) = output else {
        return Ok(OutputTarget::File(input.with_extension("svg")));
    };
    if output == Path::new("-") {
        if inputs > 1 {
            bail!("`-o -` accepts a single input, got {inputs}");
        }
        return Ok(OutputTarget::Stdout);
    }
    let is_svg = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if is_svg {
        if inputs > 1 {
            bail!(
                "output {} is a file but {} were given",
                output.display(),
                plural_count(inputs, "input")
            );
        }
        return Ok(OutputTarget::File(output.to_path_buf()));
    }
    let stem = input
        .file_stem()
        .with_context(|| format!("input {} has no file name", input.display()))?;
    let mut name = stem.to_os_string();
    name.push(".svg");
    Ok(OutputTarget::File(output.join(name)))
}
