//! `vtracer` command-line engine.

use super::exec::{Cmd, TimedOut};
use super::{EngineError, TracingEngine};
use crate::core::PixelImage;
use crate::params::TracingParameters;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Runs the engine binary on a PNG written to a scratch directory.
#[derive(Debug, Clone)]
pub struct VtracerEngine {
    command: String,
    timeout: Duration,
    path_precision: u32,
}

impl VtracerEngine {
    pub fn new(command: impl Into<String>, timeout: Duration, path_precision: u32) -> Self {
        Self {
            command: command.into(),
            timeout,
            path_precision,
        }
    }

    fn resolve(&self) -> Result<PathBuf, EngineError> {
        which::which(&self.command).map_err(|_| EngineError::Unavailable(self.command.clone()))
    }
}

impl TracingEngine for VtracerEngine {
    fn name(&self) -> &str {
        &self.command
    }

    fn is_available(&self) -> bool {
        self.resolve().is_ok()
    }

    fn trace(&self, image: &PixelImage, params: &TracingParameters) -> Result<String, EngineError> {
        let binary = self.resolve()?;
        let scratch = tempfile::Builder::new()
            .prefix("vecto-")
            .tempdir()
            .map_err(|e| EngineError::Failed(format!("scratch directory: {e}")))?;
        let input = scratch.path().join("input.png");
        let output = scratch.path().join("output.svg");

        image
            .as_rgb_image()
            .save(&input)
            .map_err(|e| EngineError::Failed(format!("write input: {e}")))?;

        let run = Cmd::new(&binary)
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&output)
            .args(params.to_args(self.path_precision))
            .cwd(scratch.path())
            .timeout(self.timeout)
            .run();

        if let Err(err) = run {
            if err.downcast_ref::<TimedOut>().is_some() {
                return Err(EngineError::Timeout(self.timeout));
            }
            if err
                .downcast_ref::<std::io::Error>()
                .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
            {
                return Err(EngineError::Unavailable(self.command.clone()));
            }
            return Err(EngineError::Failed(format!("{err:#}")));
        }

        fs::read_to_string(&output)
            .map_err(|e| EngineError::Failed(format!("read output: {e}")))
    }
}
