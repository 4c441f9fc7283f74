//! External tracing engine adapter.
//!
//! # State machine
//!
//! ```text
//! NotInvoked ──► Invoking(params) ──┬─► Succeeded(output)
//!                                   ├─► Unavailable ─────────────► basic fallback
//!                                   └─► Failed | Timeout | Degenerate
//!                                         │ first attempt
//!                                         └─► Invoking(conservative) ──┬─► Succeeded
//!                                                                      └─► Failed ─► basic fallback
//! ```
//!
//! Engine errors never escape the facade; they end up as a fallback
//! reason in the result metadata.

pub mod bounds;
pub mod exec;
mod fallback;
pub mod parse;
pub mod pathdata;
mod vtracer;

pub use fallback::{FALLBACK_COLORS, basic_fallback};
pub use vtracer::VtracerEngine;

use crate::core::PixelImage;
use crate::params::TracingParameters;
use crate::svg::SvgDocument;
use std::time::Duration;
use thiserror::Error;

/// Engine-side failures, all recoverable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Engine missing or disabled.
    #[error("tracing engine `{0}` is not available")]
    Unavailable(String),

    #[error("tracing engine failed: {0}")]
    Failed(String),

    #[error("tracing engine timed out after {0:?}")]
    Timeout(Duration),

    /// The engine reported success but the document is (nearly) empty.
    #[error("tracing engine produced degenerate output: {0}")]
    Degenerate(String),
}

impl EngineError {
    /// Whether a retry with conservative parameters makes sense.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }

    /// Short identifier for metadata and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Failed(_) => "failed",
            Self::Timeout(_) => "timeout",
            Self::Degenerate(_) => "degenerate",
        }
    }
}

/// An independent component that turns a raster into SVG text.
///
/// Implementations must be shareable across threads: one engine serves
/// every conversion of a [`Vectorizer`](crate::vectorizer::Vectorizer),
/// and parameters always arrive per call.
pub trait TracingEngine: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    fn trace(&self, image: &PixelImage, params: &TracingParameters) -> Result<String, EngineError>;
}

/// Engine stand-in that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEngine;

impl TracingEngine for NoEngine {
    fn name(&self) -> &str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn trace(&self, _: &PixelImage, _: &TracingParameters) -> Result<String, EngineError> {
        Err(EngineError::Unavailable(self.name().to_string()))
    }
}

/// Successful engine output.
#[derive(Debug, Clone)]
pub struct TraceOutput {
    /// Engine SVG text as returned.
    pub raw: String,
    /// The same output in the primitive model.
    pub document: SvgDocument,
    /// Parameters of the attempt that succeeded.
    pub params: TracingParameters,
    pub attempts: u32,
}

/// Adapter states.
#[derive(Debug, Clone)]
pub enum TraceState {
    NotInvoked,
    Invoking {
        params: TracingParameters,
        attempt: u32,
    },
    Succeeded(Box<TraceOutput>),
    Unavailable(EngineError),
    Failed {
        reason: EngineError,
        attempts: u32,
    },
}

impl TraceState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded(_) | Self::Unavailable(_) | Self::Failed { .. }
        )
    }
}

/// Output acceptance rules.
#[derive(Debug, Clone, Copy)]
pub struct AdapterOptions {
    /// Fewer parsed primitives than this counts as degenerate.
    pub min_elements: usize,
    /// Total attempts including the conservative retry.
    pub max_attempts: u32,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            min_elements: 1,
            max_attempts: 2,
        }
    }
}

/// Drives one engine through the state machine for one image.
pub struct EngineAdapter<'a> {
    engine: &'a dyn TracingEngine,
    options: AdapterOptions,
}

impl<'a> EngineAdapter<'a> {
    pub fn new(engine: &'a dyn TracingEngine, options: AdapterOptions) -> Self {
        Self { engine, options }
    }

    /// Run to a terminal state.
    pub fn run(&self, image: &PixelImage, params: &TracingParameters) -> TraceState {
        let mut state = TraceState::NotInvoked;
        while !state.is_terminal() {
            state = self.step(state, image, params);
        }
        state
    }

    /// One transition.
    pub fn step(
        &self,
        state: TraceState,
        image: &PixelImage,
        params: &TracingParameters,
    ) -> TraceState {
        match state {
            TraceState::NotInvoked => {
                if !self.engine.is_available() {
                    return TraceState::Unavailable(EngineError::Unavailable(
                        self.engine.name().to_string(),
                    ));
                }
                TraceState::Invoking {
                    params: *params,
                    attempt: 1,
                }
            }
            TraceState::Invoking { params, attempt } => {
                crate::debug!("engine"; "{} attempt {} ({:?})", self.engine.name(), attempt, params.mode);
                match self.invoke(image, &params) {
                    Ok((raw, document)) => TraceState::Succeeded(Box::new(TraceOutput {
                        raw,
                        document,
                        params,
                        attempts: attempt,
                    })),
                    Err(err @ EngineError::Unavailable(_)) => TraceState::Unavailable(err),
                    Err(err) if attempt < self.options.max_attempts && err.is_retryable() => {
                        crate::debug!("engine"; "{}, retrying with conservative parameters", err);
                        TraceState::Invoking {
                            params: params.conservative(),
                            attempt: attempt + 1,
                        }
                    }
                    Err(reason) => TraceState::Failed {
                        reason,
                        attempts: attempt,
                    },
                }
            }
            terminal => terminal,
        }
    }

    /// Call the engine and validate what comes back.
    fn invoke(
        &self,
        image: &PixelImage,
        params: &TracingParameters,
    ) -> Result<(String, SvgDocument), EngineError> {
        let raw = self.engine.trace(image, params)?;
        if raw.trim().is_empty() {
            return Err(EngineError::Degenerate("empty output".into()));
        }

        let inspection = bounds::inspect(&raw)
            .map_err(|e| EngineError::Failed(format!("unparseable output: {e}")))?;
        if inspection.is_degenerate(image.width(), image.height()) {
            return Err(EngineError::Degenerate(format!(
                "{} visible nodes",
                inspection.nodes
            )));
        }

        let document = parse::parse_svg(&raw, image.width(), image.height())
            .map_err(|e| EngineError::Failed(format!("malformed output: {e}")))?;
        if document.element_count() < self.options.min_elements.max(1) {
            return Err(EngineError::Degenerate(format!(
                "{} primitives",
                document.element_count()
            )));
        }
        Ok((raw, document))
    }
}
