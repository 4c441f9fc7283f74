//! Strategy selector and conversion facade.
//!
//! # Module Structure
//!
//! ```text
//! vectorizer/
//! ├── strategy.rs   # Strategy enum, cost model, select_strategy
//! ├── events.rs     # ConversionEvent, EventSink (+ log/null/memory sinks)
//! ├── result.rs     # ConversionResult, ResultMetadata, ContentType
//! └── mod.rs        # Vectorizer (this file)
//! ```
//!
//! # Flow
//!
//! ```text
//! vectorize(image, options)
//!   ├─ analyze (once)
//!   ├─ strategy = override or select_strategy(metadata, budget)
//!   ├─ palette_guided ─► palette ─► layers ─► ultra contours
//!   ├─ high_fidelity  ─► params ─► engine adapter ─┬─► raw | refined
//!   │                                              └─► basic fallback
//!   ├─ classical      ─► quantized layers ─► moderate contours
//!   └─ score + serialize ─► ConversionResult
//! ```
//!
//! A [`Vectorizer`] holds configuration and shared services only. Every
//! per-call input travels in [`ConversionOptions`], so one instance can
//! serve concurrent conversions.

mod events;
mod result;
mod strategy;

#[cfg(test)]
mod tests;

pub use events::{ConversionEvent, EventSink, LogSink, MemorySink, NullSink};
pub use result::{ContentType, ConversionResult, ResultMetadata};
pub use strategy::{PALETTE_MAX_COLORS, PALETTE_MAX_GRADIENT, Strategy, select_strategy};

use crate::analysis::{Analysis, ColorStats, analyze};
use crate::config::VectoConfig;
use crate::contour::{SmoothingProfile, shapes_for_layers};
use crate::core::{PixelImage, Rgb};
use crate::engine::{
    EngineAdapter, EngineError, NoEngine, TraceState, TracingEngine, VtracerEngine, basic_fallback,
};
use crate::error::{Result, VectorizeError};
use crate::layers::build_layers;
use crate::palette::{Palette, PaletteCache, PaletteExtractor, PaletteLabel, nearest_size};
use crate::params::{self, ParameterSource, TracingParameters};
use crate::refine::refine;
use crate::svg::{SvgDocument, count_elements, quality_score};
use result::Produced;
use std::sync::Arc;
use std::time::Instant;

/// Default advisory budget, in seconds.
pub const DEFAULT_TARGET_TIME: f64 = 30.0;

/// Per-call conversion inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    /// Advisory time budget in seconds. Never aborts a running step.
    pub target_time: f64,
    /// Forces a strategy and skips selection entirely.
    pub strategy: Option<Strategy>,
    /// Used verbatim; no parameter derivation runs when set.
    pub tracing_parameters: Option<TracingParameters>,
    pub palette: Option<Vec<Rgb>>,
    /// Palette-guided conversions must use `palette`.
    pub use_palette: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            target_time: DEFAULT_TARGET_TIME,
            strategy: None,
            tracing_parameters: None,
            palette: None,
            use_palette: false,
        }
    }
}

pub struct Vectorizer {
    config: VectoConfig,
    extractor: PaletteExtractor,
    engine: Arc<dyn TracingEngine>,
    events: Arc<dyn EventSink>,
    palette_cache: Option<PaletteCache>,
}

impl Vectorizer {
    /// Build from configuration, with the configured engine and a [`LogSink`].
    pub fn new(config: VectoConfig) -> Self {
        let engine: Arc<dyn TracingEngine> = if config.engine.enabled {
            Arc::new(VtracerEngine::new(
                config.engine.command.clone(),
                config.engine.timeout_duration(),
                config.engine.path_precision,
            ))
        } else {
            Arc::new(NoEngine)
        };
        let palette_cache = config.palette.cache.then(PaletteCache::default);
        Self {
            extractor: PaletteExtractor::new(config.palette.options()),
            config,
            engine,
            events: Arc::new(LogSink),
            palette_cache,
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn TracingEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &VectoConfig {
        &self.config
    }

    pub fn extractor(&self) -> &PaletteExtractor {
        &self.extractor
    }

    /// Convert one image.
    ///
    /// Only [`VectorizeError::InvalidImage`] and
    /// [`VectorizeError::PaletteMismatch`] can fail a call; engine trouble
    /// ends in the basic fallback instead.
    pub fn vectorize(&self, image: &PixelImage, options: &ConversionOptions) -> Result<ConversionResult> {
        let start = Instant::now();
        if options.strategy == Some(Strategy::PaletteGuided) {
            check_palette(options)?;
        }

        let analysis = analyze(image)?;
        self.events.emit(&ConversionEvent::Started {
            width: image.width(),
            height: image.height(),
            target_time: options.target_time,
        });

        let strategy = match options.strategy {
            Some(forced) => forced,
            None => {
                let remaining = options.target_time - start.elapsed().as_secs_f64();
                select_strategy(
                    &analysis.metadata,
                    &analysis.stats,
                    remaining,
                    self.config.strategy.fast_budget,
                )
            }
        };
        self.events.emit(&ConversionEvent::StrategyChosen {
            strategy,
            forced: options.strategy.is_some(),
        });

        let produced = match strategy {
            Strategy::PaletteGuided => {
                check_palette(options)?;
                self.palette_guided(image, &analysis, options)?
            }
            Strategy::HighFidelity => self.high_fidelity(image, &analysis, options)?,
            Strategy::Classical => self.classical(image, &analysis, options)?,
        };
        Ok(self.finish(produced, image, &analysis, start))
    }

    fn parameters(&self, analysis: &Analysis, options: &ConversionOptions) -> (TracingParameters, ParameterSource) {
        params::resolve(
            options.tracing_parameters.as_ref(),
            &analysis.stats,
            &analysis.metadata,
        )
    }

    fn palette_guided(
        &self,
        image: &PixelImage,
        analysis: &Analysis,
        options: &ConversionOptions,
    ) -> Result<Produced> {
        let (params, source) = self.parameters(analysis, options);
        let palette = match (&options.palette, options.use_palette) {
            (Some(colors), true) => Palette::new(colors.clone()),
            _ => self.suggest_palette(image, &analysis.stats),
        };

        let layers = build_layers(image, &palette);
        let profile =
            SmoothingProfile::from_intensity(self.config.smoothing.palette_intensity, params.filter_speckle);
        let mut document = SvgDocument::new(image.width(), image.height());
        let ordered = layers.by_coverage();
        for shape in shapes_for_layers(&ordered, &profile) {
            document.add_shape(shape);
        }
        if document.element_count() == 0 {
            if let Some(layer) = ordered.first() {
                document.add_rect(
                    0.0,
                    0.0,
                    f64::from(image.width()),
                    f64::from(image.height()),
                    layer.color,
                );
            }
        }

        let mut produced = Produced::new(document, ContentType::PaletteGuided, Strategy::PaletteGuided.as_str());
        produced.parameters = Some((params, source));
        Ok(produced)
    }

    /// Palette sized after the image's significant colors.
    ///
    /// Images with only a few exact colors use the frequency-counted
    /// palette, which reproduces them exactly.
    fn suggest_palette(&self, image: &PixelImage, stats: &ColorStats) -> Palette {
        let k = nearest_size(stats.significant_colors.clamp(2, 12));
        let set = match &self.palette_cache {
            Some(cache) => self.extractor.extract_cached(cache, image, &[k]),
            None => Arc::new(self.extractor.extract(image, &[k])),
        };
        let label = if stats.unique_colors <= self.extractor.options().dominant_count {
            PaletteLabel::Dominant
        } else {
            PaletteLabel::Size(k)
        };
        crate::debug!("palette"; "using {} palette", label);
        set.get(&label)
            .cloned()
            .unwrap_or_else(|| self.extractor.cluster(image, k))
    }

    fn high_fidelity(
        &self,
        image: &PixelImage,
        analysis: &Analysis,
        options: &ConversionOptions,
    ) -> Result<Produced> {
        let (params, source) = self.parameters(analysis, options);
        let adapter = EngineAdapter::new(self.engine.as_ref(), self.config.engine.adapter_options());

        match adapter.run(image, &params) {
            TraceState::Succeeded(output) => {
                let output = *output;
                let mut produced = if self.config.engine.raw_output {
                    let mut produced =
                        Produced::new(output.document, ContentType::TracedRaw, Strategy::HighFidelity.as_str());
                    produced.raw = Some(output.raw);
                    produced
                } else {
                    let mut document = output.document;
                    let report = refine(
                        &mut document,
                        image,
                        analysis,
                        &self.config.refine,
                        &self.extractor,
                    );
                    let mut produced =
                        Produced::new(document, ContentType::TracedRefined, Strategy::HighFidelity.as_str());
                    produced.gradient_regions = report.gradient_regions;
                    produced
                };
                produced.parameters = Some((output.params, source));
                Ok(produced)
            }
            TraceState::Unavailable(reason) => self.fallback(image, reason, params, source),
            TraceState::Failed { reason, attempts } => {
                crate::debug!("engine"; "gave up after {} attempts", attempts);
                self.fallback(image, reason, params, source)
            }
            TraceState::NotInvoked | TraceState::Invoking { .. } => self.fallback(
                image,
                EngineError::Failed("engine run did not finish".into()),
                params,
                source,
            ),
        }
    }

    fn fallback(
        &self,
        image: &PixelImage,
        reason: EngineError,
        params: TracingParameters,
        source: ParameterSource,
    ) -> Result<Produced> {
        let reason = reason.to_string();
        self.events.emit(&ConversionEvent::FallbackTriggered {
            reason: reason.clone(),
        });
        let document = basic_fallback(
            image,
            &self.extractor,
            self.config.smoothing.fallback_intensity,
            params.filter_speckle,
        )?;
        let mut produced = Produced::new(document, ContentType::Fallback, "basic_fallback");
        produced.parameters = Some((params, source));
        produced.fallback_reason = Some(reason);
        Ok(produced)
    }

    fn classical(
        &self,
        image: &PixelImage,
        analysis: &Analysis,
        options: &ConversionOptions,
    ) -> Result<Produced> {
        let (params, source) = self.parameters(analysis, options);
        let document = basic_fallback(
            image,
            &self.extractor,
            self.config.smoothing.layer_intensity,
            params.filter_speckle,
        )?;
        let mut produced = Produced::new(document, ContentType::Contour, Strategy::Classical.as_str());
        produced.parameters = Some((params, source));
        Ok(produced)
    }

    fn finish(
        &self,
        produced: Produced,
        image: &PixelImage,
        analysis: &Analysis,
        start: Instant,
    ) -> ConversionResult {
        let Produced {
            document,
            raw,
            content_type,
            strategy_used,
            parameters,
            fallback_reason,
            gradient_regions,
        } = produced;

        let quality_score = quality_score(&document, image);
        let (svg, num_elements) = match raw {
            Some(raw) => {
                let count = count_elements(&raw).unwrap_or_else(|_| document.element_count());
                (raw, count)
            }
            None => (document.to_svg_string(), document.element_count()),
        };
        let processing_time = start.elapsed().as_secs_f64();

        self.events.emit(&ConversionEvent::Finished {
            strategy_used: strategy_used.clone(),
            elements: num_elements,
            quality_score,
            seconds: processing_time,
        });

        let (tracing_parameters, parameter_source) = match parameters {
            Some((params, source)) => (Some(params), Some(source)),
            None => (None, None),
        };
        ConversionResult {
            svg,
            processing_time,
            strategy_used,
            quality_score,
            metadata: ResultMetadata {
                num_elements,
                content_type,
                image_metadata: analysis.metadata,
                parameter_source,
                tracing_parameters,
                fallback_reason,
                gradient_regions,
            },
        }
    }
}

impl Default for Vectorizer {
    fn default() -> Self {
        Self::new(VectoConfig::default())
    }
}

/// A palette-guided call that insists on a caller palette must have one.
fn check_palette(options: &ConversionOptions) -> Result<()> {
    if !options.use_palette {
        return Ok(());
    }
    match &options.palette {
        Some(colors) if !colors.is_empty() => Ok(()),
        Some(_) => Err(VectorizeError::PaletteMismatch(
            "use_palette is set but the palette is empty".into(),
        )),
        None => Err(VectorizeError::PaletteMismatch(
            "use_palette is set but no palette was given".into(),
        )),
    }
}
