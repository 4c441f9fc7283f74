use super::*;
use crate::core::{Lcg, polygon_area};
use crate::engine::parse::parse_svg;
use crate::params::PathMode;
use crate::svg::Primitive;
use crate::svg::raster::rasterize;
use parking_lot::Mutex;
use rayon::prelude::*;

// ============================================================================
// fixtures
// ============================================================================

/// Returns a fixed document and records the parameters of every call.
struct Recording {
    seen: Mutex<Vec<TracingParameters>>,
}

impl Recording {
    fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl TracingEngine for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn trace(&self, image: &PixelImage, params: &TracingParameters) -> std::result::Result<String, EngineError> {
        self.seen.lock().push(*params);
        let (w, h) = (image.width(), image.height());
        Ok(format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}"><path d="M0 0 L{w} 0 L{w} {h} L0 {h} Z" fill="#ffffff"/><path d="M10 10 L30 10 L30 30 L10 30 Z" fill="#000000"/></svg>"##
        ))
    }
}

/// Always errors, counting calls.
struct Broken {
    calls: Mutex<u32>,
}

impl TracingEngine for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn trace(&self, _: &PixelImage, _: &TracingParameters) -> std::result::Result<String, EngineError> {
        *self.calls.lock() += 1;
        Err(EngineError::Failed("segfault".into()))
    }
}

fn solid() -> PixelImage {
    PixelImage::filled(100, 100, Rgb::new(20, 120, 200)).unwrap()
}

fn square() -> PixelImage {
    PixelImage::from_fn(40, 40, |x, y| {
        if (10..30).contains(&x) && (10..30).contains(&y) {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        }
    })
    .unwrap()
}

fn noise() -> PixelImage {
    let mut rng = Lcg::new(3);
    let data: Vec<u8> = (0..64 * 64 * 3).map(|_| rng.next_u32() as u8).collect();
    PixelImage::from_raw(64, 64, 3, data).unwrap()
}

/// White canvas with a 4 px black border.
fn frame() -> PixelImage {
    PixelImage::from_fn(100, 100, |x, y| {
        if x < 4 || y < 4 || x >= 96 || y >= 96 {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        }
    })
    .unwrap()
}

/// Black annulus on white.
fn annulus() -> PixelImage {
    PixelImage::from_fn(100, 100, |x, y| {
        let dx = f64::from(x) + 0.5 - 50.0;
        let dy = f64::from(y) + 0.5 - 50.0;
        let d = (dx * dx + dy * dy).sqrt();
        if (18.0..=35.0).contains(&d) {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        }
    })
    .unwrap()
}

fn offline() -> Vectorizer {
    Vectorizer::default()
        .with_engine(Arc::new(NoEngine))
        .with_events(Arc::new(NullSink))
}

fn forced(strategy: Strategy) -> ConversionOptions {
    ConversionOptions {
        strategy: Some(strategy),
        ..ConversionOptions::default()
    }
}

// ============================================================================
// scenarios
// ============================================================================

#[test]
fn test_solid_image_single_canvas_primitive() {
    let v = offline();
    let image = solid();
    let mut runs = vec![ConversionOptions::default()];
    runs.extend(Strategy::ALL.map(forced));

    for options in runs {
        let result = v.vectorize(&image, &options).unwrap();
        assert_eq!(result.element_count(), 1, "{:?}", options.strategy);

        let doc = parse_svg(&result.svg, 100, 100).unwrap();
        assert_eq!(doc.element_count(), 1);
        let covered = match &doc.primitives()[0] {
            Primitive::Path { subpaths, filled, .. } => *filled && polygon_area(&subpaths[0]) == 10_000.0,
            Primitive::Rect { width, height, .. } => *width == 100.0 && *height == 100.0,
            Primitive::Circle { .. } => false,
        };
        assert!(covered, "{:?}", doc.primitives()[0]);
        assert_eq!(doc.primitives()[0].color(), Rgb::new(20, 120, 200));
        assert!(result.quality_score > 0.99);
    }
}

#[test]
fn test_enclosing_layer_keeps_interior() {
    let v = offline();
    for (name, image) in [("frame", frame()), ("annulus", annulus())] {
        // high fidelity without an engine ends in the basic fallback
        for strategy in Strategy::ALL {
            let result = v.vectorize(&image, &forced(strategy)).unwrap();
            let doc = parse_svg(&result.svg, 100, 100).unwrap();
            let canvas = rasterize(&doc, 1.0);
            assert_eq!(canvas.pixel(50, 50), Rgb::WHITE, "{name} {strategy}");
            assert_eq!(canvas.pixel(1, 50), if name == "frame" { Rgb::BLACK } else { Rgb::WHITE });
            assert!(result.quality_score > 0.9, "{name} {strategy}: {}", result.quality_score);
        }
    }
}

#[test]
fn test_engine_document_parses() {
    let v = offline().with_engine(Arc::new(Recording::new()));
    let result = v.vectorize(&square(), &forced(Strategy::HighFidelity)).unwrap();
    assert_eq!(result.metadata.content_type, ContentType::TracedRefined);
    let doc = parse_svg(&result.svg, 40, 40).unwrap();
    assert!(!doc.primitives().is_empty());
    let canvas = rasterize(&doc, 1.0);
    assert_eq!(canvas.pixel(20, 20), Rgb::BLACK);
    assert_eq!(canvas.pixel(2, 2), Rgb::WHITE);
}

#[test]
fn test_uniform_image_selects_classical() {
    let result = offline().vectorize(&solid(), &ConversionOptions::default()).unwrap();
    assert_eq!(result.strategy_used, "classical");
    assert_eq!(result.metadata.content_type, ContentType::Contour);
}

#[test]
fn test_engine_unavailable_falls_back() {
    let sink = Arc::new(MemorySink::new());
    let v = offline().with_events(sink.clone());

    for image in [square(), noise()] {
        let result = v.vectorize(&image, &forced(Strategy::HighFidelity)).unwrap();
        assert_eq!(result.strategy_used, "basic_fallback");
        assert_eq!(result.metadata.content_type, ContentType::Fallback);
        assert!(result.element_count() >= 1);
        assert!(result.metadata.fallback_reason.as_deref().is_some_and(|r| r.contains("not available")));
    }
    let fallbacks = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, ConversionEvent::FallbackTriggered { .. }))
        .count();
    assert_eq!(fallbacks, 2);
}

#[test]
fn test_engine_failure_retried_then_fallback() {
    let engine = Arc::new(Broken {
        calls: Mutex::new(0),
    });
    let v = offline().with_engine(engine.clone());
    let result = v.vectorize(&square(), &forced(Strategy::HighFidelity)).unwrap();
    assert_eq!(*engine.calls.lock(), 2);
    assert_eq!(result.strategy_used, "basic_fallback");
    assert!(result.metadata.fallback_reason.as_deref().is_some_and(|r| r.contains("segfault")));
}

#[test]
fn test_palette_mismatch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.svg");
    let v = offline();

    for palette in [None, Some(Vec::new())] {
        let options = ConversionOptions {
            strategy: Some(Strategy::PaletteGuided),
            use_palette: true,
            palette,
            ..ConversionOptions::default()
        };
        let outcome = v.vectorize(&square(), &options).and_then(|r| r.save(&out));
        assert!(matches!(outcome, Err(VectorizeError::PaletteMismatch(_))));
        assert!(!out.exists());
    }

    // without use_palette the extractor supplies one
    let result = v.vectorize(&square(), &forced(Strategy::PaletteGuided)).unwrap();
    assert_eq!(result.metadata.content_type, ContentType::PaletteGuided);
}

#[test]
fn test_caller_palette_used() {
    let image = PixelImage::from_fn(60, 30, |x, _| {
        if x < 30 { Rgb::new(250, 5, 5) } else { Rgb::new(5, 5, 250) }
    })
    .unwrap();
    let palette = vec![Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)];
    let options = ConversionOptions {
        strategy: Some(Strategy::PaletteGuided),
        palette: Some(palette.clone()),
        use_palette: true,
        ..ConversionOptions::default()
    };
    let result = offline().vectorize(&image, &options).unwrap();
    let doc = parse_svg(&result.svg, 60, 30).unwrap();
    let colors: Vec<Rgb> = doc.primitives().iter().map(Primitive::color).collect();
    assert!(colors.iter().all(|c| palette.contains(c)));
    assert!(colors.contains(&palette[0]) && colors.contains(&palette[1]));
}

#[test]
fn test_explicit_parameters_used_verbatim() {
    let engine = Arc::new(Recording::new());
    let v = offline().with_engine(engine.clone());

    // a two-color logo would derive the logo bundle; ask for the opposite
    let explicit = TracingParameters {
        filter_speckle: 13,
        color_precision: 1,
        corner_threshold: 170,
        mode: PathMode::Polygon,
        ..TracingParameters::default()
    };
    let options = ConversionOptions {
        strategy: Some(Strategy::HighFidelity),
        tracing_parameters: Some(explicit),
        ..ConversionOptions::default()
    };
    let result = v.vectorize(&square(), &options).unwrap();

    assert_eq!(engine.seen.lock().as_slice(), &[explicit]);
    assert_eq!(result.metadata.tracing_parameters, Some(explicit));
    assert_eq!(result.metadata.parameter_source, Some(ParameterSource::Explicit));
    assert_eq!(result.metadata.content_type, ContentType::TracedRefined);
}

#[test]
fn test_derived_parameters_reported() {
    let engine = Arc::new(Recording::new());
    let v = offline().with_engine(engine.clone());
    let result = v.vectorize(&square(), &forced(Strategy::HighFidelity)).unwrap();
    assert!(matches!(
        result.metadata.parameter_source,
        Some(ParameterSource::Derived(_))
    ));
    assert_eq!(engine.seen.lock()[0], result.metadata.tracing_parameters.unwrap());
}

#[test]
fn test_refined_output_keeps_traced_shapes() {
    let v = offline().with_engine(Arc::new(Recording::new()));
    let result = v.vectorize(&square(), &forced(Strategy::HighFidelity)).unwrap();
    assert_eq!(result.strategy_used, "high_fidelity");
    // the traced square already has the corners: no markers needed
    assert_eq!(result.element_count(), 2);
    assert!(result.quality_score > 0.99);
}

#[test]
fn test_raw_output_passthrough() {
    let mut config = VectoConfig::default();
    config.engine.raw_output = true;
    let engine = Arc::new(Recording::new());
    let v = Vectorizer::new(config)
        .with_engine(engine.clone())
        .with_events(Arc::new(NullSink));

    let image = square();
    let result = v.vectorize(&image, &forced(Strategy::HighFidelity)).unwrap();
    assert_eq!(result.metadata.content_type, ContentType::TracedRaw);
    let expected = engine.trace(&image, &TracingParameters::default()).unwrap();
    assert_eq!(result.svg, expected);
    assert_eq!(result.element_count(), 2);
}

#[test]
fn test_round_trip_element_count() {
    let v = offline().with_engine(Arc::new(Recording::new()));
    for strategy in Strategy::ALL {
        for image in [square(), noise()] {
            let result = v.vectorize(&image, &forced(strategy)).unwrap();
            assert_eq!(count_elements(&result.svg).unwrap(), result.element_count());
        }
    }
}

#[test]
fn test_quality_within_unit_range() {
    let v = offline();
    for strategy in Strategy::ALL {
        let result = v.vectorize(&noise(), &forced(strategy)).unwrap();
        assert!((0.0..=1.0).contains(&result.quality_score));
        assert!(result.processing_time >= 0.0);
    }
}

#[test]
fn test_events_in_order() {
    let sink = Arc::new(MemorySink::new());
    let v = offline().with_events(sink.clone());
    v.vectorize(&square(), &ConversionOptions::default()).unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], ConversionEvent::Started { width: 40, height: 40, .. }));
    assert!(matches!(events[1], ConversionEvent::StrategyChosen { forced: false, .. }));
    assert!(matches!(events[2], ConversionEvent::Finished { .. }));
}

#[test]
fn test_zero_budget_prefers_classical() {
    let options = ConversionOptions {
        target_time: 0.0,
        ..ConversionOptions::default()
    };
    let result = offline().vectorize(&noise(), &options).unwrap();
    assert_eq!(result.strategy_used, "classical");
}

#[test]
fn test_concurrent_calls_keep_their_parameters() {
    let engine = Arc::new(Recording::new());
    let v = offline().with_engine(engine.clone());
    let image = square();

    let overrides: Vec<TracingParameters> = (1..=8)
        .map(|speckle| TracingParameters {
            filter_speckle: speckle,
            ..TracingParameters::default()
        })
        .collect();

    let results: Vec<ConversionResult> = overrides
        .par_iter()
        .map(|params| {
            let options = ConversionOptions {
                strategy: Some(Strategy::HighFidelity),
                tracing_parameters: Some(*params),
                ..ConversionOptions::default()
            };
            v.vectorize(&image, &options).unwrap()
        })
        .collect();

    for (params, result) in overrides.iter().zip(&results) {
        assert_eq!(result.metadata.tracing_parameters, Some(*params));
    }
    let mut seen: Vec<u32> = engine.seen.lock().iter().map(|p| p.filter_speckle).collect();
    seen.sort_unstable();
    assert_eq!(seen, (1..=8).collect::<Vec<_>>());
}

#[test]
fn test_invalid_image_rejected() {
    let err = PixelImage::from_raw(0, 0, 3, Vec::new()).unwrap_err();
    assert!(matches!(err, VectorizeError::InvalidImage(_)));
}
